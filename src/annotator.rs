use tracing::debug;

use crate::{config::DEFAULT_THRESHOLD, page::Page, types::PredictionMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskMarker {
    High,
    Low,
}

impl RiskMarker {
    pub fn outline(&self) -> &'static str {
        match self {
            RiskMarker::High => "2px solid #e74c3c",
            RiskMarker::Low => "2px solid #2ecc71",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnnotationSummary {
    pub high: usize,
    pub low: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Applies a binary risk marker to anchors that have a prediction.
#[derive(Debug, Clone, Copy)]
pub struct Annotator {
    threshold: f64,
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl Annotator {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Strictly above the threshold is high risk.
    pub fn marker_for(&self, probability: f64) -> RiskMarker {
        if probability > self.threshold {
            RiskMarker::High
        } else {
            RiskMarker::Low
        }
    }

    /// Walks the page's anchors afresh and marks each one whose href is a key
    /// of `predictions`. A failure on one anchor does not stop the rest.
    pub fn annotate<P: Page>(&self, page: &mut P, predictions: &PredictionMap) -> AnnotationSummary {
        let mut summary = AnnotationSummary::default();

        for (index, href) in page.hrefs().into_iter().enumerate() {
            let Some(probability) = href.as_deref().and_then(|h| predictions.get(h)) else {
                summary.skipped += 1;
                continue;
            };

            let marker = self.marker_for(*probability);
            match page.mark(index, marker) {
                Ok(()) if marker == RiskMarker::High => summary.high += 1,
                Ok(()) => summary.low += 1,
                Err(e) => {
                    debug!("Ignoring marking failure: {}", e);
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}
