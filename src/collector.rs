use std::collections::HashSet;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    annotator::{AnnotationSummary, Annotator},
    config::RetryPolicy,
    error::TransportError,
    page::Page,
    transport::Transport,
    types::{ErrorCode, PredictRequest, PredictResponse, PredictionMap},
};

#[derive(Error, Debug)]
pub enum RequestFailure {
    #[error("Model failed to load after {attempts} attempts")]
    ModelUnavailable { attempts: u32 },

    #[error("Other error: {0}")]
    Rejected(String),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

#[derive(Debug)]
pub enum ScanOutcome {
    /// The page had no anchor with an href; nothing was sent.
    NoLinks,
    Annotated(AnnotationSummary),
    /// Links are left unmarked.
    Failed(RequestFailure),
}

/// Unique hrefs currently on the page, in first-seen order.
pub fn collect_urls<P: Page>(page: &P) -> Vec<String> {
    let mut seen = HashSet::new();
    page.hrefs()
        .into_iter()
        .flatten()
        .filter(|href| seen.insert(href.clone()))
        .collect()
}

/// Page-side driver: harvest links, ask for scores, mark the page.
#[derive(Debug, Clone)]
pub struct Collector<T> {
    transport: T,
    retry: RetryPolicy,
    annotator: Annotator,
}

impl<T: Transport> Collector<T> {
    pub fn new(transport: T, retry: RetryPolicy, annotator: Annotator) -> Self {
        Self {
            transport,
            retry,
            annotator,
        }
    }

    /// Sends `urls` as one batch. Only a "model not loaded" reply is retried,
    /// sequentially and at most `retry.max_retries` times. Each request is
    /// bounded by `retry.timeout`.
    pub async fn request_predictions(&self, urls: &[String]) -> Result<PredictionMap, RequestFailure> {
        let mut retries = 0;

        loop {
            let request = PredictRequest::predict_urls(urls.to_vec());
            let sent = tokio::time::timeout(self.retry.timeout, self.transport.send(request))
                .await
                .unwrap_or(Err(TransportError::Timeout(self.retry.timeout)));
            let reply = match sent {
                Ok(reply) => reply,
                Err(e) => {
                    error!("PhishBlock transport error: {}", e);
                    return Err(e.into());
                }
            };

            if reply.error_code() == Some(ErrorCode::ModelNotLoaded) {
                if retries < self.retry.max_retries {
                    retries += 1;
                    warn!(
                        "PhishBlock: Model not loaded. Retrying ({}/{})...",
                        retries, self.retry.max_retries
                    );
                    tokio::time::sleep(self.retry.delay).await;
                    continue;
                }
                error!("PhishBlock: Model failed to load after retries.");
                return Err(RequestFailure::ModelUnavailable { attempts: retries + 1 });
            }

            return match reply {
                PredictResponse::Predictions { predictions } => Ok(predictions),
                PredictResponse::Error { error, .. } => {
                    error!("PhishBlock: Other error: {}", error);
                    Err(RequestFailure::Rejected(error))
                }
            };
        }
    }

    /// One full pass over a freshly loaded page.
    pub async fn run<P: Page>(&self, page: &mut P) -> ScanOutcome {
        let urls = collect_urls(page);
        if urls.is_empty() {
            return ScanOutcome::NoLinks;
        }

        match self.request_predictions(&urls).await {
            Ok(predictions) => {
                let summary = self.annotator.annotate(page, &predictions);
                info!(
                    "PhishBlock marked {} high-risk and {} low-risk links",
                    summary.high, summary.low
                );
                ScanOutcome::Annotated(summary)
            }
            Err(failure) => ScanOutcome::Failed(failure),
        }
    }
}
