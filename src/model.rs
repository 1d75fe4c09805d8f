use parking_lot::RwLock;
use serde::{de::IgnoredAny, Deserialize, Deserializer};
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};
use tracing::{error, info};

use crate::error::ModelLoadError;

/// Trained character n-gram logistic regression.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelArtifact {
    /// Presence-only; the artifact stores it as a map whose values are unused.
    #[serde(deserialize_with = "vocabulary_keys")]
    pub vocabulary: HashSet<String>,
    pub ngram_range: (usize, usize),
    pub weights: HashMap<String, f64>,
    pub intercept: f64,
}

fn vocabulary_keys<'de, D>(deserializer: D) -> Result<HashSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let map = HashMap::<String, IgnoredAny>::deserialize(deserializer)?;
    Ok(map.into_keys().collect())
}

impl ModelArtifact {
    pub fn from_json(content: &str) -> Result<Self, ModelLoadError> {
        let model: ModelArtifact = serde_json::from_str(content)?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<(), ModelLoadError> {
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(ModelLoadError::InvalidNgramRange { min_n, max_n });
        }
        Ok(())
    }
}

/// Process-wide holder of the current model.
///
/// Either empty or holding one complete artifact. Writers replace the whole
/// value; readers take an `Arc` snapshot and never observe a partial model.
#[derive(Debug, Default)]
pub struct ModelStore {
    current: RwLock<Option<Arc<ModelArtifact>>>,
}

impl ModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches and parses the artifact at `source` (a file path or an
    /// `http(s)://` URL) and publishes the result. Any failure publishes
    /// "no model". Returns whether a model is now available.
    pub async fn load(&self, source: &str) -> bool {
        match fetch_artifact(source).await {
            Ok(model) => {
                info!(
                    "PhishBlock model loaded from {}: {} n-grams, {} weights, ngram_range {:?}",
                    source,
                    model.vocabulary.len(),
                    model.weights.len(),
                    model.ngram_range
                );
                self.publish(Some(model));
                true
            }
            Err(e) => {
                error!("Error loading PhishBlock model from {}: {}", source, e);
                self.publish(None);
                false
            }
        }
    }

    pub fn publish(&self, model: Option<ModelArtifact>) {
        *self.current.write() = model.map(Arc::new);
    }

    pub fn is_ready(&self) -> bool {
        self.current.read().is_some()
    }

    pub fn get(&self) -> Option<Arc<ModelArtifact>> {
        self.current.read().clone()
    }
}

async fn fetch_artifact(source: &str) -> Result<ModelArtifact, ModelLoadError> {
    let content = if source.starts_with("http://") || source.starts_with("https://") {
        let response = reqwest::get(source).await?;
        if !response.status().is_success() {
            return Err(ModelLoadError::Status(response.status()));
        }
        response.text().await?
    } else {
        tokio::fs::read_to_string(source).await?
    };

    ModelArtifact::from_json(&content)
}
