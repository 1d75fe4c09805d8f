use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::{
    model::ModelStore,
    scorer::predict,
    types::{PredictRequest, PredictResponse, PredictionMap},
};

/// Background-side answer to a batch of URLs.
#[derive(Debug, Clone)]
pub struct RequestHandler {
    store: Arc<ModelStore>,
}

impl RequestHandler {
    pub fn new(store: Arc<ModelStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<ModelStore> {
        &self.store
    }

    pub fn handle(&self, request: PredictRequest) -> PredictResponse {
        match request {
            PredictRequest::PredictUrls { urls } => self.predict_urls(&urls),
        }
    }

    fn predict_urls(&self, urls: &[String]) -> PredictResponse {
        // One snapshot per batch so a concurrent reload cannot mix models.
        let Some(model) = self.store.get() else {
            debug!("Model not loaded, rejecting batch of {} urls", urls.len());
            return PredictResponse::not_loaded();
        };

        let batch_id = Uuid::new_v4();
        let predictions: PredictionMap = urls
            .iter()
            .map(|url| (url.clone(), predict(&model, url)))
            .collect();

        debug!(%batch_id, "Scored {} urls", predictions.len());
        PredictResponse::Predictions { predictions }
    }
}
