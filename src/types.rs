use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Reply text for the transient "no model yet" condition. Older callers match
/// on this literal, so it must not change.
pub const MODEL_NOT_LOADED: &str = "Model not loaded. Try again.";

/// URL (exact string, query and fragment included) to phishing probability.
pub type PredictionMap = HashMap<String, f64>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action")]
pub enum PredictRequest {
    #[serde(rename = "predictUrls")]
    PredictUrls { urls: Vec<String> },
}

impl PredictRequest {
    pub fn predict_urls(urls: Vec<String>) -> Self {
        PredictRequest::PredictUrls { urls }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Transient; the caller should retry.
    ModelNotLoaded,
    UnsupportedAction,
    Internal,
    /// A code this build does not know; treated like `Internal`.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PredictResponse {
    Predictions {
        predictions: PredictionMap,
    },
    Error {
        error: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<ErrorCode>,
    },
}

impl PredictResponse {
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        PredictResponse::Error {
            error: message.into(),
            code: Some(code),
        }
    }

    pub fn not_loaded() -> Self {
        Self::error(ErrorCode::ModelNotLoaded, MODEL_NOT_LOADED)
    }

    /// Classifies an error reply. Replies without a code fall back to the
    /// legacy literal match.
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            PredictResponse::Predictions { .. } => None,
            PredictResponse::Error { code: Some(ErrorCode::Unknown), .. } => Some(ErrorCode::Internal),
            PredictResponse::Error { code: Some(code), .. } => Some(*code),
            PredictResponse::Error { error, code: None } if error == MODEL_NOT_LOADED => {
                Some(ErrorCode::ModelNotLoaded)
            }
            PredictResponse::Error { .. } => Some(ErrorCode::Internal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_shape() {
        let request = PredictRequest::predict_urls(vec!["https://a.example/".to_string()]);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value, json!({"action": "predictUrls", "urls": ["https://a.example/"]}));
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let parsed = serde_json::from_value::<PredictRequest>(json!({"action": "scanPage", "urls": []}));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_not_loaded_wire_shape() {
        let value = serde_json::to_value(PredictResponse::not_loaded()).unwrap();
        assert_eq!(
            value,
            json!({"error": "Model not loaded. Try again.", "code": "model_not_loaded"})
        );
    }

    #[test]
    fn test_legacy_error_classification() {
        let legacy: PredictResponse =
            serde_json::from_value(json!({"error": "Model not loaded. Try again."})).unwrap();
        assert_eq!(legacy.error_code(), Some(ErrorCode::ModelNotLoaded));

        let other: PredictResponse = serde_json::from_value(json!({"error": "boom"})).unwrap();
        assert_eq!(other.error_code(), Some(ErrorCode::Internal));
    }

    #[test]
    fn test_unknown_code_classified_as_internal() {
        let reply: PredictResponse =
            serde_json::from_value(json!({"error": "slow down", "code": "rate_limited"})).unwrap();
        assert_eq!(reply.error_code(), Some(ErrorCode::Internal));
    }

    #[test]
    fn test_predictions_decode() {
        let reply: PredictResponse =
            serde_json::from_value(json!({"predictions": {"https://a.example/": 0.25}})).unwrap();
        assert_eq!(reply.error_code(), None);
        match reply {
            PredictResponse::Predictions { predictions } => {
                assert_eq!(predictions.get("https://a.example/"), Some(&0.25));
            }
            other => panic!("unexpected reply: {:?}", other),
        }
    }
}
