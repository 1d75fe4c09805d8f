use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{
    error::AppError,
    handler::RequestHandler,
    types::{PredictRequest, PredictResponse},
};

pub fn router(handler: RequestHandler) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(handler)
}

async fn predict(
    State(handler): State<RequestHandler>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::UnsupportedAction(e.body_text()))?;
    Ok(Json(handler.handle(request)))
}

async fn health(State(handler): State<RequestHandler>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "model_loaded": handler.store().is_ready(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}
