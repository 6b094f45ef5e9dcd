use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::api::AppState;

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "fitlife",
            "version": env!("CARGO_PKG_VERSION"),
            "live_sessions": state.sessions.live_count().await,
        })),
    )
}
