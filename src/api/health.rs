use std::sync::Arc;

use axum::{Extension, response::Json};
use serde_json::{Value, json};

use crate::management::ControlState;

/// Liveness probe used by the CLI to find a running instance.
pub async fn health(Extension(state): Extension<Arc<ControlState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "paused": state.is_paused(),
    }))
}
