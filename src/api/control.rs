use std::sync::Arc;

use axum::{Extension, http::StatusCode, response::Json};
use serde_json::{Value, json};

use crate::{config, info, logging, management::ControlState, types::ControlStatus};

type Shared = Extension<Arc<ControlState>>;

pub async fn status(Extension(state): Shared) -> Json<ControlStatus> {
    Json(state.status().await)
}

pub async fn pause(Extension(state): Shared) -> Json<Value> {
    state.set_paused(true);
    info!("Skipping paused from the control menu.");
    Json(json!({ "paused": true }))
}

pub async fn resume(Extension(state): Shared) -> Json<Value> {
    state.set_paused(false);
    info!("Skipping resumed from the control menu.");
    Json(json!({ "paused": false }))
}

pub async fn toggle(Extension(state): Shared) -> Json<Value> {
    let paused = state.toggle_paused();
    if paused {
        info!("Skipping paused from the control menu.");
    } else {
        info!("Skipping resumed from the control menu.");
    }
    Json(json!({ "paused": paused }))
}

/// Turns skipping off for the track that is playing now.
///
/// Answers `202 Accepted`: the loop is woken and binds the request to the
/// track it reads from the player.
pub async fn keep(Extension(state): Shared) -> (StatusCode, Json<Value>) {
    state.request_keep();
    info!("Keep requested from the control menu.");
    (
        StatusCode::ACCEPTED,
        Json(json!({ "keep_pending": true, "paused": state.is_paused() })),
    )
}

pub async fn logs() -> Json<Value> {
    let path = logging::log_dir()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(config::logs_dir);
    Json(json!({ "path": path }))
}

pub async fn exit(Extension(state): Shared) -> Json<Value> {
    info!("Exit requested from the control menu.");
    state.request_shutdown();
    Json(json!({ "exiting": true }))
}
