// src/handlers/plugins.rs

use axum::{Json, extract::State, response::IntoResponse};

use crate::{
    error::AppError,
    models::workbench::PluginsResponse,
    state::{SharedSession, lock},
};

/// Lists registered sanitizers and frames in registration order.
pub async fn list_plugins(
    State(session): State<SharedSession>,
) -> Result<impl IntoResponse, AppError> {
    let session = lock(&session)?;
    let workbench = session.workbench();

    Ok(Json(PluginsResponse {
        sanitizers: workbench.sanitizers().list(),
        frames: workbench.frames().list(),
    }))
}
