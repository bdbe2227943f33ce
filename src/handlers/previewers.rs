// src/handlers/previewers.rs

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::{previewer::InitRequest, workbench::RefreshResponse},
    state::{SharedSession, lock},
};

/// Lists previewers in configuration order. The first one is the scroll leader.
pub async fn list_previewers(
    State(session): State<SharedSession>,
) -> Result<impl IntoResponse, AppError> {
    let session = lock(&session)?;
    Ok(Json(session.workbench().summaries()))
}

/// Current content and scroll offset of one previewer surface.
pub async fn get_content(
    State(session): State<SharedSession>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let session = lock(&session)?;
    let previewer = session.workbench().previewer(&name)?;
    Ok(Json(previewer.surface_content()))
}

/// Rebuilds all previewers, from the request body when it carries a
/// configuration and from the current one otherwise.
pub async fn init_workbench(
    State(session): State<SharedSession>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let payload: InitRequest = if body.is_empty() {
        InitRequest::default()
    } else {
        serde_json::from_slice(&body)?
    };
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let mut session = lock(&session)?;
    let report = session.reinitialize(payload.previewers)?;

    Ok(Json(RefreshResponse {
        report,
        previewers: session.workbench().summaries(),
    }))
}
