// src/handlers/diffs.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    models::workbench::{DiffListResponse, DiffRequest},
    state::{SharedSession, lock},
};

pub async fn list_diffs(
    State(session): State<SharedSession>,
) -> Result<impl IntoResponse, AppError> {
    let session = lock(&session)?;
    let diffs = session
        .workbench()
        .diffs()
        .iter()
        .map(|d| d.summary())
        .collect();
    Ok(Json(DiffListResponse { diffs }))
}

/// Creates a diff view of two arbitrary documents.
pub async fn create_diff(
    State(session): State<SharedSession>,
    Json(payload): Json<DiffRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let mut session = lock(&session)?;
    let workbench = session.workbench_mut();
    let id = workbench.show_diff(&payload.before, &payload.after);
    let diff = workbench.diff(id)?.summary();

    Ok((StatusCode::CREATED, Json(diff)))
}

pub async fn get_diff(
    State(session): State<SharedSession>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let session = lock(&session)?;
    let diff = session.workbench().diff(id)?.summary();
    Ok(Json(diff))
}

pub async fn delete_diff(
    State(session): State<SharedSession>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut session = lock(&session)?;
    session.workbench_mut().dismiss_diff(id)?;
    Ok(StatusCode::NO_CONTENT)
}
