// src/handlers/source.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    fixtures,
    models::workbench::{RefreshResponse, SourceRequest, SourceResponse},
    session::Session,
    state::{SharedSession, lock},
    workbench::RefreshReport,
};

fn refresh_response(session: &Session, report: RefreshReport) -> RefreshResponse {
    RefreshResponse {
        report,
        previewers: session.workbench().summaries(),
    }
}

pub async fn get_source(
    State(session): State<SharedSession>,
) -> Result<impl IntoResponse, AppError> {
    let session = lock(&session)?;
    Ok(Json(SourceResponse {
        html: session.source().to_string(),
    }))
}

/// Replaces the raw HTML and refreshes every previewer.
/// Individual previewer failures are reported, not returned as errors.
pub async fn put_source(
    State(session): State<SharedSession>,
    Json(payload): Json<SourceRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let mut session = lock(&session)?;
    let report = session.set_source(payload.html);
    Ok(Json(refresh_response(&session, report)))
}

pub async fn clear_source(
    State(session): State<SharedSession>,
) -> Result<impl IntoResponse, AppError> {
    let mut session = lock(&session)?;
    let report = session.clear();
    Ok(Json(refresh_response(&session, report)))
}

/// Loads one of the bundled sample documents as the source.
pub async fn load_example(
    State(session): State<SharedSession>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let fixture = fixtures::find(&name)
        .ok_or_else(|| AppError::NotFound(format!("No example named '{}'", name)))?;

    tracing::info!("Adding {} example", fixture.name);
    let mut session = lock(&session)?;
    let report = session.set_source(fixture.html.to_string());
    Ok(Json(refresh_response(&session, report)))
}

pub async fn list_examples() -> impl IntoResponse {
    Json(fixtures::FIXTURES)
}
