// src/handlers/workbench.rs

use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};
use validator::Validate;

use crate::{
    clipboard::{ClipboardWriter, spawn_copy},
    error::AppError,
    models::{
        action::{Action, ActionOutcome},
        workbench::ScrollRequest,
    },
    state::{SharedSession, lock},
};

/// Scroll event from a surface. Events from the leader move every follower.
pub async fn scroll(
    State(session): State<SharedSession>,
    Json(payload): Json<ScrollRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let mut session = lock(&session)?;
    let outcome = session
        .workbench_mut()
        .handle_scroll(&payload.surface_id, payload.x, payload.y)?;
    Ok(Json(outcome))
}

/// Dispatches a control action.
///
/// Copies are handed to the clipboard on a background task; the response
/// does not wait for them.
pub async fn dispatch_action(
    State(session): State<SharedSession>,
    State(clipboard): State<Arc<dyn ClipboardWriter>>,
    Json(action): Json<Action>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = {
        let mut session = lock(&session)?;
        session.dispatch(action)?
    };

    if let ActionOutcome::Copied { payload } = &outcome {
        spawn_copy(clipboard, payload.clone());
    }

    Ok(Json(outcome))
}
