// src/state.rs

use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::FromRef;

use crate::{clipboard::ClipboardWriter, config::Config, error::AppError, session::Session};

pub type SharedSession = Arc<Mutex<Session>>;

#[derive(Clone)]
pub struct AppState {
    pub session: SharedSession,
    pub config: Config,
    pub clipboard: Arc<dyn ClipboardWriter>,
}

impl AppState {
    pub fn new(session: Session, config: Config, clipboard: Arc<dyn ClipboardWriter>) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            config,
            clipboard,
        }
    }
}

/// Locks the session. All engine work happens under this one lock, so the
/// previewers only ever see one update at a time.
pub fn lock(session: &SharedSession) -> Result<MutexGuard<'_, Session>, AppError> {
    session
        .lock()
        .map_err(|_| AppError::InternalServerError("session lock poisoned".to_string()))
}

impl FromRef<AppState> for SharedSession {
    fn from_ref(state: &AppState) -> Self {
        state.session.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Arc<dyn ClipboardWriter> {
    fn from_ref(state: &AppState) -> Self {
        state.clipboard.clone()
    }
}
