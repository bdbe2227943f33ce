// src/lib.rs

pub mod clipboard;
pub mod config;
pub mod diff;
pub mod error;
pub mod fixtures;
pub mod frames;
pub mod handlers;
pub mod layout;
pub mod models;
pub mod previewer;
pub mod render;
pub mod routes;
pub mod sanitizers;
pub mod session;
pub mod state;
pub mod utils;
pub mod workbench;

use std::sync::Arc;

pub use routes::create_router;

use crate::{
    config::Config,
    diff::{DiffViewer, PrettyHtml},
    error::WorkbenchError,
    frames::FrameRegistry,
    models::previewer::PreviewerConfig,
    render::MemoryTarget,
    sanitizers::SanitizerRegistry,
    session::Session,
    workbench::Workbench,
};

/// Builds the built-in registries and starts a session over `configs`.
pub fn build_session(
    config: &Config,
    configs: Vec<PreviewerConfig>,
) -> Result<Session, WorkbenchError> {
    let sanitizers = Arc::new(SanitizerRegistry::builtin());
    let frames = Arc::new(FrameRegistry::builtin(config.frame_stylesheet_url.as_deref()));
    let workbench = Workbench::new(
        sanitizers,
        frames,
        DiffViewer::new(Arc::new(PrettyHtml)),
        MemoryTarget::factory(),
    );
    Session::start(workbench, configs)
}
