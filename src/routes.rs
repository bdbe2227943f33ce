// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{diffs, page, plugins, previewers, source, workbench},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (source, previewers, diffs, actions).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (session, config, clipboard).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    let source_routes = Router::new()
        .route("/", get(source::get_source).put(source::put_source))
        .route("/clear", post(source::clear_source))
        .route("/examples", get(source::list_examples))
        .route("/example/{name}", post(source::load_example));

    let previewer_routes = Router::new()
        .route("/", get(previewers::list_previewers))
        .route("/{name}/content", get(previewers::get_content));

    let diff_routes = Router::new()
        .route("/", get(diffs::list_diffs).post(diffs::create_diff))
        .route("/{id}", get(diffs::get_diff).delete(diffs::delete_diff));

    Router::new()
        .route("/", get(page::index))
        .route("/api/plugins", get(plugins::list_plugins))
        .route("/api/workbench/init", post(previewers::init_workbench))
        .route("/api/scroll", post(workbench::scroll))
        .route("/api/actions", post(workbench::dispatch_action))
        .nest("/api/source", source_routes)
        .nest("/api/previewers", previewer_routes)
        .nest("/api/diffs", diff_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
