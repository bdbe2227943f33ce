// src/main.rs

use std::sync::Arc;

use dotenvy::dotenv;
use sanitize_bench::{
    build_session,
    clipboard::{ClipboardWriter, DisabledClipboard, SystemClipboard},
    config::Config,
    routes,
    state::AppState,
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env()?;

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "sanitize-bench.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Previewer configuration is checked against the registries before serving
    let previewers = config.load_previewers()?;
    let session = build_session(&config, previewers)?;
    tracing::info!(
        previewers = session.workbench().previewers().len(),
        "Workbench initialized"
    );

    let clipboard: Arc<dyn ClipboardWriter> = if config.clipboard_enabled {
        Arc::new(SystemClipboard)
    } else {
        tracing::info!("Clipboard disabled");
        Arc::new(DisabledClipboard)
    };

    let addr = config.bind_addr;
    let state = AppState::new(session, config, clipboard);

    // Create the Axum application router
    let app = routes::create_router(state);

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Start the server
    axum::serve(listener, app).await?;
    Ok(())
}
