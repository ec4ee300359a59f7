//! notesai-api - HTTP server for NotesAI's AI endpoints

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tracing::info;

use notesai_api::logging::{self, LogConfig};
use notesai_api::{build_router, AppState, ServerConfig};
use notesai_inference::{AiGateway, CompletionBackend, OpenAIBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let log_config = LogConfig::from_env();
    let _file_guard = logging::init(&log_config);
    info!(
        json = log_config.json,
        log_file = log_config.file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    let config = ServerConfig::from_env();
    info!(
        "Rate limiting: {} ({} requests per {} seconds)",
        if config.rate_limit_enabled {
            "enabled"
        } else {
            "disabled"
        },
        config.rate_limit_requests,
        config.rate_limit_period_secs
    );

    let backend = Arc::new(OpenAIBackend::from_env()?);
    let model = backend.model_name().to_string();
    let gateway = Arc::new(AiGateway::new(backend));

    let state = AppState::new(gateway, model).with_rate_limiter(config.rate_limiter());
    let app = build_router(state, &config);

    let addr: SocketAddr = config.bind_addr().parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown signal received");
}
