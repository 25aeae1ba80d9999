// Framework bootstrap for the pool server runtime.

use crate::frameworks::config;
use crate::interface_adapters::net::ws_handler;
use crate::interface_adapters::state::AppState;
use crate::use_cases::{PresenceEvent, presence_task};

use axum::{Router, routing::get};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::{io::Result, sync::Arc};
use tokio::sync::mpsc;
use tower_http::{services::ServeDir, trace::TraceLayer};

pub(crate) fn init_runtime() {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// Serves the presence socket at `/ws` and static assets from `PUBLIC_DIR`.
pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    run_with_public_dir(listener, config::public_dir()).await
}

pub async fn run_with_public_dir(
    listener: tokio::net::TcpListener,
    public_dir: PathBuf,
) -> Result<()> {
    let address = listener.local_addr()?;
    let state = build_state();
    let app = Router::new()
        .route("/ws", get(ws_handler))
        .fallback_service(ServeDir::new(&public_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!(%address, public_dir = %public_dir.display(), "listening");

    // Serve app and report errors rather than panicking
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::from(([0, 0, 0, 0], config::http_port()));

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}

fn build_state() -> Arc<AppState> {
    // All connections feed one presence task, which owns the participant count.
    let (presence_tx, presence_rx) =
        mpsc::channel::<PresenceEvent>(config::PRESENCE_CHANNEL_CAPACITY);
    tokio::spawn(presence_task(presence_rx));

    Arc::new(AppState {
        presence_tx,
        outbox_capacity: config::OUTBOX_CAPACITY,
    })
}
