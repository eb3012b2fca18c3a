use std::sync::Arc;

use anyhow::{Context, Result};
use arbolitos::cli::Cli;
use arbolitos::{build_router, AppState, MemoryStore, MongoStore, RecordStore};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let store: Arc<dyn RecordStore> = if cli.memory {
        Arc::new(MemoryStore::default())
    } else {
        let mongo = MongoStore::connect(&cli.mongodb_uri)
            .await
            .context("cannot reach MongoDB")?;
        Arc::new(mongo)
    };
    info!(backend = store.backend_tag(), "record store ready");

    let app = build_router(AppState::new(store.clone()));
    let listener = TcpListener::bind(&cli.bind)
        .await
        .with_context(|| format!("bind failed on {}", cli.bind))?;
    info!("my-arbolitos-web listening on {}", cli.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server failed")?;

    store.close().await;
    Ok(())
}
