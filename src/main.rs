use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use phishblock_engine::{config::EngineConfig, handler::RequestHandler, model::ModelStore, routes::router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "phishblock_engine=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = EngineConfig::from_env();
    info!("Loaded configuration: {:?}", config);

    // The model loads in the background; until it lands, /predict answers
    // "not loaded" instead of blocking.
    let store = Arc::new(ModelStore::new());
    tokio::spawn({
        let store = store.clone();
        let source = config.model_source.clone();
        async move {
            store.load(&source).await;
        }
    });

    let app = router(RequestHandler::new(store));

    let addr: SocketAddr = config.bind_addr.parse()?;
    info!("Starting PhishBlock engine on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    warn!("PhishBlock engine shutting down, draining in-flight predictions");
}
