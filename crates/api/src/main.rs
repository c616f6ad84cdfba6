//! API server entry point.

use api::{AppState, Config};
use sqlx::postgres::PgPoolOptions;
use store::{InMemoryStore, PostgresStore, Store};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install SIGINT handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

async fn serve<S: Store + Clone + 'static>(
    store: S,
    config: &Config,
    metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
) -> Result<(), BoxError> {
    let state = AppState::new(store, config);
    let app = api::create_app(state, metrics_handle, config);

    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shut down gracefully");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // 1. Load configuration
    let config = Config::from_env()?;

    // 2. Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 3. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?;

    // 4. Pick the store and start serving
    match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new().max_connections(10).connect(url).await?;
            let store = PostgresStore::new(pool);
            store.run_migrations().await?;
            tracing::info!("using PostgreSQL store");
            serve(store, &config, metrics_handle).await
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store");
            serve(InMemoryStore::new(), &config, metrics_handle).await
        }
    }
}
