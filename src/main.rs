use product_dashboard::{
    router, AppState, DashboardConfig, InMemorySnapshotStore, RestSnapshotStore, SnapshotStore,
    StoreSource, TimeLabels,
};
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = DashboardConfig::from_env()?;
    let labels = TimeLabels::new(config.utc_offset);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    match &config.source {
        StoreSource::Rest(store_config) => {
            let store = RestSnapshotStore::new(store_config)?;
            info!(endpoint = store.endpoint(), "using rest snapshot store");
            serve(store, labels, addr).await
        }
        StoreSource::Demo => {
            info!("using demo snapshot store");
            serve(InMemorySnapshotStore::demo(), labels, addr).await
        }
    }
}

async fn serve<S: SnapshotStore>(
    store: S,
    labels: TimeLabels,
    addr: SocketAddr,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::new(store, labels);
    state.session.initialize().await;

    let app = router(state);
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("failed to listen for ctrl-c: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!("failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutting down");
}
