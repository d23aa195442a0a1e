use color_eyre::eyre;
use funcworker_server::{config::PORT_ENV, create_app, WorkerConfig, ROUTES};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    dotenvy::dotenv().ok();
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,funcworker_server=debug")),
        )
        .init();

    let config = WorkerConfig::from_env()?;
    if !config.port_from_host {
        warn!("{} not set, falling back to port {}", PORT_ENV, config.port);
    }
    let addr = config.socket_addr()?;

    let app = create_app(ROUTES);
    for route in ROUTES {
        info!("Serving {} at {} (trigger: {})", route.function, route.path, route.trigger);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Custom handler listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
