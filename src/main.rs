use physiolog_dashboard::{router, AppState, DashboardConfig, DashboardSession, HttpGateway};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = DashboardConfig::from_env();
    let gateway = HttpGateway::new(&config.api_url);
    let state = AppState::new(DashboardSession::new(gateway, config.stats_source));

    // Failures here leave placeholder stats; the page still serves.
    state.session.select_window(config.initial_window).await;

    let addr = config.listen_addr();
    info!(api = %config.api_url, "listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
}
