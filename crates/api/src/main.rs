use anyhow::Context;

use scenario_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    scenario_observability::init();

    let config = ApiConfig::from_env();
    let (app, jobs) = scenario_api::app::build_app(&config);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        max_concurrent_jobs = config.max_concurrent_jobs,
        provider = %config.provider.endpoint,
        "listening on {}",
        listener.local_addr()?
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server stopped; draining analysis jobs");
    jobs.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
