use anyhow::Context;

use stayhub_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real deployments set the environment directly.
    let _ = dotenvy::dotenv();
    stayhub_observability::init();

    let config = ApiConfig::from_env().context("invalid configuration")?;
    let app = stayhub_api::app::build_app(&config).await?;

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        environment = ?config.environment,
        "server running"
    );

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
