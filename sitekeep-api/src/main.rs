use anyhow::Result;
use sitekeep_api::{ApiConfig, build_router};
use sitekeep_store::initialize_store;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "sitekeep_api=info,sitekeep_store=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = ApiConfig::from_env()?;
    tracing::info!(?config, "starting site API");
    if !config.writes_enabled() {
        tracing::warn!("SITE_API_KEY is not set; every write will be rejected");
    }

    let repository = initialize_store(config.json_path.as_deref(), &config.content_root)?;
    let app = build_router(&config, repository);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("failed to listen for shutdown signal: {e}");
                std::future::pending::<()>().await;
            }
        })
        .await
        .inspect_err(|e| tracing::error!("server stopped with error: {e:?}"))?;

    tracing::info!("site API stopped");
    Ok(())
}
