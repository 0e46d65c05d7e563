use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use kdrama_insights::{
    api::{create_router, AppState},
    config::Config,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("kdrama_insights=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let state = AppState::from_config(&config);

    // Fail fast on missing or malformed input files
    let insights = state.insights().await?;
    tracing::info!(
        catalog = insights.summary.catalog_size,
        rated = insights.summary.num_rated,
        matched = insights.summary.num_matched,
        "Datasets loaded"
    );

    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!("Server running on http://{}", address);
    axum::serve(listener, app).await?;

    Ok(())
}
