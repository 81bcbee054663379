use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gemini_client::Gemini;
use mapstation_common::Config;
use mapstation_core::{AppContext, FactProvider, GeminiFactProvider};

mod routes;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("mapstation=info".parse()?))
        .init();

    info!("Map Station starting...");

    // Load config; a missing GEMINI_API_KEY aborts here
    let config = Config::from_env();

    let agent = Gemini::new(config.gemini_api_key.clone(), config.gemini_model.clone());
    let provider: Arc<dyn FactProvider> = Arc::new(GeminiFactProvider::new(agent));

    // Load the atlas and the capital list once; both degrade on failure
    let ctx = Arc::new(AppContext::load(&config, provider).await);
    if ctx.atlas.is_empty() {
        info!("running with an empty atlas; selection and quizzes are unavailable");
    }

    let app = routes::app(ctx);

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!("Map Station serving on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
