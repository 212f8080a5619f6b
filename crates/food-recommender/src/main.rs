mod catalog;
mod config;
mod display;
mod error;
mod export;
mod model;
mod recommend;
mod server;
mod synonyms;
mod vectorizer;

use std::sync::Arc;

use rmcp::{ServiceExt, transport::stdio};
use tracing::info;
use tracing_subscriber::EnvFilter;

use catalog::Catalog;
use config::Config;
use food_common::assets::ModelAssets;
use food_common::store::ProductStore;
use recommend::Recommender;
use server::FoodRecommenderServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing to stderr (stdout is reserved for MCP JSON-RPC)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting food-recommender MCP server");

    // 1. Load config from environment
    let config = Config::from_env()?;
    info!(
        mongo_db = %config.mongo_db,
        mongo_collection = %config.mongo_collection,
        assets_path = %config.assets_path.display(),
        default_top_n = config.default_top_n,
        default_image = config.default_image_url.is_some(),
        "configuration loaded"
    );

    // 2. Load the catalog and model assets. Either failing is fatal: there is no
    //    degraded mode without products or vocabulary.
    let store = ProductStore::connect(
        &config.mongo_uri,
        &config.mongo_db,
        &config.mongo_collection,
        config.mongo_timeout,
    )
    .await
    .inspect_err(|e| tracing::error!(error = %e, "cannot reach product store"))?;
    let catalog = Catalog::load(&store)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "cannot load products"))?;
    let assets = ModelAssets::load(&config.assets_path)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "cannot load model assets"))?;

    // 3. Fit the vectorizer once; the recommender is read-only from here on
    let recommender = Arc::new(Recommender::new(catalog, &assets));
    info!(
        products = recommender.catalog().len(),
        vocabulary = assets.vocab.len(),
        "recommender ready"
    );

    // 4. Build MCP server and serve on stdio
    let server = FoodRecommenderServer::new(
        recommender,
        config.default_image_url.clone(),
        config.default_top_n,
    );

    info!("MCP server ready, serving on stdio");
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!(error = %e, "MCP server error");
    })?;

    service.waiting().await?;
    info!("MCP server shut down");
    Ok(())
}
