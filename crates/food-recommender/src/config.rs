use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;
use crate::recommend::DEFAULT_TOP_N;

/// Largest result size a caller may request.
pub const MAX_TOP_N: usize = 50;

/// Application configuration loaded explicitly from environment variables.
///
/// Store coordinates default to a local development database. Deployment concerns
/// (credentials, hosting) live in `MONGO_URI` and are not interpreted here.
#[derive(Debug, Clone)]
pub struct Config {
    /// Document store connection string (e.g. "mongodb://localhost:27017").
    pub mongo_uri: String,
    pub mongo_db: String,
    pub mongo_collection: String,
    /// Server-selection timeout for the store client.
    pub mongo_timeout: Duration,
    /// Path to the vocabulary/synonym JSON artifact.
    pub assets_path: PathBuf,
    /// Image shown on cards for products without one. `None` shows no image.
    pub default_image_url: Option<String>,
    /// Result size when a request does not specify one.
    pub default_top_n: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional (defaults in parentheses):
    /// - `MONGO_URI` ("mongodb://localhost:27017")
    /// - `MONGO_DB` ("openfoodfacts")
    /// - `MONGO_COLLECTION` ("products")
    /// - `MONGO_TIMEOUT_SECS` (5)
    /// - `MODEL_ASSETS_PATH` ("model_assets.json")
    /// - `DEFAULT_IMAGE_URL` (none)
    /// - `RECOMMEND_TOP_N` (5, at most 50)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let var = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let timeout_secs: u64 = var("MONGO_TIMEOUT_SECS", "5").parse().map_err(|_| {
            AppError::Config("MONGO_TIMEOUT_SECS must be a whole number of seconds".to_string())
        })?;

        let default_top_n: usize = var("RECOMMEND_TOP_N", &DEFAULT_TOP_N.to_string())
            .parse()
            .ok()
            .filter(|n| (1..=MAX_TOP_N).contains(n))
            .ok_or_else(|| {
                AppError::Config(format!("RECOMMEND_TOP_N must be between 1 and {MAX_TOP_N}"))
            })?;

        let default_image_url = lookup("DEFAULT_IMAGE_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        Ok(Self {
            mongo_uri: var("MONGO_URI", "mongodb://localhost:27017"),
            mongo_db: var("MONGO_DB", "openfoodfacts"),
            mongo_collection: var("MONGO_COLLECTION", "products"),
            mongo_timeout: Duration::from_secs(timeout_secs),
            assets_path: PathBuf::from(var("MODEL_ASSETS_PATH", "model_assets.json")),
            default_image_url,
            default_top_n,
        })
    }
}
