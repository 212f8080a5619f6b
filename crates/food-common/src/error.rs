/// Error types shared by the recommender crates.
///
/// These errors represent failures in the startup inputs (document store, model
/// assets). Application-specific errors are defined in each binary crate and wrap
/// `CommonError` via `#[from]`.

#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("document store unreachable: {0}")]
    Connectivity(String),

    #[error("document store error: {0}")]
    Store(#[from] mongodb::error::Error),

    #[error("model assets missing or malformed at {path}: {reason}")]
    AssetMissing { path: String, reason: String },
}
