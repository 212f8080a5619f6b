use food_common::error::CommonError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Common(#[from] CommonError),

    #[error("config error: {0}")]
    Config(String),

    #[error("{0}")]
    Validation(String),

    #[error("export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("export failed: {0}")]
    Export(String),
}
