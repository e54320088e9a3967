use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("config file not found: {0}")]
    ConfigNotFound(String),

    #[error("input file not found: {0}")]
    InputNotFound(String),

    #[error("duplicate action id '{0}' in action catalog")]
    DuplicateCatalogAction(String),

    #[error("requirements table is missing column '{0}'")]
    MissingColumn(String),

    #[error("invalid {kind} file '{path}': {reason}")]
    InvalidInput {
        kind: &'static str,
        path: String,
        reason: String,
    },

    #[error("invalid reward type: {0}")]
    InvalidRewardType(String),

    #[error("invalid check name: {0}")]
    InvalidCheck(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, CheckError>;
