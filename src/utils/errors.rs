use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranslatorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Malformed response: missing or invalid field `{0}`")]
    MalformedResponse(String),

    #[error("Data source selection failed: {0}")]
    DataSourceSelection(String),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Workflow cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, TranslatorError>;
