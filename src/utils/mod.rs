pub mod config;
pub mod errors;

pub use config::{ApiConfig, AppConfig, LoggingConfig, PollingConfig, ProjectConfig};
pub use errors::{Result, TranslatorError};
