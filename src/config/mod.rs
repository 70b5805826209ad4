pub mod app_conf;
pub mod smtp_conf;
pub mod output_conf;

pub use app_conf::AppConfig;
pub use smtp_conf::SmtpConfig;
pub use output_conf::OutputConfig;

/// Common configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
