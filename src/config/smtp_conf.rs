use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error, info, warn};

use crate::config::ConfigError;

/// Outbound mail relay configuration.
///
/// `from_env` never fails: missing credentials only become an error when an
/// email is actually sent (`validate` runs at send time, before any network
/// I/O), so deployments that only use the inline-PDF endpoint need no SMTP
/// environment at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    /// SMTP server hostname
    pub smtp_host: String,
    /// SMTP server port
    pub smtp_port: u16,
    /// SMTP username for authentication (empty until configured)
    pub smtp_username: String,
    /// SMTP password for authentication (empty until configured)
    pub smtp_password: String,
    /// Whether to use STARTTLS (plain TLS wrapper otherwise)
    pub use_starttls: bool,
    /// From email address; defaults to the username
    pub from_email: String,
    /// From name (display name)
    pub from_name: String,
    /// Connection timeout in seconds
    pub connection_timeout_secs: u64,
}

impl SmtpConfig {
    /// Create SmtpConfig from environment variables
    pub fn from_env() -> Self {
        info!("Loading SMTP configuration from environment variables");

        let smtp_host = env::var("SMTP_HOST").unwrap_or_else(|_| {
            warn!("SMTP_HOST not set, defaulting to smtp.gmail.com");
            "smtp.gmail.com".to_string()
        });
        debug!("SMTP host: {}", smtp_host);

        let smtp_port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse::<u16>()
            .unwrap_or_else(|_| {
                warn!("Invalid SMTP_PORT value, defaulting to 587");
                587
            });
        debug!("SMTP port: {}", smtp_port);

        let smtp_username = env::var("SMTP_USERNAME").unwrap_or_default();
        let smtp_password = env::var("SMTP_PASSWORD").unwrap_or_default();
        if smtp_username.is_empty() || smtp_password.is_empty() {
            warn!("SMTP credentials not set; email dispatch will fail until configured");
        } else {
            debug!("SMTP username: {}", smtp_username);
            debug!("SMTP password: [REDACTED]");
        }

        let use_starttls = env::var("SMTP_USE_STARTTLS")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .unwrap_or(true);
        debug!("SMTP use STARTTLS: {}", use_starttls);

        let from_email = env::var("SMTP_FROM_EMAIL").unwrap_or_else(|_| smtp_username.clone());
        debug!("From email: {}", from_email);

        let from_name =
            env::var("SMTP_FROM_NAME").unwrap_or_else(|_| "VC999 Cotizador".to_string());
        debug!("From name: {}", from_name);

        let connection_timeout_secs = env::var("SMTP_CONNECTION_TIMEOUT")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .unwrap_or(30);
        debug!("Connection timeout: {} seconds", connection_timeout_secs);

        SmtpConfig {
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            use_starttls,
            from_email,
            from_name,
            connection_timeout_secs,
        }
    }

    /// Create SmtpConfig for testing
    pub fn from_test_env() -> Self {
        SmtpConfig {
            smtp_host: "localhost".to_string(),
            smtp_port: 1025,
            smtp_username: "test".to_string(),
            smtp_password: "test".to_string(),
            use_starttls: false,
            from_email: "test@example.com".to_string(),
            from_name: "Test App".to_string(),
            connection_timeout_secs: 10,
        }
    }

    /// Validate the configuration; called lazily before the first send
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.smtp_host.is_empty() {
            error!("SMTP host is empty");
            return Err(ConfigError::ValidationError(
                "SMTP host cannot be empty".to_string(),
            ));
        }

        if self.smtp_port == 0 {
            error!("SMTP port is 0");
            return Err(ConfigError::ValidationError(
                "SMTP port cannot be 0".to_string(),
            ));
        }

        if self.smtp_username.is_empty() {
            error!("SMTP username is not configured");
            return Err(ConfigError::EnvVarNotFound("SMTP_USERNAME".to_string()));
        }

        if self.smtp_password.is_empty() {
            error!("SMTP password is not configured");
            return Err(ConfigError::EnvVarNotFound("SMTP_PASSWORD".to_string()));
        }

        if self.from_email.is_empty() || !self.from_email.contains('@') {
            error!("Invalid from email: {:?}", self.from_email);
            return Err(ConfigError::ValidationError(
                "Invalid from email format".to_string(),
            ));
        }

        Ok(())
    }

    /// Get SMTP server URL
    pub fn get_smtp_url(&self) -> String {
        format!("{}:{}", self.smtp_host, self.smtp_port)
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        SmtpConfig {
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            smtp_username: "".to_string(),
            smtp_password: "".to_string(),
            use_starttls: true,
            from_email: "".to_string(),
            from_name: "VC999 Cotizador".to_string(),
            connection_timeout_secs: 30,
        }
    }
}
