use std::path::{Path, PathBuf};

use crate::config::{ConfigError, SmtpConfig};
use lettre::{
    message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{error, info, instrument, warn};

/// Email service errors
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("SMTP error: {0}")]
    SmtpError(String),

    #[error("Message building error: {0}")]
    MessageError(String),

    #[error("Address error: {0}")]
    AddressError(String),

    #[error("Attachment not found: {0}")]
    AttachmentMissing(PathBuf),
}

impl From<ConfigError> for EmailError {
    fn from(err: ConfigError) -> Self {
        EmailError::ConfigError(err.to_string())
    }
}

/// Email message builder
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text_body: Option<String>,
    pub attachment_path: Option<PathBuf>,
}

impl EmailMessage {
    pub fn new(to: String, subject: String) -> Self {
        Self {
            to,
            subject,
            text_body: None,
            attachment_path: None,
        }
    }

    pub fn with_text_body(mut self, body: String) -> Self {
        self.text_body = Some(body);
        self
    }

    pub fn with_attachment(mut self, path: PathBuf) -> Self {
        self.attachment_path = Some(path);
        self
    }
}

/// SMTP email service implementation.
///
/// Credentials are validated lazily: building the transport performs no
/// network I/O, and `send_email` checks the configuration (and the
/// attachment file) before anything touches the wire.
pub struct SmtpEmailService {
    pub config: SmtpConfig,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpEmailService {
    /// Create a new SMTP email service
    #[instrument(skip(config), fields(host = %config.smtp_host, port = config.smtp_port))]
    pub fn new(config: SmtpConfig) -> Result<Self, EmailError> {
        info!("Initializing SMTP email service");

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
                .port(config.smtp_port)
                .timeout(Some(std::time::Duration::from_secs(
                    config.connection_timeout_secs,
                )));

        if config.use_starttls {
            let tls_parameters = TlsParameters::new(config.smtp_host.clone())
                .map_err(|e| EmailError::ConfigError(format!("TLS configuration error: {}", e)))?;
            transport_builder = transport_builder.tls(Tls::Required(tls_parameters));
        } else {
            transport_builder = transport_builder.tls(Tls::None);
        }

        if !config.smtp_username.is_empty() && !config.smtp_password.is_empty() {
            let credentials = Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            );
            transport_builder = transport_builder.credentials(credentials);
        }

        let transport = transport_builder.build();

        info!("SMTP email service initialized");
        Ok(Self { config, transport })
    }

    /// Send an email message
    #[instrument(skip(self, message), fields(to = %message.to, subject = %message.subject))]
    pub async fn send_email(&self, message: EmailMessage) -> Result<(), EmailError> {
        info!("Sending email to: {}", message.to);

        self.config.validate().map_err(EmailError::from)?;
        self.validate_email_address(&message.to)?;

        let email_message = self.build_message(message).await?;

        self.transport.send(email_message).await.map_err(|e| {
            error!("Failed to send email: {}", e);
            EmailError::SmtpError(format!("Failed to send email: {}", e))
        })?;

        info!("Email sent successfully");
        Ok(())
    }

    /// Send a generated quote with the PDF attached
    #[instrument(skip(self), fields(to = %to, model = %model))]
    pub async fn send_quote_email(
        &self,
        to: &str,
        model: &str,
        customer_name: &str,
        total_formatted: &str,
        attachment_path: &Path,
    ) -> Result<(), EmailError> {
        info!("Sending quote email");

        let subject = format!("Cotización VC999 - {} - {}", model, customer_name);
        let body = self.generate_quote_body(model, customer_name, total_formatted);

        let message = EmailMessage::new(to.to_string(), subject)
            .with_text_body(body)
            .with_attachment(attachment_path.to_path_buf());

        self.send_email(message).await
    }

    /// Quote email text template
    fn generate_quote_body(
        &self,
        model: &str,
        customer_name: &str,
        total_formatted: &str,
    ) -> String {
        format!(
            r#"Hola {customer_name},

Adjuntamos la cotización solicitada para el modelo {model}.
Total: {total_formatted}.

Si tienes alguna duda o necesitas ajustar la configuración, responde a este correo.

Saludos,
Equipo VC999"#,
        )
    }

    /// Build a lettre Message from EmailMessage
    async fn build_message(&self, email_message: EmailMessage) -> Result<Message, EmailError> {
        let from_mailbox: Mailbox =
            format!("{} <{}>", self.config.from_name, self.config.from_email)
                .parse()
                .map_err(|e| EmailError::AddressError(format!("Invalid from address: {}", e)))?;

        let to_mailbox: Mailbox = email_message
            .to
            .parse()
            .map_err(|e| EmailError::AddressError(format!("Invalid to address: {}", e)))?;

        let message_builder = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(&email_message.subject);

        let text = email_message
            .text_body
            .ok_or_else(|| EmailError::MessageError("No message body provided".to_string()))?;

        match email_message.attachment_path {
            Some(path) => {
                // Checked before any network I/O; a dangling path is a
                // distinct failure, never a half-sent email.
                if !path.exists() {
                    warn!("Attachment path does not exist: {}", path.display());
                    return Err(EmailError::AttachmentMissing(path));
                }
                let data = tokio::fs::read(&path).await.map_err(|e| {
                    EmailError::MessageError(format!("Failed to read attachment: {}", e))
                })?;
                let filename = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "quote.pdf".to_string());
                let attachment = Attachment::new(filename).body(data, ContentType::parse("application/pdf").map_err(
                    |e| EmailError::MessageError(format!("Invalid attachment content type: {}", e)),
                )?);

                message_builder
                    .multipart(
                        MultiPart::mixed()
                            .singlepart(
                                SinglePart::builder()
                                    .header(ContentType::TEXT_PLAIN)
                                    .body(text),
                            )
                            .singlepart(attachment),
                    )
                    .map_err(|e| {
                        EmailError::MessageError(format!("Failed to build multipart message: {}", e))
                    })
            }
            None => message_builder.body(text).map_err(|e| {
                EmailError::MessageError(format!("Failed to build text message: {}", e))
            }),
        }
    }

    /// Validate email address format
    fn validate_email_address(&self, email: &str) -> Result<(), EmailError> {
        if email.is_empty() {
            return Err(EmailError::AddressError(
                "Email address cannot be empty".to_string(),
            ));
        }

        let parts: Vec<&str> = email.split('@').collect();
        if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
            return Err(EmailError::AddressError("Invalid email format".to_string()));
        }

        Ok(())
    }
}
