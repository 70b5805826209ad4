use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::OutputConfig;
use crate::dto::quote_dto::{EmailQuoteRequest, RawQuotePayload};
use crate::service::normalizer;
use crate::util::email::SmtpEmailService;
use crate::util::error::ServiceError;
use crate::util::pdf::{format_money, MoneyStyle, PdfRenderer};
use crate::util::slug::build_filename;

/// Per-request lifecycle states, logged at each transition. Every request
/// ends in exactly one terminal state and produces exactly one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Received,
    Normalizing,
    ValidationFailed,
    Normalized,
    Rendering,
    Rendered,
    Dispatching,
    Dispatched,
    DispatchFailed,
    Responded,
}

impl std::fmt::Display for RequestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RequestState::Received => "received",
            RequestState::Normalizing => "normalizing",
            RequestState::ValidationFailed => "validation_failed",
            RequestState::Normalized => "normalized",
            RequestState::Rendering => "rendering",
            RequestState::Rendered => "rendered",
            RequestState::Dispatching => "dispatching",
            RequestState::Dispatched => "dispatched",
            RequestState::DispatchFailed => "dispatch_failed",
            RequestState::Responded => "responded",
        };
        write!(f, "{}", s)
    }
}

fn trace_state(state: RequestState) {
    debug!(state = %state, "Request state transition");
}

/// Result of a successful inline-mode generation.
#[derive(Debug, Clone)]
pub struct GeneratedQuote {
    pub filename: String,
    pub pdf_base64: String,
    pub path: PathBuf,
}

/// Result of a successful email-mode dispatch.
#[derive(Debug, Clone)]
pub struct EmailedQuote {
    pub quote_id: String,
    pub emailed_to: String,
}

#[async_trait]
pub trait QuoteService: Send + Sync {
    /// Normalize, render and persist a PDF; return it inline as base64.
    async fn generate_inline(&self, raw: RawQuotePayload) -> Result<GeneratedQuote, ServiceError>;

    /// Render a PDF to a transient location, email it to the customer and
    /// remove the transient file on every exit path.
    async fn generate_and_email(
        &self,
        request: EmailQuoteRequest,
    ) -> Result<EmailedQuote, ServiceError>;
}

pub struct QuoteServiceImpl {
    pub renderer: PdfRenderer,
    pub email_service: Arc<SmtpEmailService>,
    pub output_config: OutputConfig,
}

impl QuoteServiceImpl {
    pub fn new(
        renderer: PdfRenderer,
        email_service: Arc<SmtpEmailService>,
        output_config: OutputConfig,
    ) -> Self {
        QuoteServiceImpl {
            renderer,
            email_service,
            output_config,
        }
    }
}

#[async_trait]
impl QuoteService for QuoteServiceImpl {
    #[instrument(skip(self, raw))]
    async fn generate_inline(&self, raw: RawQuotePayload) -> Result<GeneratedQuote, ServiceError> {
        trace_state(RequestState::Received);

        trace_state(RequestState::Normalizing);
        let quote = match normalizer::normalize(&raw) {
            Ok(quote) => quote,
            Err(err) => {
                trace_state(RequestState::ValidationFailed);
                return Err(ServiceError::Validation(err));
            }
        };
        trace_state(RequestState::Normalized);

        let filename = build_filename(&quote.model, &quote.customer_name);
        let quote_id = filename.trim_end_matches(".pdf").to_string();

        trace_state(RequestState::Rendering);
        let pdf_bytes = self
            .renderer
            .render(&quote, &quote_id, MoneyStyle::DollarPrefix)?;
        trace_state(RequestState::Rendered);

        trace_state(RequestState::Dispatching);
        tokio::fs::create_dir_all(&self.output_config.output_dir).await?;
        let path = self.output_config.output_dir.join(&filename);
        tokio::fs::write(&path, &pdf_bytes).await?;
        trace_state(RequestState::Dispatched);

        info!(path = %path.display(), size = pdf_bytes.len(), "PDF generated");

        let pdf_base64 = BASE64.encode(&pdf_bytes);
        trace_state(RequestState::Responded);
        Ok(GeneratedQuote {
            filename,
            pdf_base64,
            path,
        })
    }

    #[instrument(skip(self, request), fields(model = %request.modelo))]
    async fn generate_and_email(
        &self,
        request: EmailQuoteRequest,
    ) -> Result<EmailedQuote, ServiceError> {
        trace_state(RequestState::Received);

        trace_state(RequestState::Normalizing);
        let quote = request.to_canonical();
        trace_state(RequestState::Normalized);

        let quote_id = Uuid::new_v4().to_string();

        trace_state(RequestState::Rendering);
        let pdf_bytes = self
            .renderer
            .render(&quote, &quote_id, MoneyStyle::CodeSuffix)?;
        trace_state(RequestState::Rendered);

        let pdf_path = std::env::temp_dir().join(format!("quote_{}.pdf", quote_id));
        tokio::fs::write(&pdf_path, &pdf_bytes).await?;

        trace_state(RequestState::Dispatching);
        let total_formatted = format_money(quote.total_price, MoneyStyle::CodeSuffix, &quote.currency);
        let send_result = self
            .email_service
            .send_quote_email(
                &quote.customer_email,
                &quote.model,
                &quote.customer_name,
                &total_formatted,
                &pdf_path,
            )
            .await;

        // The transient PDF is removed whether the send succeeded or not.
        remove_temp_file(&pdf_path).await;

        match send_result {
            Ok(()) => trace_state(RequestState::Dispatched),
            Err(_) => trace_state(RequestState::DispatchFailed),
        }
        send_result?;

        info!(quote_id = %quote_id, emailed_to = %quote.customer_email, "Quote emailed");
        trace_state(RequestState::Responded);
        Ok(EmailedQuote {
            quote_id,
            emailed_to: quote.customer_email,
        })
    }
}

/// Deletion failure is logged, never escalated.
async fn remove_temp_file(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        warn!(path = %path.display(), "Could not remove temporary PDF: {}", e);
    }
}
