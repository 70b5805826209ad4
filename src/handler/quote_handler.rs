use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::{error, info, warn};
use validator::Validate;

use crate::dto::quote_dto::{
    EmailQuoteRequest, ErrorResponse, QuoteEmailedResponse, QuoteGeneratedResponse, QuoteMeta,
    RawQuotePayload,
};
use crate::service::quote_service::{QuoteService, QuoteServiceImpl};
use crate::util::error::{HandlerError, HandlerErrorKind, ServiceError};

/// `POST /generar-cotizacion`: inline-PDF variant, alias-tolerant.
///
/// Status mapping: malformed/untypable payload is 422 `payload_invalid`,
/// business validation is 400 with the normalizer's error code, and anything
/// that fails during rendering or persistence is 500 `error_interno` with a
/// generic detail (full context stays in the server log).
pub async fn generate_quote_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    payload: Result<Json<RawQuotePayload>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    info!("[generate_quote_handler] Handler called");

    let Json(raw) = payload.map_err(|rejection| {
        warn!("[generate_quote_handler] Schema-invalid payload: {}", rejection);
        HandlerError::new(
            HandlerErrorKind::SchemaInvalid,
            ErrorResponse::new("payload_invalid")
                .with_details(rejection.body_text())
                .with_where("validation"),
        )
    })?;

    let generated = service.generate_inline(raw).await.map_err(|err| match err {
        ServiceError::Validation(e) => HandlerError::new(
            HandlerErrorKind::Validation,
            ErrorResponse::new(e.code())
                .with_details(e.to_string())
                .with_where("normalization"),
        ),
        other => {
            error!("[generate_quote_handler] Quote generation failed: {}", other);
            HandlerError::new(
                HandlerErrorKind::Internal,
                ErrorResponse::new("error_interno")
                    .with_details("No se pudo generar la cotizacion")
                    .with_where("generacion_pdf"),
            )
        }
    })?;

    Ok((
        StatusCode::OK,
        Json(QuoteGeneratedResponse {
            ok: true,
            filename: generated.filename,
            pdf_base64: generated.pdf_base64,
            meta: QuoteMeta {
                path: generated.path.display().to_string(),
            },
        }),
    ))
}

/// `POST /api/quote`: email-delivery variant, strict payload.
///
/// Empty `selections` or missing `totalPrice` are business errors (400);
/// an unparseable body or invalid email address is a schema error (422).
pub async fn create_quote_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    payload: Result<Json<EmailQuoteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    info!("[create_quote_handler] Handler called");

    let Json(request) = payload.map_err(|rejection| {
        warn!("[create_quote_handler] Schema-invalid payload: {}", rejection);
        HandlerError::new(
            HandlerErrorKind::SchemaInvalid,
            ErrorResponse::new("payload_invalid").with_details(rejection.body_text()),
        )
    })?;

    if let Err(e) = request.validate() {
        warn!("[create_quote_handler] Payload validation failed: {}", e);
        return Err(HandlerError::new(
            HandlerErrorKind::SchemaInvalid,
            ErrorResponse::new("payload_invalid").with_details(e.to_string()),
        ));
    }

    if request.selections.is_empty() {
        return Err(HandlerError::new(
            HandlerErrorKind::BadRequest,
            ErrorResponse::new("Faltan selections"),
        ));
    }
    if request.totalPrice.is_none() {
        return Err(HandlerError::new(
            HandlerErrorKind::BadRequest,
            ErrorResponse::new("Falta totalPrice"),
        ));
    }

    let emailed = service.generate_and_email(request).await.map_err(|err| {
        error!("[create_quote_handler] Quote dispatch failed: {}", err);
        HandlerError::new(
            HandlerErrorKind::Internal,
            ErrorResponse::new("internal_error"),
        )
    })?;

    Ok((
        StatusCode::OK,
        Json(QuoteEmailedResponse {
            ok: true,
            quoteId: emailed.quote_id,
            emailedTo: emailed.emailed_to,
        }),
    ))
}

/// `GET /health`
pub async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}
