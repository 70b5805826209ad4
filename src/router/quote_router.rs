use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handler::quote_handler::{
    create_quote_handler, generate_quote_handler, health_handler,
};
use crate::service::quote_service::QuoteServiceImpl;

pub fn quote_router(service: Arc<QuoteServiceImpl>) -> Router {
    Router::new()
        // email-delivery variant (strict payload)
        .route("/api/quote", post(create_quote_handler))
        // inline-PDF variant (alias-tolerant payload)
        .route("/generar-cotizacion", post(generate_quote_handler))
        .route("/health", get(health_handler))
        .with_state(service)
}
