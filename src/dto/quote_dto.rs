use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::model::quote::{QuoteRequest, Selection, DEFAULT_CURRENCY};

/// Raw, alias-tolerant payload accepted by `POST /generar-cotizacion`.
///
/// Every recognized alias is an explicit optional field; unrecognized extra
/// keys are dropped at deserialization (nothing downstream reads them).
/// Price-like fields arrive as raw JSON values so the normalizer can coerce
/// them silently instead of rejecting the request. A value of the wrong
/// *shape* (e.g. `email` as an object) fails typed deserialization and is
/// reported as a schema error before normalization runs.
#[allow(non_snake_case)]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawQuotePayload {
    // model aliases
    pub modelo: Option<String>,
    pub model: Option<String>,
    pub machine: Option<String>,

    // customer name aliases
    pub nombre_cliente: Option<String>,
    pub customer_name: Option<String>,
    pub customerName: Option<String>,

    // customer email aliases
    pub email: Option<String>,
    pub customer_email: Option<String>,
    pub customerEmail: Option<String>,

    // nested customer object, lowest precedence for name/email
    pub customer: Option<RawCustomer>,

    // base price aliases
    pub precio_base: Option<Value>,
    pub basePrice: Option<Value>,
    pub base_price: Option<Value>,

    // total price aliases
    pub precio_cambiado: Option<Value>,
    pub totalPrice: Option<Value>,

    pub currency: Option<String>,

    // selections aliases
    pub selecciones: Option<Vec<RawSelection>>,
    pub selections: Option<Vec<RawSelection>>,
}

/// Nested `customer` sub-object of the raw payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCustomer {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// One raw selection entry; each entry is normalized independently.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSelection {
    pub paso: Option<String>,
    pub step: Option<String>,
    pub opcion: Option<String>,
    pub option: Option<String>,
    pub value: Option<String>,
    pub label: Option<String>,
    pub precio: Option<Value>,
    pub price: Option<Value>,
}

/// Strict payload accepted by `POST /api/quote` (email-delivery variant).
///
/// `selections` and `totalPrice` are optional at the serde level so their
/// absence surfaces as the endpoint's 400 business error rather than a
/// generic schema failure.
#[allow(non_snake_case)]
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EmailQuoteRequest {
    pub modelo: String,
    pub customerName: String,
    #[validate(email)]
    pub customerEmail: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub selections: Vec<SelectionItem>,
    pub totalPrice: Option<f64>,
}

#[allow(non_snake_case)]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionItem {
    pub stepId: String,
    pub label: String,
    pub value: String,
    pub price: f64,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl EmailQuoteRequest {
    /// Build the canonical record. The strict payload has no separate base
    /// price, so the total doubles as the base.
    pub fn to_canonical(&self) -> QuoteRequest {
        let total = self.totalPrice.unwrap_or(0.0);
        QuoteRequest {
            model: self.modelo.trim().to_string(),
            customer_name: self.customerName.trim().to_string(),
            customer_email: self.customerEmail.trim().to_string(),
            base_price: total,
            total_price: total,
            currency: self.currency.clone(),
            selections: self
                .selections
                .iter()
                .map(|item| Selection {
                    step: Some(item.stepId.clone()),
                    option: Some(format!("{} ({})", item.label, item.value)),
                    price: item.price,
                })
                .collect(),
        }
    }
}

// --- Response DTOs ---

/// Success envelope for the inline-PDF variant.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteGeneratedResponse {
    pub ok: bool,
    pub filename: String,
    pub pdf_base64: String,
    pub meta: QuoteMeta,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuoteMeta {
    pub path: String,
}

/// Success envelope for the email-delivery variant.
#[allow(non_snake_case)]
#[derive(Debug, Clone, Serialize)]
pub struct QuoteEmailedResponse {
    pub ok: bool,
    pub quoteId: String,
    pub emailedTo: String,
}

/// Error envelope shared by both endpoints; `details` and `where` are only
/// present on the inline variant.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        ErrorResponse {
            ok: false,
            error: error.into(),
            details: None,
            location: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_where(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}
