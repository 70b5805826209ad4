use serde::{Deserialize, Serialize};

/// One configuration line item after normalization.
///
/// `price` is always a finite number; missing or non-numeric input prices
/// default to 0.0 during normalization instead of failing the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub step: Option<String>,
    pub option: Option<String>,
    pub price: f64,
}

/// Canonical quote record, independent of input field naming.
///
/// Produced only by the normalizer: `model`, `customer_name` and
/// `customer_email` are non-empty after trimming, `total_price` has already
/// defaulted to `base_price` when the input carried no usable total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub model: String,
    pub customer_name: String,
    pub customer_email: String,
    pub base_price: f64,
    pub total_price: f64,
    pub currency: String,
    pub selections: Vec<Selection>,
}

pub const DEFAULT_CURRENCY: &str = "USD";
