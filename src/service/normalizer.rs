use serde_json::Value;
use tracing::{debug, info};

use crate::dto::quote_dto::{RawQuotePayload, RawSelection};
use crate::model::quote::{QuoteRequest, Selection, DEFAULT_CURRENCY};

/// Business-rule validation failures, detected after aliasing and trimming.
///
/// Structural problems (wrong types that cannot be coerced) never reach this
/// point: they fail typed deserialization and surface as a schema error with
/// their own status code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error("Falta el modelo")]
    ModelRequired,

    #[error("Faltan nombre o correo")]
    CustomerIncomplete,
}

impl NormalizeError {
    /// Machine-readable error code, stable across releases.
    pub fn code(&self) -> &'static str {
        match self {
            NormalizeError::ModelRequired => "modelo_requerido",
            NormalizeError::CustomerIncomplete => "cliente_incompleto",
        }
    }
}

/// Reconcile the alias-tolerant payload into the canonical quote record.
///
/// Alias precedence per logical field (first non-empty wins, flat keys
/// before the nested `customer` object):
///
/// - model:          `modelo` > `model` > `machine`
/// - customer name:  `nombre_cliente` > `customer_name` > `customerName`
///                   > `customer.name`
/// - customer email: `email` > `customer_email` > `customerEmail`
///                   > `customer.email`
/// - base price:     `precio_base` > `basePrice` > `base_price`
///                   (first *present* key wins; coercion failure → 0.0)
/// - total price:    `precio_cambiado` > `totalPrice`
///                   (absent or unparseable → base price)
/// - selections:     `selecciones` > `selections`
///                   (first non-empty list wins; absent or both empty →
///                   empty list)
///
/// Pure transform: no I/O, no side effects beyond logging the normalized
/// record.
pub fn normalize(raw: &RawQuotePayload) -> Result<QuoteRequest, NormalizeError> {
    let model = first_non_empty(&[&raw.modelo, &raw.model, &raw.machine]);

    let nested_name = raw.customer.as_ref().and_then(|c| c.name.clone());
    let nested_email = raw.customer.as_ref().and_then(|c| c.email.clone());

    let customer_name = first_non_empty(&[
        &raw.nombre_cliente,
        &raw.customer_name,
        &raw.customerName,
        &nested_name,
    ]);
    let customer_email = first_non_empty(&[
        &raw.email,
        &raw.customer_email,
        &raw.customerEmail,
        &nested_email,
    ]);

    let base_price = first_present(&[&raw.precio_base, &raw.basePrice, &raw.base_price])
        .and_then(coerce_price)
        .unwrap_or(0.0);
    let total_price = first_present(&[&raw.precio_cambiado, &raw.totalPrice])
        .and_then(coerce_price)
        .unwrap_or(base_price);

    let selections: Vec<Selection> = [&raw.selecciones, &raw.selections]
        .into_iter()
        .filter_map(|c| c.as_ref())
        .find(|items| !items.is_empty())
        .map(|items| items.iter().map(normalize_selection).collect())
        .unwrap_or_default();

    let currency = first_non_empty(&[&raw.currency]).unwrap_or_else(|| DEFAULT_CURRENCY.into());

    if model.is_none() {
        debug!("Normalization rejected: no model alias populated");
        return Err(NormalizeError::ModelRequired);
    }
    if customer_name.is_none() || customer_email.is_none() {
        debug!(
            has_name = customer_name.is_some(),
            has_email = customer_email.is_some(),
            "Normalization rejected: customer incomplete"
        );
        return Err(NormalizeError::CustomerIncomplete);
    }

    let normalized = QuoteRequest {
        model: model.unwrap_or_default(),
        customer_name: customer_name.unwrap_or_default(),
        customer_email: customer_email.unwrap_or_default(),
        base_price,
        total_price,
        currency,
        selections,
    };

    info!(record = ?normalized, "Payload normalized");
    Ok(normalized)
}

/// Normalize one selection entry. Never fails: a missing or non-numeric
/// price becomes 0.0.
fn normalize_selection(raw: &RawSelection) -> Selection {
    Selection {
        step: first_non_empty(&[&raw.paso, &raw.step]),
        option: first_non_empty(&[&raw.opcion, &raw.option, &raw.value, &raw.label]),
        price: first_present(&[&raw.precio, &raw.price])
            .and_then(coerce_price)
            .unwrap_or(0.0),
    }
}

/// First candidate that is non-empty after trimming, already trimmed.
fn first_non_empty(candidates: &[&Option<String>]) -> Option<String> {
    candidates
        .iter()
        .filter_map(|c| c.as_deref())
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// First candidate that is present and not JSON null.
fn first_present<'a>(candidates: &[&'a Option<Value>]) -> Option<&'a Value> {
    candidates
        .iter()
        .filter_map(|c| c.as_ref())
        .find(|v| !v.is_null())
}

/// Coerce a loose JSON value into a finite float. Numbers pass through,
/// numeric strings are parsed; anything else is `None` so the caller's
/// default policy applies.
fn coerce_price(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|p| p.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> RawQuotePayload {
        serde_json::from_value(value).expect("test payload must deserialize")
    }

    #[test]
    fn test_model_aliases_produce_identical_canonical_value() {
        for key in ["modelo", "model", "machine"] {
            let raw = payload(json!({
                key: "X1",
                "nombre_cliente": "Ana",
                "email": "a@b.com",
            }));
            let normalized = normalize(&raw).unwrap();
            assert_eq!(normalized.model, "X1", "alias {key} must map to model");
        }
    }

    #[test]
    fn test_alias_precedence_modelo_wins() {
        let raw = payload(json!({
            "modelo": "ES",
            "model": "EN",
            "machine": "M",
            "nombre_cliente": "Ana",
            "email": "a@b.com",
        }));
        assert_eq!(normalize(&raw).unwrap().model, "ES");
    }

    #[test]
    fn test_empty_alias_falls_through_to_next() {
        let raw = payload(json!({
            "modelo": "  ",
            "model": "X1",
            "nombre_cliente": "Ana",
            "email": "a@b.com",
        }));
        assert_eq!(normalize(&raw).unwrap().model, "X1");
    }

    #[test]
    fn test_nested_customer_is_lowest_precedence() {
        let raw = payload(json!({
            "model": "X1",
            "customer": {"name": "Nested", "email": "nested@b.com"},
        }));
        let normalized = normalize(&raw).unwrap();
        assert_eq!(normalized.customer_name, "Nested");
        assert_eq!(normalized.customer_email, "nested@b.com");

        let raw = payload(json!({
            "model": "X1",
            "nombre_cliente": "Flat",
            "customer": {"name": "Nested", "email": "nested@b.com"},
        }));
        assert_eq!(normalize(&raw).unwrap().customer_name, "Flat");
    }

    #[test]
    fn test_camel_case_customer_aliases() {
        let raw = payload(json!({
            "model": "X1",
            "customerName": "Ana",
            "customerEmail": "a@b.com",
        }));
        let normalized = normalize(&raw).unwrap();
        assert_eq!(normalized.customer_name, "Ana");
        assert_eq!(normalized.customer_email, "a@b.com");
    }

    #[test]
    fn test_missing_model_is_model_required() {
        let raw = payload(json!({
            "nombre_cliente": "Ana",
            "email": "a@b.com",
        }));
        assert_eq!(normalize(&raw), Err(NormalizeError::ModelRequired));
    }

    #[test]
    fn test_model_required_detected_before_customer() {
        let raw = payload(json!({}));
        assert_eq!(normalize(&raw), Err(NormalizeError::ModelRequired));
    }

    #[test]
    fn test_missing_customer_is_customer_incomplete() {
        let raw = payload(json!({"model": "X1", "email": "a@b.com"}));
        assert_eq!(normalize(&raw), Err(NormalizeError::CustomerIncomplete));

        let raw = payload(json!({"model": "X1", "nombre_cliente": "Ana"}));
        assert_eq!(normalize(&raw), Err(NormalizeError::CustomerIncomplete));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(NormalizeError::ModelRequired.code(), "modelo_requerido");
        assert_eq!(
            NormalizeError::CustomerIncomplete.code(),
            "cliente_incompleto"
        );
    }

    #[test]
    fn test_base_price_defaults_to_zero() {
        let raw = payload(json!({
            "model": "X1", "nombre_cliente": "Ana", "email": "a@b.com",
        }));
        let normalized = normalize(&raw).unwrap();
        assert_eq!(normalized.base_price, 0.0);
        assert_eq!(normalized.total_price, 0.0);
    }

    #[test]
    fn test_total_defaults_to_base_price() {
        let raw = payload(json!({
            "model": "X1", "nombre_cliente": "Ana", "email": "a@b.com",
            "precio_base": 1200.5,
        }));
        let normalized = normalize(&raw).unwrap();
        assert_eq!(normalized.total_price, normalized.base_price);
        assert_eq!(normalized.total_price, 1200.5);
    }

    #[test]
    fn test_unparseable_total_defaults_to_base_price() {
        let raw = payload(json!({
            "model": "X1", "nombre_cliente": "Ana", "email": "a@b.com",
            "basePrice": "800", "totalPrice": "not-a-number",
        }));
        let normalized = normalize(&raw).unwrap();
        assert_eq!(normalized.base_price, 800.0);
        assert_eq!(normalized.total_price, 800.0);
    }

    #[test]
    fn test_numeric_strings_are_coerced() {
        let raw = payload(json!({
            "model": "X1", "nombre_cliente": "Ana", "email": "a@b.com",
            "precio_base": " 99.5 ", "precio_cambiado": "120",
        }));
        let normalized = normalize(&raw).unwrap();
        assert_eq!(normalized.base_price, 99.5);
        assert_eq!(normalized.total_price, 120.0);
    }

    #[test]
    fn test_unparseable_base_does_not_fall_through() {
        // precio_base is present but garbage: defaults to 0.0 instead of
        // picking up a lower-precedence alias
        let raw = payload(json!({
            "model": "X1", "nombre_cliente": "Ana", "email": "a@b.com",
            "precio_base": "garbage", "base_price": 500,
        }));
        assert_eq!(normalize(&raw).unwrap().base_price, 0.0);
    }

    #[test]
    fn test_selection_price_never_raises() {
        let raw = payload(json!({
            "model": "X1", "nombre_cliente": "Ana", "email": "a@b.com",
            "selecciones": [
                {"paso": "Bomba", "opcion": "100 m3"},
                {"step": "Sellado", "value": "Doble", "price": null},
                {"step": "Banda", "label": "Ancha", "precio": "abc"},
            ],
        }));
        let normalized = normalize(&raw).unwrap();
        assert_eq!(normalized.selections.len(), 3);
        for sel in &normalized.selections {
            assert_eq!(sel.price, 0.0);
        }
        assert_eq!(normalized.selections[1].option.as_deref(), Some("Doble"));
        assert_eq!(normalized.selections[2].option.as_deref(), Some("Ancha"));
    }

    #[test]
    fn test_selection_option_alias_precedence() {
        let raw = payload(json!({
            "model": "X1", "nombre_cliente": "Ana", "email": "a@b.com",
            "selections": [
                {"opcion": "first", "option": "second", "value": "third", "label": "fourth", "price": 25},
            ],
        }));
        let sel = &normalize(&raw).unwrap().selections[0];
        assert_eq!(sel.option.as_deref(), Some("first"));
        assert_eq!(sel.price, 25.0);
    }

    #[test]
    fn test_absent_selections_is_empty_list() {
        let raw = payload(json!({
            "model": "X1", "nombre_cliente": "Ana", "email": "a@b.com",
        }));
        assert!(normalize(&raw).unwrap().selections.is_empty());
    }

    #[test]
    fn test_currency_defaults_to_usd() {
        let raw = payload(json!({
            "model": "X1", "nombre_cliente": "Ana", "email": "a@b.com",
        }));
        assert_eq!(normalize(&raw).unwrap().currency, "USD");

        let raw = payload(json!({
            "model": "X1", "nombre_cliente": "Ana", "email": "a@b.com",
            "currency": "MXN",
        }));
        assert_eq!(normalize(&raw).unwrap().currency, "MXN");
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let raw = payload(json!({
            "model": "  X1  ", "nombre_cliente": " Ana ", "email": " a@b.com ",
        }));
        let normalized = normalize(&raw).unwrap();
        assert_eq!(normalized.model, "X1");
        assert_eq!(normalized.customer_name, "Ana");
        assert_eq!(normalized.customer_email, "a@b.com");
    }
}
