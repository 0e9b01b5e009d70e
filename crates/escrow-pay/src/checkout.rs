//! Inbound checkout body validation.

use regex::Regex;
use serde_json::{Map, Number, Value};
use std::sync::LazyLock;

use crate::constants::{DEFAULT_CURRENCY, DEFAULT_REFERENCE, MAX_REFERENCE_CHARS};
use crate::error::ValidationError;

/// `local@domain.tld` with no whitespace and exactly one `@`.
static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

/// A validated checkout request from the storefront.
///
/// `reference` is already truncated to [`MAX_REFERENCE_CHARS`] but not yet
/// stamped; see [`crate::reference::unique_reference`].
///
/// `price` keeps the storefront's JSON number as sent, so `2500` goes
/// upstream as `2500` and not `2500.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    pub title: String,
    pub price: Number,
    pub currency: String,
    pub reference: String,
    pub buyer_email: Option<String>,
}

impl CheckoutRequest {
    /// Parse and validate a raw request body.
    ///
    /// An empty body is treated as `{}` and so fails on the missing title.
    pub fn from_json(body: &[u8]) -> Result<Self, ValidationError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Self::from_value(&Value::Object(Map::new()));
        }
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| ValidationError::MalformedBody(e.to_string()))?;
        Self::from_value(&value)
    }

    /// Validate an already-parsed JSON body.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let fields = value
            .as_object()
            .ok_or_else(|| ValidationError::MalformedBody("expected a JSON object".to_string()))?;

        let title = match fields.get("title") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            None | Some(Value::Null) | Some(Value::String(_)) => {
                return Err(ValidationError::MissingTitle)
            }
            Some(_) => return Err(ValidationError::WrongType("title")),
        };

        let price = match fields.get("price") {
            Some(Value::Number(n)) if n.as_f64().is_some_and(f64::is_finite) => n.clone(),
            _ => return Err(ValidationError::InvalidPrice),
        };

        // Only title and price can fail; the rest fall back to defaults.
        let currency = match fields.get("currency") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => DEFAULT_CURRENCY.to_string(),
        };

        let reference = match fields.get("reference") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(true)) => "true".to_string(),
            _ => DEFAULT_REFERENCE.to_string(),
        };

        let buyer_email = fields
            .get("buyerEmail")
            .and_then(Value::as_str)
            .filter(|email| is_email_shaped(email))
            .map(str::to_string);

        Ok(Self {
            title,
            price,
            currency,
            reference: truncate_chars(&reference, MAX_REFERENCE_CHARS),
            buyer_email,
        })
    }
}

/// Minimal shape check; anything failing it is treated as "no buyer email".
pub fn is_email_shaped(candidate: &str) -> bool {
    EMAIL_SHAPE.is_match(candidate)
}

/// Keep at most `max` characters without splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_body_with_defaults() {
        let req = CheckoutRequest::from_value(&json!({
            "title": "example.com",
            "price": 1500
        }))
        .unwrap();
        assert_eq!(req.title, "example.com");
        assert_eq!(req.price, Number::from(1500));
        assert_eq!(req.currency, "usd");
        assert_eq!(req.reference, "order");
        assert_eq!(req.buyer_email, None);
    }

    #[test]
    fn test_explicit_fields_are_kept() {
        let req = CheckoutRequest::from_value(&json!({
            "title": "grid.io",
            "price": 99.5,
            "currency": "eur",
            "reference": "listing-42",
            "buyerEmail": "buyer@example.org"
        }))
        .unwrap();
        assert_eq!(req.currency, "eur");
        assert_eq!(req.reference, "listing-42");
        assert_eq!(req.buyer_email.as_deref(), Some("buyer@example.org"));
    }

    #[test]
    fn test_missing_or_empty_title_rejected() {
        assert_eq!(
            CheckoutRequest::from_value(&json!({ "price": 10 })),
            Err(ValidationError::MissingTitle)
        );
        assert_eq!(
            CheckoutRequest::from_value(&json!({ "title": "", "price": 10 })),
            Err(ValidationError::MissingTitle)
        );
    }

    #[test]
    fn test_non_numeric_price_rejected() {
        for price in [json!("100"), json!(null), json!(true), json!([1])] {
            assert_eq!(
                CheckoutRequest::from_value(&json!({ "title": "a.com", "price": price })),
                Err(ValidationError::InvalidPrice)
            );
        }
        assert_eq!(
            CheckoutRequest::from_value(&json!({ "title": "a.com" })),
            Err(ValidationError::InvalidPrice)
        );
    }

    #[test]
    fn test_negative_price_is_not_bounded() {
        let req = CheckoutRequest::from_value(&json!({ "title": "a.com", "price": -5 })).unwrap();
        assert_eq!(req.price.as_f64(), Some(-5.0));
    }

    #[test]
    fn test_malformed_email_is_discarded() {
        for email in ["nobody", "a@b", "two@@at.com", "sp ace@x.com", ""] {
            let req = CheckoutRequest::from_value(&json!({
                "title": "a.com",
                "price": 1,
                "buyerEmail": email
            }))
            .unwrap();
            assert_eq!(req.buyer_email, None, "{email} should be discarded");
        }
    }

    #[test]
    fn test_reference_truncated_to_forty_chars() {
        let long = "r".repeat(60);
        let req = CheckoutRequest::from_value(&json!({
            "title": "a.com",
            "price": 1,
            "reference": long
        }))
        .unwrap();
        assert_eq!(req.reference, "r".repeat(40));
    }

    #[test]
    fn test_numeric_reference_is_stringified() {
        let req = CheckoutRequest::from_value(&json!({
            "title": "a.com",
            "price": 1,
            "reference": 1234
        }))
        .unwrap();
        assert_eq!(req.reference, "1234");
    }

    #[test]
    fn test_odd_reference_types_fall_back() {
        let with_reference = |reference: Value| {
            CheckoutRequest::from_value(&json!({
                "title": "a.com",
                "price": 10,
                "reference": reference
            }))
            .unwrap()
            .reference
        };
        assert_eq!(with_reference(json!(true)), "true");
        assert_eq!(with_reference(json!(false)), "order");
        assert_eq!(with_reference(json!({ "id": 1 })), "order");
        assert_eq!(with_reference(json!(["a", "b"])), "order");
        assert_eq!(with_reference(json!("")), "order");
    }

    #[test]
    fn test_non_string_currency_falls_back_to_usd() {
        for currency in [json!(5), json!(null), json!(""), json!({ "code": "eur" })] {
            let req = CheckoutRequest::from_value(&json!({
                "title": "a.com",
                "price": 10,
                "currency": currency
            }))
            .unwrap();
            assert_eq!(req.currency, "usd");
        }
    }

    #[test]
    fn test_price_number_kept_as_sent() {
        let req = CheckoutRequest::from_json(br#"{"title":"a.com","price":2500}"#).unwrap();
        assert_eq!(serde_json::to_string(&req.price).unwrap(), "2500");
        let req = CheckoutRequest::from_json(br#"{"title":"a.com","price":19.99}"#).unwrap();
        assert_eq!(serde_json::to_string(&req.price).unwrap(), "19.99");
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            CheckoutRequest::from_json(b"not json"),
            Err(ValidationError::MalformedBody(_))
        ));
        assert!(matches!(
            CheckoutRequest::from_json(b"[1, 2]"),
            Err(ValidationError::MalformedBody(_))
        ));
        assert_eq!(
            CheckoutRequest::from_json(b""),
            Err(ValidationError::MissingTitle)
        );
    }

    #[test]
    fn test_truncate_chars_respects_code_points() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 40), "abc");
    }
}
