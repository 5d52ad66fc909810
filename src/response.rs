//! Interpretation of bridge response bodies.
//!
//! The bridge answers writes with an array of per-attribute results, each one
//! either `{"success": {...}}` or `{"error": {...}}`. Reads return the resource
//! itself, which can also be an error array when the request was rejected.

use serde_json::Value;

use crate::errors::{ApiError, Error};

type Result<T> = std::result::Result<T, Error>;

/// Parse a raw body into JSON.
pub fn parse(raw: &str) -> Result<Value> {
    serde_json::from_str(raw).map_err(Error::Parse)
}

/// Return the error carried by the first element of an array response.
///
/// Only the first element is inspected, and only when `expect_array` is set;
/// callers that apply their own error policy pass `false`.
pub fn detect_error(parsed: &Value, expect_array: bool) -> Option<ApiError> {
    if !expect_array {
        return None;
    }
    parsed.as_array()?.first().and_then(error_of)
}

/// Outcome of a request as reported by the bridge.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// Every entry of a result array was a success.
    Success(Vec<Value>),
    /// A result array mixed successes and errors.
    PartialSuccess {
        successes: Vec<Value>,
        errors: Vec<ApiError>,
    },
    /// Every entry of a result array was an error.
    Error(Vec<ApiError>),
    /// Not a result array; a resource body such as a light listing.
    Data(Value),
}

/// Sort a parsed response into success, partial success or device error.
pub fn classify(parsed: &Value) -> Classification {
    let Some(entries) = parsed.as_array().filter(|entries| !entries.is_empty()) else {
        return Classification::Data(parsed.clone());
    };

    let mut successes = Vec::new();
    let mut errors = Vec::new();
    for entry in entries {
        if let Some(error) = error_of(entry) {
            errors.push(error);
        } else if let Some(success) = entry.get("success") {
            successes.push(success.clone());
        } else {
            return Classification::Data(parsed.clone());
        }
    }

    match (successes.is_empty(), errors.is_empty()) {
        (_, true) => Classification::Success(successes),
        (true, false) => Classification::Error(errors),
        (false, false) => Classification::PartialSuccess { successes, errors },
    }
}

/// Any entry with an `error` key is an error, even when its fields are
/// missing or out of range; the raw object then becomes the description.
fn error_of(entry: &Value) -> Option<ApiError> {
    let error = entry.get("error")?;
    Some(
        serde_json::from_value(error.clone()).unwrap_or_else(|_| ApiError {
            error_type: 0,
            address: None,
            description: error.to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(parse("{not json"), Err(Error::Parse(_))));
        assert_eq!(parse("[]").unwrap(), json!([]));
    }

    #[test]
    fn test_detect_error_first_element() {
        let body = json!([{"error": {"type": 1, "address": "/", "description": "bad"}}]);
        let error = detect_error(&body, true).unwrap();
        assert_eq!(error.error_type, 1);
        assert_eq!(error.description, "bad");
        assert_eq!(error.address.as_deref(), Some("/"));

        assert!(detect_error(&body, false).is_none());
    }

    #[test]
    fn test_detect_error_malformed_envelope() {
        let untyped = json!([{"error": {"description": "bad"}}]);
        let error = detect_error(&untyped, true).unwrap();
        assert_eq!(error.error_type, 0);
        assert_eq!(error.kind(), None);
        assert_eq!(error.description, r#"{"description":"bad"}"#);

        let wide = json!([{"error": {"type": 70000, "description": "bad"}}]);
        let error = detect_error(&wide, true).unwrap();
        assert_eq!(error.error_type, 70000);
        assert_eq!(error.description, "bad");

        let bare = json!([{"error": "bad"}]);
        assert_eq!(detect_error(&bare, true).unwrap().description, r#""bad""#);
    }

    #[test]
    fn test_detect_error_ignores_later_elements() {
        let body = json!([
            {"success": {"/lights/1/state/on": true}},
            {"error": {"type": 7, "description": "invalid value"}}
        ]);
        assert!(detect_error(&body, true).is_none());
    }

    #[test]
    fn test_detect_error_on_object() {
        let body = json!({"1": {"name": "Lamp"}});
        assert!(detect_error(&body, true).is_none());
    }

    #[test]
    fn test_classify() {
        let ok = json!([{"success": {"/lights/1/state/on": true}}]);
        assert_eq!(
            classify(&ok),
            Classification::Success(vec![json!({"/lights/1/state/on": true})])
        );

        let mixed = json!([
            {"success": {"/lights/1/state/on": true}},
            {"error": {"type": 201, "description": "parameter, hue, is not modifiable"}}
        ]);
        match classify(&mixed) {
            Classification::PartialSuccess { successes, errors } => {
                assert_eq!(successes.len(), 1);
                assert_eq!(errors[0].error_type, 201);
            }
            other => panic!("unexpected classification {:?}", other),
        }

        let failed = json!([{"error": {"type": 101, "description": "link button not pressed"}}]);
        assert!(matches!(classify(&failed), Classification::Error(e) if e.len() == 1));

        let data = json!({"1": {"name": "Lamp"}});
        assert_eq!(classify(&data), Classification::Data(data.clone()));
        assert_eq!(classify(&json!([])), Classification::Data(json!([])));
    }
}
