use serde_json::Value;

use crate::error::BusinessError;

/// Logged when a failure carries no usable message
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Normalizes a handler failure into a single log-friendly message
pub trait RequestFailure {
    fn failure_message(&self) -> String;
}

impl RequestFailure for BusinessError {
    fn failure_message(&self) -> String {
        self.message.clone()
    }
}

impl RequestFailure for anyhow::Error {
    fn failure_message(&self) -> String {
        self.to_string()
    }
}

impl RequestFailure for Box<dyn std::error::Error + Send + Sync> {
    fn failure_message(&self) -> String {
        self.to_string()
    }
}

impl RequestFailure for String {
    fn failure_message(&self) -> String {
        self.clone()
    }
}

impl RequestFailure for &str {
    fn failure_message(&self) -> String {
        (*self).to_string()
    }
}

impl RequestFailure for Value {
    fn failure_message(&self) -> String {
        normalize_error_message(self)
    }
}

/// String → itself; object with `message` → that field stringified;
/// anything else → [`UNKNOWN_ERROR`]
pub fn normalize_error_message(error: &Value) -> String {
    match error {
        Value::String(message) => message.clone(),
        Value::Object(map) => match map.get("message") {
            Some(Value::String(message)) => message.clone(),
            Some(other) => other.to_string(),
            None => UNKNOWN_ERROR.to_string(),
        },
        _ => UNKNOWN_ERROR.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_error_message() {
        assert_eq!(normalize_error_message(&json!("plain")), "plain");
        assert_eq!(normalize_error_message(&json!({ "message": "boom" })), "boom");
        assert_eq!(normalize_error_message(&json!({ "message": 42 })), "42");
        assert_eq!(normalize_error_message(&json!({ "code": 1 })), UNKNOWN_ERROR);
        assert_eq!(normalize_error_message(&json!(null)), UNKNOWN_ERROR);
        assert_eq!(normalize_error_message(&json!([1, 2])), UNKNOWN_ERROR);
    }

    #[test]
    fn test_typed_errors_use_their_message() {
        let err = BusinessError::forbidden("not yours");
        assert_eq!(err.failure_message(), "not yours");
        assert_eq!(anyhow::anyhow!("oops").failure_message(), "oops");
        assert_eq!("literal".failure_message(), "literal");
    }
}
