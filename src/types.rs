use std::fmt::{Debug, Display, Formatter};

use serde::Serialize;

#[derive(Debug)]
pub struct PoolInitializationError(pub String);

impl Display for PoolInitializationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

/// Body of every error response: `{"error": "<message>"}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self { error: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_serializes_to_single_error_field() {
        let body = serde_json::to_value(ErrorBody::new("Dish not found")).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "Dish not found" }));
    }
}
