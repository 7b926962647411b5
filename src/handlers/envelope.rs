//! Uniform success envelope

use serde::Serialize;

/// Success envelope wrapping every data response
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Wrap data with no message
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
        }
    }

    /// Wrap data with a human-readable message
    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: Some(message.into()),
        }
    }
}

/// Standard shape for paginated listings
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_is_omitted_when_absent() {
        let body = serde_json::to_value(ApiResponse::new(42)).expect("serializes");
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], 42);
        assert!(body.get("message").is_none());
    }

    #[test]
    fn test_message_is_included_when_present() {
        let body = serde_json::to_value(ApiResponse::with_message((), "done"))
            .expect("serializes");
        assert_eq!(body["message"], "done");
        assert_eq!(body["data"], serde_json::Value::Null);
    }
}
