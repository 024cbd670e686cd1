//! Error body and error codes

use serde::{Deserialize, Serialize};

/// Error codes carried in error bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// The request body could not be parsed or is missing required fields
    MalformedRequest = -32600,
    /// The route or method is not handled
    Unsupported = -32601,
    /// The backing store failed
    StorageFault = -32603,
    /// A verified identity is required
    Unauthorized = -32001,
    /// No record matched the identifier
    NotFound = -32003,
}

impl From<i32> for ErrorCode {
    fn from(code: i32) -> Self {
        match code {
            -32600 => ErrorCode::MalformedRequest,
            -32601 => ErrorCode::Unsupported,
            -32001 => ErrorCode::Unauthorized,
            -32003 => ErrorCode::NotFound,
            _ => ErrorCode::StorageFault,
        }
    }
}

/// Numeric error codes, for matching on decoded bodies
pub mod error_codes {
    use super::ErrorCode;

    pub const MALFORMED_REQUEST: i32 = ErrorCode::MalformedRequest as i32;
    pub const UNSUPPORTED: i32 = ErrorCode::Unsupported as i32;
    pub const STORAGE_FAULT: i32 = ErrorCode::StorageFault as i32;
    pub const UNAUTHORIZED: i32 = ErrorCode::Unauthorized as i32;
    pub const NOT_FOUND: i32 = ErrorCode::NotFound as i32;
}

/// Error details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Error code
    pub code: i32,
    /// Human readable message, including the underlying cause
    pub message: String,
}

/// Body of every non-2xx response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

impl ErrorBody {
    /// Creates an error body
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code as i32,
                message: message.into(),
            },
        }
    }

    /// Returns the error code
    pub fn code(&self) -> ErrorCode {
        ErrorCode::from(self.error.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_shape() {
        let body = ErrorBody::new(ErrorCode::NotFound, "UserProfile not found: u1");
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["error"]["code"], error_codes::NOT_FOUND);
        assert_eq!(json["error"]["message"], "UserProfile not found: u1");
    }

    #[test]
    fn test_error_code_from_i32() {
        assert_eq!(ErrorCode::from(-32003), ErrorCode::NotFound);
        assert_eq!(ErrorCode::from(-32600), ErrorCode::MalformedRequest);
        assert_eq!(ErrorCode::from(12345), ErrorCode::StorageFault);
    }
}
