//! Errors from the employee backend

use thiserror::Error;

/// Errors that can occur when talking to the backend collections
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Connection refused, DNS failure, timeout
    #[error("{endpoint}: network error - {message}")]
    Network { endpoint: String, message: String },
    /// Non-2xx response
    #[error("{endpoint}: HTTP {status} - {message}")]
    Http {
        endpoint: String,
        status: u16,
        message: String,
    },
    /// Body could not be decoded into the expected record
    #[error("{endpoint}: unexpected response - {message}")]
    Decode { endpoint: String, message: String },
}

impl ApiError {
    /// Create a network error for an endpoint
    pub fn network(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Network {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP status error for an endpoint
    pub fn http(endpoint: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        ApiError::Http {
            endpoint: endpoint.into(),
            status,
            message: message.into(),
        }
    }

    /// Create a decode error for an endpoint
    pub fn decode(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Decode {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// The endpoint the failing request targeted
    pub fn endpoint(&self) -> &str {
        match self {
            ApiError::Network { endpoint, .. }
            | ApiError::Http { endpoint, .. }
            | ApiError::Decode { endpoint, .. } => endpoint,
        }
    }

    /// HTTP status, when the backend answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 5xx responses and transport failures
    pub fn is_server_side(&self) -> bool {
        match self {
            ApiError::Network { .. } => true,
            ApiError::Http { status, .. } => *status >= 500,
            ApiError::Decode { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ApiError::network("POST /basicInfo", "connection refused");
        assert_eq!(
            err.to_string(),
            "POST /basicInfo: network error - connection refused"
        );

        let err = ApiError::http("POST /details", 422, "missing email");
        assert_eq!(err.to_string(), "POST /details: HTTP 422 - missing email");
    }

    #[test]
    fn test_status_and_endpoint() {
        let err = ApiError::http("GET /basicInfo", 503, "unavailable");
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.endpoint(), "GET /basicInfo");
        assert!(err.is_server_side());

        let err = ApiError::http("POST /details", 400, "bad");
        assert!(!err.is_server_side());
        assert!(ApiError::network("x", "y").is_server_side());
        assert_eq!(ApiError::decode("x", "y").status(), None);
    }
}
