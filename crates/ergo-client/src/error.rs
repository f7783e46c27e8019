//! Client error types.

use ergo_appkit::AppkitError;
use thiserror::Error;

/// Errors from node and explorer API calls.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport failure (connection, timeout, TLS).
    #[error("Request to {endpoint} failed: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-success HTTP status.
    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// Response body did not match the expected shape.
    #[error("Invalid response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    /// HTTP client could not be created.
    #[error("Failed to create HTTP client: {0}")]
    Builder(String),
}

impl ClientError {
    pub fn endpoint(&self) -> &str {
        match self {
            ClientError::Http { endpoint, .. }
            | ClientError::Status { endpoint, .. }
            | ClientError::Decode { endpoint, .. } => endpoint,
            ClientError::Builder(_) => "",
        }
    }

    /// True for a 404 response.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Status { status: 404, .. })
    }
}

impl From<ClientError> for AppkitError {
    fn from(e: ClientError) -> Self {
        AppkitError::Api {
            endpoint: e.endpoint().to_string(),
            message: e.to_string(),
        }
    }
}

/// Result type for client calls.
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_maps_to_api_error() {
        let err = ClientError::Status {
            endpoint: "http://node/info".into(),
            status: 500,
            body: "boom".into(),
        };
        assert!(!err.is_not_found());
        match AppkitError::from(err) {
            AppkitError::Api { endpoint, message } => {
                assert_eq!(endpoint, "http://node/info");
                assert!(message.contains("500"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_not_found() {
        let err = ClientError::Status {
            endpoint: "http://node/utxo/byId/00".into(),
            status: 404,
            body: String::new(),
        };
        assert!(err.is_not_found());
    }
}
