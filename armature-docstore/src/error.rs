//! Error types for document store operations.

use opensearch::http::response::Response;
use serde_json::Value;
use thiserror::Error;

/// Document store error type.
///
/// Configuration problems (`Config`, `MissingIndex`, `Validation`) are always
/// raised before any request is sent. Backend outcomes such as a no-op update
/// or a missing document are returned as values by the individual
/// operations, not as errors.
#[derive(Error, Debug)]
pub enum DocStoreError {
    /// Invalid connection configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// No index name was given and no default index is configured.
    #[error("No index name given and no default index configured")]
    MissingIndex,

    /// Request rejected before it was sent.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The transport client could not be built.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Index not found.
    #[error("Index not found: {0}")]
    IndexNotFound(String),

    /// Index already exists.
    #[error("Index already exists: {0}")]
    IndexExists(String),

    /// Backend answered with a non-success status.
    #[error("Backend error ({status}): {reason}")]
    Backend {
        /// HTTP status code.
        status: u16,
        /// Reason reported by the backend.
        reason: String,
    },

    /// Backend answered successfully but the body lacked an expected field.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Transport error from the opensearch crate.
    #[error("Transport error: {0}")]
    Transport(#[from] opensearch::Error),
}

impl DocStoreError {
    /// Whether the error was raised before any request reached the backend.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            DocStoreError::Config(_) | DocStoreError::MissingIndex | DocStoreError::Validation(_)
        )
    }
}

/// Result type alias for document store operations.
pub type Result<T> = std::result::Result<T, DocStoreError>;

/// Extract `error.type` and `error.reason` from a backend error body.
///
/// The backend sometimes reports `error` as a plain string.
pub(crate) fn error_details(body: &Value) -> (String, String) {
    match body.get("error") {
        Some(Value::String(reason)) => (String::new(), reason.clone()),
        Some(error) => (
            error["type"].as_str().unwrap_or_default().to_string(),
            error["reason"]
                .as_str()
                .unwrap_or("Unknown error")
                .to_string(),
        ),
        None => (String::new(), "Unknown error".to_string()),
    }
}

/// Turn a non-success response into a [`DocStoreError::Backend`].
pub(crate) async fn backend_error(response: Response) -> DocStoreError {
    let status = response.status_code().as_u16();
    let body = response.json::<Value>().await.unwrap_or(Value::Null);
    let (_, reason) = error_details(&body);
    DocStoreError::Backend { status, reason }
}

/// Read a response body as JSON.
///
/// A body that is not JSON (for example an error page from a proxy) becomes
/// a [`DocStoreError::Backend`] carrying the response status.
pub(crate) async fn json_body(response: Response) -> Result<Value> {
    let status = response.status_code().as_u16();
    let text = response.text().await?;

    let parsed: std::result::Result<Value, _> = serde_json::from_str(&text);
    match parsed {
        Ok(body) => Ok(body),
        Err(_) if text.trim().is_empty() => Err(DocStoreError::Backend {
            status,
            reason: "Unknown error".to_string(),
        }),
        Err(_) => Err(DocStoreError::Backend {
            status,
            reason: text,
        }),
    }
}
