//! Error types for example lookup

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExampleError {
    /// Keyword contained no Japanese script after sanitization
    #[error("Invalid keyword (non-Japanese): {0:?}")]
    InvalidKeyword(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    #[error("JSON parse error: {0}")]
    JsonParse(String),
}

impl From<bridge_traits::BridgeError> for ExampleError {
    fn from(e: bridge_traits::BridgeError) -> Self {
        match e {
            bridge_traits::BridgeError::Http { status, message } => ExampleError::Http {
                status,
                body: message,
            },
            other => ExampleError::Network(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExampleError>;
