use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Audio decode failed: {0}")]
    Decode(String),

    #[error("Audio device unavailable: {0}")]
    AudioDevice(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Returns `true` for failures that may succeed on retry (network-shaped
    /// errors rather than malformed input).
    pub fn is_transient(&self) -> bool {
        match self {
            BridgeError::Http { status, .. } => *status >= 500 || *status == 429,
            BridgeError::OperationFailed(_) | BridgeError::Io(_) => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(BridgeError::Http {
            status: 503,
            message: "unavailable".to_string()
        }
        .is_transient());
        assert!(BridgeError::Http {
            status: 429,
            message: "slow down".to_string()
        }
        .is_transient());
        assert!(!BridgeError::Http {
            status: 404,
            message: "missing".to_string()
        }
        .is_transient());
        assert!(!BridgeError::Decode("bad frame".to_string()).is_transient());
        assert!(BridgeError::OperationFailed("timeout".to_string()).is_transient());
    }
}
