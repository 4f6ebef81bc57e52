use thiserror::Error as ThisError;

/// Failures reported by the gateway for a state-change command.
///
/// Bridge entities hand these back to the host unchanged.
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Gateway did not acknowledge the request in time")]
    Timeout,

    #[error("Gateway is disconnected")]
    Disconnected,

    #[error("Gateway rejected the request ({code}): {description}")]
    Rejected { code: u16, description: String },

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),
}

#[derive(ThisError, Debug)]
pub enum BridgeError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Integration session has already been unloaded")]
    SessionUnloaded,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
