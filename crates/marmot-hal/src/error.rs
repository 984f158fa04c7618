//! Error types for the HAL crate.

use marmot_ir::IrError;
use thiserror::Error;

/// Errors that can occur in device operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HalError {
    /// Device construction or reconfiguration failed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No device registered under the requested name.
    #[error("Device not available: {0}")]
    DeviceUnavailable(String),

    /// An operation appeared at a position where it is not allowed.
    #[error("The operation {0} is only supported at the beginning of a circuit")]
    OperationOrder(String),

    /// The device cannot express the operation.
    #[error("Operation {0} is not supported on this device")]
    UnsupportedOperation(String),

    /// Malformed operation (wires, parameters).
    #[error("Invalid operation: {0}")]
    InvalidOperation(#[from] IrError),

    /// The remote API answered with a status outside the accepted set.
    #[error("Transport error ({status}): {message}")]
    Transport {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// Network error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The remote job finished with an error payload.
    #[error("Something went wrong with the request, got the error message: {0}")]
    RemoteExecution(String),

    /// Polling gave up before the job reached a terminal state.
    #[error("Timeout waiting for job {0}")]
    Timeout(String),

    /// Samples requested before a circuit was executed.
    #[error("No samples available: {0}")]
    NoSamples(String),

    /// Generic backend error.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for HAL operations.
pub type HalResult<T> = Result<T, HalError>;
