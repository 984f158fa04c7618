//! Error types for the AQT adapter.

use marmot_hal::HalError;
use marmot_ir::IrError;
use thiserror::Error;

/// Result type for AQT operations.
pub type AqtResult<T> = Result<T, AqtError>;

/// Errors that can occur when talking to AQT.
#[derive(Debug, Error)]
pub enum AqtError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No API key was supplied and `AQT_TOKEN` is unset or empty.
    #[error("No valid api key for AQT platform found.")]
    MissingApiKey,

    /// Only PUT and POST are accepted by the gateway.
    #[error("Invalid HTTP request method provided. Options are \"PUT\" or \"POST\", got \"{0}\"")]
    InvalidHttpMethod(String),

    /// The gateway answered with a status outside `{200, 201, 202}`.
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    /// A state preparation appeared after the first operation.
    #[error("The operation {0} is only supported at the beginning of a circuit")]
    OperationOrder(String),

    /// The operation has no AQT lowering.
    #[error("Operation {0} is not supported on AQT devices.")]
    UnsupportedOperation(String),

    /// Malformed operation (parameter count, wire count, unknown wire).
    #[error(transparent)]
    InvalidOperation(#[from] IrError),

    /// A finished job carried an error message.
    #[error("Something went wrong with the request, got the error message: {0}")]
    JobFailed(String),

    /// Polling gave up before the job finished.
    #[error("Timeout waiting for job {0}")]
    Timeout(String),

    /// The submission was accepted but the response names no job.
    #[error("Submission response carries no job id (status {0})")]
    MissingJobId(String),

    /// A finished job carried no samples.
    #[error("Job {0} finished without samples")]
    MissingSamples(String),

    /// A sample does not fit into the device register.
    #[error("Sample {sample} does not fit into {wires} wires")]
    SampleOutOfRange { sample: u64, wires: usize },

    /// Invalid device configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<AqtError> for HalError {
    fn from(e: AqtError) -> Self {
        match e {
            AqtError::Http(err) => HalError::Network(err),
            AqtError::Json(err) => HalError::Serialization(err),
            AqtError::Configuration(msg) => HalError::Configuration(msg),
            AqtError::MissingApiKey | AqtError::InvalidHttpMethod(_) => {
                HalError::Configuration(e.to_string())
            }
            AqtError::ApiError { status, message } => HalError::Transport { status, message },
            AqtError::OperationOrder(name) => HalError::OperationOrder(name),
            AqtError::UnsupportedOperation(name) => HalError::UnsupportedOperation(name),
            AqtError::InvalidOperation(err) => HalError::InvalidOperation(err),
            AqtError::JobFailed(msg) => HalError::RemoteExecution(msg),
            AqtError::Timeout(id) => HalError::Timeout(id),
            AqtError::MissingJobId(_)
            | AqtError::MissingSamples(_)
            | AqtError::SampleOutOfRange { .. } => {
                HalError::Backend(e.to_string())
            }
        }
    }
}

impl From<HalError> for AqtError {
    fn from(e: HalError) -> Self {
        match e {
            HalError::Configuration(msg) => AqtError::Configuration(msg),
            other => AqtError::Configuration(other.to_string()),
        }
    }
}
