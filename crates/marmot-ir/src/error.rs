//! Error types for the IR crate.

use crate::wire::WireLabel;
use thiserror::Error;

/// Errors that can occur while building operations or wire registers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Wire label is not registered on the device.
    #[error("Wire {wire} not found on device{}", format_op_context(.op_name))]
    WireNotFound {
        /// The label that was not found.
        wire: WireLabel,
        /// Optional operation name for context.
        op_name: Option<String>,
    },

    /// The same label was registered twice.
    #[error("Duplicate wire label {0}")]
    DuplicateWire(WireLabel),

    /// Operation requires a different number of wires.
    #[error("Operation '{op_name}' requires {expected} wires, got {got}")]
    WireCountMismatch {
        /// Name of the operation.
        op_name: String,
        /// Expected number of wires.
        expected: usize,
        /// Actual number of wires provided.
        got: usize,
    },

    /// Operation requires a different number of parameters.
    #[error("Operation '{op_name}' takes {expected} parameters, got {got}")]
    ParameterCountMismatch {
        /// Name of the operation.
        op_name: String,
        /// Expected number of parameters.
        expected: usize,
        /// Actual number of parameters provided.
        got: usize,
    },

    /// A basis state contains something other than 0 or 1.
    #[error("Invalid basis state {0:?}: entries must be 0 or 1")]
    InvalidBasisState(Vec<f64>),
}

/// Helper function to format optional operation context.
#[allow(clippy::ref_option)]
fn format_op_context(op_name: &Option<String>) -> String {
    match op_name {
        Some(name) => format!(" (operation: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
