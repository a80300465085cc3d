//! Error types for expression evaluation.

use crate::access::DataType;
use crate::planner::Slot;
use crate::sql::UnhandledNode;
use thiserror::Error;

/// Errors that can occur during expression evaluation.
///
/// None of them is retryable: a failure aborts evaluation of the current
/// expression for the current row.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    /// The planner handed over a tree or mapping that breaks its contract
    #[error("Contract violation: {message}")]
    ContractViolation { message: String },

    /// Structurally valid node the interpreter does not implement
    #[error("Unsupported operation: {message}")]
    UnsupportedOperation { message: String },

    /// Slot missing from the slot-to-channel mapping
    #[error("Slot {slot} has no channel")]
    UnresolvedSlot { slot: Slot },

    /// Declared slot type without a read path
    #[error("Reading slots of type {data_type} is not supported")]
    UnsupportedType { data_type: DataType },

    /// Operand runtime types without defined semantics for the operation
    #[error("Type mismatch: {operation}({})", .operand_types.join(", "))]
    TypeMismatch {
        operation: String,
        operand_types: Vec<&'static str>,
    },

    #[error("Division by zero")]
    DivisionByZero,
}

impl From<UnhandledNode> for ExpressionError {
    fn from(err: UnhandledNode) -> Self {
        ExpressionError::UnsupportedOperation {
            message: format!("not yet implemented: {}", err.kind),
        }
    }
}

/// Result type for expression operations
pub type ExpressionResult<T> = Result<T, ExpressionError>;
