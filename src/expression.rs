//! Expression evaluation for query execution.
//!
//! This module provides:
//! - Operator definitions for arithmetic, comparison and logical nodes
//! - The evaluation error taxonomy
//! - The interpreter that evaluates an expression tree against one row

pub mod error;
pub mod interpreter;
pub mod operator;

pub use error::{ExpressionError, ExpressionResult};
pub use interpreter::ExpressionInterpreter;
pub use operator::{ArithmeticOperator, ComparisonOperator, LogicalOperator};
