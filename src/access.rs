//! Access layer for row-oriented input to expression evaluation.
//!
//! This module provides the types the interpreter exchanges with storage:
//!
//! - **Value**: Dynamically-tagged runtime value produced by evaluation
//! - **DataType**: Declared scalar types of planner slots
//! - **TupleReadable**: Null-checked, typed field access for one channel
//! - **Tuple**: In-memory field reader used by row sources and tests
//!
//! Storage formats and row iteration live outside this crate; a row is just
//! a slice of channel readers supplied fresh for every evaluated row.

pub mod tuple;
pub mod value;

pub use tuple::{Tuple, TupleReadable};
pub use value::{DataType, Value};
