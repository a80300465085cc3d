//! Planner-side passes that prepare an expression for evaluation.
//!
//! The passes run in this order:
//! 1. Name resolution: qualified names are rewritten to slot references
//! 2. Layout: referenced slots are collected and assigned consecutive channels
//!
//! The resulting slot-to-channel mapping is what the interpreter is built with.

pub mod layout;
pub mod plan;
pub mod resolver;
pub mod slot;

pub use layout::{ChannelLayout, SlotCollector};
pub use plan::PlanDocument;
pub use resolver::{resolve_slots, SlotResolver, SymbolTable};
pub use slot::{Slot, SlotId};
