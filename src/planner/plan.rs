use crate::planner::{Slot, SymbolTable};
use crate::sql::ast::{Expression, QualifiedName};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A planned expression together with the slots its names may resolve to.
///
/// Slot names are dotted qualified names, e.g. `orders.price`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDocument {
    pub slots: Vec<Slot>,
    pub expression: Expression,
}

impl PlanDocument {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse plan document")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read plan file {}", path.display()))?;
        Self::from_json(&json)
    }

    /// Symbol table keyed by each slot's qualified name
    pub fn symbols(&self) -> SymbolTable {
        self.slots
            .iter()
            .map(|slot| (QualifiedName::parse(&slot.name), slot.clone()))
            .collect()
    }
}
