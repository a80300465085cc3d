use crate::access::DataType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Planner-assigned identifier of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotId(pub u32);

/// A logical column with a declared scalar type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub id: SlotId,
    pub name: String,
    pub data_type: DataType,
}

impl Slot {
    pub fn new(id: u32, name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            id: SlotId(id),
            name: name.into(),
            data_type,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}:{}", self.name, self.id.0, self.data_type)
    }
}
