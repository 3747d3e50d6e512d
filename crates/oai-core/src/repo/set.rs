//! Set descriptors.

use serde::{Deserialize, Serialize};

use crate::types::SetSpec;

/// A named, hierarchical grouping of records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetDescriptor {
    /// Colon-delimited key of the set.
    pub spec: SetSpec,
    /// Display name.
    pub name: String,
    /// Optional free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SetDescriptor {
    pub fn new(spec: SetSpec, name: impl Into<String>) -> Self {
        Self {
            spec,
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
