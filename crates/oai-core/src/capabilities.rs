//! Backend capability descriptor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Granularity;

/// How a backend keeps track of deleted records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletedRecordsSupport {
    /// Deletions are not reported.
    No,
    /// Deletions may be reported, without guarantee of persistence.
    Transient,
    /// Deletions are kept forever.
    Persistent,
}

impl DeletedRecordsSupport {
    /// Returns true if deleted records appear in listings.
    pub fn reports_deletions(&self) -> bool {
        !matches!(self, DeletedRecordsSupport::No)
    }

    /// Returns the value used in an `Identify` response.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeletedRecordsSupport::No => "no",
            DeletedRecordsSupport::Transient => "transient",
            DeletedRecordsSupport::Persistent => "persistent",
        }
    }
}

/// Static facts about a backend, fixed at initialisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub deleted_records: DeletedRecordsSupport,
    pub granularity: Granularity,
    pub earliest_datestamp: DateTime<Utc>,
}
