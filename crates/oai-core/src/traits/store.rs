//! Record store trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::Result;
use crate::repo::{SetDescriptor, StoredRecord};
use crate::types::{Identifier, MetadataPrefix, SetSpec};

/// Selection criteria for a store scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    /// Inclusive lower bound on the datestamp.
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on the datestamp.
    pub until: Option<DateTime<Utc>>,
    /// Only records in this set or one of its descendants.
    pub set: Option<SetSpec>,
    /// Only live records available in this format. Deleted records pass
    /// regardless of format when `include_deleted` is set.
    pub metadata_prefix: Option<MetadataPrefix>,
    pub include_deleted: bool,
}

impl RecordFilter {
    /// Returns true if the record satisfies every criterion.
    pub fn matches(&self, record: &StoredRecord) -> bool {
        if record.deleted && !self.include_deleted {
            return false;
        }

        if self.from.is_some_and(|from| record.datestamp < from) {
            return false;
        }

        if self.until.is_some_and(|until| record.datestamp >= until) {
            return false;
        }

        if let Some(set) = &self.set
            && !record.in_set(set)
        {
            return false;
        }

        match &self.metadata_prefix {
            Some(prefix) => record.deleted || record.supports(prefix),
            None => true,
        }
    }
}

/// Read access to the records and sets behind a backend.
///
/// Stores are queried read-only; consistency under concurrent writes is the
/// store's own concern.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Look up a record, deleted or not.
    async fn record(&self, identifier: &Identifier) -> Result<Option<StoredRecord>>;

    /// Return every record matching the filter, in any order.
    async fn scan(&self, filter: &RecordFilter) -> Result<Vec<StoredRecord>>;

    /// Return the set hierarchy; empty when the store has no sets.
    async fn sets(&self) -> Result<Vec<SetDescriptor>>;

    /// Return the earliest record datestamp, if any record exists.
    async fn earliest_datestamp(&self) -> Result<Option<DateTime<Utc>>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::MetadataDocument;
    use chrono::TimeZone;
    use serde_json::json;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, day, 0, 0, 0).unwrap()
    }

    fn record(day: u32) -> StoredRecord {
        StoredRecord::new(Identifier::new(format!("id-{day}")).unwrap(), at(day))
            .with_set(SetSpec::new("a:b").unwrap())
            .with_format(
                MetadataPrefix::new("oai_dc").unwrap(),
                MetadataDocument::new(json!({})).unwrap(),
            )
    }

    #[test]
    fn default_filter_matches_live_records() {
        let filter = RecordFilter::default();
        assert!(filter.matches(&record(1)));
        assert!(!filter.matches(&record(1).tombstone(at(2))));
    }

    #[test]
    fn range_bounds() {
        let filter = RecordFilter {
            from: Some(at(2)),
            until: Some(at(4)),
            ..Default::default()
        };
        assert!(!filter.matches(&record(1)));
        assert!(filter.matches(&record(2)));
        assert!(filter.matches(&record(3)));
        assert!(!filter.matches(&record(4)));
    }

    #[test]
    fn format_filter_lets_tombstones_through() {
        let filter = RecordFilter {
            metadata_prefix: Some(MetadataPrefix::new("marc21").unwrap()),
            include_deleted: true,
            ..Default::default()
        };
        assert!(!filter.matches(&record(1)));
        assert!(filter.matches(&record(1).tombstone(at(2))));
    }

    #[test]
    fn set_filter() {
        let parent = RecordFilter {
            set: Some(SetSpec::new("a").unwrap()),
            ..Default::default()
        };
        let other = RecordFilter {
            set: Some(SetSpec::new("c").unwrap()),
            ..Default::default()
        };
        assert!(parent.matches(&record(1)));
        assert!(!other.matches(&record(1)));
    }
}
