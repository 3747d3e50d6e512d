//! Record types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::MetadataDocument;
use crate::types::{Identifier, MetadataPrefix, SetSpec};

/// The header of a record: everything but the metadata body.
///
/// Identifier listings return headers only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    /// Unique, stable identifier of the record.
    pub identifier: Identifier,

    /// Instant of the last modification (or deletion).
    pub datestamp: DateTime<Utc>,

    /// Whether the record has been deleted.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deleted: bool,

    /// Specs of the sets the record belongs to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub set_specs: Vec<SetSpec>,
}

/// A record disseminated in one metadata format.
///
/// A deleted record never carries metadata; the constructors make any other
/// combination unrepresentable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    header: Header,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<MetadataDocument>,
}

impl Record {
    /// A live record with its metadata body.
    pub fn new(mut header: Header, metadata: MetadataDocument) -> Self {
        header.deleted = false;
        Self {
            header,
            metadata: Some(metadata),
        }
    }

    /// A deleted record: header only.
    pub fn deleted(mut header: Header) -> Self {
        header.deleted = true;
        Self {
            header,
            metadata: None,
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn identifier(&self) -> &Identifier {
        &self.header.identifier
    }

    pub fn datestamp(&self) -> DateTime<Utc> {
        self.header.datestamp
    }

    pub fn is_deleted(&self) -> bool {
        self.header.deleted
    }

    /// Returns the metadata body; always `None` for deleted records.
    pub fn metadata(&self) -> Option<&MetadataDocument> {
        self.metadata.as_ref()
    }
}

/// A record as held by a record store, with every format it is available in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub identifier: Identifier,

    pub datestamp: DateTime<Utc>,

    #[serde(default)]
    pub deleted: bool,

    #[serde(default)]
    pub sets: Vec<SetSpec>,

    #[serde(default)]
    formats: BTreeMap<MetadataPrefix, MetadataDocument>,
}

impl StoredRecord {
    /// A live record with no formats and no set membership.
    pub fn new(identifier: Identifier, datestamp: DateTime<Utc>) -> Self {
        Self {
            identifier,
            datestamp,
            deleted: false,
            sets: Vec::new(),
            formats: BTreeMap::new(),
        }
    }

    /// Add the record to a set.
    pub fn with_set(mut self, spec: SetSpec) -> Self {
        if !self.sets.contains(&spec) {
            self.sets.push(spec);
        }
        self
    }

    /// Make the record available in a format, replacing any previous body.
    pub fn with_format(mut self, prefix: MetadataPrefix, document: MetadataDocument) -> Self {
        self.formats.insert(prefix, document);
        self
    }

    /// Turn the record into a tombstone deleted at `at`.
    ///
    /// Identifier and set membership survive; every metadata body is dropped.
    pub fn tombstone(mut self, at: DateTime<Utc>) -> Self {
        self.deleted = true;
        self.datestamp = at;
        self.formats.clear();
        self
    }

    pub fn header(&self) -> Header {
        Header {
            identifier: self.identifier.clone(),
            datestamp: self.datestamp,
            deleted: self.deleted,
            set_specs: self.sets.clone(),
        }
    }

    /// Prefixes the record can be disseminated in; empty once deleted.
    pub fn available_formats(&self) -> impl Iterator<Item = &MetadataPrefix> {
        self.formats.keys().filter(|_| !self.deleted)
    }

    pub fn supports(&self, prefix: &MetadataPrefix) -> bool {
        !self.deleted && self.formats.contains_key(prefix)
    }

    /// Returns true if the record belongs to `spec` or one of its descendants.
    pub fn in_set(&self, spec: &SetSpec) -> bool {
        self.sets.iter().any(|s| spec.contains(s))
    }

    /// Produce the record in the given format.
    ///
    /// Deleted records disseminate as a bare header regardless of prefix;
    /// live records return `None` when the format is not available.
    pub fn disseminate(&self, prefix: &MetadataPrefix) -> Option<Record> {
        if self.deleted {
            return Some(Record::deleted(self.header()));
        }
        self.formats
            .get(prefix)
            .map(|doc| Record::new(self.header(), doc.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn dc() -> MetadataPrefix {
        MetadataPrefix::new("oai_dc").unwrap()
    }

    fn sample() -> StoredRecord {
        StoredRecord::new(
            Identifier::new("oai:test:1").unwrap(),
            Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap(),
        )
        .with_set(SetSpec::new("a:b").unwrap())
        .with_format(dc(), MetadataDocument::new(json!({"title": "x"})).unwrap())
    }

    #[test]
    fn disseminates_available_format() {
        let record = sample().disseminate(&dc()).unwrap();
        assert!(!record.is_deleted());
        assert_eq!(record.metadata().unwrap().get("title"), Some(&json!("x")));
    }

    #[test]
    fn missing_format_is_none() {
        let marc = MetadataPrefix::new("marc21").unwrap();
        assert!(sample().disseminate(&marc).is_none());
    }

    #[test]
    fn tombstone_drops_metadata() {
        let at = Utc.with_ymd_and_hms(2022, 5, 5, 5, 5, 5).unwrap();
        let stored = sample().tombstone(at);
        assert_eq!(stored.available_formats().count(), 0);
        assert!(!stored.supports(&dc()));

        let record = stored.disseminate(&dc()).unwrap();
        assert!(record.is_deleted());
        assert!(record.metadata().is_none());
        assert_eq!(record.datestamp(), at);
        assert_eq!(record.header().set_specs, vec![SetSpec::new("a:b").unwrap()]);
    }

    #[test]
    fn set_membership_includes_descendants() {
        let stored = sample();
        assert!(stored.in_set(&SetSpec::new("a").unwrap()));
        assert!(stored.in_set(&SetSpec::new("a:b").unwrap()));
        assert!(!stored.in_set(&SetSpec::new("a:b:c").unwrap()));
        assert!(!stored.in_set(&SetSpec::new("b").unwrap()));
    }

    #[test]
    fn deleted_record_serializes_without_metadata() {
        let at = Utc.with_ymd_and_hms(2022, 5, 5, 5, 5, 5).unwrap();
        let record = sample().tombstone(at).disseminate(&dc()).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["header"]["deleted"], json!(true));
        assert!(json.get("metadata").is_none());
    }
}
