//! Backend trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::Result;
use crate::capabilities::Capabilities;
use crate::page::Page;
use crate::query::SelectiveQuery;
use crate::repo::{Header, MetadataFormat, Record, SetDescriptor};
use crate::types::{Identifier, MetadataPrefix};

/// A source of metadata records for an OAI-PMH server.
///
/// Every operation either succeeds or fails with a single error. Protocol
/// failures carry an [`ErrorCode`](crate::ErrorCode); rendering them is the
/// caller's job. Listing operations are stateless: all continuation state
/// travels inside the resumption token.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Returns the static capabilities of this backend.
    fn capabilities(&self) -> Capabilities;

    /// Returns the earliest datestamp of any record.
    ///
    /// Never fails; when unknown the current instant is returned.
    async fn earliest_datestamp(&self) -> DateTime<Utc>;

    /// List metadata formats, either all supported ones or those available
    /// for a single record.
    ///
    /// Without an identifier the result is never empty. With one, fails with
    /// `idDoesNotExist` if the record is absent and `noMetadataFormats` if it
    /// has no formats.
    async fn metadata_formats(&self, identifier: Option<&Identifier>)
    -> Result<Vec<MetadataFormat>>;

    /// Get a single record in the given format.
    ///
    /// Fails with `idDoesNotExist` or `cannotDisseminateFormat`.
    async fn get_record(&self, identifier: &Identifier, prefix: &MetadataPrefix)
    -> Result<Record>;

    /// List records matching a selective query, one page at a time.
    async fn list_records(&self, query: &SelectiveQuery) -> Result<Page<Record>>;

    /// List record headers matching a selective query, one page at a time.
    async fn list_identifiers(&self, query: &SelectiveQuery) -> Result<Page<Header>>;

    /// List the set hierarchy, one page at a time.
    async fn list_sets(&self, resumption_token: Option<&str>) -> Result<Page<SetDescriptor>>;
}
