//! Placeholder backend.
//!
//! [`PrototypeBackend`] holds no records and no sets. It validates its
//! arguments like a real backend and then reports the empty repository, which
//! makes it a reference for the shape of the contract and a stand-in while a
//! real backend is being written.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

use crate::Result;
use crate::capabilities::{Capabilities, DeletedRecordsSupport};
use crate::error::OaiError;
use crate::page::Page;
use crate::query::SelectiveQuery;
use crate::repo::{DUBLIN_CORE, Header, MetadataFormat, Record, SetDescriptor};
use crate::traits::Backend;
use crate::types::{Granularity, Identifier, MetadataPrefix};

/// A backend with an empty repository, supporting only `oai_dc`.
#[derive(Debug, Clone)]
pub struct PrototypeBackend {
    capabilities: Capabilities,
}

impl PrototypeBackend {
    pub fn new() -> Self {
        Self {
            capabilities: Capabilities {
                deleted_records: DeletedRecordsSupport::No,
                granularity: Granularity::Date,
                earliest_datestamp: Utc::now(),
            },
        }
    }

    fn check_query(&self, query: &SelectiveQuery) -> Result<()> {
        if query.resumption_token.is_some() {
            return Err(
                OaiError::bad_resumption_token("no resumption tokens have been issued").into(),
            );
        }

        let prefix = query
            .metadata_prefix
            .as_ref()
            .ok_or_else(|| OaiError::bad_argument("metadataPrefix is required"))?;

        if *prefix != DUBLIN_CORE.prefix {
            return Err(OaiError::cannot_disseminate_format(prefix.as_str()).into());
        }

        let granularity = self.capabilities.granularity;
        if [&query.from, &query.until]
            .into_iter()
            .flatten()
            .any(|bound| bound.granularity() > granularity)
        {
            return Err(OaiError::bad_argument(format!(
                "datestamps must use the {} granularity",
                granularity
            ))
            .into());
        }

        if let (Some(from), Some(until)) = (&query.from, &query.until)
            && from > until
        {
            return Err(OaiError::bad_argument("from is later than until").into());
        }

        if query.set.is_some() {
            return Err(OaiError::no_set_hierarchy().into());
        }

        Ok(())
    }
}

impl Default for PrototypeBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for PrototypeBackend {
    fn capabilities(&self) -> Capabilities {
        self.capabilities.clone()
    }

    async fn earliest_datestamp(&self) -> DateTime<Utc> {
        Utc::now()
    }

    #[instrument(skip(self))]
    async fn metadata_formats(
        &self,
        identifier: Option<&Identifier>,
    ) -> Result<Vec<MetadataFormat>> {
        match identifier {
            Some(identifier) => Err(OaiError::id_does_not_exist(identifier.as_str()).into()),
            None => Ok(vec![DUBLIN_CORE.clone()]),
        }
    }

    #[instrument(skip(self))]
    async fn get_record(
        &self,
        identifier: &Identifier,
        _prefix: &MetadataPrefix,
    ) -> Result<Record> {
        debug!("Prototype backend holds no records");
        Err(OaiError::id_does_not_exist(identifier.as_str()).into())
    }

    #[instrument(skip(self))]
    async fn list_records(&self, query: &SelectiveQuery) -> Result<Page<Record>> {
        self.check_query(query)?;
        Err(OaiError::no_records_match().into())
    }

    #[instrument(skip(self))]
    async fn list_identifiers(&self, query: &SelectiveQuery) -> Result<Page<Header>> {
        self.check_query(query)?;
        Err(OaiError::no_records_match().into())
    }

    #[instrument(skip(self))]
    async fn list_sets(&self, resumption_token: Option<&str>) -> Result<Page<SetDescriptor>> {
        match resumption_token {
            Some(_) => {
                Err(OaiError::bad_resumption_token("no resumption tokens have been issued").into())
            }
            None => Err(OaiError::no_set_hierarchy().into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::types::{Datestamp, SetSpec};

    fn dc_query() -> SelectiveQuery {
        SelectiveQuery::new(DUBLIN_CORE.prefix.clone())
    }

    #[test]
    fn capabilities() {
        let caps = PrototypeBackend::new().capabilities();
        assert_eq!(caps.deleted_records, DeletedRecordsSupport::No);
        assert_eq!(caps.granularity, Granularity::Date);
        assert!(caps.earliest_datestamp <= Utc::now());
    }

    #[tokio::test]
    async fn earliest_datestamp_is_now() {
        let before = Utc::now();
        let earliest = PrototypeBackend::new().earliest_datestamp().await;
        assert!(earliest >= before);
    }

    #[tokio::test]
    async fn get_record_never_finds_anything() {
        let err = PrototypeBackend::new()
            .get_record(
                &Identifier::new("foo").unwrap(),
                &MetadataPrefix::new("bar").unwrap(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::IdDoesNotExist));
    }

    #[tokio::test]
    async fn metadata_formats() {
        let backend = PrototypeBackend::new();
        let formats = backend.metadata_formats(None).await.unwrap();
        assert_eq!(formats, vec![DUBLIN_CORE.clone()]);

        let err = backend
            .metadata_formats(Some(&Identifier::new("unknown-id").unwrap()))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::IdDoesNotExist));
    }

    #[tokio::test]
    async fn sets() {
        let backend = PrototypeBackend::new();
        let err = backend.list_sets(None).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::NoSetHierarchy));

        let err = backend.list_sets(Some("foo")).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::BadResumptionToken));
    }

    #[tokio::test]
    async fn listings_match_nothing() {
        let backend = PrototypeBackend::new();
        let err = backend.list_records(&dc_query()).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::NoRecordsMatch));

        let err = backend.list_identifiers(&dc_query()).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::NoRecordsMatch));
    }

    #[tokio::test]
    async fn listings_validate_arguments() {
        let backend = PrototypeBackend::new();

        let err = backend
            .list_records(&SelectiveQuery::new(MetadataPrefix::new("marc21").unwrap()))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::CannotDisseminateFormat));

        let inverted = dc_query()
            .from(Datestamp::parse("2020-02-01").unwrap())
            .until(Datestamp::parse("2020-01-01").unwrap());
        let err = backend.list_records(&inverted).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::BadArgument));

        let too_fine = dc_query().from(Datestamp::parse("2020-01-01T10:00:00Z").unwrap());
        let err = backend.list_identifiers(&too_fine).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::BadArgument));

        let err = backend
            .list_identifiers(&dc_query().set(SetSpec::new("a").unwrap()))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::NoSetHierarchy));

        let err = backend
            .list_records(&SelectiveQuery::resume("foo"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::BadResumptionToken));

        let err = backend
            .list_records(&SelectiveQuery::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::BadArgument));
    }
}
