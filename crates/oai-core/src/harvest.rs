//! Store-backed backend implementation.
//!
//! [`StoreBackend`] implements the whole [`Backend`] contract on top of any
//! [`RecordStore`]: argument validation, resumption token handling, filtering,
//! stable ordering and page assembly. Concrete backends only supply storage.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, instrument, warn};

use crate::Result;
use crate::capabilities::Capabilities;
use crate::config::BackendConfig;
use crate::error::{Error, OaiError};
use crate::page::{FlowControl, Page};
use crate::query::SelectiveQuery;
use crate::repo::{Header, MetadataFormat, Record, SetDescriptor, StoredRecord};
use crate::token::{HarvestQuery, TokenCodec, TokenState, Verb};
use crate::traits::{Backend, RecordFilter, RecordStore};
use crate::types::{Identifier, MetadataPrefix};

/// Source of the current instant, replaceable in tests.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Records selected for one listing page.
struct Selection {
    records: Vec<StoredRecord>,
    window: Range<usize>,
    flow_control: Option<FlowControl>,
    prefix: MetadataPrefix,
}

impl Selection {
    fn page(&self) -> &[StoredRecord] {
        &self.records[self.window.clone()]
    }
}

/// A [`Backend`] serving records from a [`RecordStore`].
///
/// # Example
///
/// ```
/// use oai_core::{Backend, MemoryStore, SelectiveQuery, StoreBackend, DUBLIN_CORE};
/// use oai_core::config::BackendConfig;
///
/// # async fn example() -> oai_core::Result<()> {
/// let backend = StoreBackend::open(MemoryStore::new(), BackendConfig::default()).await?;
/// let err = backend
///     .list_records(&SelectiveQuery::new(DUBLIN_CORE.prefix.clone()))
///     .await
///     .unwrap_err();
/// assert_eq!(err.code(), Some(oai_core::ErrorCode::NoRecordsMatch));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct StoreBackend<S> {
    store: S,
    config: Arc<BackendConfig>,
    codec: TokenCodec,
    capabilities: Capabilities,
    clock: Clock,
}

impl<S> fmt::Debug for StoreBackend<S>
where
    S: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreBackend")
            .field("store", &self.store)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

impl<S: RecordStore> StoreBackend<S> {
    /// Create a backend over `store`.
    ///
    /// The capability descriptor, including the earliest datestamp, is
    /// computed once here and never changes afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub async fn open(store: S, config: BackendConfig) -> Result<Self> {
        Self::open_with_clock(store, config, Arc::new(Utc::now)).await
    }

    /// Create a backend using `clock` as its source of time.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub async fn open_with_clock(store: S, config: BackendConfig, clock: Clock) -> Result<Self> {
        config.validate()?;

        let codec = match &config.token_secret {
            Some(secret) => TokenCodec::new(secret),
            None => {
                debug!("No token secret configured, tokens are valid for this process only");
                TokenCodec::random()
            }
        };

        let earliest = resolve_earliest(&store, &config, clock()).await;
        let capabilities = Capabilities {
            deleted_records: config.deleted_records,
            granularity: config.granularity,
            earliest_datestamp: earliest,
        };

        debug!(?capabilities, page_size = config.page_size, "Opened store backend");

        Ok(Self {
            store,
            config: Arc::new(config),
            codec,
            capabilities,
            clock,
        })
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    fn format(&self, prefix: &MetadataPrefix) -> Option<&MetadataFormat> {
        self.config
            .metadata_formats
            .iter()
            .find(|f| &f.prefix == prefix)
    }

    /// Fetch a record that is visible under the deleted-record policy.
    async fn visible_record(&self, identifier: &Identifier) -> Result<StoredRecord> {
        match self.store.record(identifier).await? {
            Some(record)
                if !record.deleted || self.capabilities.deleted_records.reports_deletions() =>
            {
                Ok(record)
            }
            _ => Err(OaiError::id_does_not_exist(identifier.as_str()).into()),
        }
    }

    /// Recover the query and cursor for a listing call.
    ///
    /// Returns whether the call resumed from a token alongside the query.
    async fn resolve(
        &self,
        verb: Verb,
        query: &SelectiveQuery,
    ) -> Result<(HarvestQuery, u64, bool)> {
        if let Some(token) = &query.resumption_token {
            let state = self.codec.decode(token, verb, self.now())?;
            debug!(cursor = state.cursor, "Resuming from token");
            return Ok((state.query, state.cursor, true));
        }

        let harvest = self.validate(query).await?;
        Ok((harvest, 0, false))
    }

    async fn validate(&self, query: &SelectiveQuery) -> Result<HarvestQuery> {
        let prefix = query
            .metadata_prefix
            .as_ref()
            .ok_or_else(|| OaiError::bad_argument("metadataPrefix is required"))?;

        if self.format(prefix).is_none() {
            return Err(OaiError::cannot_disseminate_format(prefix.as_str()).into());
        }

        let granularity = self.capabilities.granularity;
        for bound in [&query.from, &query.until].into_iter().flatten() {
            if bound.granularity() > granularity {
                return Err(OaiError::bad_argument(format!(
                    "datestamp '{}' is finer than the supported granularity {}",
                    bound, granularity
                ))
                .into());
            }
        }

        if let (Some(from), Some(until)) = (&query.from, &query.until) {
            if from.granularity() != until.granularity() {
                return Err(OaiError::bad_argument(
                    "from and until must have the same granularity",
                )
                .into());
            }
            if from > until {
                return Err(OaiError::bad_argument(format!(
                    "from ({}) is later than until ({})",
                    from, until
                ))
                .into());
            }
        }

        if let Some(set) = &query.set {
            let sets = self.store.sets().await?;
            if sets.is_empty() {
                return Err(OaiError::no_set_hierarchy().into());
            }
            if !sets.iter().any(|s| &s.spec == set) {
                return Err(OaiError::bad_argument(format!("unknown set '{}'", set)).into());
            }
        }

        Ok(HarvestQuery {
            metadata_prefix: Some(prefix.clone()),
            from: query.from,
            until: query.until,
            set: query.set.clone(),
        })
    }

    /// Select, order and window the records for a listing call.
    async fn select(
        &self,
        verb: Verb,
        query: &SelectiveQuery,
    ) -> Result<Selection> {
        let (harvest, cursor, resumed) = self.resolve(verb, query).await?;

        let prefix = harvest.metadata_prefix.clone().ok_or_else(|| {
            OaiError::bad_resumption_token("token does not carry a metadata prefix")
        })?;

        let filter = RecordFilter {
            from: harvest.from.map(|d| d.start()),
            until: harvest.until.map(|d| d.end_exclusive()),
            set: harvest.set.clone(),
            metadata_prefix: Some(prefix.clone()),
            include_deleted: self.capabilities.deleted_records.reports_deletions(),
        };

        let mut records = self.store.scan(&filter).await?;
        records.sort_by(|a, b| {
            a.datestamp
                .cmp(&b.datestamp)
                .then_with(|| a.identifier.cmp(&b.identifier))
        });

        if records.is_empty() && !resumed {
            return Err(OaiError::no_records_match().into());
        }

        let window = self.window(records.len(), cursor, resumed)?;
        let flow_control = self.flow_control(verb, harvest, &window, records.len())?;

        debug!(
            total = records.len(),
            start = window.start,
            end = window.end,
            "Selected records"
        );

        Ok(Selection {
            records,
            window,
            flow_control,
            prefix,
        })
    }

    fn window(&self, total: usize, cursor: u64, resumed: bool) -> Result<Range<usize>> {
        let start = usize::try_from(cursor).unwrap_or(usize::MAX);
        if resumed && start >= total {
            return Err(OaiError::bad_resumption_token(
                "resumption token points past the end of the list",
            )
            .into());
        }
        let end = start.saturating_add(self.config.page_size).min(total);
        Ok(start..end)
    }

    fn flow_control(
        &self,
        verb: Verb,
        query: HarvestQuery,
        window: &Range<usize>,
        total: usize,
    ) -> Result<Option<FlowControl>> {
        if window.start == 0 && window.end == total {
            return Ok(None);
        }

        let (resumption_token, expiration_date) = if window.end < total {
            let expires_at = self.expiry()?;
            let state = TokenState {
                verb,
                query,
                cursor: window.end as u64,
                expires_at,
            };
            (Some(self.codec.encode(&state)?), expires_at)
        } else {
            (None, None)
        };

        Ok(Some(FlowControl {
            resumption_token,
            expiration_date,
            complete_list_size: self.config.complete_list_size.then_some(total as u64),
            cursor: Some(window.start as u64),
        }))
    }

    fn expiry(&self) -> Result<Option<DateTime<Utc>>> {
        self.config
            .token_ttl()
            .map(|ttl| {
                TimeDelta::from_std(ttl)
                    .ok()
                    .and_then(|ttl| self.now().checked_add_signed(ttl))
                    .ok_or_else(|| Error::Internal {
                        message: "token lifetime overflows the calendar".to_string(),
                    })
            })
            .transpose()
    }
}

async fn resolve_earliest<S: RecordStore>(
    store: &S,
    config: &BackendConfig,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    if let Some(earliest) = config.earliest_datestamp {
        return earliest;
    }

    match store.earliest_datestamp().await {
        Ok(Some(earliest)) => earliest,
        Ok(None) => now,
        Err(err) => {
            warn!(error = %err, "Failed to read earliest datestamp, reporting now");
            now
        }
    }
}

#[async_trait]
impl<S: RecordStore> Backend for StoreBackend<S> {
    fn capabilities(&self) -> Capabilities {
        self.capabilities.clone()
    }

    #[instrument(skip(self))]
    async fn earliest_datestamp(&self) -> DateTime<Utc> {
        resolve_earliest(&self.store, &self.config, self.now()).await
    }

    #[instrument(skip(self))]
    async fn metadata_formats(
        &self,
        identifier: Option<&Identifier>,
    ) -> Result<Vec<MetadataFormat>> {
        let Some(identifier) = identifier else {
            return Ok(self.config.metadata_formats.clone());
        };

        let record = self.visible_record(identifier).await?;
        let formats: Vec<_> = self
            .config
            .metadata_formats
            .iter()
            .filter(|f| record.supports(&f.prefix))
            .cloned()
            .collect();

        if formats.is_empty() {
            return Err(OaiError::no_metadata_formats(identifier.as_str()).into());
        }

        debug!(count = formats.len(), "Listed record formats");
        Ok(formats)
    }

    #[instrument(skip(self))]
    async fn get_record(&self, identifier: &Identifier, prefix: &MetadataPrefix) -> Result<Record> {
        let record = self.visible_record(identifier).await?;

        if self.format(prefix).is_none() {
            return Err(OaiError::cannot_disseminate_format(prefix.as_str()).into());
        }

        record
            .disseminate(prefix)
            .ok_or_else(|| OaiError::cannot_disseminate_format(prefix.as_str()).into())
    }

    #[instrument(skip(self))]
    async fn list_records(&self, query: &SelectiveQuery) -> Result<Page<Record>> {
        let selection = self.select(Verb::ListRecords, query).await?;

        let items = selection
            .page()
            .iter()
            .filter_map(|r| r.disseminate(&selection.prefix))
            .collect();

        Ok(Page {
            items,
            flow_control: selection.flow_control,
        })
    }

    #[instrument(skip(self))]
    async fn list_identifiers(&self, query: &SelectiveQuery) -> Result<Page<Header>> {
        let selection = self.select(Verb::ListIdentifiers, query).await?;

        let items = selection.page().iter().map(StoredRecord::header).collect();

        Ok(Page {
            items,
            flow_control: selection.flow_control,
        })
    }

    #[instrument(skip(self))]
    async fn list_sets(&self, resumption_token: Option<&str>) -> Result<Page<SetDescriptor>> {
        let (cursor, resumed) = match resumption_token {
            Some(token) => {
                let state = self.codec.decode(token, Verb::ListSets, self.now())?;
                (state.cursor, true)
            }
            None => (0, false),
        };

        let mut sets = self.store.sets().await?;
        if sets.is_empty() && !resumed {
            return Err(OaiError::no_set_hierarchy().into());
        }
        sets.sort_by(|a, b| a.spec.cmp(&b.spec));

        let window = self.window(sets.len(), cursor, resumed)?;
        let flow_control =
            self.flow_control(Verb::ListSets, HarvestQuery::default(), &window, sets.len())?;

        debug!(total = sets.len(), start = window.start, "Listed sets");

        sets.truncate(window.end);
        let items = sets.split_off(window.start);

        Ok(Page {
            items,
            flow_control,
        })
    }
}
