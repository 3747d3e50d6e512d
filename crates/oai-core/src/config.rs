//! Backend configuration.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::capabilities::DeletedRecordsSupport;
use crate::error::ConfigError;
use crate::repo::{DUBLIN_CORE, MetadataFormat};
use crate::types::Granularity;

/// Configuration shared by every store-backed backend.
///
/// All fields have defaults, so an empty JSON object is a valid configuration.
///
/// # Example
///
/// ```
/// use oai_core::config::BackendConfig;
///
/// let config: BackendConfig = serde_json::from_str(r#"{ "page_size": 25 }"#).unwrap();
/// assert_eq!(config.page_size, 25);
/// assert_eq!(config.metadata_formats[0].prefix.as_str(), "oai_dc");
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Number of items per listing page.
    pub page_size: usize,

    /// Lifetime of issued resumption tokens. `None` means tokens never expire.
    pub token_ttl_secs: Option<u64>,

    /// Secret used to sign resumption tokens.
    ///
    /// Tokens stay valid across restarts and replicas only when every
    /// process shares the same secret.
    pub token_secret: Option<String>,

    pub deleted_records: DeletedRecordsSupport,

    pub granularity: Granularity,

    /// Supported formats, in the order they are reported.
    pub metadata_formats: Vec<MetadataFormat>,

    /// Whether flow control reports `completeListSize`.
    pub complete_list_size: bool,

    /// Overrides the earliest datestamp reported by the store.
    pub earliest_datestamp: Option<DateTime<Utc>>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            token_ttl_secs: Some(3600),
            token_secret: None,
            deleted_records: DeletedRecordsSupport::Persistent,
            granularity: Granularity::DateTime,
            metadata_formats: vec![DUBLIN_CORE.clone()],
            complete_list_size: true,
            earliest_datestamp: None,
        }
    }
}

impl BackendConfig {
    /// Check the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero page size, an empty or duplicated format
    /// list, or an empty token secret.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }

        if self.metadata_formats.is_empty() {
            return Err(ConfigError::NoMetadataFormats);
        }

        let mut seen = HashSet::new();
        for format in &self.metadata_formats {
            if !seen.insert(format.prefix.as_str()) {
                return Err(ConfigError::DuplicatePrefix {
                    prefix: format.prefix.to_string(),
                });
            }
        }

        if self.token_secret.as_deref().is_some_and(str::is_empty) {
            return Err(ConfigError::EmptySecret);
        }

        Ok(())
    }

    /// Returns the token lifetime, if tokens expire.
    pub fn token_ttl(&self) -> Option<Duration> {
        self.token_ttl_secs.map(Duration::from_secs)
    }
}
