//! oai-core - the OAI-PMH backend contract.
//!
//! A [`Backend`] supplies records, headers, sets and metadata formats to an
//! OAI-PMH protocol layer. [`StoreBackend`] implements the contract over any
//! [`RecordStore`], including selective harvesting and stateless pagination
//! through signed resumption tokens.

pub mod capabilities;
pub mod config;
pub mod error;
pub mod harvest;
pub mod memory;
pub mod page;
pub mod prototype;
pub mod query;
pub mod repo;
pub mod token;
pub mod traits;
pub mod types;

pub use capabilities::{Capabilities, DeletedRecordsSupport};
pub use config::BackendConfig;
pub use error::{Error, ErrorCode, OaiError};
pub use harvest::StoreBackend;
pub use memory::MemoryStore;
pub use page::{FlowControl, Page};
pub use prototype::PrototypeBackend;
pub use query::{QueryParams, SelectiveQuery};
pub use repo::{
    DUBLIN_CORE, Header, MetadataDocument, MetadataFormat, Record, SetDescriptor, StoredRecord,
};
pub use token::{ResumptionToken, TokenCodec, Verb};
pub use traits::{Backend, RecordFilter, RecordStore};
pub use types::{Datestamp, Granularity, Identifier, MetadataPrefix, SetSpec};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
