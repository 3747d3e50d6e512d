//! Repository data model.
//!
//! This module defines the records, sets and metadata formats a backend
//! exposes. The operations producing them are methods on
//! [`Backend`](crate::Backend).

mod format;
mod metadata;
mod record;
mod set;

pub use format::{DUBLIN_CORE, MetadataFormat};
pub use metadata::MetadataDocument;
pub use record::{Header, Record, StoredRecord};
pub use set::SetDescriptor;
