//! oai-file - Filesystem-backed record store for OAI-PMH backends.

mod backend;
mod store;

pub use backend::{FileBackend, open};
pub use store::FileStore;
