//! Core OAI-PMH value types.
//!
//! These types enforce protocol invariants at construction time,
//! ensuring invalid states are unrepresentable.

mod datestamp;
mod identifier;
mod metadata_prefix;
mod set_spec;

pub use datestamp::{Datestamp, Granularity};
pub use identifier::Identifier;
pub use metadata_prefix::MetadataPrefix;
pub use set_spec::SetSpec;

/// Returns true for the characters OAI-PMH allows in prefixes and set specs.
pub(crate) fn is_unreserved(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '!' | '~' | '*' | '\'' | '(' | ')')
}
