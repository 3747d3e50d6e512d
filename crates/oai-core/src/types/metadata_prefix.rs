//! Metadata prefix type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::is_unreserved;
use crate::error::{Error, InvalidInputError};

/// A validated metadata format prefix, such as `oai_dc`.
///
/// Prefixes are restricted to the unreserved URI characters
/// (`A-Z a-z 0-9 - _ . ! ~ * ' ( )`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MetadataPrefix(String);

impl MetadataPrefix {
    /// Create a new metadata prefix, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is empty or contains reserved characters.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();

        if s.is_empty() {
            return Err(InvalidInputError::MetadataPrefix {
                value: s,
                reason: "cannot be empty".to_string(),
            }
            .into());
        }

        if let Some(c) = s.chars().find(|c| !is_unreserved(*c)) {
            return Err(InvalidInputError::MetadataPrefix {
                reason: format!("character {:?} is not allowed", c),
                value: s,
            }
            .into());
        }

        Ok(Self(s))
    }

    /// Returns the prefix string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MetadataPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MetadataPrefix {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for MetadataPrefix {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<MetadataPrefix> for String {
    fn from(prefix: MetadataPrefix) -> Self {
        prefix.0
    }
}

impl AsRef<str> for MetadataPrefix {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
