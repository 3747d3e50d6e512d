//! Record identifier type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// A validated record identifier.
///
/// Identifiers are opaque to the backend contract beyond being non-empty and
/// free of whitespace; most repositories use the `oai:<namespace>:<local>` form.
///
/// # Example
///
/// ```
/// use oai_core::Identifier;
///
/// let id = Identifier::new("oai:example.org:1234").unwrap();
/// assert_eq!(id.as_str(), "oai:example.org:1234");
/// assert!(Identifier::new("has space").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    /// Create a new identifier, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is empty or contains whitespace or
    /// control characters.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    /// Returns the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(s: &str) -> Result<(), Error> {
        if s.is_empty() {
            return Err(InvalidInputError::Identifier {
                value: s.to_string(),
                reason: "cannot be empty".to_string(),
            }
            .into());
        }

        if let Some(c) = s.chars().find(|c| c.is_whitespace() || c.is_control()) {
            return Err(InvalidInputError::Identifier {
                value: s.to_string(),
                reason: format!("contains invalid character {:?}", c),
            }
            .into());
        }

        Ok(())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Identifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Identifier {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.0
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
