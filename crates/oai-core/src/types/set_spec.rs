//! Set spec type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::is_unreserved;
use crate::error::{Error, InvalidInputError};

/// A validated, hierarchical set spec.
///
/// Set specs are colon-separated paths; `math:algebra` is a child of `math`.
///
/// # Example
///
/// ```
/// use oai_core::SetSpec;
///
/// let math = SetSpec::new("math").unwrap();
/// let algebra = SetSpec::new("math:algebra").unwrap();
/// assert!(math.is_ancestor_of(&algebra));
/// assert!(math.contains(&algebra));
/// assert!(math.contains(&math));
/// assert_eq!(algebra.parent(), Some(math));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SetSpec(String);

impl SetSpec {
    /// Create a new set spec, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the spec is empty, has an empty segment, or
    /// contains reserved characters.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    /// Returns the full spec string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the colon-separated segments of the spec.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(':')
    }

    /// Returns the number of segments.
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Returns the parent spec, or `None` for a top-level set.
    pub fn parent(&self) -> Option<SetSpec> {
        self.0
            .rsplit_once(':')
            .map(|(parent, _)| SetSpec(parent.to_string()))
    }

    /// Returns true if `other` is a strict descendant of this spec.
    pub fn is_ancestor_of(&self, other: &SetSpec) -> bool {
        other
            .0
            .strip_prefix(self.0.as_str())
            .is_some_and(|rest| rest.starts_with(':'))
    }

    /// Returns true if `other` is this spec or one of its descendants.
    pub fn contains(&self, other: &SetSpec) -> bool {
        self == other || self.is_ancestor_of(other)
    }

    fn validate(s: &str) -> Result<(), Error> {
        if s.is_empty() {
            return Err(InvalidInputError::SetSpec {
                value: s.to_string(),
                reason: "cannot be empty".to_string(),
            }
            .into());
        }

        for (i, segment) in s.split(':').enumerate() {
            if segment.is_empty() {
                return Err(InvalidInputError::SetSpec {
                    value: s.to_string(),
                    reason: format!("segment {} is empty", i + 1),
                }
                .into());
            }

            if let Some(c) = segment.chars().find(|c| !is_unreserved(*c)) {
                return Err(InvalidInputError::SetSpec {
                    value: s.to_string(),
                    reason: format!("character {:?} is not allowed", c),
                }
                .into());
            }
        }

        Ok(())
    }
}

impl fmt::Display for SetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SetSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for SetSpec {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<SetSpec> for String {
    fn from(spec: SetSpec) -> Self {
        spec.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hierarchy() {
        let a = SetSpec::new("a").unwrap();
        let ab = SetSpec::new("a:b").unwrap();
        let abc = SetSpec::new("a:b:c").unwrap();

        assert!(a.is_ancestor_of(&ab));
        assert!(a.is_ancestor_of(&abc));
        assert!(!ab.is_ancestor_of(&a));
        assert!(!a.is_ancestor_of(&a));
        assert_eq!(abc.depth(), 3);
        assert_eq!(abc.parent(), Some(ab));
        assert_eq!(a.parent(), None);
    }

    #[test]
    fn prefix_is_not_ancestry() {
        let math = SetSpec::new("math").unwrap();
        let maths = SetSpec::new("mathematics").unwrap();
        assert!(!math.contains(&maths));
    }

    #[test]
    fn invalid_specs() {
        assert!(SetSpec::new("").is_err());
        assert!(SetSpec::new("a::b").is_err());
        assert!(SetSpec::new(":a").is_err());
        assert!(SetSpec::new("a:").is_err());
        assert!(SetSpec::new("a b").is_err());
    }
}
