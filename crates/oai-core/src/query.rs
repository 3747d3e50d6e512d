//! Selective harvesting queries.

use serde::{Deserialize, Serialize};

use crate::error::{Error, OaiError};
use crate::types::{Datestamp, MetadataPrefix, SetSpec};

/// The selective-harvesting arguments of a listing request.
///
/// When `resumption_token` is set, every other field is ignored: the backend
/// recovers the original arguments from the token.
///
/// # Example
///
/// ```
/// use oai_core::{Datestamp, MetadataPrefix, SelectiveQuery, SetSpec};
///
/// let query = SelectiveQuery::new(MetadataPrefix::new("oai_dc").unwrap())
///     .from(Datestamp::parse("2024-01-01").unwrap())
///     .set(SetSpec::new("physics").unwrap());
/// assert!(query.resumption_token.is_none());
///
/// let next = SelectiveQuery::resume("opaque-token");
/// assert!(next.metadata_prefix.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectiveQuery {
    pub metadata_prefix: Option<MetadataPrefix>,
    pub from: Option<Datestamp>,
    pub until: Option<Datestamp>,
    pub set: Option<SetSpec>,
    pub resumption_token: Option<String>,
}

impl SelectiveQuery {
    /// A fresh query for the given format.
    pub fn new(metadata_prefix: MetadataPrefix) -> Self {
        Self {
            metadata_prefix: Some(metadata_prefix),
            ..Default::default()
        }
    }

    /// A continuation request carrying only a resumption token.
    pub fn resume(token: impl Into<String>) -> Self {
        Self {
            resumption_token: Some(token.into()),
            ..Default::default()
        }
    }

    pub fn from(mut self, from: Datestamp) -> Self {
        self.from = Some(from);
        self
    }

    pub fn until(mut self, until: Datestamp) -> Self {
        self.until = Some(until);
        self
    }

    pub fn set(mut self, set: SetSpec) -> Self {
        self.set = Some(set);
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.resumption_token = Some(token.into());
        self
    }
}

/// Raw, unvalidated listing arguments as a protocol layer receives them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParams {
    pub metadata_prefix: Option<String>,
    pub from: Option<String>,
    pub until: Option<String>,
    pub set: Option<String>,
    pub resumption_token: Option<String>,
}

impl QueryParams {
    /// Convert raw arguments into a typed query.
    ///
    /// A syntactically invalid prefix cannot name a supported format and is
    /// reported as `cannotDisseminateFormat`; malformed datestamps and set
    /// specs are `badArgument`. With a resumption token present the other
    /// arguments are not inspected.
    ///
    /// # Errors
    ///
    /// Returns the protocol error describing the first invalid argument.
    pub fn parse(self) -> Result<SelectiveQuery, OaiError> {
        if let Some(token) = self.resumption_token {
            return Ok(SelectiveQuery::resume(token));
        }

        let metadata_prefix = self
            .metadata_prefix
            .map(|p| {
                MetadataPrefix::new(p.as_str())
                    .map_err(|_| OaiError::cannot_disseminate_format(&p))
            })
            .transpose()?;

        Ok(SelectiveQuery {
            metadata_prefix,
            from: parse_arg(self.from.as_deref(), Datestamp::parse)?,
            until: parse_arg(self.until.as_deref(), Datestamp::parse)?,
            set: parse_arg(self.set.as_deref(), |s| SetSpec::new(s))?,
            resumption_token: None,
        })
    }
}

fn parse_arg<T>(
    raw: Option<&str>,
    parse: impl FnOnce(&str) -> Result<T, Error>,
) -> Result<Option<T>, OaiError> {
    raw.map(|s| parse(s).map_err(|e| OaiError::bad_argument(e.to_string())))
        .transpose()
}
