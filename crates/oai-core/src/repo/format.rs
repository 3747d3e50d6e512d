//! Metadata format descriptors.

use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::Url;

use crate::error::{Error, InvalidInputError};
use crate::types::MetadataPrefix;

/// Unqualified Dublin Core, the format every OAI-PMH repository must support.
pub static DUBLIN_CORE: LazyLock<MetadataFormat> = LazyLock::new(|| {
    MetadataFormat::new(
        "oai_dc",
        "http://www.openarchives.org/OAI/2.0/oai_dc.xsd",
        "http://www.openarchives.org/OAI/2.0/oai_dc/",
    )
    .expect("Dublin Core descriptor is valid")
});

/// A metadata format a backend can disseminate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataFormat {
    /// Key used in requests (`metadataPrefix`).
    pub prefix: MetadataPrefix,
    /// Location of the XML schema.
    pub schema: Url,
    /// XML namespace of the format.
    pub namespace: Url,
}

impl MetadataFormat {
    /// Create a new format descriptor, validating the prefix and both URLs.
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix is invalid or either URL does not parse.
    pub fn new(prefix: &str, schema: &str, namespace: &str) -> Result<Self, Error> {
        Ok(Self {
            prefix: MetadataPrefix::new(prefix)?,
            schema: parse_url(schema)?,
            namespace: parse_url(namespace)?,
        })
    }
}

fn parse_url(s: &str) -> Result<Url, Error> {
    Url::parse(s).map_err(|e| {
        InvalidInputError::Url {
            value: s.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dublin_core_descriptor() {
        assert_eq!(DUBLIN_CORE.prefix.as_str(), "oai_dc");
        assert_eq!(
            DUBLIN_CORE.schema.as_str(),
            "http://www.openarchives.org/OAI/2.0/oai_dc.xsd"
        );
        assert_eq!(
            DUBLIN_CORE.namespace.as_str(),
            "http://www.openarchives.org/OAI/2.0/oai_dc/"
        );
    }

    #[test]
    fn rejects_relative_schema() {
        assert!(MetadataFormat::new("x", "schema.xsd", "http://example.org/ns").is_err());
    }
}
