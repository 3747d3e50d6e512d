//! Validated metadata document type.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::{Error, InvalidInputError};

/// The metadata body of a record in one format.
///
/// Documents are structured JSON objects; rendering them into the XML
/// serialization of the format is the protocol layer's job.
///
/// # Example
///
/// ```
/// use oai_core::repo::MetadataDocument;
/// use serde_json::json;
///
/// let doc = MetadataDocument::new(json!({ "title": "On Computable Numbers" })).unwrap();
/// assert_eq!(doc.get("title").and_then(|v| v.as_str()), Some("On Computable Numbers"));
/// assert!(MetadataDocument::new(json!("not an object")).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataDocument(Value);

impl MetadataDocument {
    /// Create a new document from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a JSON object.
    pub fn new(value: Value) -> Result<Self, Error> {
        if !value.is_object() {
            return Err(InvalidInputError::Metadata {
                reason: "metadata document must be a JSON object".to_string(),
            }
            .into());
        }
        Ok(Self(value))
    }

    /// Returns a field of the document.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the underlying JSON value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consumes the document, returning the JSON value.
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl Serialize for MetadataDocument {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MetadataDocument {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        MetadataDocument::new(value).map_err(serde::de::Error::custom)
    }
}
