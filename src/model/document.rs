//! # Documents and the Resource Mapper
//!
//! A [`Document`] is what the store holds and what travels over the wire: a JSON
//! object with a store-assigned identity under [`ID_FIELD`]. The mapper does no
//! transformation beyond serialization, so a document read from the store is sent
//! to the client byte-for-byte as stored.
//!
//! Typed resources (e.g. [`Contact`](crate::model::Contact)) implement [`Resource`]
//! to declare their collection name and to convert to and from documents.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Name of the identity field inside stored documents.
pub const ID_FIELD: &str = "_id";

/// A schema-flexible record as stored in a collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// The store-assigned identity, if the document has been persisted.
    pub fn id(&self) -> Option<&str> {
        self.0.get(ID_FIELD).and_then(Value::as_str)
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.0.insert(ID_FIELD.to_string(), Value::String(id.into()));
    }

    /// Drops any client-supplied identity so the store can assign its own.
    pub fn without_id(mut self) -> Self {
        self.0.remove(ID_FIELD);
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// A field rendered as a URL-friendly scalar. Objects, arrays and nulls yield `None`.
    pub fn scalar(&self, field: &str) -> Option<String> {
        match self.0.get(field)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(field.into(), value.into());
        self
    }
}

/// Failures converting between typed resources and documents.
#[derive(Debug, Error)]
pub enum MapperError {
    #[error("resource is not a JSON object")]
    NotAnObject,

    #[error("document does not match resource shape: {0}")]
    Shape(#[from] serde_json::Error),
}

/// A typed entity stored as documents in a named collection.
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection (and URL) name, e.g. `contacts`.
    const COLLECTION: &'static str;

    /// Display name used in logs and error messages, e.g. `Contact`.
    const NAME: &'static str;

    fn to_document(&self) -> Result<Document, MapperError> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(Document(map)),
            _ => Err(MapperError::NotAnObject),
        }
    }

    fn from_document(document: Document) -> Result<Self, MapperError> {
        Ok(serde_json::from_value(Value::Object(document.0))?)
    }
}
