//! Domain object model
//!
//! A [`DomainObject`] is a JSON object with a few well known properties
//! (`identifier`, `type`, `name`, `location` and `modified`) and any number
//! of type specific nested properties, addressable via
//! [property paths](`crate::PropertyPath`).

use jsonptr::PointerBuf;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::errors::MalformedPatchPath;
use crate::patch::PropertyPatch;
use crate::path::PropertyPath;

mod identifier;
pub use identifier::*;

/// Milliseconds since the Unix epoch
pub type Timestamp = i64;

/// Return the current time as a [`Timestamp`]
pub fn now() -> Timestamp {
    chrono::Utc::now().timestamp_millis()
}

#[derive(Debug, Error)]
pub enum InvalidObject {
    #[error("domain objects must be JSON objects")]
    NotAnObject,

    #[error("domain object has no valid identifier: {0}")]
    Identifier(#[source] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct DomainObject {
    properties: Map<String, Value>,
}

impl DomainObject {
    /// Create a new object of the given type
    pub fn new(identifier: Identifier, type_key: impl Into<String>, name: impl Into<String>) -> Self {
        let mut properties = Map::new();
        properties.insert("identifier".into(), json!(identifier));
        properties.insert("type".into(), Value::String(type_key.into()));
        properties.insert("name".into(), Value::String(name.into()));
        Self { properties }
    }

    /// Return the object identifier
    ///
    /// Missing identifier parts are returned as empty strings.
    pub fn identifier(&self) -> Identifier {
        let identifier = self.properties.get("identifier");
        let part = |name: &str| {
            identifier
                .and_then(|id| id.get(name))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Identifier::new(part("key"), part("namespace"))
    }

    pub(crate) fn set_identifier(&mut self, identifier: &Identifier) {
        self.properties
            .insert("identifier".into(), json!(identifier));
    }

    pub fn type_key(&self) -> &str {
        self.str_property("type").unwrap_or_default()
    }

    pub fn name(&self) -> &str {
        self.str_property("name").unwrap_or_default()
    }

    /// Key string of the object's parent, only set once the object is saved
    pub fn location(&self) -> Option<&str> {
        self.str_property("location")
    }

    pub(crate) fn set_location(&mut self, location: String) {
        self.properties
            .insert("location".into(), Value::String(location));
    }

    /// Time of the last change intended for persistence
    pub fn modified(&self) -> Option<Timestamp> {
        self.properties.get("modified").and_then(Value::as_i64)
    }

    pub(crate) fn set_modified(&mut self, modified: Timestamp) {
        self.properties
            .insert("modified".into(), Value::from(modified));
    }

    fn str_property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(Value::as_str)
    }

    /// Read the property at the given path
    pub fn get(&self, path: &PropertyPath) -> Option<&Value> {
        let mut segments = path.segments();
        let value = self.properties.get(segments.next()?)?;
        value.pointer(PointerBuf::from_tokens(segments).as_str())
    }

    /// Mutable access to the top level properties
    ///
    /// This is meant for type initializers seeding the default structure of
    /// a new object.
    pub fn properties_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.properties
    }

    /// Apply a property patch to the object
    pub fn patch(&mut self, patch: &PropertyPatch) -> Result<(), MalformedPatchPath> {
        patch.apply_to_object(&mut self.properties)
    }

    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    /// Return a JSON copy of the object
    pub fn to_value(&self) -> Value {
        Value::Object(self.properties.clone())
    }
}

impl TryFrom<Value> for DomainObject {
    type Error = InvalidObject;

    fn try_from(state: Value) -> Result<Self, Self::Error> {
        let Value::Object(properties) = state else {
            return Err(InvalidObject::NotAnObject);
        };

        Identifier::deserialize(properties.get("identifier").cloned().unwrap_or_default())
            .map_err(InvalidObject::Identifier)?;

        Ok(Self { properties })
    }
}

impl From<DomainObject> for Value {
    fn from(object: DomainObject) -> Value {
        Value::Object(object.properties)
    }
}
