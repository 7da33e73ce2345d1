//! External collaborators
//!
//! The creation workflow does not render forms, persist objects or navigate
//! by itself. It relies on the capabilities defined in this module, which
//! are provided by the host application and bundled into [`Services`].
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::errors::ServiceError;
use crate::object::{DomainObject, Identifier};
use crate::patch::PropertyPatch;

mod types;
pub use types::*;

mod ids;
pub use ids::*;

/// Registry of object type definitions
pub trait TypeRegistry: Send + Sync {
    /// Return the definition for the type, if registered
    fn get(&self, type_key: &str) -> Option<TypeDefinition>;
}

/// Source of globally unique object keys
pub trait IdGenerator: Send + Sync {
    fn next(&self) -> String;
}

/// Declarative description of a form, as produced by the form subsystem
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FormStructure {
    pub title: String,
    #[serde(default)]
    pub sections: Vec<Value>,
}

#[async_trait]
pub trait FormRenderer: Send + Sync {
    /// Build the form used to edit the properties of a new object
    fn structure(&self, object: &DomainObject, parent: &DomainObject) -> FormStructure;

    /// Display the form for the given object
    ///
    /// Resolves to the user edits once the user confirms, or `None` if the
    /// form is cancelled.
    async fn show(&self, structure: FormStructure, object: &DomainObject) -> Option<PropertyPatch>;
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Persist the object
    async fn save(&self, object: &DomainObject) -> Result<(), ServiceError>;

    /// Return the path of the object in the containment hierarchy
    ///
    /// The path starts with the object itself and ends with the root. An
    /// entry is `None` if the corresponding ancestor could not be read.
    async fn original_path(
        &self,
        identifier: &Identifier,
    ) -> Result<Vec<Option<DomainObject>>, ServiceError>;
}

/// The children of a domain object
pub trait Composition: Send {
    /// Add a reference to the child
    fn add(&mut self, child: &DomainObject);
}

#[async_trait]
pub trait CompositionService: Send + Sync {
    async fn get(&self, parent: &DomainObject) -> Result<Box<dyn Composition>, ServiceError>;
}

pub trait Notifications: Send + Sync {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
}

/// Options for a progress dialog
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressOpts {
    pub title: String,
    pub message: String,
    pub icon_class: String,
    /// Completion percentage, `None` if unknown
    pub progress: Option<u8>,
}

/// A visible progress dialog
pub trait ProgressDialog: Send {
    fn dismiss(self: Box<Self>);
}

pub trait ProgressIndicator: Send + Sync {
    fn show(&self, opts: ProgressOpts) -> Box<dyn ProgressDialog>;
}

pub trait Navigator: Send + Sync {
    /// Replace the current application location
    fn navigate(&self, url: &str);
}

/// A view able to display a domain object
pub trait ObjectView: Send + Sync {
    /// Return true if the view supports editing the object in place
    fn can_edit(&self, _object: &DomainObject, _path: &[Option<DomainObject>]) -> bool {
        false
    }
}

pub trait ViewRegistry: Send + Sync {
    /// Return the views able to display the object, preferred first
    fn get(&self, object: &DomainObject, path: &[Option<DomainObject>]) -> Vec<Arc<dyn ObjectView>>;
}

pub trait Editor: Send + Sync {
    /// Enter edit mode for the currently displayed object
    fn edit(&self);
}

/// The collaborators used by the creation workflow
#[derive(Clone)]
pub struct Services {
    pub types: Arc<dyn TypeRegistry>,
    pub ids: Arc<dyn IdGenerator>,
    pub forms: Arc<dyn FormRenderer>,
    pub objects: Arc<dyn ObjectStore>,
    pub composition: Arc<dyn CompositionService>,
    pub notifications: Arc<dyn Notifications>,
    pub overlays: Arc<dyn ProgressIndicator>,
    pub navigator: Arc<dyn Navigator>,
    pub views: Arc<dyn ViewRegistry>,
    pub editor: Arc<dyn Editor>,
}
