use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::TypeRegistry;
use crate::object::DomainObject;

type Initializer = Arc<dyn Fn(&mut DomainObject) + Send + Sync>;

/// Describes a kind of domain object
#[derive(Clone)]
pub struct TypeDefinition {
    pub name: String,
    pub description: Option<String>,
    pub css_class: Option<String>,
    initialize: Option<Initializer>,
}

impl TypeDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            css_class: None,
            initialize: None,
        }
    }

    pub fn with_description(self, description: impl Into<String>) -> Self {
        let mut def = self;
        def.description = Some(description.into());
        def
    }

    pub fn with_css_class(self, css_class: impl Into<String>) -> Self {
        let mut def = self;
        def.css_class = Some(css_class.into());
        def
    }

    /// Set a hook to seed the default properties of new objects of this type
    pub fn with_initializer<F>(self, initialize: F) -> Self
    where
        F: Fn(&mut DomainObject) + Send + Sync + 'static,
    {
        let mut def = self;
        def.initialize = Some(Arc::new(initialize));
        def
    }

    /// Run the initialization hook on the object, if any
    pub fn initialize(&self, object: &mut DomainObject) {
        if let Some(initialize) = self.initialize.as_ref() {
            initialize(object);
        }
    }
}

impl fmt::Debug for TypeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("css_class", &self.css_class)
            .field("initialize", &self.initialize.is_some())
            .finish()
    }
}

/// An in-memory type registry
#[derive(Clone, Debug, Default)]
pub struct Types(HashMap<String, TypeDefinition>);

impl Types {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type, replacing any previous definition for the key
    pub fn with_type(self, key: impl Into<String>, definition: TypeDefinition) -> Self {
        let mut types = self;
        types.0.insert(key.into(), definition);
        types
    }
}

impl TypeRegistry for Types {
    fn get(&self, type_key: &str) -> Option<TypeDefinition> {
        self.0.get(type_key).cloned()
    }
}
