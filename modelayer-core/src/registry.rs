//! Read-only registry of models known to a connector.
//!
//! Models are registered through [`ModelRegistryBuilder`] at startup. Building the
//! registry resolves every model's [`ModelIdSpec`] eagerly; afterwards the registry
//! is immutable and can be cloned and shared across tasks without locking.

use std::{collections::HashMap, sync::Arc};
use tracing::debug;

use crate::{
    backend::IDENTITY_FIELD,
    definition::ModelDefinition,
    error::{ConnectorError, ConnectorResult},
    id::{DeclaredType, ModelIdSpec},
};

/// A model together with everything resolved from its definition at registration.
#[derive(Debug, Clone)]
pub struct RegisteredModel {
    pub name: String,
    pub collection: String,
    pub id: ModelIdSpec,
    /// Non-id properties declared as native identifiers (foreign keys).
    native_properties: Vec<(String, DeclaredType)>,
}

impl RegisteredModel {
    pub fn from_definition(definition: &ModelDefinition) -> ConnectorResult<Self> {
        let id = ModelIdSpec::from_definition(definition)?;
        let native_properties = definition
            .properties
            .iter()
            .filter(|(name, _)| *name != id.id_property)
            .map(|(name, def)| (name.to_string(), DeclaredType::from_property(def)))
            .filter(|(_, declared)| declared.is_native())
            .collect();

        Ok(Self {
            name: definition.name.clone(),
            collection: definition.collection_name().to_string(),
            id,
            native_properties,
        })
    }

    /// Returns the declared type of a property whose values go through the id codec.
    ///
    /// That is the id property itself, the store identity field standing in for it, and
    /// any property declared as a native identifier.
    pub fn id_typed(&self, property: &str) -> Option<&DeclaredType> {
        if property == self.id.id_property || property == IDENTITY_FIELD {
            return Some(&self.id.declared_type);
        }

        self.native_properties
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, declared)| declared)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: Arc<HashMap<String, Arc<RegisteredModel>>>,
}

impl ModelRegistry {
    pub fn builder() -> ModelRegistryBuilder {
        ModelRegistryBuilder::default()
    }

    /// Looks up a registered model by name.
    pub fn get(&self, name: &str) -> ConnectorResult<&RegisteredModel> {
        self.models
            .get(name)
            .map(Arc::as_ref)
            .ok_or_else(|| ConnectorError::ModelNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    pub fn models(&self) -> impl Iterator<Item = &RegisteredModel> {
        self.models
            .values()
            .map(Arc::as_ref)
    }
}

/// Collects model definitions before the registry is frozen.
#[derive(Debug, Default)]
pub struct ModelRegistryBuilder {
    models: HashMap<String, Arc<RegisteredModel>>,
}

impl ModelRegistryBuilder {
    /// Registers a model, resolving its id declaration.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::InvalidModel`] if the model is already registered or its
    /// id declaration cannot be resolved.
    pub fn register(mut self, definition: ModelDefinition) -> ConnectorResult<Self> {
        if self.models.contains_key(&definition.name) {
            return Err(ConnectorError::InvalidModel(format!(
                "model {} is already registered",
                definition.name
            )));
        }

        let model = RegisteredModel::from_definition(&definition)?;
        debug!(
            target: "modelayer::registry",
            model = %model.name,
            collection = %model.collection,
            id_property = %model.id.id_property,
            kind = ?model.id.kind,
            declared_type = ?model.id.declared_type,
            "Model registered"
        );

        self.models
            .insert(definition.name, Arc::new(model));

        Ok(self)
    }

    /// Registers a model from its JSON definition.
    pub fn register_json(self, json: &str) -> ConnectorResult<Self> {
        self.register(serde_json::from_str(json)?)
    }

    pub fn build(self) -> ModelRegistry {
        ModelRegistry { models: Arc::new(self.models) }
    }
}
