//! Per-model identifier declarations.
//!
//! A [`ModelIdSpec`] is resolved once from a [`ModelDefinition`] when the model is
//! registered. Every later operation dispatches on its [`IdKind`] instead of
//! re-inspecting the property declarations.

use crate::{
    definition::{ModelDefinition, PropertyDef, PropertyType},
    error::{ConnectorError, ConnectorResult},
};

/// Name of the implicit id property synthesized for models without one.
pub const DEFAULT_ID_PROPERTY: &str = "id";

/// The id regime that applies to a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    /// The store generates a native object identifier.
    NativeGenerated,
    /// A sequence generator outside the store produces the value.
    OpaqueGenerated,
    /// The caller always provides the value.
    UserSupplied,
}

/// The type an id (or id-typed property) is declared with, as far as the codec cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredType {
    /// The store's native object identifier.
    ObjectId,
    String,
    Number,
    Any,
    Other(PropertyType),
}

impl DeclaredType {
    pub fn from_property(def: &PropertyDef) -> Self {
        if def
            .store_data_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("objectid"))
        {
            return DeclaredType::ObjectId;
        }

        match &def.property_type {
            PropertyType::ObjectId => DeclaredType::ObjectId,
            PropertyType::String => DeclaredType::String,
            PropertyType::Number => DeclaredType::Number,
            PropertyType::Any => DeclaredType::Any,
            other => DeclaredType::Other(other.clone()),
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, DeclaredType::ObjectId)
    }
}

/// Resolved identifier configuration of a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelIdSpec {
    /// Name of the model this id belongs to.
    pub model: String,
    /// The application-facing id property name.
    pub id_property: String,
    pub kind: IdKind,
    pub declared_type: DeclaredType,
    /// Reject client-supplied values for opaque generated ids.
    pub force_id: bool,
}

impl ModelIdSpec {
    /// Resolves the id declaration of a model.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::InvalidModel`] when more than one property is marked as
    /// the id, or when a generated id is declared with a type no generator can produce.
    pub fn from_definition(definition: &ModelDefinition) -> ConnectorResult<Self> {
        let force_id = definition.options.force_id.unwrap_or(false);
        let mut ids = definition
            .properties
            .iter()
            .filter(|(_, def)| def.id);

        let Some((name, def)) = ids.next() else {
            return Ok(ModelIdSpec {
                model: definition.name.clone(),
                id_property: DEFAULT_ID_PROPERTY.to_string(),
                kind: IdKind::NativeGenerated,
                declared_type: DeclaredType::ObjectId,
                force_id,
            });
        };

        if let Some((other, _)) = ids.next() {
            return Err(ConnectorError::InvalidModel(format!(
                "model {} declares more than one id property ({name}, {other})",
                definition.name
            )));
        }

        let declared_type = DeclaredType::from_property(def);
        let kind = match (def.generated.unwrap_or(false), &declared_type) {
            (false, _) => IdKind::UserSupplied,
            (true, DeclaredType::ObjectId) => IdKind::NativeGenerated,
            (true, DeclaredType::Number | DeclaredType::String | DeclaredType::Any) => {
                IdKind::OpaqueGenerated
            }
            (true, DeclaredType::Other(property_type)) => {
                return Err(ConnectorError::InvalidModel(format!(
                    "generated id property {name} of model {} cannot be of type {property_type:?}",
                    definition.name
                )));
            }
        };

        Ok(ModelIdSpec {
            model: definition.name.clone(),
            id_property: name.to_string(),
            kind,
            declared_type,
            force_id,
        })
    }
}
