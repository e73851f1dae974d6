//! Model definitions consumed at registration time.
//!
//! A [`ModelDefinition`] is the connector's view of an ORM model: a name, an ordered
//! set of typed properties and connector options. Definitions can be built in code
//! or deserialized from JSON model definitions:
//!
//! ```ignore
//! use modelayer_core::definition::ModelDefinition;
//!
//! let book: ModelDefinition = serde_json::from_str(r#"{
//!     "name": "Book",
//!     "properties": {
//!         "id": { "type": "String", "id": true, "mongodb": { "dataType": "ObjectId" } },
//!         "title": "String"
//!     }
//! }"#)?;
//! ```

use serde::{
    Deserialize, Deserializer,
    de::{IgnoredAny, MapAccess, Visitor},
};
use std::fmt;

/// The application-level type of a model property.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PropertyType {
    String,
    Number,
    Boolean,
    Date,
    /// The store's native object identifier.
    ObjectId,
    Array,
    Object,
    /// Untyped or unrecognised property type.
    #[default]
    Any,
}

impl From<&str> for PropertyType {
    fn from(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "string" => PropertyType::String,
            "number" => PropertyType::Number,
            "boolean" => PropertyType::Boolean,
            "date" => PropertyType::Date,
            "objectid" => PropertyType::ObjectId,
            "array" => PropertyType::Array,
            "object" => PropertyType::Object,
            _ => PropertyType::Any,
        }
    }
}

impl From<String> for PropertyType {
    fn from(name: String) -> Self {
        PropertyType::from(name.as_str())
    }
}

impl<'de> Deserialize<'de> for PropertyType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(PropertyType::from(String::deserialize(deserializer)?))
    }
}

/// Declaration of a single model property.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "PropertyDefRepr")]
pub struct PropertyDef {
    /// The declared application type.
    pub property_type: PropertyType,
    /// Whether this property is the model's identifier.
    pub id: bool,
    /// Whether values for this id are generated rather than supplied.
    pub generated: Option<bool>,
    /// Store-specific data type override (e.g. `"ObjectId"`).
    pub store_data_type: Option<String>,
}

impl PropertyDef {
    pub fn new(property_type: PropertyType) -> Self {
        Self { property_type, ..Default::default() }
    }

    /// Marks this property as the model identifier.
    pub fn id(mut self) -> Self {
        self.id = true;
        self
    }

    pub fn generated(mut self, generated: bool) -> Self {
        self.generated = Some(generated);
        self
    }

    pub fn store_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.store_data_type = Some(data_type.into());
        self
    }
}

impl From<PropertyType> for PropertyDef {
    fn from(property_type: PropertyType) -> Self {
        PropertyDef::new(property_type)
    }
}

#[derive(Deserialize)]
struct StoreSettingsRepr {
    #[serde(rename = "dataType")]
    data_type: Option<String>,
}

#[derive(Deserialize)]
struct FullPropertyRepr {
    #[serde(rename = "type", default)]
    property_type: PropertyType,
    #[serde(default)]
    id: bool,
    #[serde(default)]
    generated: Option<bool>,
    #[serde(default)]
    mongodb: Option<StoreSettingsRepr>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PropertyDefRepr {
    Shorthand(PropertyType),
    ArrayShorthand(Vec<IgnoredAny>),
    Full(FullPropertyRepr),
}

impl From<PropertyDefRepr> for PropertyDef {
    fn from(repr: PropertyDefRepr) -> Self {
        match repr {
            PropertyDefRepr::Shorthand(property_type) => PropertyDef::new(property_type),
            PropertyDefRepr::ArrayShorthand(_) => PropertyDef::new(PropertyType::Array),
            PropertyDefRepr::Full(full) => PropertyDef {
                property_type: full.property_type,
                id: full.id,
                generated: full.generated,
                store_data_type: full.mongodb.and_then(|m| m.data_type),
            },
        }
    }
}

/// Ordered mapping from property name to its declaration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Properties(Vec<(String, PropertyDef)>);

impl Properties {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyDef)> {
        self.0
            .iter()
            .map(|(name, def)| (name.as_str(), def))
    }

    pub fn get(&self, name: &str) -> Option<&PropertyDef> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, def)| def)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Inserts or replaces a property, keeping the original position on replace.
    pub fn insert(&mut self, name: impl Into<String>, def: PropertyDef) {
        let name = name.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = def,
            None => self.0.push((name, def)),
        }
    }
}

impl<'de> Deserialize<'de> for Properties {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PropertiesVisitor;

        impl<'de> Visitor<'de> for PropertiesVisitor {
            type Value = Properties;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of property names to property definitions")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut properties = Properties::default();
                while let Some((name, def)) = map.next_entry::<String, PropertyDef>()? {
                    properties.insert(name, def);
                }
                Ok(properties)
            }
        }

        deserializer.deserialize_map(PropertiesVisitor)
    }
}

#[derive(Deserialize, Default)]
struct CollectionSettingsRepr {
    collection: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ModelOptionsRepr {
    #[serde(default)]
    force_id: Option<bool>,
    #[serde(default)]
    mongodb: Option<CollectionSettingsRepr>,
}

/// Connector options attached to a model.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "ModelOptionsRepr")]
pub struct ModelOptions {
    /// Reject client-supplied values for generated ids. Defaults to `false`.
    pub force_id: Option<bool>,
    /// Collection name override. Defaults to the model name.
    pub collection: Option<String>,
}

impl From<ModelOptionsRepr> for ModelOptions {
    fn from(repr: ModelOptionsRepr) -> Self {
        ModelOptions {
            force_id: repr.force_id,
            collection: repr.mongodb.and_then(|m| m.collection),
        }
    }
}

/// A model as presented to the connector at registration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelDefinition {
    pub name: String,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default)]
    pub options: ModelOptions,
}

impl ModelDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Properties::default(),
            options: ModelOptions::default(),
        }
    }

    pub fn property(mut self, name: impl Into<String>, def: impl Into<PropertyDef>) -> Self {
        self.properties.insert(name, def.into());
        self
    }

    pub fn force_id(mut self, force_id: bool) -> Self {
        self.options.force_id = Some(force_id);
        self
    }

    pub fn collection(mut self, collection: impl Into<String>) -> Self {
        self.options.collection = Some(collection.into());
        self
    }

    /// Name of the store collection backing this model.
    pub fn collection_name(&self) -> &str {
        self.options
            .collection
            .as_deref()
            .unwrap_or(&self.name)
    }
}
