//! Typed models and their conversion to and from BSON documents.
//!
//! Registered models can be used untyped through [`Connector`](crate::connector::Connector)
//! with plain [`bson::Document`] property bags, or typed through
//! [`TypedModel`](crate::typed::TypedModel) with any serde type implementing [`Model`].
//!
//! # Example
//!
//! ```ignore
//! use modelayer::document::Model;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct Book {
//!     pub id: Option<String>,
//!     pub title: String,
//! }
//!
//! impl Model for Book {
//!     fn model_name() -> &'static str {
//!         "Book"
//!     }
//! }
//! ```

use bson::{Bson, Document, de::deserialize_from_bson, ser::serialize_to_bson};
use serde::{Deserialize, Serialize};

use crate::error::{ConnectorError, ConnectorResult};

/// A Rust type mapped onto a registered model.
///
/// The id property should be an `Option` so instances can be created without one when
/// the model's id is generated; `None` serializes as null, which counts as absent.
pub trait Model: Serialize + for<'de> Deserialize<'de> + Send + Sync + Clone + 'static {
    /// Returns the name the model was registered under.
    fn model_name() -> &'static str;
}

/// Extension trait providing document conversion for models.
///
/// This trait is automatically implemented for all types that implement [`Model`].
pub trait ModelExt: Model {
    /// Converts this model into a property document.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the model does not serialize to a document.
    fn to_document(&self) -> ConnectorResult<Document>;

    /// Creates a model from a property document.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails or the structure is invalid.
    fn from_document(document: Document) -> ConnectorResult<Self>;
}

impl<M: Model> ModelExt for M {
    fn to_document(&self) -> ConnectorResult<Document> {
        match serialize_to_bson(self)? {
            Bson::Document(document) => Ok(document),
            other => Err(ConnectorError::Serialization(format!(
                "model {} serialized to {:?} instead of a document",
                M::model_name(),
                other.element_type()
            ))),
        }
    }

    fn from_document(document: Document) -> ConnectorResult<Self> {
        Ok(deserialize_from_bson(Bson::Document(document))?)
    }
}
