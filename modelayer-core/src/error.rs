//! Error types and result types for connector operations.
//!
//! Identifier policy and codec errors are raised before any store call is made.
//! Backend failures are surfaced as [`ConnectorError::Transport`] (or the more
//! specific backend variants) and are never reclassified as policy errors.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when mapping models onto a document store.
#[derive(Error, Debug)]
pub enum ConnectorError {
    /// A value was supplied for an id property that the store or a generator owns.
    #[error("Cannot specify value for autogenerated id property {property} of model {model}")]
    AutogeneratedIdConflict {
        model: String,
        property: String,
    },
    /// No value was supplied for an id property that must be provided by the caller.
    #[error("Value is required for non-autogenerated id property {property} of model {model}")]
    MissingRequiredId {
        model: String,
        property: String,
    },
    /// The value is neither a native object identifier nor a 24-character hex string.
    #[error("Invalid ObjectId string: {0}")]
    InvalidObjectIdFormat(String),
    /// The requested model was never registered.
    #[error("Model not found: {0}")]
    ModelNotFound(String),
    /// The model definition declares its id in a way that cannot be resolved.
    #[error("Invalid model definition: {0}")]
    InvalidModel(String),
    /// The filter or where clause is malformed.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    /// Serialization/deserialization error when converting between document formats (BSON, JSON).
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Error during store initialization or connection setup.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// A document with the given identity already exists in the collection.
    /// The first argument is the identity, the second is the collection name.
    #[error("Document {0} already exists in collection {1}")]
    DocumentAlreadyExists(String, String),
    /// An error occurred in the underlying storage backend.
    #[error("Transport error: {0}")]
    Transport(String),
}

/// A specialized `Result` type for connector operations.
pub type ConnectorResult<T> = Result<T, ConnectorError>;

impl From<BsonError> for ConnectorError {
    fn from(err: BsonError) -> Self {
        ConnectorError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for ConnectorError {
    fn from(err: SerdeJsonError) -> Self {
        ConnectorError::Serialization(err.to_string())
    }
}
