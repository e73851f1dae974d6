//! Value generation for opaque generated ids.
//!
//! The connector asks an [`IdGenerator`] for the next sequence number of a model when
//! its id is generated but not a native store identifier. What the number becomes is
//! driven by the declared id type:
//!
//! - `Number` and untyped ids take the sequence value as an `Int64`
//! - `String` ids take a random UUID v4 string and never consult the generator

use async_trait::async_trait;
use bson::Bson;
use std::fmt::Debug;
use uuid::Uuid;

use crate::{
    codec::IdValue,
    error::{ConnectorError, ConnectorResult},
    id::{DeclaredType, ModelIdSpec},
};

/// Source of monotonically increasing sequence values per model.
#[async_trait]
pub trait IdGenerator: Send + Sync + Debug {
    /// Returns the next sequence value for the given model.
    async fn next_sequence(&self, model: &str) -> ConnectorResult<i64>;
}

/// Produces a fresh id value for an opaque generated id.
///
/// # Errors
///
/// Returns [`ConnectorError::Initialization`] if the id needs a sequence value and no
/// generator is available.
pub async fn generate_id(generator: Option<&dyn IdGenerator>, spec: &ModelIdSpec) -> ConnectorResult<IdValue> {
    if spec.declared_type == DeclaredType::String {
        return Ok(IdValue::Opaque(Bson::String(Uuid::new_v4().to_string())));
    }

    let generator = generator.ok_or_else(|| {
        ConnectorError::Initialization(format!(
            "model {} has a generated id but no id generator is configured",
            spec.model
        ))
    })?;

    Ok(IdValue::Opaque(Bson::Int64(
        generator
            .next_sequence(&spec.model)
            .await?,
    )))
}
