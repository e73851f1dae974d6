//! Convenient re-exports of commonly used types from modelayer.
//!
//! ```ignore
//! use modelayer::prelude::*;
//! ```

pub use modelayer_core::{
    backend::{StoreBackend, StoreBackendBuilder, IDENTITY_FIELD},
    codec::{IdentifierCodec, IdValue, StoreIdentity},
    connector::{Connector, DeleteResult},
    definition::{ModelDefinition, ModelOptions, PropertyDef, PropertyType, Properties},
    document::{Model, ModelExt},
    generator::IdGenerator,
    id::{DeclaredType, IdKind, ModelIdSpec},
    policy::{IdPolicyResolver, ResolvedId},
    query::{Query, QueryVisitor, Expr, Sort, SortDirection, FieldOp, QueryBuilder, Filter, StoreQuery},
    registry::{ModelRegistry, ModelRegistryBuilder, RegisteredModel},
    typed::TypedModel,
    where_clause::WhereClause,
    error::{ConnectorError, ConnectorResult},
};
