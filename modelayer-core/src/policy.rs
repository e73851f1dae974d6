//! Id-generation policy enforcement for creates.
//!
//! [`IdPolicyResolver::resolve`] runs once per create, before anything is written, and
//! decides whether the supplied id is used, rejected, or left for the store or an
//! id generator to produce. Find and destroy paths never consult it.

use bson::Bson;

use crate::{
    codec::{IdValue, IdentifierCodec},
    error::{ConnectorError, ConnectorResult},
    id::{IdKind, ModelIdSpec},
};

/// What a create should do with the identity field.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedId {
    /// Write this value.
    Supplied(IdValue),
    /// Omit the identity field; the store assigns a native identifier.
    DeferToStore,
    /// Ask the configured id generator for the next value.
    DeferToGenerator,
}

pub struct IdPolicyResolver;

impl IdPolicyResolver {
    /// Resolves the id of a model instance about to be created.
    ///
    /// A supplied `Bson::Null` is treated as absent.
    pub fn resolve(spec: &ModelIdSpec, supplied: Option<&Bson>) -> ConnectorResult<ResolvedId> {
        let supplied = supplied.filter(|value| !matches!(value, Bson::Null));

        match (spec.kind, supplied) {
            (IdKind::NativeGenerated, Some(_)) => Err(Self::conflict(spec)),
            (IdKind::NativeGenerated, None) => Ok(ResolvedId::DeferToStore),
            (IdKind::OpaqueGenerated, None) => Ok(ResolvedId::DeferToGenerator),
            (IdKind::OpaqueGenerated, Some(_)) if spec.force_id => Err(Self::conflict(spec)),
            (IdKind::OpaqueGenerated, Some(value)) => Ok(ResolvedId::Supplied(
                IdentifierCodec::classify(value, &spec.declared_type)?.into_opaque(),
            )),
            (IdKind::UserSupplied, None) => Err(ConnectorError::MissingRequiredId {
                model: spec.model.clone(),
                property: spec.id_property.clone(),
            }),
            (IdKind::UserSupplied, Some(value)) => Ok(ResolvedId::Supplied(
                IdentifierCodec::classify(value, &spec.declared_type)?,
            )),
        }
    }

    fn conflict(spec: &ModelIdSpec) -> ConnectorError {
        ConnectorError::AutogeneratedIdConflict {
            model: spec.model.clone(),
            property: spec.id_property.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::DeclaredType;

    fn spec(kind: IdKind, declared_type: DeclaredType, force_id: bool) -> ModelIdSpec {
        ModelIdSpec {
            model: "Thing".into(),
            id_property: "id".into(),
            kind,
            declared_type,
            force_id,
        }
    }

    #[test]
    fn native_generated_rejects_any_supplied_value() {
        let spec = spec(IdKind::NativeGenerated, DeclaredType::ObjectId, false);

        let err = IdPolicyResolver::resolve(&spec, Some(&Bson::Int32(1))).unwrap_err();
        assert!(matches!(err, ConnectorError::AutogeneratedIdConflict { .. }));
        assert!(err.to_string().starts_with("Cannot specify value for autogenerated id"));

        assert_eq!(IdPolicyResolver::resolve(&spec, None).unwrap(), ResolvedId::DeferToStore);
        assert_eq!(
            IdPolicyResolver::resolve(&spec, Some(&Bson::Null)).unwrap(),
            ResolvedId::DeferToStore
        );
    }

    #[test]
    fn opaque_generated_honours_force_id() {
        let open = spec(IdKind::OpaqueGenerated, DeclaredType::Number, false);
        assert_eq!(IdPolicyResolver::resolve(&open, None).unwrap(), ResolvedId::DeferToGenerator);
        assert_eq!(
            IdPolicyResolver::resolve(&open, Some(&Bson::Int32(5))).unwrap(),
            ResolvedId::Supplied(IdValue::Opaque(Bson::Int32(5)))
        );

        let forced = spec(IdKind::OpaqueGenerated, DeclaredType::Number, true);
        assert!(matches!(
            IdPolicyResolver::resolve(&forced, Some(&Bson::Int32(5))),
            Err(ConnectorError::AutogeneratedIdConflict { .. })
        ));
    }

    #[test]
    fn user_supplied_requires_a_valid_value() {
        let spec = spec(IdKind::UserSupplied, DeclaredType::ObjectId, false);

        let err = IdPolicyResolver::resolve(&spec, None).unwrap_err();
        assert!(matches!(err, ConnectorError::MissingRequiredId { .. }));
        assert!(err.to_string().starts_with("Value is required for non-autogenerated id"));

        let err = IdPolicyResolver::resolve(&spec, Some(&Bson::Int32(3))).unwrap_err();
        assert!(matches!(err, ConnectorError::InvalidObjectIdFormat(_)));
        assert!(err.to_string().starts_with("Invalid ObjectId string"));

        let hex = Bson::String("7cd2ad46ffc580ba45d3cb1f".into());
        assert_eq!(
            IdPolicyResolver::resolve(&spec, Some(&hex)).unwrap(),
            ResolvedId::Supplied(IdValue::NativeString("7cd2ad46ffc580ba45d3cb1f".into()))
        );
    }

    #[test]
    fn user_supplied_numbers_are_literals() {
        let spec = spec(IdKind::UserSupplied, DeclaredType::Number, false);

        assert_eq!(
            IdPolicyResolver::resolve(&spec, Some(&Bson::Int32(1))).unwrap(),
            ResolvedId::Supplied(IdValue::UserLiteral(Bson::Int32(1)))
        );
    }
}
