//! Conversion of id values between the application and the document store.
//!
//! The store's identity field holds a native 12-byte [`ObjectId`] for models whose id
//! is declared as one. The application always sees such values as 24-character
//! lowercase hex strings. Every other id type passes through unchanged, apart from
//! numeric strings supplied for ids declared as numbers.

use bson::{Bson, oid::ObjectId};
use std::fmt;

use crate::{
    error::{ConnectorError, ConnectorResult},
    id::DeclaredType,
};

/// A classified id value on its way to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum IdValue {
    /// A 24-character lowercase hex rendering of a native identifier.
    NativeString(String),
    /// A native identifier instance.
    NativeBinary(ObjectId),
    /// A generated, or accepted opaque, value for an opaque generated id.
    Opaque(Bson),
    /// A value owned by the application's declared id type.
    UserLiteral(Bson),
}

impl IdValue {
    /// Converts the value into what the store keeps in its identity field.
    pub fn into_store(self) -> ConnectorResult<Bson> {
        match self {
            IdValue::NativeString(hex) => ObjectId::parse_str(&hex)
                .map(Bson::ObjectId)
                .map_err(|_| ConnectorError::InvalidObjectIdFormat(hex)),
            IdValue::NativeBinary(oid) => Ok(Bson::ObjectId(oid)),
            IdValue::Opaque(value) | IdValue::UserLiteral(value) => Ok(value),
        }
    }

    /// Reclassifies a user literal as an opaque value. Native values are unchanged.
    pub fn into_opaque(self) -> Self {
        match self {
            IdValue::UserLiteral(value) => IdValue::Opaque(value),
            other => other,
        }
    }

    /// The canonical string form, as the application would read it back.
    pub fn canonical_string(&self) -> String {
        match self {
            IdValue::NativeString(hex) => hex.clone(),
            IdValue::NativeBinary(oid) => oid.to_hex(),
            IdValue::Opaque(value) | IdValue::UserLiteral(value) => describe(value),
        }
    }
}

impl fmt::Display for IdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_string())
    }
}

/// Outcome of encoding an optional id for a write.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreIdentity {
    /// Store this value in the identity field.
    Value(Bson),
    /// Omit the identity field and let the store generate one.
    Generate,
}

/// Bidirectional id conversion between application values and store identities.
pub struct IdentifierCodec;

impl IdentifierCodec {
    /// Returns `true` for exactly 24 lowercase hexadecimal characters.
    pub fn is_object_id_hex(input: &str) -> bool {
        input.len() == 24
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    /// Classifies an application value against its declared type.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::InvalidObjectIdFormat`] when the declared type is the
    /// native identifier and the value is neither an [`ObjectId`] nor a hex-24 string.
    pub fn classify(value: &Bson, declared: &DeclaredType) -> ConnectorResult<IdValue> {
        if declared.is_native() {
            return match value {
                Bson::ObjectId(oid) => Ok(IdValue::NativeBinary(*oid)),
                Bson::String(s) if Self::is_object_id_hex(s) => Ok(IdValue::NativeString(s.clone())),
                other => Err(ConnectorError::InvalidObjectIdFormat(describe(other))),
            };
        }

        Ok(IdValue::UserLiteral(Self::coerce_literal(value, declared)))
    }

    /// Encodes an optional id for a write. An absent value asks the store to generate one.
    pub fn encode_for_store(
        value: Option<&Bson>,
        declared: &DeclaredType,
    ) -> ConnectorResult<StoreIdentity> {
        match value {
            None => Ok(StoreIdentity::Generate),
            Some(value) => Ok(StoreIdentity::Value(Self::encode_value(value, declared)?)),
        }
    }

    /// Encodes a value that must be present, such as a filter literal.
    pub fn encode_value(value: &Bson, declared: &DeclaredType) -> ConnectorResult<Bson> {
        Self::classify(value, declared)?.into_store()
    }

    /// Converts a value read from the store into its application form. Never fails.
    pub fn decode_from_store(value: Bson, declared: &DeclaredType) -> Bson {
        match value {
            Bson::ObjectId(oid) => Bson::String(oid.to_hex()),
            Bson::Array(items) if declared.is_native() => Bson::Array(
                items
                    .into_iter()
                    .map(|item| Self::decode_from_store(item, declared))
                    .collect(),
            ),
            other => other,
        }
    }

    fn coerce_literal(value: &Bson, declared: &DeclaredType) -> Bson {
        match (declared, value) {
            (DeclaredType::Number, Bson::String(s)) => {
                if let Ok(n) = s.parse::<i64>() {
                    Bson::Int64(n)
                } else {
                    match s.parse::<f64>() {
                        Ok(n) if n.is_finite() => Bson::Double(n),
                        _ => value.clone(),
                    }
                }
            }
            _ => value.clone(),
        }
    }
}

fn describe(value: &Bson) -> String {
    match value {
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEX: &str = "7cd2ad46ffc580ba45d3cb1f";

    #[test]
    fn accepts_native_instances_and_hex_strings() {
        let oid = ObjectId::parse_str(HEX).unwrap();

        assert_eq!(
            IdentifierCodec::encode_value(&Bson::String(HEX.into()), &DeclaredType::ObjectId).unwrap(),
            Bson::ObjectId(oid)
        );
        assert_eq!(
            IdentifierCodec::encode_value(&Bson::ObjectId(oid), &DeclaredType::ObjectId).unwrap(),
            Bson::ObjectId(oid)
        );
    }

    #[test]
    fn rejects_malformed_native_ids() {
        for value in [
            Bson::Int32(3),
            Bson::String("not-an-object-id".into()),
            Bson::String(HEX.to_uppercase()),
            Bson::String(format!("{HEX}0")),
            Bson::Null,
        ] {
            assert!(
                matches!(
                    IdentifierCodec::encode_value(&value, &DeclaredType::ObjectId),
                    Err(ConnectorError::InvalidObjectIdFormat(_))
                ),
                "{value} should be rejected"
            );
        }
    }

    #[test]
    fn absent_native_id_defers_to_store() {
        assert_eq!(
            IdentifierCodec::encode_for_store(None, &DeclaredType::ObjectId).unwrap(),
            StoreIdentity::Generate
        );
    }

    #[test]
    fn non_native_ids_pass_through() {
        let value = Bson::String("customer-42".into());
        assert_eq!(
            IdentifierCodec::encode_value(&value, &DeclaredType::String).unwrap(),
            value
        );
        assert_eq!(
            IdentifierCodec::encode_value(&Bson::Int32(3), &DeclaredType::Any).unwrap(),
            Bson::Int32(3)
        );
    }

    #[test]
    fn numeric_strings_become_numbers_only_for_number_ids() {
        let big = Bson::String("9007199254740993".into());

        assert_eq!(
            IdentifierCodec::encode_value(&big, &DeclaredType::Number).unwrap(),
            Bson::Int64(9007199254740993)
        );
        assert_eq!(IdentifierCodec::encode_value(&big, &DeclaredType::Any).unwrap(), big);
        assert_eq!(IdentifierCodec::encode_value(&big, &DeclaredType::String).unwrap(), big);
        assert_eq!(
            IdentifierCodec::encode_value(&Bson::String("abc".into()), &DeclaredType::Number).unwrap(),
            Bson::String("abc".into())
        );
    }

    #[test]
    fn decode_of_encode_yields_canonical_string() {
        let oid = ObjectId::new();

        for input in [Bson::ObjectId(oid), Bson::String(oid.to_hex())] {
            let classified = IdentifierCodec::classify(&input, &DeclaredType::ObjectId).unwrap();
            let canonical = classified.canonical_string();
            let stored = classified.into_store().unwrap();

            assert_eq!(
                IdentifierCodec::decode_from_store(stored, &DeclaredType::ObjectId),
                Bson::String(canonical.clone())
            );
            assert_eq!(canonical, oid.to_hex());
        }
    }

    #[test]
    fn decode_leaves_other_values_alone() {
        assert_eq!(
            IdentifierCodec::decode_from_store(Bson::Int64(7), &DeclaredType::Number),
            Bson::Int64(7)
        );

        let oid = ObjectId::new();
        assert_eq!(
            IdentifierCodec::decode_from_store(
                Bson::Array(vec![Bson::ObjectId(oid)]),
                &DeclaredType::ObjectId
            ),
            Bson::Array(vec![Bson::String(oid.to_hex())])
        );
    }
}
