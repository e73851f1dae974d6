//! Query expression evaluation for in-memory document filtering.
//!
//! Matching follows document-store conventions: equality against an array field matches
//! when any element is equal, a missing field compares as null, and the negated
//! operators (`Neq`, `Nin`) match documents where the field is missing.

use std::{collections::HashMap, cmp::Ordering};
use bson::{Bson, Document, datetime::DateTime, oid::ObjectId};

use modelayer_core::{
    query::{QueryVisitor, Expr, FieldOp},
    error::{ConnectorError, ConnectorResult},
};


/// Type-erased, comparable representation of BSON values.
///
/// Integers of either width compare exactly as `i64`, and against doubles by numeric
/// value, so `Int32(1)`, `Int64(1)` and `Double(1.0)` compare equal while `2^53` and
/// `2^53 + 1` stay distinct. Types without a dedicated variant compare by BSON equality
/// and have no ordering.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Number(f64),
    DateTime(DateTime),
    ObjectId(ObjectId),
    String(&'a str),
    Array(Vec<Comparable<'a>>),
    Map(HashMap<&'a str, Comparable<'a>>),
    Other(&'a Bson),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Int(i64::from(*value)),
            Bson::Int64(value) => Comparable::Int(*value),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::ObjectId(value) => Comparable::ObjectId(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::Array(arr) => Comparable::Array(
                arr
                    .iter()
                    .map(Comparable::from)
                    .collect::<Vec<_>>()
            ),
            Bson::Document(doc) => Comparable::Map(
                doc
                    .iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect::<HashMap<_, _>>()
            ),
            other => Comparable::Other(other),
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Int(a), Comparable::Int(b)) => a == b,
            (Comparable::Int(a), Comparable::Number(b)) => compare_int_double(*a, *b) == Some(Ordering::Equal),
            (Comparable::Number(a), Comparable::Int(b)) => compare_int_double(*b, *a) == Some(Ordering::Equal),
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::ObjectId(a), Comparable::ObjectId(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            (Comparable::Other(a), Comparable::Other(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Int(a), Comparable::Int(b)) => a.partial_cmp(b),
            (Comparable::Int(a), Comparable::Number(b)) => compare_int_double(*a, *b),
            (Comparable::Number(a), Comparable::Int(b)) => compare_int_double(*b, *a).map(Ordering::reverse),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::ObjectId(a), Comparable::ObjectId(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

/// Orders an integer against a double without rounding the integer.
///
/// When the integer rounds to the double, the double is integral and within `i128`, so
/// the exact comparison happens there.
fn compare_int_double(int: i64, double: f64) -> Option<Ordering> {
    match (int as f64).partial_cmp(&double)? {
        Ordering::Equal => Some(i128::from(int).cmp(&(double as i128))),
        ordering => Some(ordering),
    }
}

/// Equality as a store filter sees it: arrays also match on any element.
fn matches<'v>(field_value: &Comparable<'v>, value: &Comparable<'v>) -> bool {
    if field_value == value {
        return true;
    }

    match field_value {
        Comparable::Array(items) => items.iter().any(|item| item == value),
        _ => false,
    }
}


pub(crate) struct DocumentEvaluator<'a> {
    document: &'a Document,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    pub fn evaluate(&mut self, expr: &Expr) -> ConnectorResult<bool> {
        self.visit_expr(expr)
    }

    pub fn filter_documents(
        documents: impl IntoIterator<Item = &'a Document>,
        expr: &Expr,
    ) -> ConnectorResult<Vec<&'a Document>> {
        let mut matched = Vec::new();

        for document in documents {
            if DocumentEvaluator::new(document).evaluate(expr)? {
                matched.push(document);
            }
        }

        Ok(matched)
    }

    fn field(&self, field: &str) -> Comparable<'a> {
        self.document
            .get(field)
            .map(Comparable::from)
            .unwrap_or(Comparable::Null)
    }

    fn any_of(&self, field: &str, values: &Bson) -> ConnectorResult<bool> {
        let Bson::Array(values) = values else {
            return Err(ConnectorError::InvalidQuery(format!("list operator on {field} requires an array")));
        };
        let field_value = self.field(field);

        Ok(
            values
                .iter()
                .any(|value| matches(&field_value, &Comparable::from(value)))
        )
    }
}

impl<'a> QueryVisitor for DocumentEvaluator<'a> {
    type Output = bool;
    type Error = ConnectorError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        for expr in exprs {
            if !self.visit_expr(expr)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        for expr in exprs {
            if self.visit_expr(expr)? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        Ok(!self.visit_expr(expr)?)
    }

    fn visit_exists(&mut self, field: &str, should_exist: bool) -> Result<Self::Output, Self::Error> {
        Ok(self.document.contains_key(field) == should_exist)
    }

    fn visit_field(&mut self, field: &str, op: &FieldOp, value: &Bson) -> Result<Self::Output, Self::Error> {
        match op {
            FieldOp::Eq => Ok(matches(&self.field(field), &Comparable::from(value))),
            FieldOp::Neq => Ok(!matches(&self.field(field), &Comparable::from(value))),
            FieldOp::Inq => self.any_of(field, value),
            FieldOp::Nin => Ok(!self.any_of(field, value)?),
            FieldOp::Gt | FieldOp::Gte | FieldOp::Lt | FieldOp::Lte => {
                let Some(field_value) = self.document.get(field) else {
                    return Ok(false);
                };

                match Comparable::from(field_value).partial_cmp(&Comparable::from(value)) {
                    Some(ordering) => Ok(match op {
                        FieldOp::Gt => ordering == Ordering::Greater,
                        FieldOp::Gte => ordering != Ordering::Less,
                        FieldOp::Lt => ordering == Ordering::Less,
                        _ => ordering != Ordering::Greater,
                    }),
                    None => Ok(false),
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{Binary, doc, spec::BinarySubtype};
    use modelayer_core::query::Filter;

    fn selects(document: &Document, expr: &Expr) -> bool {
        DocumentEvaluator::new(document).evaluate(expr).unwrap()
    }

    #[test]
    fn numbers_compare_across_widths() {
        let document = doc! { "_id": 1_i64, "age": 30 };

        assert!(selects(&document, &Filter::eq("_id", 1)));
        assert!(selects(&document, &Filter::gte("age", 30.0)));
        assert!(!selects(&document, &Filter::lt("age", 30_i64)));
    }

    #[test]
    fn large_integers_compare_exactly() {
        let boundary = 9_007_199_254_740_992_i64;
        let document = doc! { "_id": boundary + 1 };

        assert!(selects(&document, &Filter::eq("_id", boundary + 1)));
        assert!(!selects(&document, &Filter::eq("_id", boundary)));
        assert!(selects(&document, &Filter::gt("_id", boundary)));
        assert!(!selects(&document, &Filter::eq("_id", boundary as f64)));
        assert!(selects(&document, &Filter::gt("_id", boundary as f64)));
        assert!(selects(&doc! { "_id": boundary }, &Filter::eq("_id", boundary as f64)));
    }

    #[test]
    fn other_types_compare_by_value() {
        let binary = |bytes: &[u8]| Bson::Binary(Binary { subtype: BinarySubtype::Generic, bytes: bytes.to_vec() });
        let document = doc! { "_id": binary(&[1, 2]) };

        assert!(selects(&document, &Filter::eq("_id", binary(&[1, 2]))));
        assert!(!selects(&document, &Filter::eq("_id", binary(&[3, 4]))));
        assert!(!selects(&document, &Filter::eq("_id", Bson::Null)));
        assert!(!selects(&document, &Filter::gt("_id", binary(&[0]))));
    }

    #[test]
    fn object_ids_match_only_object_ids() {
        let oid = ObjectId::new();
        let document = doc! { "_id": oid };

        assert!(selects(&document, &Filter::eq("_id", oid)));
        assert!(!selects(&document, &Filter::eq("_id", oid.to_hex())));
        assert!(selects(&document, &Filter::inq("_id", [oid])));
        assert!(!selects(&document, &Filter::inq("_id", Vec::<Bson>::new())));
    }

    #[test]
    fn negated_operators_match_missing_fields() {
        let document = doc! { "name": "John1" };

        assert!(selects(&document, &Filter::neq("age", 30)));
        assert!(selects(&document, &Filter::nin("age", [30, 40])));
        assert!(!selects(&document, &Filter::gt("age", 1)));
    }

    #[test]
    fn array_fields_match_elements() {
        let document = doc! { "tags": ["a", "b"] };

        assert!(selects(&document, &Filter::eq("tags", "a")));
        assert!(selects(&document, &Filter::inq("tags", ["c", "b"])));
        assert!(selects(&document, &Filter::nin("tags", ["c"])));
    }

    #[test]
    fn combinators_and_existence() {
        let document = doc! { "name": "John1", "age": 30 };
        let expr = Filter::and([
            Filter::exists("name"),
            Filter::or([Filter::eq("age", 31), Filter::not_exists("email")]),
        ]);

        assert!(selects(&document, &expr));
        assert!(!selects(&document, &expr.not()));
    }

    #[test]
    fn list_operators_reject_scalars() {
        let document = doc! { "age": 30 };
        let expr = Expr::field("age".into(), FieldOp::Inq, Bson::Int32(30));

        assert!(matches!(
            DocumentEvaluator::new(&document).evaluate(&expr),
            Err(ConnectorError::InvalidQuery(_))
        ));
    }
}
