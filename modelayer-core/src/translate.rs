//! Translation of application-level queries into store queries.
//!
//! The translator walks a filter expression and rewrites every predicate on an
//! id-typed property: the model's id property is renamed to the store identity field,
//! and literals are encoded through [`IdentifierCodec`]. Predicates on other
//! properties, and the logical structure of the expression, are preserved as-is.

use bson::Bson;

use crate::{
    backend::IDENTITY_FIELD,
    codec::IdentifierCodec,
    error::{ConnectorError, ConnectorResult},
    id::DeclaredType,
    query::{Expr, FieldOp, Query, QueryVisitor, Sort, StoreQuery},
    registry::RegisteredModel,
};

pub struct QueryPredicateTranslator<'a> {
    model: &'a RegisteredModel,
}

impl<'a> QueryPredicateTranslator<'a> {
    pub fn new(model: &'a RegisteredModel) -> Self {
        Self { model }
    }

    /// Translates a full query: filter, sort, limit and offset.
    pub fn translate(&mut self, query: &Query) -> ConnectorResult<StoreQuery> {
        let mut translated = StoreQuery::new(self.translate_filter(query.filter.as_ref())?);
        translated.limit = query.limit;
        translated.offset = query.offset;
        translated.sort = query
            .sort
            .as_ref()
            .map(|sort| Sort {
                field: self.store_field(&sort.field).to_string(),
                direction: sort.direction.clone(),
            });

        Ok(translated)
    }

    pub fn translate_filter(&mut self, filter: Option<&Expr>) -> ConnectorResult<Option<Expr>> {
        filter
            .map(|expr| self.visit_expr(expr))
            .transpose()
    }

    fn store_field<'f>(&self, field: &'f str) -> &'f str {
        if field == self.model.id.id_property {
            IDENTITY_FIELD
        } else {
            field
        }
    }

    fn encode_operand(op: &FieldOp, value: &Bson, declared: &DeclaredType) -> ConnectorResult<Bson> {
        if !op.is_list() {
            return IdentifierCodec::encode_value(value, declared);
        }

        match value {
            Bson::Array(values) => Ok(Bson::Array(
                values
                    .iter()
                    .map(|v| IdentifierCodec::encode_value(v, declared))
                    .collect::<ConnectorResult<Vec<_>>>()?,
            )),
            _ => Err(ConnectorError::InvalidQuery(format!("{op:?} requires an array of values"))),
        }
    }
}

impl<'a> QueryVisitor for QueryPredicateTranslator<'a> {
    type Output = Expr;
    type Error = ConnectorError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        Ok(Expr::And(
            exprs
                .iter()
                .map(|expr| self.visit_expr(expr))
                .collect::<Result<Vec<_>, _>>()?,
        ))
    }

    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        Ok(Expr::Or(
            exprs
                .iter()
                .map(|expr| self.visit_expr(expr))
                .collect::<Result<Vec<_>, _>>()?,
        ))
    }

    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        Ok(Expr::Not(Box::new(self.visit_expr(expr)?)))
    }

    fn visit_exists(&mut self, field: &str, should_exist: bool) -> Result<Self::Output, Self::Error> {
        Ok(Expr::Exists(self.store_field(field).to_string(), should_exist))
    }

    fn visit_field(&mut self, field: &str, op: &FieldOp, value: &Bson) -> Result<Self::Output, Self::Error> {
        let value = match self.model.id_typed(field) {
            Some(declared) => Self::encode_operand(op, value, declared)?,
            None if op.is_list() && !matches!(value, Bson::Array(_)) => {
                return Err(ConnectorError::InvalidQuery(format!("{op:?} on {field} requires an array")));
            }
            None => value.clone(),
        };

        Ok(Expr::field(self.store_field(field).to_string(), op.clone(), value))
    }
}
