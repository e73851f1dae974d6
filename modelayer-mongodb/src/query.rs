//! Query translation from modelayer store queries to MongoDB query syntax.

use bson::{Document, Bson, doc};

use modelayer_core::{
    backend::IDENTITY_FIELD,
    query::{QueryVisitor, Expr, FieldOp},
    error::ConnectorError,
};


/// Translates store query expressions into MongoDB filter documents.
///
/// MongoDB rejects `$and` and `$or` with empty arrays, so an empty conjunction renders
/// as the match-all filter and an empty disjunction as a filter nothing can satisfy.
pub(crate) struct MongoQueryTranslator;

impl MongoQueryTranslator {
    pub fn filter(expr: Option<&Expr>) -> Result<Document, ConnectorError> {
        match expr {
            Some(expr) => MongoQueryTranslator.visit_expr(expr),
            None => Ok(doc! {}),
        }
    }
}

impl QueryVisitor for MongoQueryTranslator {
    type Output = Document;
    type Error = ConnectorError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        if exprs.is_empty() {
            return Ok(doc! {});
        }

        Ok(doc! {
            "$and": exprs
                .iter()
                .map(|expr| self.visit_expr(expr))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }

    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        if exprs.is_empty() {
            return Ok(doc! { IDENTITY_FIELD: { "$in": [] } });
        }

        Ok(doc! {
            "$or": exprs
                .iter()
                .map(|expr| self.visit_expr(expr))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }

    // `$not` only applies to field operators; `$nor` negates a whole expression.
    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            "$nor": [self.visit_expr(expr)?],
        })
    }

    fn visit_exists(&mut self, field: &str, should_exist: bool) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            field: { "$exists": should_exist },
        })
    }

    fn visit_field(&mut self, field: &str, op: &FieldOp, value: &Bson) -> Result<Self::Output, Self::Error> {
        if op.is_list() && !matches!(value, Bson::Array(_)) {
            return Err(ConnectorError::InvalidQuery(format!("{op:?} on {field} requires an array value")));
        }

        Ok(doc! {
            field: match op {
                FieldOp::Eq => doc! { "$eq": value },
                FieldOp::Neq => doc! { "$ne": value },
                FieldOp::Gt => doc! { "$gt": value },
                FieldOp::Gte => doc! { "$gte": value },
                FieldOp::Lt => doc! { "$lt": value },
                FieldOp::Lte => doc! { "$lte": value },
                FieldOp::Inq => doc! { "$in": value },
                FieldOp::Nin => doc! { "$nin": value },
            }
        })
    }
}
