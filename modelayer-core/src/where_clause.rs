//! Parsing of ORM-style `where` clauses into filter expressions.
//!
//! ```ignore
//! let expr = WhereClause::parse(&doc! {
//!     "seq": { "inq": [1, 2] },
//!     "or": [{ "name": "John1" }, { "age": { "gte": 30 } }],
//! })?;
//! ```

use bson::{Bson, Document};

use crate::{
    error::{ConnectorError, ConnectorResult},
    query::{Expr, FieldOp},
};

const UNSUPPORTED_OPERATORS: [&str; 8] = [
    "like", "nlike", "ilike", "nilike", "regexp", "near", "maxDistance", "minDistance",
];

pub struct WhereClause;

impl WhereClause {
    /// Parses a where clause. An empty clause yields no filter.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::InvalidQuery`] for unknown operators, operator objects mixed
    /// with plain keys, or operand shapes an operator cannot take.
    pub fn parse(clause: &Document) -> ConnectorResult<Option<Expr>> {
        let mut exprs = Self::parse_clause(clause)?;

        Ok(match exprs.len() {
            0 => None,
            1 => exprs.pop(),
            _ => Some(Expr::And(exprs)),
        })
    }

    fn parse_clause(clause: &Document) -> ConnectorResult<Vec<Expr>> {
        clause
            .iter()
            .map(|(key, value)| match key.as_str() {
                "and" => Ok(Expr::And(Self::parse_branches(key, value)?)),
                "or" => Ok(Expr::Or(Self::parse_branches(key, value)?)),
                _ => Self::parse_condition(key, value),
            })
            .collect()
    }

    fn parse_branches(key: &str, value: &Bson) -> ConnectorResult<Vec<Expr>> {
        let Bson::Array(branches) = value else {
            return Err(ConnectorError::InvalidQuery(format!("{key} requires an array of clauses")));
        };

        branches
            .iter()
            .map(|branch| match branch {
                Bson::Document(clause) => {
                    let mut exprs = Self::parse_clause(clause)?;
                    Ok(if exprs.len() == 1 {
                        exprs.remove(0)
                    } else {
                        Expr::And(exprs)
                    })
                }
                _ => Err(ConnectorError::InvalidQuery(format!("{key} branches must be objects"))),
            })
            .collect()
    }

    fn parse_condition(field: &str, value: &Bson) -> ConnectorResult<Expr> {
        let Bson::Document(conditions) = value else {
            return Ok(Expr::field(field.to_string(), FieldOp::Eq, value.clone()));
        };

        if let Some(op) = conditions
            .keys()
            .find(|k| UNSUPPORTED_OPERATORS.contains(&k.as_str()))
        {
            return Err(ConnectorError::InvalidQuery(format!("unsupported operator {op} on {field}")));
        }

        // An object without any operator key is a nested document to compare against
        if !conditions.keys().any(|k| Self::is_operator(k)) {
            return Ok(Expr::field(field.to_string(), FieldOp::Eq, value.clone()));
        }

        let mut exprs = conditions
            .iter()
            .map(|(op, operand)| Self::parse_operator(field, op, operand))
            .collect::<ConnectorResult<Vec<_>>>()?;

        Ok(if exprs.len() == 1 {
            exprs.remove(0)
        } else {
            Expr::And(exprs)
        })
    }

    fn field_op(op: &str) -> Option<FieldOp> {
        match op {
            "eq" => Some(FieldOp::Eq),
            "neq" => Some(FieldOp::Neq),
            "gt" => Some(FieldOp::Gt),
            "gte" => Some(FieldOp::Gte),
            "lt" => Some(FieldOp::Lt),
            "lte" => Some(FieldOp::Lte),
            "inq" => Some(FieldOp::Inq),
            "nin" => Some(FieldOp::Nin),
            _ => None,
        }
    }

    fn is_operator(key: &str) -> bool {
        matches!(key, "between" | "exists") || Self::field_op(key).is_some()
    }

    /// Parses one key of an operator object. Keys that are not operators end up here
    /// when they sit beside one, and are rejected.
    fn parse_operator(field: &str, op: &str, operand: &Bson) -> ConnectorResult<Expr> {
        let field = field.to_string();
        let op = match op {
            "exists" => {
                return match operand {
                    Bson::Boolean(should_exist) => Ok(Expr::Exists(field, *should_exist)),
                    _ => Err(ConnectorError::InvalidQuery(format!("exists on {field} requires a boolean"))),
                };
            }
            "between" => {
                return match operand {
                    Bson::Array(bounds) if bounds.len() == 2 => Ok(Expr::And(vec![
                        Expr::field(field.clone(), FieldOp::Gte, bounds[0].clone()),
                        Expr::field(field, FieldOp::Lte, bounds[1].clone()),
                    ])),
                    _ => Err(ConnectorError::InvalidQuery(format!(
                        "between on {field} requires an array of two bounds"
                    ))),
                };
            }
            other => Self::field_op(other).ok_or_else(|| {
                ConnectorError::InvalidQuery(format!(
                    "unknown operator {other} on {field}; operators cannot be mixed with plain keys"
                ))
            })?,
        };

        if op.is_list() && !matches!(operand, Bson::Array(_)) {
            return Err(ConnectorError::InvalidQuery(format!("{op:?} on {field} requires an array")));
        }

        Ok(Expr::field(field, op, operand.clone()))
    }
}
