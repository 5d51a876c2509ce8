//! Parser for disjunction strings of the form `col.op.value,col.op.value`.
//!
//! The grammar has no escaping: commas separate clauses and the first two
//! dots separate column, operator and value. Any user text embedded in an
//! expression therefore has to go through `crate::sanitize` first.

use serde_json::Value;

use super::error::FilterError;
use super::filter_where::validate_column;
use super::types::{Condition, FilterOp};

pub fn parse(expr: &str) -> Result<Vec<Condition>, FilterError> {
    let expr = expr.trim();
    if expr.is_empty() {
        return Ok(vec![]);
    }
    if expr.contains('(') || expr.contains(')') {
        return Err(FilterError::InvalidExpression("nested groups are not supported".to_string()));
    }

    expr.split(',').map(parse_clause).collect()
}

fn parse_clause(clause: &str) -> Result<Condition, FilterError> {
    let mut parts = clause.trim().splitn(3, '.');
    let (column, op, value) = match (parts.next(), parts.next(), parts.next()) {
        (Some(c), Some(o), Some(v)) if !c.is_empty() && !o.is_empty() => (c, o, v),
        _ => return Err(FilterError::InvalidExpression(format!("malformed clause '{}'", clause))),
    };

    validate_column(column)?;
    let operator = FilterOp::from_expression(op)?;
    let data = match operator {
        FilterOp::Is => match value {
            "null" => Value::Null,
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            other => return Err(FilterError::InvalidOperatorData(format!("is.{} is not supported", other))),
        },
        _ => Value::String(value.to_string()),
    };

    Ok(Condition::new(column, operator, data))
}
