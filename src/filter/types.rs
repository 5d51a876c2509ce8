use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::FilterError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    ILike,
    In,
    Is,
}

impl FilterOp {
    /// Parse an operator name as it appears in a filter expression (`col.op.value`).
    pub fn from_expression(op: &str) -> Result<Self, FilterError> {
        Ok(match op {
            "eq" => FilterOp::Eq,
            "neq" => FilterOp::Neq,
            "gt" => FilterOp::Gt,
            "gte" => FilterOp::Gte,
            "lt" => FilterOp::Lt,
            "lte" => FilterOp::Lte,
            "like" => FilterOp::Like,
            "ilike" => FilterOp::ILike,
            "is" => FilterOp::Is,
            other => return Err(FilterError::UnsupportedOperator(other.to_string())),
        })
    }

    pub fn to_sql(&self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Neq => "<>",
            FilterOp::Gt => ">",
            FilterOp::Gte => ">=",
            FilterOp::Lt => "<",
            FilterOp::Lte => "<=",
            FilterOp::Like => "LIKE",
            FilterOp::ILike => "ILIKE",
            FilterOp::In => "IN",
            FilterOp::Is => "IS",
        }
    }
}

/// A single `column <op> value` predicate
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub operator: FilterOp,
    pub data: Value,
}

impl Condition {
    pub fn new(column: impl Into<String>, operator: FilterOp, data: Value) -> Self {
        Self { column: column.into(), operator, data }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOrderInfo {
    pub column: String,
    pub sort: SortDirection,
}

/// Bound parameter, tagged with the column it is compared against so the
/// driver can pick the right SQL type.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlParam {
    pub column: String,
    pub value: Value,
}
