use serde_json::Value;

use super::error::FilterError;
use super::filter::Filter;
use super::types::{Condition, FilterOp, SqlParam};

/// Column names must be plain snake_case identifiers; they are quoted but never bound.
pub fn validate_column(column: &str) -> Result<(), FilterError> {
    let mut chars = column.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_lowercase() || first == '_')
                && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(FilterError::InvalidColumn(column.to_string()))
    }
}

pub struct FilterWhere {
    params: Vec<SqlParam>,
    param_index: usize,
    qualifier: Option<String>,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize, qualifier: Option<&str>) -> Self {
        Self {
            params: vec![],
            param_index: starting_param_index,
            qualifier: qualifier.map(str::to_string),
        }
    }

    /// Render the filter's predicates as a WHERE body. Placeholders start at
    /// `$starting_param_index + 1`; `qualifier` prefixes every column (`r."col"`).
    pub fn generate(
        filter: &Filter,
        starting_param_index: usize,
        qualifier: Option<&str>,
    ) -> Result<(String, Vec<SqlParam>), FilterError> {
        let mut filter_where = Self::new(starting_param_index, qualifier);
        filter_where.build(filter)
    }

    fn build(&mut self, filter: &Filter) -> Result<(String, Vec<SqlParam>), FilterError> {
        let mut sql_conditions = vec![];

        for condition in filter.predicates() {
            sql_conditions.push(self.build_sql_condition(&condition)?);
        }

        for group in filter.any_of() {
            let mut parts = Vec::with_capacity(group.len());
            for condition in group {
                parts.push(self.build_sql_condition(condition)?);
            }
            sql_conditions.push(format!("({})", parts.join(" OR ")));
        }

        let where_clause = if sql_conditions.is_empty() {
            "1=1".to_string()
        } else {
            sql_conditions.join(" AND ")
        };
        Ok((where_clause, std::mem::take(&mut self.params)))
    }

    fn build_sql_condition(&mut self, condition: &Condition) -> Result<String, FilterError> {
        validate_column(&condition.column)?;
        let column = self.quoted(&condition.column);

        match condition.operator {
            FilterOp::Eq if condition.data.is_null() => Ok(format!("{} IS NULL", column)),
            FilterOp::Neq if condition.data.is_null() => Ok(format!("{} IS NOT NULL", column)),
            FilterOp::Eq
            | FilterOp::Neq
            | FilterOp::Gt
            | FilterOp::Gte
            | FilterOp::Lt
            | FilterOp::Lte
            | FilterOp::Like
            | FilterOp::ILike => {
                let placeholder = self.param(condition);
                Ok(format!("{} {} {}", column, condition.operator.to_sql(), placeholder))
            }
            FilterOp::In => match &condition.data {
                Value::Array(values) if values.is_empty() => Ok("1=0".to_string()),
                Value::Array(values) => {
                    let placeholders: Vec<String> = values
                        .iter()
                        .map(|v| self.param(&Condition::new(condition.column.clone(), FilterOp::Eq, v.clone())))
                        .collect();
                    Ok(format!("{} IN ({})", column, placeholders.join(", ")))
                }
                _ => {
                    let placeholder = self.param(condition);
                    Ok(format!("{} = {}", column, placeholder))
                }
            },
            FilterOp::Is => match &condition.data {
                Value::Null => Ok(format!("{} IS NULL", column)),
                Value::Bool(true) => Ok(format!("{} IS TRUE", column)),
                Value::Bool(false) => Ok(format!("{} IS FALSE", column)),
                other => Err(FilterError::InvalidOperatorData(format!("IS does not accept {}", other))),
            },
        }
    }

    fn quoted(&self, column: &str) -> String {
        match &self.qualifier {
            Some(q) => format!("{}.\"{}\"", q, column),
            None => format!("\"{}\"", column),
        }
    }

    fn param(&mut self, condition: &Condition) -> String {
        self.params.push(SqlParam {
            column: condition.column.clone(),
            value: condition.data.clone(),
        });
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}
