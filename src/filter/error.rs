use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum FilterError {
    #[error("Invalid column name: {0}")]
    InvalidColumn(String),

    #[error("Invalid filter expression: {0}")]
    InvalidExpression(String),

    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    #[error("Invalid operator data: {0}")]
    InvalidOperatorData(String),
}
