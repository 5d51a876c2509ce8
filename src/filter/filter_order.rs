use super::error::FilterError;
use super::filter_where::validate_column;
use super::types::{FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    pub fn generate(infos: &[FilterOrderInfo]) -> Result<String, FilterError> {
        if infos.is_empty() {
            return Ok(String::new());
        }
        let mut parts = Vec::with_capacity(infos.len());
        for info in infos {
            validate_column(&info.column)?;
            parts.push(format!("\"{}\" {} NULLS LAST", info.column, info.sort.to_sql()));
        }
        Ok(format!("ORDER BY {}", parts.join(", ")))
    }
}
