use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::types::TenantId;

use super::error::FilterError;
use super::expression;
use super::types::{Condition, FilterOp, FilterOrderInfo, SortDirection};

pub const TENANT_COLUMN: &str = "tenant_id";

/// Row filter shared by every store backend.
///
/// A tenant bound via [`Filter::for_tenant`] is always emitted as the first
/// predicate and is ANDed with everything else, so caller-supplied conditions
/// can only narrow a tenant-scoped query, never widen it.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    tenant: Option<TenantId>,
    conditions: Vec<Condition>,
    any_of: Vec<Vec<Condition>>,
    order: Vec<FilterOrderInfo>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_tenant(tenant_id: TenantId) -> Self {
        Self::new().with_tenant(tenant_id)
    }

    pub fn with_tenant(mut self, tenant_id: TenantId) -> Self {
        self.tenant = Some(tenant_id);
        self
    }

    pub fn tenant(&self) -> Option<TenantId> {
        self.tenant
    }

    pub fn condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn eq(self, column: &str, value: impl Into<Value>) -> Self {
        self.condition(Condition::new(column, FilterOp::Eq, value.into()))
    }

    /// Add a disjunction parsed from a `col.op.value,col.op.value` expression.
    /// Free user text must be sanitized before it is spliced into `expr`.
    pub fn or_expression(mut self, expr: &str) -> Result<Self, FilterError> {
        let group = expression::parse(expr)?;
        if !group.is_empty() {
            self.any_of.push(group);
        }
        Ok(self)
    }

    pub fn order_by(mut self, column: &str, sort: SortDirection) -> Self {
        self.order.push(FilterOrderInfo { column: column.to_string(), sort });
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit.max(0));
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset.max(0));
        self
    }

    /// AND-ed predicates, tenant first.
    pub fn predicates(&self) -> Vec<Condition> {
        let mut out = Vec::with_capacity(self.conditions.len() + 1);
        if let Some(tenant_id) = self.tenant {
            out.push(Condition::new(TENANT_COLUMN, FilterOp::Eq, Value::String(tenant_id.to_string())));
        }
        out.extend(self.conditions.iter().cloned());
        out
    }

    pub fn any_of(&self) -> &[Vec<Condition>] {
        &self.any_of
    }

    pub fn order(&self) -> &[FilterOrderInfo] {
        &self.order
    }

    pub fn limit_value(&self) -> Option<i64> {
        self.limit
    }

    pub fn offset_value(&self) -> Option<i64> {
        self.offset
    }

    /// In-process evaluation against a JSON record.
    pub fn matches(&self, record: &Map<String, Value>) -> bool {
        self.predicates().iter().all(|c| condition_matches(c, record))
            && self
                .any_of
                .iter()
                .all(|group| group.iter().any(|c| condition_matches(c, record)))
    }

    /// Sort, then apply offset/limit, in process.
    pub fn apply_window(&self, mut rows: Vec<Map<String, Value>>) -> Vec<Map<String, Value>> {
        if !self.order.is_empty() {
            rows.sort_by(|a, b| {
                for info in &self.order {
                    let ord = compare_nulls_last(a.get(&info.column), b.get(&info.column));
                    let ord = match info.sort {
                        SortDirection::Asc => ord,
                        SortDirection::Desc => ord.reverse(),
                    };
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                Ordering::Equal
            });
        }
        let offset = self.offset.unwrap_or(0) as usize;
        let limit = self.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        rows.into_iter().skip(offset).take(limit).collect()
    }
}

fn condition_matches(condition: &Condition, record: &Map<String, Value>) -> bool {
    let field = record.get(&condition.column).unwrap_or(&Value::Null);
    match condition.operator {
        FilterOp::Eq if condition.data.is_null() => field.is_null(),
        FilterOp::Eq => values_equal(field, &condition.data),
        FilterOp::Neq if condition.data.is_null() => !field.is_null(),
        FilterOp::Neq => !field.is_null() && !values_equal(field, &condition.data),
        FilterOp::Gt => compare(field, &condition.data) == Some(Ordering::Greater),
        FilterOp::Gte => matches!(compare(field, &condition.data), Some(Ordering::Greater | Ordering::Equal)),
        FilterOp::Lt => compare(field, &condition.data) == Some(Ordering::Less),
        FilterOp::Lte => matches!(compare(field, &condition.data), Some(Ordering::Less | Ordering::Equal)),
        FilterOp::Like => match (field.as_str(), condition.data.as_str()) {
            (Some(text), Some(pattern)) => like_matches(text, pattern),
            _ => false,
        },
        FilterOp::ILike => match (field.as_str(), condition.data.as_str()) {
            (Some(text), Some(pattern)) => like_matches(&text.to_lowercase(), &pattern.to_lowercase()),
            _ => false,
        },
        FilterOp::In => match &condition.data {
            Value::Array(values) => values.iter().any(|v| values_equal(field, v)),
            other => values_equal(field, other),
        },
        FilterOp::Is => match &condition.data {
            Value::Null => field.is_null(),
            Value::Bool(b) => field.as_bool() == Some(*b),
            _ => false,
        },
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn compare_nulls_last(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => compare(x, y).unwrap_or(Ordering::Equal),
    }
}

/// SQL LIKE semantics: `%` matches any run, `_` matches one character.
fn like_matches(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    let (mut t, mut p) = (0usize, 0usize);
    let mut star: Option<usize> = None;
    let mut mark = 0usize;

    while t < text.len() {
        if p < pattern.len() && pattern[p] == '%' {
            star = Some(p);
            mark = t;
            p += 1;
        } else if p < pattern.len() && (pattern[p] == '_' || pattern[p] == text[t]) {
            t += 1;
            p += 1;
        } else if let Some(s) = star {
            p = s + 1;
            mark += 1;
            t = mark;
        } else {
            return false;
        }
    }
    while p < pattern.len() && pattern[p] == '%' {
        p += 1;
    }
    p == pattern.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn tenant_predicate_comes_first() {
        let tenant = TenantId::new();
        let filter = Filter::new().eq("user_id", "u1").with_tenant(tenant);
        let predicates = filter.predicates();
        assert_eq!(predicates[0].column, TENANT_COLUMN);
        assert_eq!(predicates[0].data, json!(tenant.to_string()));
        assert_eq!(predicates[1].column, "user_id");
    }

    #[test]
    fn caller_tenant_condition_cannot_widen_scope() {
        let a = TenantId::new();
        let b = TenantId::new();
        let row = record(json!({ "tenant_id": b.to_string(), "name": "x" }));
        let filter = Filter::for_tenant(a).eq("tenant_id", b.to_string());
        assert!(!filter.matches(&row));
    }

    #[test]
    fn or_expression_is_anded_with_tenant() {
        let a = TenantId::new();
        let b = TenantId::new();
        let row = record(json!({ "tenant_id": b.to_string(), "full_name": "admin" }));
        let filter = Filter::for_tenant(a)
            .or_expression(&format!("full_name.eq.admin,tenant_id.eq.{}", b))
            .unwrap();
        assert!(!filter.matches(&row));
    }

    #[test]
    fn like_patterns() {
        assert!(like_matches("giraffe", "%raf%"));
        assert!(like_matches("giraffe", "g_raffe"));
        assert!(like_matches("giraffe", "%"));
        assert!(!like_matches("giraffe", "%lion%"));
        assert!(like_matches("", "%"));
        assert!(!like_matches("", "_"));
    }

    #[test]
    fn ilike_is_case_insensitive() {
        let row = record(json!({ "email": "Keeper@Zoo.org" }));
        let filter = Filter::new().or_expression("email.ilike.%zoo%").unwrap();
        assert!(filter.matches(&row));
    }

    #[test]
    fn window_orders_and_limits() {
        let rows = vec![
            record(json!({ "order_index": 3 })),
            record(json!({ "order_index": 1 })),
            record(json!({ "order_index": null })),
            record(json!({ "order_index": 2 })),
        ];
        let out = Filter::new().order_by("order_index", SortDirection::Asc).limit(3).apply_window(rows);
        let got: Vec<Value> = out.iter().map(|r| r["order_index"].clone()).collect();
        assert_eq!(got, vec![json!(1), json!(2), json!(3)]);
    }

    #[test]
    fn is_null_and_in_list() {
        let row = record(json!({ "redeemed_at": null, "role": "staff" }));
        assert!(Filter::new().or_expression("redeemed_at.is.null").unwrap().matches(&row));
        assert!(Filter::new().eq("redeemed_at", Value::Null).matches(&row));
        let roles = |values: Vec<Value>| Condition::new("role", FilterOp::In, Value::Array(values));
        assert!(Filter::new().condition(roles(vec![json!("admin"), json!("staff")])).matches(&row));
        assert!(!Filter::new().condition(roles(vec![])).matches(&row));
    }
}
