//! Filters and ordering for table queries

use chrono::NaiveDate;
use serde_json::Value;
use std::cmp::Ordering;

/// Operator for filter expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    /// Equal to
    Eq,

    /// Not equal to
    Neq,

    /// Greater than
    Gt,

    /// Greater than or equal to
    Gte,

    /// Less than
    Lt,

    /// Less than or equal to
    Lte,

    /// Is (`null`, `true`, `false`)
    Is,

    /// In a list of values
    In,
}

impl FilterOperator {
    /// Convert the operator to its string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Neq => "neq",
            FilterOperator::Gt => "gt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lt => "lt",
            FilterOperator::Lte => "lte",
            FilterOperator::Is => "is",
            FilterOperator::In => "in",
        }
    }
}

/// Right-hand side of a filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Literal(String),
    /// The calendar day the query runs on, resolved just before sending
    Today,
}

impl FilterValue {
    fn render(&self, today: NaiveDate) -> String {
        match self {
            FilterValue::Literal(value) => value.clone(),
            FilterValue::Today => today.format("%Y-%m-%d").to_string(),
        }
    }
}

/// A single `column=op.value` condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub operator: FilterOperator,
    pub value: FilterValue,
}

impl Filter {
    fn literal(&self) -> &str {
        match &self.value {
            FilterValue::Literal(value) => value,
            FilterValue::Today => "",
        }
    }

    /// Evaluate the filter against a JSON row. Used by in-process gateways;
    /// the filter must already be resolved (no `Today` left).
    pub fn matches(&self, row: &Value) -> bool {
        let actual = row.get(&self.column).unwrap_or(&Value::Null);
        let literal = self.literal();

        match self.operator {
            FilterOperator::Is => match literal {
                "null" => actual.is_null(),
                "true" => actual.as_bool() == Some(true),
                "false" => actual.as_bool() == Some(false),
                _ => false,
            },
            FilterOperator::In => literal
                .split(',')
                .any(|candidate| compare(actual, candidate.trim()) == Some(Ordering::Equal)),
            FilterOperator::Neq => compare(actual, literal) != Some(Ordering::Equal),
            op => match compare(actual, literal) {
                Some(ord) => match op {
                    FilterOperator::Eq => ord == Ordering::Equal,
                    FilterOperator::Gt => ord == Ordering::Greater,
                    FilterOperator::Gte => ord != Ordering::Less,
                    FilterOperator::Lt => ord == Ordering::Less,
                    FilterOperator::Lte => ord != Ordering::Greater,
                    _ => false,
                },
                None => false,
            },
        }
    }
}

// Compare a JSON scalar with the textual form PostgREST would receive.
fn compare(actual: &Value, literal: &str) -> Option<Ordering> {
    match actual {
        Value::String(s) => Some(s.as_str().cmp(literal)),
        Value::Number(n) => {
            let lhs = n.as_f64()?;
            let rhs: f64 = literal.parse().ok()?;
            lhs.partial_cmp(&rhs)
        }
        Value::Bool(b) => {
            let rhs: bool = literal.parse().ok()?;
            Some(b.cmp(&rhs))
        }
        _ => None,
    }
}

/// Ordering of query results by one column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

impl Order {
    /// Compare two rows on the ordering column; missing values sort last.
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        let lhs = a.get(&self.column).unwrap_or(&Value::Null);
        let rhs = b.get(&self.column).unwrap_or(&Value::Null);
        let ord = match (lhs, rhs) {
            (Value::Null, Value::Null) => return Ordering::Equal,
            (Value::Null, _) => return Ordering::Greater,
            (_, Value::Null) => return Ordering::Less,
            (Value::String(x), Value::String(y)) => x.cmp(y),
            (Value::Number(x), Value::Number(y)) => x
                .as_f64()
                .zip(y.as_f64())
                .and_then(|(x, y)| x.partial_cmp(&y))
                .unwrap_or(Ordering::Equal),
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            _ => Ordering::Equal,
        };
        if self.ascending {
            ord
        } else {
            ord.reverse()
        }
    }
}

/// A filtered, ordered read of one table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    fn filter(mut self, column: &str, operator: FilterOperator, value: FilterValue) -> Self {
        self.filters.push(Filter {
            column: column.to_string(),
            operator,
            value,
        });
        self
    }

    /// 等価フィルター
    pub fn eq<T: ToString>(self, column: &str, value: T) -> Self {
        self.filter(column, FilterOperator::Eq, FilterValue::Literal(value.to_string()))
    }

    pub fn neq<T: ToString>(self, column: &str, value: T) -> Self {
        self.filter(column, FilterOperator::Neq, FilterValue::Literal(value.to_string()))
    }

    pub fn gt<T: ToString>(self, column: &str, value: T) -> Self {
        self.filter(column, FilterOperator::Gt, FilterValue::Literal(value.to_string()))
    }

    pub fn gte<T: ToString>(self, column: &str, value: T) -> Self {
        self.filter(column, FilterOperator::Gte, FilterValue::Literal(value.to_string()))
    }

    pub fn lt<T: ToString>(self, column: &str, value: T) -> Self {
        self.filter(column, FilterOperator::Lt, FilterValue::Literal(value.to_string()))
    }

    pub fn lte<T: ToString>(self, column: &str, value: T) -> Self {
        self.filter(column, FilterOperator::Lte, FilterValue::Literal(value.to_string()))
    }

    pub fn is(self, column: &str, value: &str) -> Self {
        self.filter(column, FilterOperator::Is, FilterValue::Literal(value.to_string()))
    }

    pub fn in_list<T: ToString>(self, column: &str, values: &[T]) -> Self {
        let joined: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        self.filter(column, FilterOperator::In, FilterValue::Literal(joined.join(",")))
    }

    /// `column >= today`, with today taken when the query is resolved
    pub fn from_today(self, column: &str) -> Self {
        self.filter(column, FilterOperator::Gte, FilterValue::Today)
    }

    /// ソート順を指定
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, count: usize) -> Self {
        self.limit = Some(count);
        self
    }

    /// Replace every `Today` marker with the given date
    pub fn resolve(&self, today: NaiveDate) -> Query {
        let filters = self
            .filters
            .iter()
            .map(|f| Filter {
                column: f.column.clone(),
                operator: f.operator,
                value: FilterValue::Literal(f.value.render(today)),
            })
            .collect();
        Query {
            filters,
            order: self.order.clone(),
            limit: self.limit,
        }
    }

    /// Whether a row passes every filter
    pub fn matches(&self, row: &Value) -> bool {
        self.filters.iter().all(|f| f.matches(row))
    }

    /// PostgREST query-string pairs; `Today` resolves to the local date
    pub fn to_params(&self) -> Vec<(String, String)> {
        let today = chrono::Local::now().date_naive();
        let mut params = vec![("select".to_string(), "*".to_string())];

        for f in &self.filters {
            let value = f.value.render(today);
            let rendered = match f.operator {
                FilterOperator::In => format!("in.({})", value),
                op => format!("{}.{}", op.as_str(), value),
            };
            params.push((f.column.clone(), rendered));
        }

        if let Some(order) = &self.order {
            let direction = if order.ascending { "asc" } else { "desc" };
            params.push(("order".to_string(), format!("{}.{}", order.column, direction)));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_postgrest_params() {
        let q = Query::new()
            .eq("is_active", true)
            .from_today("date")
            .order("date", true)
            .resolve(NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());

        let params = q.to_params();
        assert_eq!(params[0], ("select".to_string(), "*".to_string()));
        assert!(params.contains(&("is_active".to_string(), "eq.true".to_string())));
        assert!(params.contains(&("date".to_string(), "gte.2024-12-01".to_string())));
        assert!(params.contains(&("order".to_string(), "date.asc".to_string())));
    }

    #[test]
    fn renders_in_list() {
        let q = Query::new().in_list("status", &["pending", "completed"]);
        assert!(q
            .to_params()
            .contains(&("status".to_string(), "in.(pending,completed)".to_string())));
    }

    #[test]
    fn matches_rows_by_type() {
        let row = json!({ "date": "2024-12-25", "max_bookings": 3, "is_active": true, "note": null });

        assert!(Query::new().eq("date", "2024-12-25").matches(&row));
        assert!(Query::new().gte("date", "2024-12-01").matches(&row));
        assert!(!Query::new().lt("date", "2024-12-25").matches(&row));
        assert!(Query::new().lte("max_bookings", 3).matches(&row));
        assert!(!Query::new().gt("max_bookings", 3).matches(&row));
        assert!(Query::new().eq("is_active", true).matches(&row));
        assert!(Query::new().is("note", "null").matches(&row));
        assert!(Query::new().neq("date", "2024-12-24").matches(&row));
        assert!(Query::new().in_list("max_bookings", &[1, 3]).matches(&row));
    }

    #[test]
    fn orders_with_nulls_last() {
        let order = Order {
            column: "created_at".into(),
            ascending: false,
        };
        let a = json!({ "created_at": "2024-01-02T00:00:00Z" });
        let b = json!({ "created_at": "2024-01-01T00:00:00Z" });
        let c = json!({});
        let mut rows = vec![c.clone(), b.clone(), a.clone()];
        rows.sort_by(|x, y| order.compare(x, y));
        assert_eq!(rows, vec![a, b, c]);
    }
}
