use serde_json::Value;

use super::types::{OrderBy, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    /// Accepts "name desc, createdAt", ["name desc"] or { "name": "desc" }
    pub fn parse(order: &Value) -> Vec<OrderBy> {
        match order {
            Value::String(s) => Self::parse_order_string(s),
            Value::Array(arr) => arr
                .iter()
                .filter_map(Value::as_str)
                .flat_map(Self::parse_order_string)
                .collect(),
            Value::Object(obj) => obj
                .iter()
                .map(|(field, dir)| OrderBy {
                    field: field.clone(),
                    direction: Self::direction(dir.as_str().unwrap_or("asc")),
                })
                .collect(),
            _ => vec![],
        }
    }

    pub fn parse_order_string(s: &str) -> Vec<OrderBy> {
        let mut out = Vec::new();
        for part in s.split(',') {
            let mut it = part.split_whitespace();
            if let Some(field) = it.next() {
                out.push(OrderBy {
                    field: field.to_string(),
                    direction: Self::direction(it.next().unwrap_or("asc")),
                });
            }
        }
        out
    }

    fn direction(dir: &str) -> SortDirection {
        if dir.eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }
}
