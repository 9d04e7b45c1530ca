use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Filter predicate handed to the persistence delegate: a JSON object of
/// field → expected value, matched by equality.
pub type Filter = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Arguments for a list query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindManyArgs {
    #[serde(default, rename = "where")]
    pub where_clause: Filter,
    #[serde(default)]
    pub order_by: Vec<OrderBy>,
    pub skip: Option<usize>,
    pub take: Option<usize>,
}

impl FindManyArgs {
    pub fn with_where(where_clause: Filter) -> Self {
        Self {
            where_clause,
            ..Default::default()
        }
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn take(mut self, take: usize) -> Self {
        self.take = Some(take);
        self
    }
}
