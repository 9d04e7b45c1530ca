// In-memory persistence delegate
//
// Rows are kept as JSON objects in insertion order and converted to the
// model type on the way out. Filters match top-level fields by equality.

use std::cmp::Ordering;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::delegate::{DelegateError, PersistenceDelegate, RecordData};
use crate::filter::{Filter, FindManyArgs, OrderBy, SortDirection};
use crate::models::TenantAwareModel;

#[derive(Debug, Default)]
struct MemoryStore {
    rows: Vec<RecordData>,
    create_journal: Vec<RecordData>,
}

/// Thread-safe in-memory table. Clones share the same rows.
#[derive(Debug)]
pub struct InMemoryDelegate<M> {
    store: Arc<Mutex<MemoryStore>>,
    _phantom: PhantomData<fn() -> M>,
}

impl<M> Clone for InMemoryDelegate<M> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _phantom: PhantomData,
        }
    }
}

impl<M> Default for InMemoryDelegate<M> {
    fn default() -> Self {
        Self {
            store: Arc::new(Mutex::new(MemoryStore::default())),
            _phantom: PhantomData,
        }
    }
}

impl<M> InMemoryDelegate<M>
where
    M: TenantAwareModel + Serialize + DeserializeOwned,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a delegate pre-loaded with rows (JSON objects)
    pub fn with_records(records: Vec<Value>) -> Result<Self, DelegateError> {
        let delegate = Self::new();
        for record in records {
            delegate.seed(record)?;
        }
        Ok(delegate)
    }

    /// Insert a row directly, bypassing the create journal
    pub fn seed(&self, record: Value) -> Result<(), DelegateError> {
        let row = Self::into_row(record)?;
        self.store().rows.push(row);
        Ok(())
    }

    /// Payloads received by `create`, in call order
    pub fn created_payloads(&self) -> Vec<RecordData> {
        self.store().create_journal.clone()
    }

    pub fn len(&self) -> usize {
        self.store().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn store(&self) -> MutexGuard<'_, MemoryStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn into_row(record: Value) -> Result<RecordData, DelegateError> {
        match record {
            Value::Object(map) => Ok(map),
            other => Err(DelegateError::InvalidData(format!(
                "expected a JSON object, got {}",
                other
            ))),
        }
    }

    fn to_model(row: &RecordData) -> Result<M, DelegateError> {
        Ok(serde_json::from_value(Value::Object(row.clone()))?)
    }

    fn not_found(id: &str) -> DelegateError {
        DelegateError::RecordNotFound {
            model: M::MODEL_NAME,
            id: id.to_string(),
        }
    }

    fn row_id(row: &RecordData) -> Option<&str> {
        row.get("id").and_then(Value::as_str)
    }
}

fn matches(row: &RecordData, filter: &Filter) -> bool {
    filter
        .iter()
        .all(|(field, expected)| row.get(field).unwrap_or(&Value::Null) == expected)
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        // nulls sort first
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

fn sort_rows(rows: &mut [RecordData], order_by: &[OrderBy]) {
    rows.sort_by(|a, b| {
        for order in order_by {
            let ordering = compare_values(a.get(&order.field), b.get(&order.field));
            let ordering = match order.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

#[async_trait]
impl<M> PersistenceDelegate<M> for InMemoryDelegate<M>
where
    M: TenantAwareModel + Serialize + DeserializeOwned,
{
    async fn find_unique(&self, id: &str) -> Result<Option<M>, DelegateError> {
        let store = self.store();
        store
            .rows
            .iter()
            .find(|row| Self::row_id(row) == Some(id))
            .map(Self::to_model)
            .transpose()
    }

    async fn find_first(&self, filter: &Filter) -> Result<Option<M>, DelegateError> {
        let store = self.store();
        store
            .rows
            .iter()
            .find(|row| matches(row, filter))
            .map(Self::to_model)
            .transpose()
    }

    async fn find_many(&self, args: &FindManyArgs) -> Result<Vec<M>, DelegateError> {
        let mut rows: Vec<RecordData> = {
            let store = self.store();
            store
                .rows
                .iter()
                .filter(|row| matches(row, &args.where_clause))
                .cloned()
                .collect()
        };

        if !args.order_by.is_empty() {
            sort_rows(&mut rows, &args.order_by);
        }

        rows.iter()
            .skip(args.skip.unwrap_or(0))
            .take(args.take.unwrap_or(usize::MAX))
            .map(Self::to_model)
            .collect()
    }

    async fn create(&self, mut data: RecordData) -> Result<M, DelegateError> {
        let mut store = self.store();
        store.create_journal.push(data.clone());

        if !data.contains_key("id") {
            data.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        }
        if let Some(id) = Self::row_id(&data) {
            if store.rows.iter().any(|row| Self::row_id(row) == Some(id)) {
                return Err(DelegateError::Conflict {
                    model: M::MODEL_NAME,
                    id: id.to_string(),
                });
            }
        }
        let model = Self::to_model(&data)?;
        store.rows.push(data);
        Ok(model)
    }

    async fn update(&self, id: &str, data: RecordData) -> Result<M, DelegateError> {
        let mut store = self.store();
        let row = store
            .rows
            .iter_mut()
            .find(|row| Self::row_id(row) == Some(id))
            .ok_or_else(|| Self::not_found(id))?;

        let mut updated = row.clone();
        for (field, value) in data {
            if field != "id" {
                updated.insert(field, value);
            }
        }
        let model = Self::to_model(&updated)?;
        *row = updated;
        Ok(model)
    }

    async fn delete(&self, id: &str) -> Result<M, DelegateError> {
        let mut store = self.store();
        let index = store
            .rows
            .iter()
            .position(|row| Self::row_id(row) == Some(id))
            .ok_or_else(|| Self::not_found(id))?;
        let row = store.rows.remove(index);
        Self::to_model(&row)
    }

    async fn count(&self, filter: &Filter) -> Result<u64, DelegateError> {
        let store = self.store();
        Ok(store.rows.iter().filter(|row| matches(row, filter)).count() as u64)
    }
}
