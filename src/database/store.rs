use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::table::Table;
use crate::filter::Filter;

/// A row as it moves through a store: column name to JSON value.
pub type Record = Map<String, Value>;

/// Session identity a store call runs under. Backends apply row-level
/// policies for everything except `Elevated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Anonymous,
    User(Uuid),
    Elevated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnConflict {
    Error,
    /// Unique conflict is a no-op and the insert returns `None`.
    Ignore,
}

/// Generic data-access capability.
#[async_trait]
pub trait Store: Send + Sync {
    async fn select(&self, access: Access, table: Table, filter: &Filter) -> Result<Vec<Record>, DatabaseError>;

    async fn count(&self, access: Access, table: Table, filter: &Filter) -> Result<i64, DatabaseError>;

    async fn insert(
        &self,
        access: Access,
        table: Table,
        record: Record,
        on_conflict: OnConflict,
    ) -> Result<Option<Record>, DatabaseError>;

    async fn update(
        &self,
        access: Access,
        table: Table,
        filter: &Filter,
        changes: Record,
    ) -> Result<Vec<Record>, DatabaseError>;

    async fn delete(&self, access: Access, table: Table, filter: &Filter) -> Result<u64, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

/// Store handle bound to one session identity, with typed helpers.
#[derive(Clone)]
pub struct Db {
    store: Arc<dyn Store>,
    access: Access,
}

impl Db {
    pub fn anonymous(store: Arc<dyn Store>) -> Self {
        Self { store, access: Access::Anonymous }
    }

    pub fn for_user(store: Arc<dyn Store>, user_id: Uuid) -> Self {
        Self { store, access: Access::User(user_id) }
    }

    pub fn elevated(store: Arc<dyn Store>) -> Self {
        Self { store, access: Access::Elevated }
    }

    /// Same store with row-level policies bypassed. Only call after the
    /// caller has been authorized for the operation.
    pub fn elevate(&self) -> Self {
        Self::elevated(self.store.clone())
    }

    pub fn access(&self) -> Access {
        self.access
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub async fn select<T: DeserializeOwned>(&self, table: Table, filter: &Filter) -> Result<Vec<T>, DatabaseError> {
        let rows = self.store.select(self.access, table, filter).await?;
        rows.into_iter().map(from_record).collect()
    }

    pub async fn select_optional<T: DeserializeOwned>(
        &self,
        table: Table,
        filter: &Filter,
    ) -> Result<Option<T>, DatabaseError> {
        let filter = filter.clone().limit(1);
        let mut rows = self.store.select(self.access, table, &filter).await?;
        match rows.pop() {
            Some(row) => Ok(Some(from_record(row)?)),
            None => Ok(None),
        }
    }

    pub async fn count(&self, table: Table, filter: &Filter) -> Result<i64, DatabaseError> {
        self.store.count(self.access, table, filter).await
    }

    pub async fn insert<T: Serialize, R: DeserializeOwned>(
        &self,
        table: Table,
        row: &T,
        on_conflict: OnConflict,
    ) -> Result<Option<R>, DatabaseError> {
        let record = to_record(row)?;
        match self.store.insert(self.access, table, record, on_conflict).await? {
            Some(row) => Ok(Some(from_record(row)?)),
            None => Ok(None),
        }
    }

    pub async fn update<R: DeserializeOwned>(
        &self,
        table: Table,
        filter: &Filter,
        changes: Record,
    ) -> Result<Vec<R>, DatabaseError> {
        let rows = self.store.update(self.access, table, filter, changes).await?;
        rows.into_iter().map(from_record).collect()
    }

    pub async fn delete(&self, table: Table, filter: &Filter) -> Result<u64, DatabaseError> {
        self.store.delete(self.access, table, filter).await
    }
}

pub fn to_record<T: Serialize>(value: &T) -> Result<Record, DatabaseError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(DatabaseError::QueryError(format!("expected an object row, got {}", other))),
    }
}

pub fn from_record<T: DeserializeOwned>(record: Record) -> Result<T, DatabaseError> {
    Ok(serde_json::from_value(Value::Object(record))?)
}
