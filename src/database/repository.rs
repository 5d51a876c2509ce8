use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::database::manager::DatabaseError;
use crate::database::store::{to_record, Db, OnConflict, Record};
use crate::database::table::Table;
use crate::filter::{Filter, TENANT_COLUMN};
use crate::types::TenantId;

/// Typed access to one tenant-scoped table.
///
/// Every call ANDs `tenant_id = <tenant>` onto the caller's filter, inserts
/// are checked against the bound tenant and updates can never move a row to
/// another tenant.
pub struct Repository<T> {
    db: Db,
    table: Table,
    tenant_id: TenantId,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Repository<T>
where
    T: DeserializeOwned + Send,
{
    pub fn new(db: &Db, table: Table, tenant_id: TenantId) -> Self {
        debug_assert!(table.is_tenant_scoped());
        Self {
            db: db.clone(),
            table,
            tenant_id,
            _phantom: std::marker::PhantomData,
        }
    }

    fn scoped(&self, filter: Filter) -> Filter {
        filter.with_tenant(self.tenant_id)
    }

    pub async fn select_any(&self, filter: Filter) -> Result<Vec<T>, DatabaseError> {
        self.db.select(self.table, &self.scoped(filter)).await
    }

    pub async fn select_one(&self, filter: Filter) -> Result<Option<T>, DatabaseError> {
        self.db.select_optional(self.table, &self.scoped(filter)).await
    }

    pub async fn count(&self, filter: Filter) -> Result<i64, DatabaseError> {
        self.db.count(self.table, &self.scoped(filter)).await
    }

    pub async fn insert<N: Serialize>(&self, row: &N, on_conflict: OnConflict) -> Result<Option<T>, DatabaseError> {
        let mut record = to_record(row)?;
        match record.get(TENANT_COLUMN) {
            Some(Value::String(id)) if *id == self.tenant_id.to_string() => {}
            None | Some(Value::Null) => {
                record.insert(TENANT_COLUMN.to_string(), Value::String(self.tenant_id.to_string()));
            }
            Some(_) => return Err(DatabaseError::TenantMismatch),
        }
        self.db.insert(self.table, &record, on_conflict).await
    }

    pub async fn update(&self, filter: Filter, mut changes: Record) -> Result<Vec<T>, DatabaseError> {
        changes.remove(TENANT_COLUMN);
        if changes.is_empty() {
            return self.select_any(filter).await;
        }
        self.db.update(self.table, &self.scoped(filter), changes).await
    }

    pub async fn delete(&self, filter: Filter) -> Result<u64, DatabaseError> {
        self.db.delete(self.table, &self.scoped(filter)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::database::models::Membership;
    use serde_json::json;
    use std::sync::Arc;
    use uuid::Uuid;

    fn membership(user: Uuid, tenant: TenantId) -> Value {
        json!({ "user_id": user, "tenant_id": tenant, "role": "staff" })
    }

    #[tokio::test]
    async fn rows_from_other_tenants_are_invisible() {
        let db = Db::elevated(Arc::new(MemoryStore::new()));
        let a = TenantId::new();
        let b = TenantId::new();
        let repo_a = Repository::<Membership>::new(&db, Table::Memberships, a);
        let repo_b = Repository::<Membership>::new(&db, Table::Memberships, b);

        repo_a.insert(&membership(Uuid::new_v4(), a), OnConflict::Error).await.unwrap();
        repo_b.insert(&membership(Uuid::new_v4(), b), OnConflict::Error).await.unwrap();

        assert_eq!(repo_a.count(Filter::new()).await.unwrap(), 1);
        let rows = repo_a.select_any(Filter::new().eq("tenant_id", b.to_string())).await.unwrap();
        assert!(rows.is_empty());
        assert_eq!(repo_a.delete(Filter::new()).await.unwrap(), 1);
        assert_eq!(repo_b.count(Filter::new()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn insert_into_wrong_tenant_is_rejected() {
        let db = Db::elevated(Arc::new(MemoryStore::new()));
        let repo = Repository::<Membership>::new(&db, Table::Memberships, TenantId::new());
        let err = repo
            .insert(&membership(Uuid::new_v4(), TenantId::new()), OnConflict::Error)
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::TenantMismatch));
    }

    #[tokio::test]
    async fn update_cannot_move_rows() {
        let db = Db::elevated(Arc::new(MemoryStore::new()));
        let a = TenantId::new();
        let repo = Repository::<Membership>::new(&db, Table::Memberships, a);
        repo.insert(&membership(Uuid::new_v4(), a), OnConflict::Error).await.unwrap();

        let mut changes = Record::new();
        changes.insert("tenant_id".to_string(), json!(TenantId::new()));
        changes.insert("role".to_string(), json!("admin"));
        let rows = repo.update(Filter::new(), changes).await.unwrap();
        assert_eq!(rows[0].tenant_id, a);
    }
}
