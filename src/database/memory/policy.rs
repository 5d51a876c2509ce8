//! Row-level policies for the in-memory store. These mirror the RLS policies
//! in `migrations/0001_init.sql` so tests see the same backstop Postgres gives.

use serde_json::Value;

use crate::database::manager::DatabaseError;
use crate::database::store::{Access, Record};
use crate::database::table::Table;

fn owned_by(row: &Record, user_id: &uuid::Uuid) -> bool {
    row.get("user_id").and_then(Value::as_str) == Some(user_id.to_string().as_str())
}

fn is_true(row: &Record, column: &str) -> bool {
    row.get(column).and_then(Value::as_bool).unwrap_or(false)
}

pub fn can_read(access: Access, table: Table, row: &Record) -> bool {
    match (access, table) {
        (Access::Elevated, _) => true,
        (_, Table::Tenants) | (_, Table::Animals) => is_true(row, "is_active"),
        (Access::User(user_id), _) => owned_by(row, &user_id),
        (Access::Anonymous, _) => false,
    }
}

pub fn check_insert(access: Access, table: Table, row: &Record) -> Result<(), DatabaseError> {
    let allowed = match (access, table) {
        (Access::Elevated, _) => true,
        (Access::User(user_id), Table::Profiles) => {
            owned_by(row, &user_id)
                && row.get("role").and_then(Value::as_str) == Some("visitor")
                && !is_true(row, "is_super_admin")
        }
        (Access::User(user_id), Table::UserProgress) => owned_by(row, &user_id),
        _ => false,
    };
    if allowed {
        Ok(())
    } else {
        Err(DatabaseError::PolicyViolation { table: table.name(), operation: "insert" })
    }
}

pub fn check_modify(access: Access, table: Table, operation: &'static str) -> Result<(), DatabaseError> {
    match access {
        Access::Elevated => Ok(()),
        _ => Err(DatabaseError::PolicyViolation { table: table.name(), operation }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn row(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn users_read_only_their_own_rows() {
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mine = row(json!({ "user_id": me.to_string() }));
        let theirs = row(json!({ "user_id": other.to_string() }));
        assert!(can_read(Access::User(me), Table::Redemptions, &mine));
        assert!(!can_read(Access::User(me), Table::Redemptions, &theirs));
        assert!(!can_read(Access::Anonymous, Table::Profiles, &mine));
        assert!(can_read(Access::Elevated, Table::Profiles, &theirs));
    }

    #[test]
    fn inactive_tenants_are_hidden() {
        let active = row(json!({ "is_active": true }));
        let suspended = row(json!({ "is_active": false }));
        assert!(can_read(Access::Anonymous, Table::Tenants, &active));
        assert!(!can_read(Access::Anonymous, Table::Tenants, &suspended));
    }

    #[test]
    fn users_cannot_grant_themselves_privileges() {
        let me = Uuid::new_v4();
        let escalated = row(json!({ "user_id": me.to_string(), "role": "visitor", "is_super_admin": true }));
        let staff = row(json!({ "user_id": me.to_string(), "role": "staff" }));
        let visitor = row(json!({ "user_id": me.to_string(), "role": "visitor", "is_super_admin": false }));
        assert!(check_insert(Access::User(me), Table::Profiles, &escalated).is_err());
        assert!(check_insert(Access::User(me), Table::Profiles, &staff).is_err());
        assert!(check_insert(Access::User(me), Table::Profiles, &visitor).is_ok());
        assert!(check_insert(Access::User(me), Table::Memberships, &visitor).is_err());
    }
}
