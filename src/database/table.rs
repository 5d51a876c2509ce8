use std::fmt;

/// How a column is bound when it appears in a SQL predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Uuid,
    Text,
    Bool,
    Int,
    Timestamp,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniqueKey {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

/// Every table the service reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Tenants,
    Memberships,
    Profiles,
    Animals,
    UserProgress,
    Redemptions,
}

use ColumnKind::*;

const TENANT_COLUMNS: &[(&str, ColumnKind)] = &[
    ("id", Uuid),
    ("name", Text),
    ("slug", Text),
    ("is_active", Bool),
    ("branding", Json),
    ("created_at", Timestamp),
    ("updated_at", Timestamp),
];

const MEMBERSHIP_COLUMNS: &[(&str, ColumnKind)] = &[
    ("id", Uuid),
    ("user_id", Uuid),
    ("tenant_id", Uuid),
    ("role", Text),
    ("created_at", Timestamp),
];

const PROFILE_COLUMNS: &[(&str, ColumnKind)] = &[
    ("id", Uuid),
    ("user_id", Uuid),
    ("tenant_id", Uuid),
    ("email", Text),
    ("full_name", Text),
    ("role", Text),
    ("completion_status", Text),
    ("is_super_admin", Bool),
    ("created_at", Timestamp),
    ("updated_at", Timestamp),
];

const ANIMAL_COLUMNS: &[(&str, ColumnKind)] = &[
    ("id", Uuid),
    ("tenant_id", Uuid),
    ("name", Text),
    ("letter", Text),
    ("order_index", Int),
    ("qr_token", Text),
    ("is_active", Bool),
    ("created_at", Timestamp),
];

const PROGRESS_COLUMNS: &[(&str, ColumnKind)] = &[
    ("id", Uuid),
    ("user_id", Uuid),
    ("tenant_id", Uuid),
    ("animal_id", Uuid),
    ("letter", Text),
    ("scanned_at", Timestamp),
];

const REDEMPTION_COLUMNS: &[(&str, ColumnKind)] = &[
    ("id", Uuid),
    ("user_id", Uuid),
    ("tenant_id", Uuid),
    ("redemption_code", Text),
    ("redeemed", Bool),
    ("redeemed_at", Timestamp),
    ("created_at", Timestamp),
];

pub const TENANTS_SLUG_KEY: &str = "tenants_slug_key";
pub const MEMBERSHIPS_USER_TENANT_KEY: &str = "memberships_user_id_tenant_id_key";
pub const PROFILES_USER_TENANT_KEY: &str = "profiles_user_id_tenant_id_key";
pub const ANIMALS_QR_TOKEN_KEY: &str = "animals_qr_token_key";
pub const PROGRESS_USER_ANIMAL_TENANT_KEY: &str = "user_progress_user_id_animal_id_tenant_id_key";
pub const REDEMPTIONS_USER_TENANT_KEY: &str = "redemptions_user_id_tenant_id_key";
pub const REDEMPTIONS_TENANT_CODE_KEY: &str = "redemptions_tenant_id_redemption_code_key";

impl Table {
    pub const ALL: [Table; 6] = [
        Table::Tenants,
        Table::Memberships,
        Table::Profiles,
        Table::Animals,
        Table::UserProgress,
        Table::Redemptions,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Table::Tenants => "tenants",
            Table::Memberships => "memberships",
            Table::Profiles => "profiles",
            Table::Animals => "animals",
            Table::UserProgress => "user_progress",
            Table::Redemptions => "redemptions",
        }
    }

    pub fn columns(&self) -> &'static [(&'static str, ColumnKind)] {
        match self {
            Table::Tenants => TENANT_COLUMNS,
            Table::Memberships => MEMBERSHIP_COLUMNS,
            Table::Profiles => PROFILE_COLUMNS,
            Table::Animals => ANIMAL_COLUMNS,
            Table::UserProgress => PROGRESS_COLUMNS,
            Table::Redemptions => REDEMPTION_COLUMNS,
        }
    }

    pub fn column_kind(&self, column: &str) -> Option<ColumnKind> {
        self.columns().iter().find(|(name, _)| *name == column).map(|(_, kind)| *kind)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_kind(column).is_some()
    }

    /// Unique constraints besides the primary key, named as Postgres names them.
    pub fn unique_keys(&self) -> &'static [UniqueKey] {
        match self {
            Table::Tenants => &[UniqueKey { name: TENANTS_SLUG_KEY, columns: &["slug"] }],
            Table::Memberships => &[UniqueKey { name: MEMBERSHIPS_USER_TENANT_KEY, columns: &["user_id", "tenant_id"] }],
            Table::Profiles => &[UniqueKey { name: PROFILES_USER_TENANT_KEY, columns: &["user_id", "tenant_id"] }],
            Table::Animals => &[UniqueKey { name: ANIMALS_QR_TOKEN_KEY, columns: &["qr_token"] }],
            Table::UserProgress => &[UniqueKey {
                name: PROGRESS_USER_ANIMAL_TENANT_KEY,
                columns: &["user_id", "animal_id", "tenant_id"],
            }],
            Table::Redemptions => &[
                UniqueKey { name: REDEMPTIONS_USER_TENANT_KEY, columns: &["user_id", "tenant_id"] },
                UniqueKey { name: REDEMPTIONS_TENANT_CODE_KEY, columns: &["tenant_id", "redemption_code"] },
            ],
        }
    }

    /// Rows in these tables carry a `tenant_id` and belong to exactly one tenant.
    pub fn is_tenant_scoped(&self) -> bool {
        !matches!(self, Table::Tenants)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
