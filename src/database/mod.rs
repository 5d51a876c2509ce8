pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod scoped;
pub mod store;
pub mod table;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use repository::Repository;
pub use store::{Access, Db, OnConflict, Record, Store};
pub use table::Table;
