//! SQLite persistence for the audit trail.

pub mod connection;
pub mod model;
pub mod schema;
pub mod sink;

pub use connection::{create_pool, open, run_migrations, DbPool};
pub use sink::SqliteAuditSink;
