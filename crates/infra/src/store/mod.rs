//! Engine store boundary.
//!
//! Storage-agnostic persistence for entity documents, the command ledger,
//! history rows and the per-user undo/redo stacks. Ships with an in-memory
//! implementation (tests/dev) and a Postgres one.

pub mod in_memory;
pub mod postgres;
pub mod query;
pub mod r#trait;

pub use in_memory::InMemoryEngineStore;
pub use postgres::PostgresEngineStore;
pub use query::{HistoryFilter, HistoryPage, HistoryQuery, Pagination};
pub use r#trait::{EngineStore, StoreError, StoreTx, StoredEntity};
