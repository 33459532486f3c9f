//! Infrastructure layer of the command engine.
//!
//! Storage (in-memory and Postgres), the adapter registry, the command
//! executor, undo/redo, transaction grouping, the entity services that call
//! into all of them, and engine configuration.

pub mod adapter;
pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod service;
pub mod store;
pub mod transaction;
pub mod undo;

mod integration_tests;

pub use adapter::{AdapterRegistry, DomainAdapter, EntityView, TypedAdapter};
pub use config::{ConfigError, EngineConfig};
pub use engine::Engine;
pub use error::EngineError;
pub use executor::CommandExecutor;
pub use service::{AnnotationService, EntityService, ServiceContext, TermService};
pub use transaction::TransactionService;
pub use undo::{ReversalPolicy, UndoRedoOutcome, UndoRedoService};
