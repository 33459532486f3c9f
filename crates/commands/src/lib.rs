//! Command ledger records.
//!
//! Everything the engine persists about a change lives here: the immutable
//! [`Command`], the [`Transaction`] grouping several commands, the per-user
//! undo/redo stack pointers, the append-only [`CommandHistory`] and the
//! transient [`CommandResponse`] handed back to callers.

pub mod command;
pub mod history;
pub mod message;
pub mod response;
pub mod stack;
pub mod transaction;

pub use annostack_core::CommandKind;
pub use command::{Command, CommandError, CommandParts, CommandSubject};
pub use history::{CommandHistory, HistoryId, HistoryPrefix};
pub use response::{CommandResponse, aggregate_status};
pub use stack::{RedoStackItem, StackItemId, UndoStackItem};
pub use transaction::Transaction;
