use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use annostack_commands::{Command, CommandHistory, RedoStackItem, Transaction, UndoStackItem};
use annostack_core::{CommandId, EntityId, ExpectedVersion, TransactionId, UserId};

/// The persisted document of one participating entity.
///
/// The store is agnostic of entity types: `data` is the entity's serialized
/// snapshot and `class_name` routes it back to its adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEntity {
    pub class_name: String,
    pub id: EntityId,
    /// Optimistic-concurrency token. Starts at 1, bumped by every write and
    /// never reused for the same id, even across delete and re-insert.
    pub version: u64,
    pub data: JsonValue,
}

/// Store operation error.
///
/// Infrastructure errors (storage, concurrency, uniqueness) as opposed to
/// domain errors (validation, invariants).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("storage backend failure: {0}")]
    Backend(String),

    #[error("stored record is unreadable: {0}")]
    Serialization(String),
}

/// Persistence boundary of the command engine.
///
/// Every mutation happens inside a [`StoreTx`]; the executor and the
/// undo/redo service decide where transactions begin and end. The read
/// helpers run in a throwaway transaction.
#[async_trait::async_trait]
pub trait EngineStore: Send + Sync {
    /// Begin a storage transaction.
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError>;

    async fn load_entity(
        &self,
        class_name: &str,
        id: EntityId,
    ) -> Result<Option<StoredEntity>, StoreError> {
        let mut tx = self.begin().await?;
        let found = tx.load_entity(class_name, id).await;
        tx.rollback().await?;
        found
    }

    async fn list_entities(&self, class_name: &str) -> Result<Vec<StoredEntity>, StoreError> {
        let mut tx = self.begin().await?;
        let found = tx.list_entities(class_name).await;
        tx.rollback().await?;
        found
    }

    async fn find_entities(
        &self,
        class_name: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<StoredEntity>, StoreError> {
        let mut tx = self.begin().await?;
        let found = tx.find_entities(class_name, field, value).await;
        tx.rollback().await?;
        found
    }

    async fn load_command(&self, id: CommandId) -> Result<Option<Command>, StoreError> {
        let mut tx = self.begin().await?;
        let found = tx.load_command(id).await;
        tx.rollback().await?;
        found
    }
}

/// One storage transaction.
///
/// Dropping a transaction without calling [`StoreTx::commit`] discards its
/// writes.
#[async_trait::async_trait]
pub trait StoreTx: Send {
    async fn load_entity(
        &mut self,
        class_name: &str,
        id: EntityId,
    ) -> Result<Option<StoredEntity>, StoreError>;

    /// All entities of a class, in insertion order.
    async fn list_entities(&mut self, class_name: &str) -> Result<Vec<StoredEntity>, StoreError>;

    /// Entities of a class whose top-level string `field` equals `value`.
    async fn find_entities(
        &mut self,
        class_name: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<StoredEntity>, StoreError>;

    /// Insert an entity. A fresh id starts at version 1; an id that was
    /// deleted before resumes one above its last version.
    ///
    /// Fails with `AlreadyExists` when the id is taken or another live entity
    /// of the class holds the same `unique_key`.
    async fn insert_entity(
        &mut self,
        class_name: &str,
        id: EntityId,
        data: JsonValue,
        unique_key: Option<String>,
    ) -> Result<StoredEntity, StoreError>;

    /// Overwrite an entity's document, bumping its version.
    async fn update_entity(
        &mut self,
        class_name: &str,
        id: EntityId,
        data: JsonValue,
        unique_key: Option<String>,
        expected: ExpectedVersion,
    ) -> Result<StoredEntity, StoreError>;

    async fn delete_entity(
        &mut self,
        class_name: &str,
        id: EntityId,
        expected: ExpectedVersion,
    ) -> Result<(), StoreError>;

    async fn insert_command(&mut self, command: &Command) -> Result<(), StoreError>;

    async fn load_command(&mut self, id: CommandId) -> Result<Option<Command>, StoreError>;

    async fn insert_transaction(&mut self, transaction: &Transaction) -> Result<(), StoreError>;

    async fn append_history(&mut self, row: &CommandHistory) -> Result<(), StoreError>;

    async fn push_undo(&mut self, item: &UndoStackItem) -> Result<(), StoreError>;

    async fn push_redo(&mut self, item: &RedoStackItem) -> Result<(), StoreError>;

    /// The user's most recent undo item, optionally restricted to one command.
    async fn latest_undo(
        &mut self,
        user: UserId,
        command: Option<CommandId>,
    ) -> Result<Option<UndoStackItem>, StoreError>;

    async fn latest_redo(
        &mut self,
        user: UserId,
        command: Option<CommandId>,
    ) -> Result<Option<RedoStackItem>, StoreError>;

    /// The user's undo items pointing at commands of `transaction`, most recent first.
    async fn undo_items_in_transaction(
        &mut self,
        user: UserId,
        transaction: TransactionId,
    ) -> Result<Vec<UndoStackItem>, StoreError>;

    /// The user's redo items pointing at commands of `transaction`, most recent first.
    async fn redo_items_in_transaction(
        &mut self,
        user: UserId,
        transaction: TransactionId,
    ) -> Result<Vec<RedoStackItem>, StoreError>;

    async fn remove_undo(&mut self, item: &UndoStackItem) -> Result<(), StoreError>;

    async fn remove_redo(&mut self, item: &RedoStackItem) -> Result<(), StoreError>;

    /// Drop every redo item owned by `user`.
    async fn clear_redo(&mut self, user: UserId) -> Result<u64, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}
