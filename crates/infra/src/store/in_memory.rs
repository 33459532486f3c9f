use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value as JsonValue;
use tokio::sync::{Mutex, OwnedMutexGuard};

use annostack_commands::{Command, CommandHistory, RedoStackItem, Transaction, UndoStackItem};
use annostack_core::{CommandId, EntityId, ExpectedVersion, TransactionId, UserId};

use super::query::{HistoryFilter, HistoryPage, HistoryQuery, Pagination};
use super::r#trait::{EngineStore, StoreError, StoreTx, StoredEntity};

type EntityKey = (String, EntityId);

#[derive(Debug, Clone)]
struct EntityRow {
    seq: u64,
    unique_key: Option<String>,
    entity: StoredEntity,
}

#[derive(Debug, Default)]
struct MemoryState {
    next_seq: u64,
    entities: HashMap<EntityKey, EntityRow>,
    /// Last version of every deleted entity, so a re-insert continues above it.
    retired: HashMap<EntityKey, u64>,
    commands: HashMap<CommandId, Command>,
    transactions: HashMap<TransactionId, Transaction>,
    history: Vec<CommandHistory>,
    undo: Vec<UndoStackItem>,
    redo: Vec<RedoStackItem>,
}

impl MemoryState {
    fn key_taken(&self, class_name: &str, id: EntityId, key: Option<&str>) -> bool {
        let Some(key) = key else { return false };
        self.entities.iter().any(|((class, other), row)| {
            class == class_name && *other != id && row.unique_key.as_deref() == Some(key)
        })
    }

    fn transaction_of(&self, command: CommandId) -> Option<TransactionId> {
        self.commands.get(&command).and_then(Command::transaction_id)
    }
}

/// Inverse of one write, replayed newest first on rollback.
#[derive(Debug)]
enum Revert {
    Entity(EntityKey, Option<EntityRow>),
    Retired(EntityKey, Option<u64>),
    NextSeq(u64),
    Command(CommandId),
    Transaction(TransactionId, Option<Transaction>),
    History,
    UndoPushed,
    RedoPushed,
    UndoRemoved(usize, UndoStackItem),
    RedoRemoved(usize, RedoStackItem),
    Redo(Vec<RedoStackItem>),
}

impl Revert {
    fn apply(self, state: &mut MemoryState) {
        match self {
            Revert::Entity(key, Some(row)) => {
                state.entities.insert(key, row);
            }
            Revert::Entity(key, None) => {
                state.entities.remove(&key);
            }
            Revert::Retired(key, Some(version)) => {
                state.retired.insert(key, version);
            }
            Revert::Retired(key, None) => {
                state.retired.remove(&key);
            }
            Revert::NextSeq(seq) => state.next_seq = seq,
            Revert::Command(id) => {
                state.commands.remove(&id);
            }
            Revert::Transaction(id, Some(previous)) => {
                state.transactions.insert(id, previous);
            }
            Revert::Transaction(id, None) => {
                state.transactions.remove(&id);
            }
            Revert::History => {
                state.history.pop();
            }
            Revert::UndoPushed => {
                state.undo.pop();
            }
            Revert::RedoPushed => {
                state.redo.pop();
            }
            Revert::UndoRemoved(index, item) => state.undo.insert(index, item),
            Revert::RedoRemoved(index, item) => state.redo.insert(index, item),
            Revert::Redo(items) => state.redo = items,
        }
    }
}

/// In-memory engine store.
///
/// Intended for tests/dev. A transaction holds the store lock for its whole
/// lifetime, so concurrent callers are serialized. Writes go straight to the
/// shared state and are journaled; rollback (or dropping an uncommitted
/// transaction) replays the journal backwards.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEngineStore {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryEngineStore {
    pub fn new() -> Self {
        Self::default()
    }
}

struct InMemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    journal: Vec<Revert>,
}

impl InMemoryTx {
    fn undo_journal(&mut self) {
        while let Some(revert) = self.journal.pop() {
            revert.apply(&mut self.guard);
        }
    }
}

impl Drop for InMemoryTx {
    fn drop(&mut self) {
        self.undo_journal();
    }
}

#[async_trait::async_trait]
impl EngineStore for InMemoryEngineStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError> {
        let guard = self.state.clone().lock_owned().await;
        Ok(Box::new(InMemoryTx {
            guard,
            journal: Vec::new(),
        }))
    }
}

#[async_trait::async_trait]
impl HistoryQuery for InMemoryEngineStore {
    async fn query_history(
        &self,
        filter: HistoryFilter,
        pagination: Pagination,
    ) -> Result<HistoryPage, StoreError> {
        let state = self.state.lock().await;
        let matching: Vec<&CommandHistory> =
            state.history.iter().rev().filter(|row| filter.matches(row)).collect();

        let rows = matching
            .iter()
            .skip(pagination.offset as usize)
            .take(pagination.limit as usize)
            .map(|row| (*row).clone())
            .collect();

        Ok(HistoryPage::new(rows, matching.len() as u64, pagination))
    }
}

#[async_trait::async_trait]
impl StoreTx for InMemoryTx {
    async fn load_entity(
        &mut self,
        class_name: &str,
        id: EntityId,
    ) -> Result<Option<StoredEntity>, StoreError> {
        Ok(self
            .guard
            .entities
            .get(&(class_name.to_string(), id))
            .map(|row| row.entity.clone()))
    }

    async fn list_entities(&mut self, class_name: &str) -> Result<Vec<StoredEntity>, StoreError> {
        let mut rows: Vec<&EntityRow> = self
            .guard
            .entities
            .iter()
            .filter(|((class, _), _)| class == class_name)
            .map(|(_, row)| row)
            .collect();
        rows.sort_by_key(|row| row.seq);
        Ok(rows.into_iter().map(|row| row.entity.clone()).collect())
    }

    async fn find_entities(
        &mut self,
        class_name: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<StoredEntity>, StoreError> {
        let all = self.list_entities(class_name).await?;
        Ok(all
            .into_iter()
            .filter(|e| e.data.get(field).and_then(JsonValue::as_str) == Some(value))
            .collect())
    }

    async fn insert_entity(
        &mut self,
        class_name: &str,
        id: EntityId,
        data: JsonValue,
        unique_key: Option<String>,
    ) -> Result<StoredEntity, StoreError> {
        let key = (class_name.to_string(), id);
        if self.guard.entities.contains_key(&key) {
            return Err(StoreError::AlreadyExists(format!("{class_name} {id}")));
        }
        if self.guard.key_taken(class_name, id, unique_key.as_deref()) {
            return Err(StoreError::AlreadyExists(format!(
                "{class_name} with key '{}'",
                unique_key.unwrap_or_default()
            )));
        }

        let entity = StoredEntity {
            class_name: class_name.to_string(),
            id,
            version: self.guard.retired.get(&key).map_or(1, |last| last + 1),
            data,
        };
        self.journal.push(Revert::NextSeq(self.guard.next_seq));
        self.guard.next_seq += 1;
        let row = EntityRow {
            seq: self.guard.next_seq,
            unique_key,
            entity: entity.clone(),
        };
        self.guard.entities.insert(key.clone(), row);
        self.journal.push(Revert::Entity(key, None));
        Ok(entity)
    }

    async fn update_entity(
        &mut self,
        class_name: &str,
        id: EntityId,
        data: JsonValue,
        unique_key: Option<String>,
        expected: ExpectedVersion,
    ) -> Result<StoredEntity, StoreError> {
        if self.guard.key_taken(class_name, id, unique_key.as_deref()) {
            return Err(StoreError::AlreadyExists(format!(
                "{class_name} with key '{}'",
                unique_key.unwrap_or_default()
            )));
        }

        let key = (class_name.to_string(), id);
        let row = self
            .guard
            .entities
            .get_mut(&key)
            .ok_or_else(|| StoreError::NotFound(format!("{class_name} {id}")))?;

        if !expected.matches(row.entity.version) {
            return Err(StoreError::Concurrency(format!(
                "{class_name} {id}: expected {expected:?}, found {}",
                row.entity.version
            )));
        }

        let previous = row.clone();
        row.entity.version += 1;
        row.entity.data = data;
        row.unique_key = unique_key;
        let updated = row.entity.clone();
        self.journal.push(Revert::Entity(key, Some(previous)));
        Ok(updated)
    }

    async fn delete_entity(
        &mut self,
        class_name: &str,
        id: EntityId,
        expected: ExpectedVersion,
    ) -> Result<(), StoreError> {
        let key = (class_name.to_string(), id);
        let current = self
            .guard
            .entities
            .get(&key)
            .ok_or_else(|| StoreError::NotFound(format!("{class_name} {id}")))?
            .entity
            .version;

        if !expected.matches(current) {
            return Err(StoreError::Concurrency(format!(
                "{class_name} {id}: expected {expected:?}, found {current}"
            )));
        }

        let removed = self.guard.entities.remove(&key);
        let retired = self.guard.retired.insert(key.clone(), current);
        self.journal.push(Revert::Entity(key.clone(), removed));
        self.journal.push(Revert::Retired(key, retired));
        Ok(())
    }

    async fn insert_command(&mut self, command: &Command) -> Result<(), StoreError> {
        if self.guard.commands.contains_key(&command.id()) {
            return Err(StoreError::AlreadyExists(format!("command {}", command.id())));
        }
        self.guard.commands.insert(command.id(), command.clone());
        self.journal.push(Revert::Command(command.id()));
        Ok(())
    }

    async fn load_command(&mut self, id: CommandId) -> Result<Option<Command>, StoreError> {
        Ok(self.guard.commands.get(&id).cloned())
    }

    async fn insert_transaction(&mut self, transaction: &Transaction) -> Result<(), StoreError> {
        let previous = self.guard.transactions.insert(transaction.id, transaction.clone());
        self.journal.push(Revert::Transaction(transaction.id, previous));
        Ok(())
    }

    async fn append_history(&mut self, row: &CommandHistory) -> Result<(), StoreError> {
        self.guard.history.push(row.clone());
        self.journal.push(Revert::History);
        Ok(())
    }

    async fn push_undo(&mut self, item: &UndoStackItem) -> Result<(), StoreError> {
        self.guard.undo.push(item.clone());
        self.journal.push(Revert::UndoPushed);
        Ok(())
    }

    async fn push_redo(&mut self, item: &RedoStackItem) -> Result<(), StoreError> {
        self.guard.redo.push(item.clone());
        self.journal.push(Revert::RedoPushed);
        Ok(())
    }

    async fn latest_undo(
        &mut self,
        user: UserId,
        command: Option<CommandId>,
    ) -> Result<Option<UndoStackItem>, StoreError> {
        Ok(self
            .guard
            .undo
            .iter()
            .rev()
            .find(|i| i.acting_user == user && command.is_none_or(|c| i.command_id == c))
            .cloned())
    }

    async fn latest_redo(
        &mut self,
        user: UserId,
        command: Option<CommandId>,
    ) -> Result<Option<RedoStackItem>, StoreError> {
        Ok(self
            .guard
            .redo
            .iter()
            .rev()
            .find(|i| i.acting_user == user && command.is_none_or(|c| i.command_id == c))
            .cloned())
    }

    async fn undo_items_in_transaction(
        &mut self,
        user: UserId,
        transaction: TransactionId,
    ) -> Result<Vec<UndoStackItem>, StoreError> {
        let state = &*self.guard;
        Ok(state
            .undo
            .iter()
            .rev()
            .filter(|i| i.acting_user == user && state.transaction_of(i.command_id) == Some(transaction))
            .cloned()
            .collect())
    }

    async fn redo_items_in_transaction(
        &mut self,
        user: UserId,
        transaction: TransactionId,
    ) -> Result<Vec<RedoStackItem>, StoreError> {
        let state = &*self.guard;
        Ok(state
            .redo
            .iter()
            .rev()
            .filter(|i| i.acting_user == user && state.transaction_of(i.command_id) == Some(transaction))
            .cloned()
            .collect())
    }

    async fn remove_undo(&mut self, item: &UndoStackItem) -> Result<(), StoreError> {
        let index = self
            .guard
            .undo
            .iter()
            .position(|i| i.id == item.id)
            .ok_or_else(|| StoreError::Concurrency(format!("undo item {} already consumed", item.id)))?;
        let removed = self.guard.undo.remove(index);
        self.journal.push(Revert::UndoRemoved(index, removed));
        Ok(())
    }

    async fn remove_redo(&mut self, item: &RedoStackItem) -> Result<(), StoreError> {
        let index = self
            .guard
            .redo
            .iter()
            .position(|i| i.id == item.id)
            .ok_or_else(|| StoreError::Concurrency(format!("redo item {} already consumed", item.id)))?;
        let removed = self.guard.redo.remove(index);
        self.journal.push(Revert::RedoRemoved(index, removed));
        Ok(())
    }

    async fn clear_redo(&mut self, user: UserId) -> Result<u64, StoreError> {
        let cleared = self.guard.redo.iter().filter(|i| i.acting_user == user).count();
        if cleared > 0 {
            let kept = self.guard.redo.iter().filter(|i| i.acting_user != user).cloned().collect();
            let previous = std::mem::replace(&mut self.guard.redo, kept);
            self.journal.push(Revert::Redo(previous));
        }
        Ok(cleared as u64)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let mut this = self;
        this.journal.clear();
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        let mut this = self;
        this.undo_journal();
        Ok(())
    }
}
