//! Command execution pipeline.
//!
//! The executor is the single write path of the engine. It dispatches
//! Add/Edit/Delete uniformly over every registered adapter and records the
//! resulting [`Command`] together with its bookkeeping.
//!
//! ## Execution Flow
//!
//! ```text
//! execute(kind, class, existing, payload, user, transaction?)
//!   ↓
//! 1. Select the adapter registered for `class`
//!   ↓
//! 2. Resolve the entities the payload references
//!   ↓
//! 3. Build / edit / describe the entity (pure, adapter side)
//!   ↓
//! 4. Write the entity document (optimistic version check)
//!   ↓
//! 5. Record: Command + History("") + UndoStackItem, clear the user's redo stack
//! ```
//!
//! Steps 4 and 5 share one storage transaction: either everything is durable
//! or nothing is.

use std::sync::Arc;

use serde_json::{Map, Value as JsonValue, json};
use tracing::instrument;

use annostack_commands::message::{action_message, callback_method};
use annostack_commands::{
    Command, CommandHistory, CommandKind, CommandResponse, CommandSubject, UndoStackItem,
};
use annostack_core::{CommandId, EntityId, ExpectedVersion, ResolvedRefs, TransactionId, UserId};

use crate::adapter::{AdapterRegistry, DomainAdapter, EntityView};
use crate::error::EngineError;
use crate::store::{EngineStore, StoreTx, StoredEntity};

/// Reusable execution engine over every registered entity class.
#[derive(Clone)]
pub struct CommandExecutor {
    store: Arc<dyn EngineStore>,
    registry: Arc<AdapterRegistry>,
}

impl CommandExecutor {
    pub fn new(store: Arc<dyn EngineStore>, registry: Arc<AdapterRegistry>) -> Self {
        Self { store, registry }
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// Execute one change in its own storage transaction.
    ///
    /// `existing` is the caller's view of the target (`None` for Add). Its
    /// version is the optimistic-concurrency token: if the stored entity moved
    /// on in the meantime the call fails with
    /// [`EngineError::ConcurrentModification`] and nothing is written.
    #[instrument(
        skip_all,
        fields(class = class_name, kind = %kind, user = %acting_user, transaction = ?transaction),
        err
    )]
    pub async fn execute(
        &self,
        kind: CommandKind,
        class_name: &str,
        existing: Option<StoredEntity>,
        payload: JsonValue,
        acting_user: UserId,
        transaction: Option<TransactionId>,
    ) -> Result<CommandResponse, EngineError> {
        let mut tx = self.store.begin().await?;
        let outcome = self
            .execute_in(tx.as_mut(), kind, class_name, existing, payload, acting_user, transaction)
            .await;

        match outcome {
            Ok(response) => {
                tx.commit().await?;
                Ok(response)
            }
            Err(err) => {
                if let Err(rollback) = tx.rollback().await {
                    tracing::warn!(error = %rollback, "rollback after failed execute");
                }
                Err(err)
            }
        }
    }

    /// Execute one change inside a caller-owned storage transaction.
    ///
    /// Composite operations use this to record several commands atomically.
    #[allow(clippy::too_many_arguments)]
    pub async fn execute_in(
        &self,
        tx: &mut dyn StoreTx,
        kind: CommandKind,
        class_name: &str,
        existing: Option<StoredEntity>,
        payload: JsonValue,
        acting_user: UserId,
        transaction: Option<TransactionId>,
    ) -> Result<CommandResponse, EngineError> {
        let adapter = self.registry.get(class_name)?;

        let (command, view) = match kind {
            CommandKind::Add => {
                if existing.is_some() {
                    return Err(EngineError::Validation(format!(
                        "cannot add {}: the entity already exists",
                        adapter.label()
                    )));
                }
                let refs = self.resolve(tx, adapter.as_ref(), &payload).await?;
                let view = adapter.build(EntityId::new(), &payload, &refs)?;
                tx.insert_entity(class_name, view.id, view.data.clone(), view.unique_key.clone())
                    .await?;

                let message = action_message(kind, adapter.label(), &view.message_params);
                let command = Command::add(
                    CommandSubject::new(class_name, view.id, view.project),
                    view.data.clone(),
                    acting_user,
                    transaction,
                    message,
                );
                (command, view)
            }
            CommandKind::Edit => {
                let existing = Self::require(adapter.as_ref(), existing)?;
                let refs = self.resolve(tx, adapter.as_ref(), &payload).await?;
                let view = adapter.edit(&existing.data, &payload, &refs)?;
                tx.update_entity(
                    class_name,
                    existing.id,
                    view.data.clone(),
                    view.unique_key.clone(),
                    ExpectedVersion::Exact(existing.version),
                )
                .await?;

                let message = action_message(kind, adapter.label(), &view.message_params);
                let command = Command::edit(
                    CommandSubject::new(class_name, existing.id, view.project),
                    existing.data,
                    view.data.clone(),
                    acting_user,
                    transaction,
                    message,
                );
                (command, view)
            }
            CommandKind::Delete => {
                let existing = Self::require(adapter.as_ref(), existing)?;
                let view = adapter.describe(&existing.data)?;
                tx.delete_entity(class_name, existing.id, ExpectedVersion::Exact(existing.version))
                    .await?;

                let message = action_message(kind, adapter.label(), &view.message_params);
                let command = Command::delete(
                    CommandSubject::new(class_name, existing.id, view.project),
                    existing.data,
                    acting_user,
                    transaction,
                    message,
                );
                (command, view)
            }
        };

        tx.insert_command(&command).await?;
        tx.append_history(&CommandHistory::executed(&command)).await?;
        tx.push_undo(&UndoStackItem::new(command.id(), acting_user)).await?;
        let invalidated = tx.clear_redo(acting_user).await?;

        tracing::info!(
            command_id = %command.id(),
            domain_id = %command.domain_id(),
            invalidated_redo = invalidated,
            "command executed"
        );

        Ok(respond(
            adapter.as_ref(),
            kind,
            &view,
            command.id(),
            command.action_message().to_string(),
        ))
    }

    /// Build the entity a creation payload describes without writing anything.
    ///
    /// Used by callers that must know the target container before executing
    /// (access checks).
    pub async fn preview(&self, class_name: &str, payload: &JsonValue) -> Result<EntityView, EngineError> {
        let adapter = self.registry.get(class_name)?;
        let mut tx = self.store.begin().await?;
        let refs = self.resolve(tx.as_mut(), adapter.as_ref(), payload).await;
        tx.rollback().await?;
        Ok(adapter.build(EntityId::new(), payload, &refs?)?)
    }

    fn require(adapter: &dyn DomainAdapter, existing: Option<StoredEntity>) -> Result<StoredEntity, EngineError> {
        existing.ok_or_else(|| EngineError::NotFound(adapter.label().to_string()))
    }

    /// Load every entity the payload references. A missing one is `NotFound`.
    async fn resolve(
        &self,
        tx: &mut dyn StoreTx,
        adapter: &dyn DomainAdapter,
        payload: &JsonValue,
    ) -> Result<ResolvedRefs, EngineError> {
        let mut refs = ResolvedRefs::new();
        for reference in adapter.references(payload)? {
            let label = self
                .registry
                .get(reference.class_name)
                .map(|a| a.label())
                .unwrap_or(reference.class_name);
            let stored = tx
                .load_entity(reference.class_name, reference.id)
                .await?
                .ok_or_else(|| EngineError::NotFound(format!("{label} {}", reference.id)))?;
            refs.insert(reference.class_name, reference.id, stored.data);
        }
        Ok(refs)
    }
}

impl core::fmt::Debug for CommandExecutor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CommandExecutor")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

/// Assemble the success response of a change of `kind` over `view`.
///
/// The payload goes under the adapter's response key (post-hook may relabel
/// it); the callback carries `<key>ID`, `method` and adapter cross refs.
pub(crate) fn respond(
    adapter: &dyn DomainAdapter,
    kind: CommandKind,
    view: &EntityView,
    command_id: CommandId,
    message: String,
) -> CommandResponse {
    let mut callback: Map<String, JsonValue> = view.callback.clone();
    callback.insert(format!("{}ID", adapter.response_key()), json!(view.id));
    callback.insert("method".into(), json!(callback_method(kind, adapter.label())));

    let mut response = CommandResponse::success(kind.success_status(), message)
        .with_command(command_id)
        .with_callback(callback)
        .with_payload(adapter.response_key(), view.data.clone());
    adapter.decorate(kind, &mut response.data);
    response
}
