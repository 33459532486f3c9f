//! Undo / redo over the per-user stacks.
//!
//! Undo pops the acting user's most recent (or id-selected) undo item and
//! applies the inverse of its command; redo replays the forward mutation. A
//! command recorded under a [`Transaction`](annostack_commands::Transaction)
//! drags every sibling still on the user's stack along with it.
//!
//! | command | undo applies | redo applies |
//! |---------|--------------|--------------|
//! | Add     | delete (200) | re-insert `afterState` (201) |
//! | Edit    | rewrite `beforeState` (200) | rewrite `afterState` (200) |
//! | Delete  | re-insert `beforeState`, same id (201) | delete (200) |

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::instrument;

use annostack_commands::message::{NOTHING_TO_REDO, NOTHING_TO_UNDO, action_message};
use annostack_commands::{
    Command, CommandHistory, CommandKind, CommandResponse, RedoStackItem, UndoStackItem,
    aggregate_status,
};
use annostack_core::{CommandId, ExpectedVersion, UserId};

use crate::adapter::AdapterRegistry;
use crate::error::EngineError;
use crate::executor::respond;
use crate::store::{EngineStore, StoreTx};

/// How a multi-command reversal is committed.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReversalPolicy {
    /// The whole reversal is one storage transaction; a failing sub-command
    /// rolls back every sub-command of the call.
    #[default]
    AllOrNothing,
    /// Each sub-command commits on its own; a failure stops the loop and the
    /// already-applied sub-commands stay applied.
    PerCommand,
}

impl FromStr for ReversalPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all_or_nothing" => Ok(ReversalPolicy::AllOrNothing),
            "per_command" => Ok(ReversalPolicy::PerCommand),
            other => Err(format!(
                "unknown reversal policy '{other}' (expected all_or_nothing or per_command)"
            )),
        }
    }
}

/// Result of an undo or redo call.
#[derive(Debug, Clone, PartialEq)]
pub enum UndoRedoOutcome {
    /// The user's stack was empty. No state changed.
    Nothing(CommandResponse),
    /// One response per sub-command, in application order.
    Applied(Vec<CommandResponse>),
}

impl UndoRedoOutcome {
    /// 200 when every sub-command succeeded (or nothing was to do), 400 otherwise.
    pub fn status(&self) -> u16 {
        match self {
            UndoRedoOutcome::Nothing(_) => 200,
            UndoRedoOutcome::Applied(responses) => aggregate_status(responses),
        }
    }

    pub fn responses(&self) -> &[CommandResponse] {
        match self {
            UndoRedoOutcome::Nothing(response) => std::slice::from_ref(response),
            UndoRedoOutcome::Applied(responses) => responses,
        }
    }

    pub fn into_responses(self) -> Vec<CommandResponse> {
        match self {
            UndoRedoOutcome::Nothing(response) => vec![response],
            UndoRedoOutcome::Applied(responses) => responses,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Direction {
    Undo,
    Redo,
}

/// A stack entry selected for reversal.
#[derive(Debug, Clone)]
enum Pending {
    Undo(UndoStackItem),
    Redo(RedoStackItem),
}

impl Pending {
    fn command_id(&self) -> CommandId {
        match self {
            Pending::Undo(item) => item.command_id,
            Pending::Redo(item) => item.command_id,
        }
    }
}

#[derive(Clone)]
pub struct UndoRedoService {
    store: Arc<dyn EngineStore>,
    registry: Arc<AdapterRegistry>,
    policy: ReversalPolicy,
}

impl UndoRedoService {
    pub fn new(store: Arc<dyn EngineStore>, registry: Arc<AdapterRegistry>, policy: ReversalPolicy) -> Self {
        Self {
            store,
            registry,
            policy,
        }
    }

    pub fn policy(&self) -> ReversalPolicy {
        self.policy
    }

    /// Undo the user's most recent command, or the one given by id.
    ///
    /// An unknown command id is `NotFound`; a known command with no undo
    /// item left for this user is a no-op.
    #[instrument(skip(self), fields(policy = ?self.policy), err)]
    pub async fn undo(&self, acting_user: UserId, command: Option<CommandId>) -> Result<UndoRedoOutcome, EngineError> {
        self.reverse(Direction::Undo, acting_user, command).await
    }

    /// Redo the user's most recently undone command, or the one given by id.
    #[instrument(skip(self), fields(policy = ?self.policy), err)]
    pub async fn redo(&self, acting_user: UserId, command: Option<CommandId>) -> Result<UndoRedoOutcome, EngineError> {
        self.reverse(Direction::Redo, acting_user, command).await
    }

    async fn reverse(
        &self,
        direction: Direction,
        user: UserId,
        command: Option<CommandId>,
    ) -> Result<UndoRedoOutcome, EngineError> {
        let mut tx = self.store.begin().await?;
        let plan = match self.plan(tx.as_mut(), direction, user, command).await {
            Ok(plan) => plan,
            Err(err) => {
                tx.rollback().await?;
                return Err(err);
            }
        };

        if plan.is_empty() {
            tx.rollback().await?;
            let message = match direction {
                Direction::Undo => NOTHING_TO_UNDO,
                Direction::Redo => NOTHING_TO_REDO,
            };
            return Ok(UndoRedoOutcome::Nothing(CommandResponse::nothing(message)));
        }

        match self.policy {
            ReversalPolicy::AllOrNothing => {
                let mut responses = Vec::with_capacity(plan.len());
                for pending in &plan {
                    match self.apply(tx.as_mut(), user, pending).await {
                        Ok(response) => responses.push(response),
                        Err(err) => {
                            tx.rollback().await?;
                            tracing::warn!(
                                command_id = %pending.command_id(),
                                error = %err,
                                rolled_back = responses.len(),
                                "reversal failed, nothing applied"
                            );
                            return Ok(UndoRedoOutcome::Applied(vec![failure(&err, pending)]));
                        }
                    }
                }
                tx.commit().await?;
                Ok(UndoRedoOutcome::Applied(responses))
            }
            ReversalPolicy::PerCommand => {
                // Selection only; every sub-command gets its own transaction.
                tx.rollback().await?;

                let mut responses = Vec::with_capacity(plan.len());
                for pending in &plan {
                    let mut tx = self.store.begin().await?;
                    match self.apply(tx.as_mut(), user, pending).await {
                        Ok(response) => {
                            tx.commit().await?;
                            responses.push(response);
                        }
                        Err(err) => {
                            tx.rollback().await?;
                            tracing::warn!(
                                command_id = %pending.command_id(),
                                error = %err,
                                applied = responses.len(),
                                "reversal stopped"
                            );
                            responses.push(failure(&err, pending));
                            break;
                        }
                    }
                }
                Ok(UndoRedoOutcome::Applied(responses))
            }
        }
    }

    /// Select the stack entries to reverse, in application order.
    async fn plan(
        &self,
        tx: &mut dyn StoreTx,
        direction: Direction,
        user: UserId,
        command: Option<CommandId>,
    ) -> Result<Vec<Pending>, EngineError> {
        if let Some(id) = command {
            if tx.load_command(id).await?.is_none() {
                return Err(EngineError::NotFound(format!("command {id}")));
            }
        }

        let selected = match direction {
            Direction::Undo => tx.latest_undo(user, command).await?.map(Pending::Undo),
            Direction::Redo => tx.latest_redo(user, command).await?.map(Pending::Redo),
        };
        let Some(selected) = selected else {
            return Ok(Vec::new());
        };

        let selected_command = load_command(tx, selected.command_id()).await?;
        let Some(transaction) = selected_command.transaction_id() else {
            return Ok(vec![selected]);
        };

        // Undo items of a transaction were pushed in creation order and redo
        // items in undo order, so most-recent-first is the right order for both.
        let plan = match direction {
            Direction::Undo => tx
                .undo_items_in_transaction(user, transaction)
                .await?
                .into_iter()
                .map(Pending::Undo)
                .collect(),
            Direction::Redo => tx
                .redo_items_in_transaction(user, transaction)
                .await?
                .into_iter()
                .map(Pending::Redo)
                .collect(),
        };
        Ok(plan)
    }

    /// Apply one stack entry: consume it, mutate the entity, log history and
    /// push the opposite stack entry.
    async fn apply(&self, tx: &mut dyn StoreTx, user: UserId, pending: &Pending) -> Result<CommandResponse, EngineError> {
        let command = load_command(tx, pending.command_id()).await?;

        let (applied_kind, target, history) = match pending {
            Pending::Undo(item) => {
                tx.remove_undo(item).await?;
                (
                    command.kind().inverse(),
                    command.before_state(),
                    CommandHistory::undone(&command, user),
                )
            }
            Pending::Redo(item) => {
                tx.remove_redo(item).await?;
                (command.kind(), command.after_state(), CommandHistory::redone(&command, user))
            }
        };

        let response = self.mutate(tx, &command, applied_kind, target).await?;

        tx.append_history(&history).await?;
        match pending {
            Pending::Undo(_) => tx.push_redo(&RedoStackItem::new(command.id(), user)).await?,
            Pending::Redo(_) => tx.push_undo(&UndoStackItem::new(command.id(), user)).await?,
        }

        tracing::info!(
            command_id = %command.id(),
            prefix = history.prefix_action.as_str(),
            applied = %applied_kind,
            "command reversed"
        );
        Ok(response)
    }

    /// Bring the command's entity to `target` by applying a change of `kind`.
    async fn mutate(
        &self,
        tx: &mut dyn StoreTx,
        command: &Command,
        kind: CommandKind,
        target: Option<&JsonValue>,
    ) -> Result<CommandResponse, EngineError> {
        let class_name = command.domain_class_name();
        let id = command.domain_id();
        let adapter = self.registry.get(class_name)?;
        let missing = || EngineError::NotFound(format!("{} {id}", adapter.label()));
        let state = |target: Option<&JsonValue>| {
            target.cloned().ok_or_else(|| {
                EngineError::Store(format!("command {} has no state to restore", command.id()))
            })
        };

        let view = match kind {
            CommandKind::Add => {
                let view = adapter.describe(&state(target)?)?;
                tx.insert_entity(class_name, id, view.data.clone(), view.unique_key.clone())
                    .await?;
                view
            }
            CommandKind::Edit => {
                let current = tx.load_entity(class_name, id).await?.ok_or_else(missing)?;
                let view = adapter.describe(&state(target)?)?;
                tx.update_entity(
                    class_name,
                    id,
                    view.data.clone(),
                    view.unique_key.clone(),
                    ExpectedVersion::Exact(current.version),
                )
                .await?;
                view
            }
            CommandKind::Delete => {
                let current = tx.load_entity(class_name, id).await?.ok_or_else(missing)?;
                let view = adapter.describe(&current.data)?;
                tx.delete_entity(class_name, id, ExpectedVersion::Exact(current.version))
                    .await?;
                view
            }
        };

        let message = action_message(kind, adapter.label(), &view.message_params);
        Ok(respond(adapter.as_ref(), kind, &view, command.id(), message))
    }
}

impl core::fmt::Debug for UndoRedoService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UndoRedoService")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

async fn load_command(tx: &mut dyn StoreTx, id: CommandId) -> Result<Command, EngineError> {
    tx.load_command(id)
        .await?
        .ok_or_else(|| EngineError::Store(format!("stack item points at missing command {id}")))
}

fn failure(err: &EngineError, pending: &Pending) -> CommandResponse {
    CommandResponse::failure(err.status(), err.to_string()).with_command(pending.command_id())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_reversal_policy() {
        assert_eq!("all_or_nothing".parse::<ReversalPolicy>(), Ok(ReversalPolicy::AllOrNothing));
        assert_eq!(" PER_COMMAND ".parse::<ReversalPolicy>(), Ok(ReversalPolicy::PerCommand));
        assert!("sometimes".parse::<ReversalPolicy>().is_err());
        assert_eq!(ReversalPolicy::default(), ReversalPolicy::AllOrNothing);
    }

    #[test]
    fn nothing_outcome_is_a_single_success() {
        let outcome = UndoRedoOutcome::Nothing(CommandResponse::nothing(NOTHING_TO_UNDO));
        assert_eq!(outcome.status(), 200);
        let responses = outcome.into_responses();
        assert_eq!(responses.len(), 1);
        assert!(responses[0].success);
        assert!(responses[0].callback.is_none());
    }

    #[test]
    fn any_failed_member_fails_the_aggregate() {
        let outcome = UndoRedoOutcome::Applied(vec![
            CommandResponse::success(200, "ok"),
            CommandResponse::failure(409, "stale"),
        ]);
        assert_eq!(outcome.status(), 400);
    }
}
