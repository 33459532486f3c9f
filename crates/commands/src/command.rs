use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use annostack_core::{CommandId, CommandKind, EntityId, ProjectId, TransactionId, UserId};

/// The entity a command is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSubject {
    pub domain_class_name: String,
    pub domain_id: EntityId,
    pub project: Option<ProjectId>,
}

impl CommandSubject {
    pub fn new(domain_class_name: impl Into<String>, domain_id: EntityId, project: Option<ProjectId>) -> Self {
        Self {
            domain_class_name: domain_class_name.into(),
            domain_id,
            project,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("{kind} command must not carry a before state")]
    UnexpectedBefore { kind: CommandKind },

    #[error("{kind} command requires a before state")]
    MissingBefore { kind: CommandKind },

    #[error("{kind} command must not carry an after state")]
    UnexpectedAfter { kind: CommandKind },

    #[error("{kind} command requires an after state")]
    MissingAfter { kind: CommandKind },
}

/// Immutable record of one executed state change over one domain entity.
///
/// The shape of the snapshots is fixed by `kind`:
///
/// | kind   | before | after |
/// |--------|--------|-------|
/// | Add    | none   | some  |
/// | Edit   | some   | some  |
/// | Delete | some   | none  |
///
/// The typed constructors make any other combination unrepresentable, and
/// [`Command::from_parts`] rejects it when rows are read back from storage.
/// There are no mutators: once recorded, a command is part of the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CommandParts", into = "CommandParts")]
pub struct Command {
    id: CommandId,
    kind: CommandKind,
    domain_class_name: String,
    domain_id: EntityId,
    before_state: Option<JsonValue>,
    after_state: Option<JsonValue>,
    acting_user: UserId,
    project: Option<ProjectId>,
    transaction_id: Option<TransactionId>,
    action_message: String,
    created_at: DateTime<Utc>,
}

/// Raw column set of a command, as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandParts {
    pub id: CommandId,
    pub kind: CommandKind,
    pub domain_class_name: String,
    pub domain_id: EntityId,
    pub before_state: Option<JsonValue>,
    pub after_state: Option<JsonValue>,
    pub acting_user: UserId,
    pub project: Option<ProjectId>,
    pub transaction_id: Option<TransactionId>,
    pub action_message: String,
    pub created_at: DateTime<Utc>,
}

impl Command {
    pub fn add(
        subject: CommandSubject,
        after: JsonValue,
        acting_user: UserId,
        transaction_id: Option<TransactionId>,
        action_message: impl Into<String>,
    ) -> Self {
        Self::record(
            CommandKind::Add,
            subject,
            None,
            Some(after),
            acting_user,
            transaction_id,
            action_message.into(),
        )
    }

    pub fn edit(
        subject: CommandSubject,
        before: JsonValue,
        after: JsonValue,
        acting_user: UserId,
        transaction_id: Option<TransactionId>,
        action_message: impl Into<String>,
    ) -> Self {
        Self::record(
            CommandKind::Edit,
            subject,
            Some(before),
            Some(after),
            acting_user,
            transaction_id,
            action_message.into(),
        )
    }

    pub fn delete(
        subject: CommandSubject,
        before: JsonValue,
        acting_user: UserId,
        transaction_id: Option<TransactionId>,
        action_message: impl Into<String>,
    ) -> Self {
        Self::record(
            CommandKind::Delete,
            subject,
            Some(before),
            None,
            acting_user,
            transaction_id,
            action_message.into(),
        )
    }

    fn record(
        kind: CommandKind,
        subject: CommandSubject,
        before_state: Option<JsonValue>,
        after_state: Option<JsonValue>,
        acting_user: UserId,
        transaction_id: Option<TransactionId>,
        action_message: String,
    ) -> Self {
        Self {
            id: CommandId::new(),
            kind,
            domain_class_name: subject.domain_class_name,
            domain_id: subject.domain_id,
            before_state,
            after_state,
            acting_user,
            project: subject.project,
            transaction_id,
            action_message,
            created_at: Utc::now(),
        }
    }

    /// Rebuild a command from stored columns, enforcing the snapshot invariant.
    pub fn from_parts(parts: CommandParts) -> Result<Self, CommandError> {
        let kind = parts.kind;
        let has_before = parts.before_state.as_ref().is_some_and(|v| !v.is_null());
        let has_after = parts.after_state.as_ref().is_some_and(|v| !v.is_null());

        match kind {
            CommandKind::Add => {
                if has_before {
                    return Err(CommandError::UnexpectedBefore { kind });
                }
                if !has_after {
                    return Err(CommandError::MissingAfter { kind });
                }
            }
            CommandKind::Edit => {
                if !has_before {
                    return Err(CommandError::MissingBefore { kind });
                }
                if !has_after {
                    return Err(CommandError::MissingAfter { kind });
                }
            }
            CommandKind::Delete => {
                if !has_before {
                    return Err(CommandError::MissingBefore { kind });
                }
                if has_after {
                    return Err(CommandError::UnexpectedAfter { kind });
                }
            }
        }

        Ok(Self {
            id: parts.id,
            kind,
            domain_class_name: parts.domain_class_name,
            domain_id: parts.domain_id,
            before_state: parts.before_state.filter(|v| !v.is_null()),
            after_state: parts.after_state.filter(|v| !v.is_null()),
            acting_user: parts.acting_user,
            project: parts.project,
            transaction_id: parts.transaction_id,
            action_message: parts.action_message,
            created_at: parts.created_at,
        })
    }

    pub fn id(&self) -> CommandId {
        self.id
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn domain_class_name(&self) -> &str {
        &self.domain_class_name
    }

    pub fn domain_id(&self) -> EntityId {
        self.domain_id
    }

    pub fn before_state(&self) -> Option<&JsonValue> {
        self.before_state.as_ref()
    }

    pub fn after_state(&self) -> Option<&JsonValue> {
        self.after_state.as_ref()
    }

    pub fn acting_user(&self) -> UserId {
        self.acting_user
    }

    pub fn project(&self) -> Option<ProjectId> {
        self.project
    }

    pub fn transaction_id(&self) -> Option<TransactionId> {
        self.transaction_id
    }

    pub fn action_message(&self) -> &str {
        &self.action_message
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn to_parts(&self) -> CommandParts {
        self.clone().into()
    }
}

impl TryFrom<CommandParts> for Command {
    type Error = CommandError;

    fn try_from(parts: CommandParts) -> Result<Self, Self::Error> {
        Command::from_parts(parts)
    }
}

impl From<Command> for CommandParts {
    fn from(c: Command) -> Self {
        CommandParts {
            id: c.id,
            kind: c.kind,
            domain_class_name: c.domain_class_name,
            domain_id: c.domain_id,
            before_state: c.before_state,
            after_state: c.after_state,
            acting_user: c.acting_user,
            project: c.project,
            transaction_id: c.transaction_id,
            action_message: c.action_message,
            created_at: c.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn subject() -> CommandSubject {
        CommandSubject::new("ontology.term", EntityId::new(), Some(ProjectId::new()))
    }

    #[test]
    fn add_command_has_only_after_state() {
        let cmd = Command::add(subject(), json!({"name": "Tumor"}), UserId::new(), None, "Term added");
        assert_eq!(cmd.kind(), CommandKind::Add);
        assert!(cmd.before_state().is_none());
        assert_eq!(cmd.after_state(), Some(&json!({"name": "Tumor"})));
    }

    #[test]
    fn delete_command_has_only_before_state() {
        let cmd = Command::delete(subject(), json!({"name": "Tumor"}), UserId::new(), None, "Term deleted");
        assert!(cmd.after_state().is_none());
        assert!(cmd.before_state().is_some());
    }

    #[test]
    fn from_parts_rejects_edit_without_before() {
        let mut parts = Command::edit(subject(), json!({}), json!({}), UserId::new(), None, "").to_parts();
        parts.before_state = None;
        assert_eq!(
            Command::from_parts(parts).unwrap_err(),
            CommandError::MissingBefore { kind: CommandKind::Edit }
        );
    }

    #[test]
    fn from_parts_treats_json_null_as_absent() {
        let mut parts = Command::delete(subject(), json!({"a": 1}), UserId::new(), None, "").to_parts();
        parts.after_state = Some(JsonValue::Null);
        let cmd = Command::from_parts(parts).unwrap();
        assert!(cmd.after_state().is_none());
    }

    #[test]
    fn serde_round_trip_preserves_transaction_link() {
        let tx = TransactionId::new();
        let cmd = Command::add(subject(), json!({"x": 1}), UserId::new(), Some(tx), "added");
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["kind"], "add");

        let back: Command = serde_json::from_value(json).unwrap();
        assert_eq!(back.transaction_id(), Some(tx));
        assert_eq!(back, cmd);
    }

    #[test]
    fn deserializing_an_invalid_row_fails() {
        let mut json = serde_json::to_value(Command::add(subject(), json!({}), UserId::new(), None, "")).unwrap();
        json["before_state"] = json!({"unexpected": true});
        assert!(serde_json::from_value::<Command>(json).is_err());
    }
}
