use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use annostack_core::{CommandId, ProjectId, UserId};

use crate::command::Command;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryId(Uuid);

impl HistoryId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for HistoryId {
    fn default() -> Self {
        Self::new()
    }
}

/// What happened to the command in a history row.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistoryPrefix {
    #[serde(rename = "")]
    Executed,
    #[serde(rename = "UNDO")]
    Undo,
    #[serde(rename = "REDO")]
    Redo,
}

impl HistoryPrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryPrefix::Executed => "",
            HistoryPrefix::Undo => "UNDO",
            HistoryPrefix::Redo => "REDO",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "" => Some(HistoryPrefix::Executed),
            "UNDO" => Some(HistoryPrefix::Undo),
            "REDO" => Some(HistoryPrefix::Redo),
            _ => None,
        }
    }
}

/// Append-only audit row for every execute, undo and redo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandHistory {
    pub id: HistoryId,
    pub command_id: CommandId,
    pub acting_user: UserId,
    pub project: Option<ProjectId>,
    pub prefix_action: HistoryPrefix,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl CommandHistory {
    fn for_command(command: &Command, acting_user: UserId, prefix_action: HistoryPrefix) -> Self {
        Self {
            id: HistoryId::new(),
            command_id: command.id(),
            acting_user,
            project: command.project(),
            prefix_action,
            message: command.action_message().to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn executed(command: &Command) -> Self {
        Self::for_command(command, command.acting_user(), HistoryPrefix::Executed)
    }

    pub fn undone(command: &Command, acting_user: UserId) -> Self {
        Self::for_command(command, acting_user, HistoryPrefix::Undo)
    }

    pub fn redone(command: &Command, acting_user: UserId) -> Self {
        Self::for_command(command, acting_user, HistoryPrefix::Redo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandSubject;
    use annostack_core::EntityId;
    use serde_json::json;

    #[test]
    fn history_rows_copy_command_context() {
        let project = ProjectId::new();
        let user = UserId::new();
        let cmd = Command::add(
            CommandSubject::new("ontology.term", EntityId::new(), Some(project)),
            json!({}),
            user,
            None,
            "Term added",
        );

        let row = CommandHistory::undone(&cmd, user);
        assert_eq!(row.command_id, cmd.id());
        assert_eq!(row.project, Some(project));
        assert_eq!(row.prefix_action, HistoryPrefix::Undo);
        assert_eq!(row.message, "Term added");
    }

    #[test]
    fn prefix_serializes_to_legacy_strings() {
        assert_eq!(serde_json::to_value(HistoryPrefix::Executed).unwrap(), json!(""));
        assert_eq!(serde_json::to_value(HistoryPrefix::Redo).unwrap(), json!("REDO"));
        assert_eq!(HistoryPrefix::parse("UNDO"), Some(HistoryPrefix::Undo));
        assert_eq!(HistoryPrefix::parse("bogus"), None);
    }
}
