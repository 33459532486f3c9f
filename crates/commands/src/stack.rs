use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use annostack_core::{CommandId, UserId};

/// Identifier of an undo or redo stack entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StackItemId(Uuid);

impl StackItemId {
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

impl Default for StackItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for StackItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Per-user pointer that makes a command undoable.
///
/// Owned by `acting_user`; only that user's undo consumes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoStackItem {
    pub id: StackItemId,
    pub command_id: CommandId,
    pub acting_user: UserId,
    pub created_at: DateTime<Utc>,
}

impl UndoStackItem {
    pub fn new(command_id: CommandId, acting_user: UserId) -> Self {
        Self {
            id: StackItemId::new(),
            command_id,
            acting_user,
            created_at: Utc::now(),
        }
    }
}

/// Per-user pointer that makes an undone command replayable.
///
/// Created only by undo; consumed by redo or dropped by the owner's next
/// fresh command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedoStackItem {
    pub id: StackItemId,
    pub command_id: CommandId,
    pub acting_user: UserId,
    pub created_at: DateTime<Utc>,
}

impl RedoStackItem {
    pub fn new(command_id: CommandId, acting_user: UserId) -> Self {
        Self {
            id: StackItemId::new(),
            command_id,
            acting_user,
            created_at: Utc::now(),
        }
    }
}
