use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use annostack_core::CommandId;

/// Structured outcome of one executed, undone or redone command.
///
/// Serializes flat, with the domain payload under its type-specific key next
/// to the bookkeeping fields:
///
/// ```text
/// {"status":201,"success":true,"message":"Term … added","printMessage":true,
///  "command":"…","callback":{"termID":"…","method":"annostack.AddTermCommand"},
///  "term":{…}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResponse {
    pub status: u16,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub message: String,
    pub print_message: bool,
    #[serde(rename = "command", default, skip_serializing_if = "Option::is_none")]
    pub command_id: Option<CommandId>,
    pub callback: Option<Map<String, JsonValue>>,
    #[serde(flatten)]
    pub data: Map<String, JsonValue>,
}

impl CommandResponse {
    pub fn success(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            success: true,
            error_message: None,
            message: message.into(),
            print_message: true,
            command_id: None,
            callback: None,
            data: Map::new(),
        }
    }

    pub fn failure(status: u16, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            status,
            success: false,
            error_message: Some(error.clone()),
            message: error,
            print_message: true,
            command_id: None,
            callback: None,
            data: Map::new(),
        }
    }

    /// Idempotent no-op outcome ("nothing to undo").
    pub fn nothing(message: impl Into<String>) -> Self {
        Self::success(200, message)
    }

    pub fn with_command(mut self, command_id: CommandId) -> Self {
        self.command_id = Some(command_id);
        self
    }

    pub fn with_payload(mut self, key: impl Into<String>, payload: JsonValue) -> Self {
        self.data.insert(key.into(), payload);
        self
    }

    pub fn with_callback(mut self, callback: Map<String, JsonValue>) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn payload(&self, key: &str) -> Option<&JsonValue> {
        self.data.get(key)
    }

    pub fn is_success_status(&self) -> bool {
        matches!(self.status, 200 | 201)
    }
}

/// Overall status of an aggregate undo/redo response: 200 when every member
/// succeeded, 400 otherwise.
pub fn aggregate_status(responses: &[CommandResponse]) -> u16 {
    if responses.iter().all(CommandResponse::is_success_status) {
        200
    } else {
        400
    }
}
