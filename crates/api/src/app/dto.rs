use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Deserialize;

use annostack_commands::CommandResponse;
use annostack_infra::UndoRedoOutcome;

// -------------------------
// Request DTOs
// -------------------------

/// Query string of `GET /command/history`.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    pub project: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// Body of `POST /acl/grants` and `DELETE /acl/grants`.
#[derive(Debug, Deserialize)]
pub struct GrantRequest {
    pub container: String,
    pub user: String,
    pub permission: String,
}

// -------------------------
// Response mapping
// -------------------------

fn status_of(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// One executed command, answered with the command's own status.
pub fn command_response(response: CommandResponse) -> axum::response::Response {
    (status_of(response.status), Json(response)).into_response()
}

/// An undo/redo call: the list of per-command outcomes, 200 when all of them
/// succeeded and 400 otherwise.
pub fn reversal_response(outcome: UndoRedoOutcome) -> axum::response::Response {
    let status = status_of(outcome.status());
    (status, Json(outcome.into_responses())).into_response()
}
