//! Undo, redo and history of the caller's commands.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    response::IntoResponse,
    routing::get,
};

use annostack_core::{CommandId, ProjectId};
use annostack_infra::store::{HistoryFilter, Pagination};

use crate::app::{dto, errors, services::AppServices};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/undo", get(undo))
        .route("/redo", get(redo))
        .route("/undo/:id", get(undo_command))
        .route("/redo/:id", get(redo_command))
        .route("/:id/undo", get(undo_command))
        .route("/:id/redo", get(redo_command))
        .route("/history", get(history))
}

/// GET /command/undo - undo the caller's most recent command
pub async fn undo(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.engine.undo_redo.undo(principal.user_id(), None).await {
        Ok(outcome) => dto::reversal_response(outcome),
        Err(e) => errors::engine_error_to_response(e),
    }
}

/// GET /command/redo - redo the caller's most recently undone command
pub async fn redo(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.engine.undo_redo.redo(principal.user_id(), None).await {
        Ok(outcome) => dto::reversal_response(outcome),
        Err(e) => errors::engine_error_to_response(e),
    }
}

/// GET /command/undo/:id (also GET /command/:id/undo)
pub async fn undo_command(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<CommandId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.engine.undo_redo.undo(principal.user_id(), Some(id)).await {
        Ok(outcome) => dto::reversal_response(outcome),
        Err(e) => errors::engine_error_to_response(e),
    }
}

/// GET /command/redo/:id (also GET /command/:id/redo)
pub async fn redo_command(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<CommandId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.engine.undo_redo.redo(principal.user_id(), Some(id)).await {
        Ok(outcome) => dto::reversal_response(outcome),
        Err(e) => errors::engine_error_to_response(e),
    }
}

/// GET /command/history?project=&limit=&offset=
///
/// Admins see every user's rows, everyone else only their own.
pub async fn history(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(params): Query<dto::HistoryParams>,
) -> axum::response::Response {
    let project = match params.project.as_deref().map(errors::parse_id::<ProjectId>) {
        Some(Ok(p)) => Some(p),
        Some(Err(resp)) => return resp,
        None => None,
    };
    let filter = HistoryFilter {
        user: (!principal.principal().is_admin()).then(|| principal.user_id()),
        project,
    };
    let pagination = Pagination::new(params.limit, params.offset);

    match services.engine.history.query_history(filter, pagination).await {
        Ok(page) => Json(page).into_response(),
        Err(e) => errors::engine_error_to_response(e.into()),
    }
}
