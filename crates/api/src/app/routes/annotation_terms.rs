use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::Value as JsonValue;

use annostack_core::EntityId;

use crate::app::{dto, errors, services::AppServices};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_link).get(list_links))
        .route("/:id", get(get_link).delete(delete_link))
}

/// POST /annotation-terms - link a term to an annotation
pub async fn create_link(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<JsonValue>,
) -> axum::response::Response {
    match services
        .engine
        .annotation_terms
        .add(principal.principal(), body)
        .await
    {
        Ok(response) => dto::command_response(response),
        Err(e) => errors::engine_error_to_response(e),
    }
}

pub async fn list_links(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.engine.annotation_terms.list(principal.principal()).await {
        Ok(links) => Json(links).into_response(),
        Err(e) => errors::engine_error_to_response(e),
    }
}

pub async fn get_link(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<EntityId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services
        .engine
        .annotation_terms
        .get(principal.principal(), id)
        .await
    {
        Ok(link) => Json(link).into_response(),
        Err(e) => errors::engine_error_to_response(e),
    }
}

pub async fn delete_link(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<EntityId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services
        .engine
        .annotation_terms
        .delete(principal.principal(), id)
        .await
    {
        Ok(response) => dto::command_response(response),
        Err(e) => errors::engine_error_to_response(e),
    }
}
