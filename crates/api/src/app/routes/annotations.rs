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
        .route("/", post(create_annotation).get(list_annotations))
        .route(
            "/:id",
            get(get_annotation).put(update_annotation).delete(delete_annotation),
        )
}

/// POST /annotations - create an annotation, optionally linked to `term`/`terms`
pub async fn create_annotation(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<JsonValue>,
) -> axum::response::Response {
    match services
        .engine
        .annotations
        .add_with_terms(principal.principal(), body)
        .await
    {
        Ok(response) => dto::command_response(response),
        Err(e) => errors::engine_error_to_response(e),
    }
}

pub async fn list_annotations(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services
        .engine
        .annotations
        .entities()
        .list(principal.principal())
        .await
    {
        Ok(annotations) => Json(annotations).into_response(),
        Err(e) => errors::engine_error_to_response(e),
    }
}

pub async fn get_annotation(
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
        .annotations
        .entities()
        .get(principal.principal(), id)
        .await
    {
        Ok(annotation) => Json(annotation).into_response(),
        Err(e) => errors::engine_error_to_response(e),
    }
}

pub async fn update_annotation(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<JsonValue>,
) -> axum::response::Response {
    let id = match errors::parse_id::<EntityId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services
        .engine
        .annotations
        .update(principal.principal(), id, body)
        .await
    {
        Ok(response) => dto::command_response(response),
        Err(e) => errors::engine_error_to_response(e),
    }
}

/// DELETE /annotations/:id - removes the annotation and its term links
pub async fn delete_annotation(
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
        .annotations
        .delete_with_dependencies(principal.principal(), id)
        .await
    {
        Ok(response) => dto::command_response(response),
        Err(e) => errors::engine_error_to_response(e),
    }
}
