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
        .route("/", post(create_term).get(list_terms))
        .route("/:id", get(get_term).put(update_term).delete(delete_term))
}

pub async fn create_term(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<JsonValue>,
) -> axum::response::Response {
    match services.engine.terms.add(principal.principal(), body).await {
        Ok(response) => dto::command_response(response),
        Err(e) => errors::engine_error_to_response(e),
    }
}

pub async fn list_terms(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.engine.terms.entities().list(principal.principal()).await {
        Ok(terms) => Json(terms).into_response(),
        Err(e) => errors::engine_error_to_response(e),
    }
}

pub async fn get_term(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<EntityId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.engine.terms.entities().get(principal.principal(), id).await {
        Ok(term) => Json(term).into_response(),
        Err(e) => errors::engine_error_to_response(e),
    }
}

pub async fn update_term(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<JsonValue>,
) -> axum::response::Response {
    let id = match errors::parse_id::<EntityId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.engine.terms.update(principal.principal(), id, body).await {
        Ok(response) => dto::command_response(response),
        Err(e) => errors::engine_error_to_response(e),
    }
}

/// DELETE /terms/:id - also removes the annotation links using the term
pub async fn delete_term(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<EntityId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.engine.terms.delete(principal.principal(), id).await {
        Ok(response) => dto::command_response(response),
        Err(e) => errors::engine_error_to_response(e),
    }
}
