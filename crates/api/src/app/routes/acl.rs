//! Admin routes for container grants.
//!
//! The engine consults the access policy on every entity operation; these
//! endpoints let an administrator give users rights on a project or ontology.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};

use annostack_auth::Permission;
use annostack_core::{ContainerId, UserId};

use crate::app::{dto, errors, services::AppServices};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new().route("/grants", post(grant).delete(revoke))
}

fn parse_grant(
    principal: &PrincipalContext,
    body: &dto::GrantRequest,
) -> Result<(ContainerId, UserId, Permission), axum::response::Response> {
    if !principal.principal().is_admin() {
        return Err(errors::json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "only administrators manage grants",
        ));
    }
    let container = errors::parse_id::<ContainerId>(&body.container)?;
    let user = errors::parse_id::<UserId>(&body.user)?;
    let permission = body.permission.trim().to_ascii_lowercase();
    if permission.is_empty() {
        return Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "permission must not be empty",
        ));
    }
    Ok((container, user, Permission::new(permission)))
}

/// POST /acl/grants
pub async fn grant(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::GrantRequest>,
) -> axum::response::Response {
    let (container, user, permission) = match parse_grant(&principal, &body) {
        Ok(grant) => grant,
        Err(resp) => return resp,
    };
    tracing::info!(%container, %user, %permission, by = %principal.user_id(), "grant added");
    services.acl.grant(container, user, permission);
    StatusCode::NO_CONTENT.into_response()
}

/// DELETE /acl/grants
pub async fn revoke(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::GrantRequest>,
) -> axum::response::Response {
    let (container, user, permission) = match parse_grant(&principal, &body) {
        Ok(grant) => grant,
        Err(resp) => return resp,
    };
    tracing::info!(%container, %user, %permission, by = %principal.user_id(), "grant revoked");
    services.acl.revoke(container, user, &permission);
    StatusCode::NO_CONTENT.into_response()
}
