use axum::{Router, routing::get};

pub mod acl;
pub mod annotation_terms;
pub mod annotations;
pub mod command;
pub mod system;
pub mod terms;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/command", command::router())
        .nest("/terms", terms::router())
        .nest("/annotations", annotations::router())
        .nest("/annotation-terms", annotation_terms::router())
        .nest("/acl", acl::router())
}
