//! Engine wiring for the HTTP layer.

use std::sync::Arc;

use annostack_auth::InMemoryAcl;
use annostack_infra::{Engine, EngineError};

use crate::config::AppConfig;

/// Everything the handlers need, shared behind an `Arc`.
pub struct AppServices {
    pub engine: Engine,
    /// Project/ontology grants. Admins bypass it.
    pub acl: Arc<InMemoryAcl>,
}

impl AppServices {
    pub fn new(engine: Engine, acl: Arc<InMemoryAcl>) -> Self {
        Self { engine, acl }
    }

    /// In-memory engine, for tests and local runs.
    pub fn in_memory(config: &AppConfig) -> Self {
        let acl = Arc::new(InMemoryAcl::new());
        let engine = Engine::in_memory(acl.clone(), &config.engine);
        Self::new(engine, acl)
    }
}

/// Build the services: Postgres when `DATABASE_URL` is set, otherwise the
/// in-memory store.
pub async fn build_services(config: &AppConfig) -> Result<AppServices, EngineError> {
    match &config.database_url {
        Some(url) => {
            tracing::info!("using postgres engine store");
            let acl = Arc::new(InMemoryAcl::new());
            let engine = Engine::postgres(url, acl.clone(), &config.engine).await?;
            Ok(AppServices::new(engine, acl))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory engine store");
            Ok(AppServices::in_memory(config))
        }
    }
}
