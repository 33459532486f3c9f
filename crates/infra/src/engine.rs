//! Engine wiring: one place that builds every service over a shared store.

use std::sync::Arc;

use annostack_auth::AccessPolicy;
use annostack_ontology::AnnotationTerm;

use crate::adapter::AdapterRegistry;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::executor::CommandExecutor;
use crate::service::{AnnotationService, EntityService, ServiceContext, TermService};
use crate::store::{EngineStore, HistoryQuery, InMemoryEngineStore, PostgresEngineStore};
use crate::transaction::TransactionService;
use crate::undo::UndoRedoService;

/// The command engine with its services, ready to be shared across requests.
#[derive(Clone)]
pub struct Engine {
    pub store: Arc<dyn EngineStore>,
    pub history: Arc<dyn HistoryQuery>,
    pub executor: CommandExecutor,
    pub undo_redo: UndoRedoService,
    pub transactions: TransactionService,
    pub terms: TermService,
    pub annotations: AnnotationService,
    pub annotation_terms: EntityService<AnnotationTerm>,
}

impl Engine {
    /// Build the engine over `store`, with the ontology entity classes
    /// registered.
    pub fn new<S>(store: S, acl: Arc<dyn AccessPolicy>, config: &EngineConfig) -> Self
    where
        S: EngineStore + HistoryQuery + 'static,
    {
        let shared = Arc::new(store);
        let store: Arc<dyn EngineStore> = shared.clone();
        let history: Arc<dyn HistoryQuery> = shared;
        let registry = Arc::new(AdapterRegistry::ontology());

        let executor = CommandExecutor::new(store.clone(), registry.clone());
        let ctx = ServiceContext::new(store.clone(), executor.clone(), acl);

        tracing::info!(
            classes = ?registry.class_names(),
            reversal_policy = ?config.reversal_policy,
            "command engine ready"
        );

        Self {
            undo_redo: UndoRedoService::new(store.clone(), registry, config.reversal_policy),
            transactions: TransactionService::new(store.clone()),
            terms: TermService::new(ctx.clone()),
            annotations: AnnotationService::new(ctx.clone()),
            annotation_terms: EntityService::new(ctx),
            executor,
            history,
            store,
        }
    }

    pub fn in_memory(acl: Arc<dyn AccessPolicy>, config: &EngineConfig) -> Self {
        Self::new(InMemoryEngineStore::new(), acl, config)
    }

    /// Connect to Postgres, apply the schema and build the engine over it.
    pub async fn postgres(
        database_url: &str,
        acl: Arc<dyn AccessPolicy>,
        config: &EngineConfig,
    ) -> Result<Self, EngineError> {
        let store = PostgresEngineStore::connect(database_url, config.max_connections).await?;
        store.migrate().await?;
        Ok(Self::new(store, acl, config))
    }
}
