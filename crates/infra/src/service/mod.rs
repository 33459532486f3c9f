//! Entity services: the callers of the executor.
//!
//! Each service checks the acting user's rights on the entity's container
//! before it builds a change payload and hands it to the executor.
//! Composite operations record several commands under one
//! [`Transaction`](annostack_commands::Transaction) inside one storage
//! transaction, so they either happen entirely and undo in one call, or not
//! at all.

pub mod annotation;
pub mod entity;
pub mod term;

use std::sync::Arc;

use serde_json::{Value as JsonValue, json};

use annostack_auth::{AccessPolicy, Principal};
use annostack_commands::{CommandKind, CommandResponse};
use annostack_core::{DomainEntity, EntityId};
use annostack_ontology::AnnotationTerm;

use crate::error::EngineError;
use crate::executor::CommandExecutor;
use crate::store::{EngineStore, StoreTx, StoredEntity};
use crate::transaction::TransactionService;

pub use annotation::AnnotationService;
pub use entity::EntityService;
pub use term::TermService;

/// Collaborators shared by every entity service.
#[derive(Clone)]
pub struct ServiceContext {
    pub store: Arc<dyn EngineStore>,
    pub executor: CommandExecutor,
    pub acl: Arc<dyn AccessPolicy>,
}

impl ServiceContext {
    pub fn new(store: Arc<dyn EngineStore>, executor: CommandExecutor, acl: Arc<dyn AccessPolicy>) -> Self {
        Self { store, executor, acl }
    }

    /// Delete `parent` together with every annotation-term link whose
    /// `link_field` points at it, as one transaction.
    pub(crate) async fn delete_with_links<P: DomainEntity>(
        &self,
        principal: &Principal,
        parent: StoredEntity,
        link_field: &str,
    ) -> Result<CommandResponse, EngineError> {
        let mut tx = self.store.begin().await?;
        match self
            .delete_with_links_in(tx.as_mut(), principal, parent, P::CLASS_NAME, link_field)
            .await
        {
            Ok(response) => {
                tx.commit().await?;
                Ok(response)
            }
            Err(err) => {
                tx.rollback().await?;
                Err(err)
            }
        }
    }

    async fn delete_with_links_in(
        &self,
        tx: &mut dyn StoreTx,
        principal: &Principal,
        parent: StoredEntity,
        parent_class: &str,
        link_field: &str,
    ) -> Result<CommandResponse, EngineError> {
        let transaction = TransactionService::start_in(tx).await?;
        let links = tx
            .find_entities(AnnotationTerm::CLASS_NAME, link_field, &parent.id.to_string())
            .await?;

        tracing::debug!(
            parent = %parent.id,
            links = links.len(),
            transaction_id = %transaction.id,
            "cascading delete"
        );

        for link in links {
            self.executor
                .execute_in(
                    tx,
                    CommandKind::Delete,
                    AnnotationTerm::CLASS_NAME,
                    Some(link),
                    json!({}),
                    principal.user_id,
                    Some(transaction.id),
                )
                .await?;
        }

        self.executor
            .execute_in(
                tx,
                CommandKind::Delete,
                parent_class,
                Some(parent),
                json!({}),
                principal.user_id,
                Some(transaction.id),
            )
            .await
    }
}

/// Stamp `user` into an object payload that names no user of its own.
pub(crate) fn stamp_user(payload: &mut JsonValue, user: annostack_core::UserId) {
    if let Some(map) = payload.as_object_mut() {
        map.entry("user").or_insert_with(|| json!(user));
    }
}

/// Id of the entity carried under `key` in a response.
pub(crate) fn response_entity_id(response: &CommandResponse, key: &str) -> Result<EntityId, EngineError> {
    response
        .payload(key)
        .and_then(|p| p.get("id"))
        .and_then(JsonValue::as_str)
        .ok_or_else(|| EngineError::Store(format!("response carries no {key} id")))?
        .parse::<EntityId>()
        .map_err(EngineError::from)
}
