use serde_json::{Value as JsonValue, json};
use tracing::instrument;

use annostack_auth::{Permission, Principal};
use annostack_commands::{CommandKind, CommandResponse};
use annostack_core::entity::payload;
use annostack_core::{DomainEntity, EntityId};
use annostack_ontology::{AnnotationTerm, UserAnnotation};

use super::{EntityService, ServiceContext, response_entity_id, stamp_user};
use crate::error::EngineError;
use crate::store::StoreTx;
use crate::transaction::TransactionService;

/// Annotation operations, including the composite ones that also touch
/// annotation-term links.
#[derive(Clone)]
pub struct AnnotationService {
    annotations: EntityService<UserAnnotation>,
}

impl AnnotationService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self {
            annotations: EntityService::new(ctx),
        }
    }

    /// Plain CRUD on annotations.
    pub fn entities(&self) -> &EntityService<UserAnnotation> {
        &self.annotations
    }

    /// Create an annotation, linking it to every id listed under `term` or
    /// `terms`.
    ///
    /// Without terms this is a plain add. With terms, the annotation and its
    /// links are recorded under one transaction, so a single undo removes
    /// them all. An unknown term fails the whole call.
    #[instrument(skip_all, fields(user = %principal.user_id), err)]
    pub async fn add_with_terms(
        &self,
        principal: &Principal,
        mut payload: JsonValue,
    ) -> Result<CommandResponse, EngineError> {
        let mut terms: Vec<EntityId> = payload::id_list(&payload, "term")?;
        for id in payload::id_list::<EntityId>(&payload, "terms")? {
            if !terms.contains(&id) {
                terms.push(id);
            }
        }
        if terms.is_empty() {
            return self.annotations.add(principal, payload).await;
        }

        stamp_user(&mut payload, principal.user_id);
        let ctx = self.annotations.context();
        let preview = ctx.executor.preview(UserAnnotation::CLASS_NAME, &payload).await?;
        ctx.acl.check(principal, preview.container, &Permission::WRITE)?;

        let mut tx = ctx.store.begin().await?;
        match self
            .add_with_terms_in(tx.as_mut(), principal, payload, &terms)
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

    async fn add_with_terms_in(
        &self,
        tx: &mut dyn StoreTx,
        principal: &Principal,
        payload: JsonValue,
        terms: &[EntityId],
    ) -> Result<CommandResponse, EngineError> {
        let ctx = self.annotations.context();
        let transaction = TransactionService::start_in(tx).await?;

        let mut response = ctx
            .executor
            .execute_in(
                tx,
                CommandKind::Add,
                UserAnnotation::CLASS_NAME,
                None,
                payload,
                principal.user_id,
                Some(transaction.id),
            )
            .await?;
        let annotation = response_entity_id(&response, "annotation")?;

        for term in terms {
            ctx.executor
                .execute_in(
                    tx,
                    CommandKind::Add,
                    AnnotationTerm::CLASS_NAME,
                    None,
                    json!({ "annotation": annotation, "term": term, "user": principal.user_id }),
                    principal.user_id,
                    Some(transaction.id),
                )
                .await?;
        }

        if let Some(JsonValue::Object(body)) = response.data.get_mut("annotation") {
            body.insert("term".into(), json!(terms));
        }
        Ok(response)
    }

    pub async fn update(
        &self,
        principal: &Principal,
        id: EntityId,
        payload: JsonValue,
    ) -> Result<CommandResponse, EngineError> {
        self.annotations.update(principal, id, payload).await
    }

    /// Delete an annotation and every term link pointing at it.
    #[instrument(skip_all, fields(user = %principal.user_id, %id), err)]
    pub async fn delete_with_dependencies(
        &self,
        principal: &Principal,
        id: EntityId,
    ) -> Result<CommandResponse, EngineError> {
        let stored = self.annotations.authorize_delete(principal, id).await?;
        self.annotations
            .context()
            .delete_with_links::<UserAnnotation>(principal, stored, "annotation")
            .await
    }
}
