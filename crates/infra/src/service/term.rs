use serde_json::Value as JsonValue;
use tracing::instrument;

use annostack_auth::Principal;
use annostack_commands::CommandResponse;
use annostack_core::EntityId;
use annostack_ontology::Term;

use super::{EntityService, ServiceContext};
use crate::error::EngineError;

/// Term operations. Deleting a term also removes the annotation links that
/// use it.
#[derive(Clone)]
pub struct TermService {
    terms: EntityService<Term>,
}

impl TermService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self {
            terms: EntityService::new(ctx),
        }
    }

    pub fn entities(&self) -> &EntityService<Term> {
        &self.terms
    }

    pub async fn add(&self, principal: &Principal, payload: JsonValue) -> Result<CommandResponse, EngineError> {
        self.terms.add(principal, payload).await
    }

    pub async fn update(
        &self,
        principal: &Principal,
        id: EntityId,
        payload: JsonValue,
    ) -> Result<CommandResponse, EngineError> {
        self.terms.update(principal, id, payload).await
    }

    #[instrument(skip_all, fields(user = %principal.user_id, %id), err)]
    pub async fn delete(&self, principal: &Principal, id: EntityId) -> Result<CommandResponse, EngineError> {
        let stored = self.terms.authorize_delete(principal, id).await?;
        self.terms
            .context()
            .delete_with_links::<Term>(principal, stored, "term")
            .await
    }
}
