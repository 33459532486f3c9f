use std::marker::PhantomData;

use serde_json::Value as JsonValue;
use tracing::instrument;

use annostack_auth::{Permission, Principal};
use annostack_commands::{CommandKind, CommandResponse};
use annostack_core::{DomainEntity, DomainError, EntityId};

use super::{ServiceContext, stamp_user};
use crate::error::EngineError;
use crate::store::StoredEntity;

/// CRUD over one entity class, access-checked and routed through the executor.
///
/// Reads need `read` on the entity's container, add/update need `write`,
/// delete needs `delete`.
pub struct EntityService<E> {
    ctx: ServiceContext,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for EntityService<E> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: DomainEntity> EntityService<E> {
    pub fn new(ctx: ServiceContext) -> Self {
        Self {
            ctx,
            _entity: PhantomData,
        }
    }

    pub async fn get(&self, principal: &Principal, id: EntityId) -> Result<E, EngineError> {
        let stored = self.load(id).await?;
        let entity = parse::<E>(&stored)?;
        self.ctx
            .acl
            .check(principal, entity.container(), &Permission::READ)?;
        Ok(entity)
    }

    /// Every entity of the class the principal may read, oldest first.
    pub async fn list(&self, principal: &Principal) -> Result<Vec<E>, EngineError> {
        let stored = self.ctx.store.list_entities(E::CLASS_NAME).await?;
        let mut visible = Vec::with_capacity(stored.len());
        for s in &stored {
            let entity = parse::<E>(s)?;
            if self
                .ctx
                .acl
                .check(principal, entity.container(), &Permission::READ)
                .is_ok()
            {
                visible.push(entity);
            }
        }
        Ok(visible)
    }

    /// Create an entity. Payloads without an explicit `user` are stamped with
    /// the acting user.
    #[instrument(skip_all, fields(class = E::CLASS_NAME, user = %principal.user_id), err)]
    pub async fn add(&self, principal: &Principal, mut payload: JsonValue) -> Result<CommandResponse, EngineError> {
        stamp_user(&mut payload, principal.user_id);
        let preview = self.ctx.executor.preview(E::CLASS_NAME, &payload).await?;
        self.ctx
            .acl
            .check(principal, preview.container, &Permission::WRITE)?;

        self.ctx
            .executor
            .execute(CommandKind::Add, E::CLASS_NAME, None, payload, principal.user_id, None)
            .await
    }

    #[instrument(skip_all, fields(class = E::CLASS_NAME, user = %principal.user_id, %id), err)]
    pub async fn update(
        &self,
        principal: &Principal,
        id: EntityId,
        payload: JsonValue,
    ) -> Result<CommandResponse, EngineError> {
        let stored = self.load(id).await?;
        let entity = parse::<E>(&stored)?;
        self.ctx
            .acl
            .check(principal, entity.container(), &Permission::WRITE)?;

        self.ctx
            .executor
            .execute(CommandKind::Edit, E::CLASS_NAME, Some(stored), payload, principal.user_id, None)
            .await
    }

    #[instrument(skip_all, fields(class = E::CLASS_NAME, user = %principal.user_id, %id), err)]
    pub async fn delete(&self, principal: &Principal, id: EntityId) -> Result<CommandResponse, EngineError> {
        let stored = self.authorize_delete(principal, id).await?;
        self.ctx
            .executor
            .execute(
                CommandKind::Delete,
                E::CLASS_NAME,
                Some(stored),
                JsonValue::Object(Default::default()),
                principal.user_id,
                None,
            )
            .await
    }

    /// Load the stored document and check `delete` on its container.
    pub(crate) async fn authorize_delete(&self, principal: &Principal, id: EntityId) -> Result<StoredEntity, EngineError> {
        let stored = self.load(id).await?;
        let entity = parse::<E>(&stored)?;
        self.ctx
            .acl
            .check(principal, entity.container(), &Permission::DELETE)?;
        Ok(stored)
    }

    pub(crate) fn context(&self) -> &ServiceContext {
        &self.ctx
    }

    async fn load(&self, id: EntityId) -> Result<StoredEntity, EngineError> {
        self.ctx
            .store
            .load_entity(E::CLASS_NAME, id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("{} {id}", E::LABEL)))
    }
}

fn parse<E: DomainEntity>(stored: &StoredEntity) -> Result<E, EngineError> {
    serde_json::from_value(stored.data.clone()).map_err(|e| {
        EngineError::from(DomainError::validation(format!(
            "unreadable {} {}: {e}",
            E::LABEL,
            stored.id
        )))
    })
}
