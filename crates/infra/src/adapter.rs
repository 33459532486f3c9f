//! Object-safe domain adapters and the class-name registry.
//!
//! The executor only ever sees `dyn DomainAdapter`. Each participating entity
//! type gets one through the generic [`TypedAdapter`], so entity crates only
//! implement [`DomainEntity`].

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};

use annostack_core::{
    CommandKind, ContainerId, DomainEntity, DomainError, DomainResult, EntityId, EntityRef,
    ProjectId, ResolvedRefs,
};
use annostack_ontology::{AnnotationTerm, Term, UserAnnotation};

use crate::error::EngineError;

/// Everything the engine needs to know about one entity state.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityView {
    pub id: EntityId,
    /// Serialized snapshot, the before/after state of commands.
    pub data: JsonValue,
    pub container: ContainerId,
    pub project: Option<ProjectId>,
    pub unique_key: Option<String>,
    pub message_params: Vec<String>,
    pub callback: Map<String, JsonValue>,
}

/// Engine-facing, type-erased half of the adapter contract.
pub trait DomainAdapter: Send + Sync {
    fn class_name(&self) -> &'static str;

    fn response_key(&self) -> &'static str;

    fn label(&self) -> &'static str;

    fn references(&self, payload: &JsonValue) -> DomainResult<Vec<EntityRef>>;

    /// Construct a new entity (pre-insert hook applied).
    fn build(&self, id: EntityId, payload: &JsonValue, refs: &ResolvedRefs) -> DomainResult<EntityView>;

    /// Apply an edit payload to a stored snapshot.
    fn edit(&self, current: &JsonValue, payload: &JsonValue, refs: &ResolvedRefs) -> DomainResult<EntityView>;

    /// Interpret a stored snapshot.
    fn describe(&self, data: &JsonValue) -> DomainResult<EntityView>;

    /// Post-change hook over response data.
    fn decorate(&self, kind: CommandKind, data: &mut Map<String, JsonValue>);
}

/// [`DomainAdapter`] for any [`DomainEntity`].
pub struct TypedAdapter<E>(PhantomData<fn() -> E>);

impl<E: DomainEntity> TypedAdapter<E> {
    pub fn new() -> Self {
        Self(PhantomData)
    }

    fn parse(data: &JsonValue) -> DomainResult<E> {
        serde_json::from_value(data.clone())
            .map_err(|e| DomainError::validation(format!("unreadable {} snapshot: {e}", E::LABEL)))
    }

    fn view(entity: &E) -> DomainResult<EntityView> {
        let data = serde_json::to_value(entity)
            .map_err(|e| DomainError::validation(format!("{} is not serializable: {e}", E::LABEL)))?;
        Ok(EntityView {
            id: entity.id(),
            data,
            container: entity.container(),
            project: entity.project(),
            unique_key: entity.unique_key(),
            message_params: entity.message_params(),
            callback: entity.callback(),
        })
    }
}

impl<E: DomainEntity> Default for TypedAdapter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: DomainEntity> DomainAdapter for TypedAdapter<E> {
    fn class_name(&self) -> &'static str {
        E::CLASS_NAME
    }

    fn response_key(&self) -> &'static str {
        E::RESPONSE_KEY
    }

    fn label(&self) -> &'static str {
        E::LABEL
    }

    fn references(&self, payload: &JsonValue) -> DomainResult<Vec<EntityRef>> {
        E::references(payload)
    }

    fn build(&self, id: EntityId, payload: &JsonValue, refs: &ResolvedRefs) -> DomainResult<EntityView> {
        let mut entity = E::from_payload(id, payload, refs)?;
        entity.before_add();
        Self::view(&entity)
    }

    fn edit(&self, current: &JsonValue, payload: &JsonValue, refs: &ResolvedRefs) -> DomainResult<EntityView> {
        let mut entity = Self::parse(current)?;
        let id = entity.id();
        entity.apply_edit(payload, refs)?;
        if entity.id() != id {
            return Err(DomainError::validation(format!("{} id cannot change", E::LABEL)));
        }
        Self::view(&entity)
    }

    fn describe(&self, data: &JsonValue) -> DomainResult<EntityView> {
        Self::view(&Self::parse(data)?)
    }

    fn decorate(&self, kind: CommandKind, data: &mut Map<String, JsonValue>) {
        E::decorate_response(kind, data);
    }
}

/// Explicit class-name → adapter registration table.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: HashMap<&'static str, Arc<dyn DomainAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every ontology entity registered.
    pub fn ontology() -> Self {
        let mut registry = Self::new();
        registry.register::<Term>();
        registry.register::<UserAnnotation>();
        registry.register::<AnnotationTerm>();
        registry
    }

    pub fn register<E: DomainEntity>(&mut self) -> &mut Self {
        self.adapters
            .insert(E::CLASS_NAME, Arc::new(TypedAdapter::<E>::new()));
        self
    }

    pub fn get(&self, class_name: &str) -> Result<Arc<dyn DomainAdapter>, EngineError> {
        self.adapters
            .get(class_name)
            .cloned()
            .ok_or_else(|| EngineError::UnknownDomainClass(class_name.to_string()))
    }

    pub fn class_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.adapters.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl core::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("classes", &self.class_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn unknown_class_is_reported() {
        let registry = AdapterRegistry::ontology();
        assert_eq!(
            registry.get("ontology.unknown").err(),
            Some(EngineError::UnknownDomainClass("ontology.unknown".into()))
        );
        assert_eq!(registry.class_names().len(), 3);
    }

    #[test]
    fn build_applies_pre_insert_hook() {
        let registry = AdapterRegistry::ontology();
        let adapter = registry.get(UserAnnotation::CLASS_NAME).unwrap();
        let view = adapter
            .build(
                EntityId::new(),
                &json!({
                    "location": "point(1 2)",
                    "image": EntityId::new().to_string(),
                    "project": ProjectId::new().to_string(),
                    "user": annostack_core::UserId::new().to_string(),
                }),
                &ResolvedRefs::new(),
            )
            .unwrap();
        assert_eq!(view.data["location"], json!("POINT (1 2)"));
        assert!(view.project.is_some());
    }

    #[test]
    fn describe_round_trips_snapshots() {
        let registry = AdapterRegistry::ontology();
        let adapter = registry.get(Term::CLASS_NAME).unwrap();
        let id = EntityId::new();
        let built = adapter
            .build(
                id,
                &json!({"name": "Stroma", "color": "#00FF00", "ontology": EntityId::new().to_string()}),
                &ResolvedRefs::new(),
            )
            .unwrap();
        let described = adapter.describe(&built.data).unwrap();
        assert_eq!(described, built);
        assert_eq!(described.id, id);
    }
}
