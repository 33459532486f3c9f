//! Domain adapter contract: what an entity type exposes to the command engine.
//!
//! The engine never inspects concrete entity types. It only needs identity, a
//! container for access-control scoping, construction from a payload, in-place
//! edits, full JSON serialization (for before/after snapshots) and a few
//! presentation hooks. Everything else is the entity's business.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::{DomainError, DomainResult};
use crate::id::{ContainerId, EntityId, ProjectId};

/// Kind of structural change a command records.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Add,
    Edit,
    Delete,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::Add => "add",
            CommandKind::Edit => "edit",
            CommandKind::Delete => "delete",
        }
    }

    /// Capitalised form used in callback method names (`AddTermCommand`).
    pub fn method_prefix(&self) -> &'static str {
        match self {
            CommandKind::Add => "Add",
            CommandKind::Edit => "Edit",
            CommandKind::Delete => "Delete",
        }
    }

    /// Past-tense verb used in display messages.
    pub fn verb(&self) -> &'static str {
        match self {
            CommandKind::Add => "added",
            CommandKind::Edit => "edited",
            CommandKind::Delete => "deleted",
        }
    }

    /// The kind of change that reverses this one.
    pub fn inverse(&self) -> CommandKind {
        match self {
            CommandKind::Add => CommandKind::Delete,
            CommandKind::Edit => CommandKind::Edit,
            CommandKind::Delete => CommandKind::Add,
        }
    }

    /// HTTP-style status of a successful change of this kind.
    pub fn success_status(&self) -> u16 {
        match self {
            CommandKind::Add => 201,
            CommandKind::Edit | CommandKind::Delete => 200,
        }
    }
}

impl core::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reference from a payload to another stored entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityRef {
    pub class_name: &'static str,
    pub id: EntityId,
}

impl EntityRef {
    pub fn new(class_name: &'static str, id: EntityId) -> Self {
        Self { class_name, id }
    }

    pub fn of<E: DomainEntity>(id: EntityId) -> Self {
        Self::new(E::CLASS_NAME, id)
    }
}

/// Reference-resolution context handed to entity construction.
///
/// The engine loads every [`EntityRef`] an entity declares before building it,
/// so construction itself stays pure.
#[derive(Debug, Clone, Default)]
pub struct ResolvedRefs {
    entries: HashMap<(String, EntityId), JsonValue>,
}

impl ResolvedRefs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, class_name: impl Into<String>, id: EntityId, data: JsonValue) {
        self.entries.insert((class_name.into(), id), data);
    }

    /// Typed access to a resolved reference.
    pub fn get<E: DomainEntity>(&self, id: EntityId) -> DomainResult<E> {
        let data = self
            .entries
            .get(&(E::CLASS_NAME.to_string(), id))
            .ok_or_else(|| DomainError::not_found(format!("{} {}", E::LABEL, id)))?;

        serde_json::from_value(data.clone())
            .map_err(|e| DomainError::validation(format!("{} {} is unreadable: {e}", E::LABEL, id)))
    }
}

/// Typed half of the domain adapter contract.
///
/// Implemented by every entity struct that participates in the command engine.
/// The serde representation is the snapshot format: whatever `Serialize`
/// produces is stored as a command's before/after state and must deserialize
/// back into an equal entity.
pub trait DomainEntity:
    Serialize + DeserializeOwned + Clone + core::fmt::Debug + Send + Sync + 'static
{
    /// Stable class name used to route commands to this entity's adapter.
    const CLASS_NAME: &'static str;

    /// Key under which the entity payload is returned in responses.
    const RESPONSE_KEY: &'static str;

    /// Display name used in messages and callback method names.
    const LABEL: &'static str;

    fn id(&self) -> EntityId;

    /// Access-control container the entity lives in.
    fn container(&self) -> ContainerId;

    /// Project recorded on commands and history rows, when the entity has one.
    fn project(&self) -> Option<ProjectId> {
        None
    }

    /// Entities referenced by a payload, loaded before construction/edit.
    fn references(payload: &JsonValue) -> DomainResult<Vec<EntityRef>> {
        let _ = payload;
        Ok(Vec::new())
    }

    /// Build a new entity from a creation payload.
    fn from_payload(id: EntityId, payload: &JsonValue, refs: &ResolvedRefs) -> DomainResult<Self>;

    /// Apply an edit payload to an existing entity.
    fn apply_edit(&mut self, payload: &JsonValue, refs: &ResolvedRefs) -> DomainResult<()>;

    /// Pre-insert hook.
    fn before_add(&mut self) {}

    /// Uniqueness key among live entities of the same class.
    fn unique_key(&self) -> Option<String> {
        None
    }

    /// Parameters rendered into display messages.
    fn message_params(&self) -> Vec<String>;

    /// Cross-reference ids returned to clients for optimistic-UI reconciliation.
    fn callback(&self) -> Map<String, JsonValue> {
        Map::new()
    }

    /// Post-change hook over the response data map.
    fn decorate_response(kind: CommandKind, data: &mut Map<String, JsonValue>) {
        let _ = (kind, data);
    }
}

/// Payload field helpers shared by entity implementations.
pub mod payload {
    use core::str::FromStr;

    use serde_json::Value as JsonValue;

    use crate::error::{DomainError, DomainResult};

    pub fn optional_str<'a>(payload: &'a JsonValue, field: &str) -> Option<&'a str> {
        payload.get(field).and_then(|v| v.as_str())
    }

    pub fn required_str<'a>(payload: &'a JsonValue, field: &str) -> DomainResult<&'a str> {
        match optional_str(payload, field) {
            Some(s) if !s.trim().is_empty() => Ok(s),
            _ => Err(DomainError::validation(format!("{field} is required"))),
        }
    }

    pub fn optional_id<T>(payload: &JsonValue, field: &str) -> DomainResult<Option<T>>
    where
        T: FromStr<Err = DomainError>,
    {
        match payload.get(field) {
            None | Some(JsonValue::Null) => Ok(None),
            Some(JsonValue::String(s)) => s.parse().map(Some),
            Some(other) => Err(DomainError::validation(format!(
                "{field} must be an identifier string, got {other}"
            ))),
        }
    }

    pub fn required_id<T>(payload: &JsonValue, field: &str) -> DomainResult<T>
    where
        T: FromStr<Err = DomainError>,
    {
        optional_id(payload, field)?
            .ok_or_else(|| DomainError::validation(format!("{field} is required")))
    }

    /// Identifiers listed under `field`, accepting a single id or an array.
    pub fn id_list<T>(payload: &JsonValue, field: &str) -> DomainResult<Vec<T>>
    where
        T: FromStr<Err = DomainError>,
    {
        match payload.get(field) {
            None | Some(JsonValue::Null) => Ok(Vec::new()),
            Some(JsonValue::String(s)) => Ok(vec![s.parse()?]),
            Some(JsonValue::Array(items)) => items
                .iter()
                .map(|v| {
                    v.as_str()
                        .ok_or_else(|| DomainError::validation(format!("{field} entries must be strings")))?
                        .parse()
                })
                .collect(),
            Some(other) => Err(DomainError::validation(format!(
                "{field} must be an identifier or a list of identifiers, got {other}"
            ))),
        }
    }
}
