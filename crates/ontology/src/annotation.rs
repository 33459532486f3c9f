use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue, json};

use annostack_core::entity::payload;
use annostack_core::{
    CommandKind, ContainerId, DomainEntity, DomainError, DomainResult, EntityId, ProjectId,
    ResolvedRefs, UserId,
};

use crate::geometry::normalize_wkt;

/// Shape drawn by a user on an image of a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAnnotation {
    pub id: EntityId,
    /// WKT geometry.
    pub location: String,
    pub image: EntityId,
    pub project: ProjectId,
    pub user: UserId,
    #[serde(default)]
    pub geometry_compression: f64,
}

fn compression(payload: &JsonValue) -> DomainResult<Option<f64>> {
    match payload.get("geometryCompression") {
        None | Some(JsonValue::Null) => Ok(None),
        Some(v) => v
            .as_f64()
            .filter(|c| *c >= 0.0)
            .map(Some)
            .ok_or_else(|| DomainError::validation("geometryCompression must be a non-negative number")),
    }
}

impl DomainEntity for UserAnnotation {
    const CLASS_NAME: &'static str = "ontology.userannotation";
    const RESPONSE_KEY: &'static str = "userannotation";
    const LABEL: &'static str = "Annotation";

    fn id(&self) -> EntityId {
        self.id
    }

    fn container(&self) -> ContainerId {
        self.project.into()
    }

    fn project(&self) -> Option<ProjectId> {
        Some(self.project)
    }

    fn from_payload(id: EntityId, payload: &JsonValue, _refs: &ResolvedRefs) -> DomainResult<Self> {
        let location = payload::required_str(payload, "location")?;
        normalize_wkt(location)?;
        Ok(Self {
            id,
            location: location.to_string(),
            image: payload::required_id(payload, "image")?,
            project: payload::required_id(payload, "project")?,
            user: payload::required_id(payload, "user")?,
            geometry_compression: compression(payload)?.unwrap_or(0.0),
        })
    }

    fn apply_edit(&mut self, payload: &JsonValue, _refs: &ResolvedRefs) -> DomainResult<()> {
        if payload.get("location").is_some() {
            self.location = normalize_wkt(payload::required_str(payload, "location")?)?;
        }
        if let Some(c) = compression(payload)? {
            self.geometry_compression = c;
        }
        Ok(())
    }

    /// Stores geometries in canonical WKT form.
    fn before_add(&mut self) {
        if let Ok(wkt) = normalize_wkt(&self.location) {
            self.location = wkt;
        }
    }

    fn message_params(&self) -> Vec<String> {
        vec![self.id.to_string(), self.image.to_string()]
    }

    fn callback(&self) -> Map<String, JsonValue> {
        let mut map = Map::new();
        map.insert("annotationID".into(), json!(self.id));
        map.insert("imageID".into(), json!(self.image));
        map
    }

    /// Clients address user annotations under the generic `annotation` key.
    fn decorate_response(_kind: CommandKind, data: &mut Map<String, JsonValue>) {
        if let Some(value) = data.remove(Self::RESPONSE_KEY) {
            data.insert("annotation".into(), value);
        }
    }
}
