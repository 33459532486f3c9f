use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue, json};

use annostack_core::entity::payload;
use annostack_core::{ContainerId, DomainEntity, DomainError, DomainResult, EntityId, ResolvedRefs};

/// A named, coloured label within an ontology.
///
/// Terms are scoped to their ontology for access control and name
/// uniqueness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub id: EntityId,
    pub name: String,
    pub color: String,
    pub ontology: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Term {
    fn validate_color(color: &str) -> DomainResult<String> {
        let hex = color.trim();
        let ok = hex.len() == 7
            && hex.starts_with('#')
            && hex[1..].chars().all(|c| c.is_ascii_hexdigit());
        if ok {
            Ok(hex.to_ascii_uppercase())
        } else {
            Err(DomainError::validation(format!(
                "color must be a #RRGGBB value, got '{color}'"
            )))
        }
    }
}

impl DomainEntity for Term {
    const CLASS_NAME: &'static str = "ontology.term";
    const RESPONSE_KEY: &'static str = "term";
    const LABEL: &'static str = "Term";

    fn id(&self) -> EntityId {
        self.id
    }

    fn container(&self) -> ContainerId {
        self.ontology.into()
    }

    fn from_payload(id: EntityId, payload: &JsonValue, _refs: &ResolvedRefs) -> DomainResult<Self> {
        Ok(Self {
            id,
            name: payload::required_str(payload, "name")?.trim().to_string(),
            color: Self::validate_color(payload::required_str(payload, "color")?)?,
            ontology: payload::required_id(payload, "ontology")?,
            comment: payload::optional_str(payload, "comment").map(str::to_string),
        })
    }

    fn apply_edit(&mut self, payload: &JsonValue, _refs: &ResolvedRefs) -> DomainResult<()> {
        if let Some(ontology) = payload::optional_id::<EntityId>(payload, "ontology")? {
            if ontology != self.ontology {
                return Err(DomainError::validation("a term cannot move to another ontology"));
            }
        }
        if payload.get("name").is_some() {
            self.name = payload::required_str(payload, "name")?.trim().to_string();
        }
        if let Some(color) = payload::optional_str(payload, "color") {
            self.color = Self::validate_color(color)?;
        }
        match payload.get("comment") {
            Some(JsonValue::Null) => self.comment = None,
            Some(JsonValue::String(c)) => self.comment = Some(c.clone()),
            _ => {}
        }
        Ok(())
    }

    fn unique_key(&self) -> Option<String> {
        Some(format!("{}:{}", self.ontology, self.name.to_lowercase()))
    }

    fn message_params(&self) -> Vec<String> {
        vec![self.id.to_string(), self.name.clone(), self.ontology.to_string()]
    }

    fn callback(&self) -> Map<String, JsonValue> {
        let mut map = Map::new();
        map.insert("ontologyID".into(), json!(self.ontology));
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(name: &str, ontology: EntityId) -> Term {
        Term::from_payload(
            EntityId::new(),
            &json!({"name": name, "color": "#ff0000", "ontology": ontology.to_string()}),
            &ResolvedRefs::new(),
        )
        .unwrap()
    }

    #[test]
    fn builds_from_payload_with_normalized_color() {
        let ontology = EntityId::new();
        let term = create(" Tumor ", ontology);
        assert_eq!(term.name, "Tumor");
        assert_eq!(term.color, "#FF0000");
        assert_eq!(term.container(), ContainerId::from(ontology));
        assert_eq!(term.callback()["ontologyID"], json!(ontology));
    }

    #[test]
    fn rejects_missing_name_and_bad_color() {
        let refs = ResolvedRefs::new();
        let ontology = EntityId::new().to_string();
        let missing = Term::from_payload(EntityId::new(), &json!({"color": "#000000", "ontology": ontology}), &refs);
        assert_eq!(missing.unwrap_err(), DomainError::validation("name is required"));

        let bad = Term::from_payload(
            EntityId::new(),
            &json!({"name": "x", "color": "red", "ontology": ontology}),
            &refs,
        );
        assert!(matches!(bad, Err(DomainError::Validation(_))));
    }

    #[test]
    fn unique_key_is_case_insensitive_within_ontology() {
        let ontology = EntityId::new();
        assert_eq!(create("Tumor", ontology).unique_key(), create("tumor", ontology).unique_key());
        assert_ne!(create("Tumor", ontology).unique_key(), create("Tumor", EntityId::new()).unique_key());
    }

    #[test]
    fn edit_applies_present_fields_only() {
        let mut term = create("Tumor", EntityId::new());
        term.apply_edit(&json!({"color": "#00ff00"}), &ResolvedRefs::new()).unwrap();
        assert_eq!(term.name, "Tumor");
        assert_eq!(term.color, "#00FF00");

        let err = term.apply_edit(&json!({"name": ""}), &ResolvedRefs::new()).unwrap_err();
        assert_eq!(err, DomainError::validation("name is required"));
    }

    #[test]
    fn edit_refuses_ontology_change() {
        let mut term = create("Tumor", EntityId::new());
        let other = EntityId::new().to_string();
        assert!(term.apply_edit(&json!({"ontology": other}), &ResolvedRefs::new()).is_err());
    }

    mod props {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: the serialized snapshot deserializes back to an equal term.
            #[test]
            fn snapshot_round_trips(
                name in "[A-Za-z][A-Za-z0-9 ]{0,40}",
                color in "#[0-9A-F]{6}",
                comment in proptest::option::of("[a-z ]{0,20}"),
            ) {
                let term = Term {
                    id: EntityId::new(),
                    name,
                    color,
                    ontology: EntityId::new(),
                    comment,
                };
                let snapshot = serde_json::to_value(&term).unwrap();
                let back: Term = serde_json::from_value(snapshot).unwrap();
                prop_assert_eq!(back, term);
            }

            /// Property: an edit carrying only a name changes nothing else and is idempotent.
            #[test]
            fn rename_is_idempotent(name in "[A-Za-z][A-Za-z0-9]{0,30}") {
                let mut term = create("Start", EntityId::new());
                let before = term.clone();
                let edit = json!({"name": name.clone()});
                term.apply_edit(&edit, &ResolvedRefs::new()).unwrap();
                let once = term.clone();
                term.apply_edit(&edit, &ResolvedRefs::new()).unwrap();

                prop_assert_eq!(&once, &term);
                prop_assert_eq!(&term.name, &name);
                prop_assert_eq!(term.color, before.color);
                prop_assert_eq!(term.ontology, before.ontology);
            }
        }
    }
}
