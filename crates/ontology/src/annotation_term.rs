use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue, json};

use annostack_core::entity::payload;
use annostack_core::{
    ContainerId, DomainEntity, DomainError, DomainResult, EntityId, EntityRef, ProjectId,
    ResolvedRefs, UserId,
};

use crate::{Term, UserAnnotation};

/// Association between a user annotation and an ontology term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationTerm {
    pub id: EntityId,
    pub annotation: EntityId,
    pub term: EntityId,
    pub user: UserId,
    /// Copied from the annotation so access checks need no extra lookup.
    pub project: ProjectId,
}

impl DomainEntity for AnnotationTerm {
    const CLASS_NAME: &'static str = "ontology.annotationterm";
    const RESPONSE_KEY: &'static str = "annotationterm";
    const LABEL: &'static str = "AnnotationTerm";

    fn id(&self) -> EntityId {
        self.id
    }

    fn container(&self) -> ContainerId {
        self.project.into()
    }

    fn project(&self) -> Option<ProjectId> {
        Some(self.project)
    }

    fn references(payload: &JsonValue) -> DomainResult<Vec<EntityRef>> {
        Ok(vec![
            EntityRef::of::<UserAnnotation>(payload::required_id(payload, "annotation")?),
            EntityRef::of::<Term>(payload::required_id(payload, "term")?),
        ])
    }

    fn from_payload(id: EntityId, payload: &JsonValue, refs: &ResolvedRefs) -> DomainResult<Self> {
        let annotation: UserAnnotation = refs.get(payload::required_id(payload, "annotation")?)?;
        let term: Term = refs.get(payload::required_id(payload, "term")?)?;
        let user = payload::optional_id(payload, "user")?.unwrap_or(annotation.user);

        Ok(Self {
            id,
            annotation: annotation.id,
            term: term.id,
            user,
            project: annotation.project,
        })
    }

    fn apply_edit(&mut self, _payload: &JsonValue, _refs: &ResolvedRefs) -> DomainResult<()> {
        Err(DomainError::validation("an annotation-term link cannot be edited, delete and re-add it"))
    }

    fn unique_key(&self) -> Option<String> {
        Some(format!("{}:{}", self.annotation, self.term))
    }

    fn message_params(&self) -> Vec<String> {
        vec![self.id.to_string(), self.annotation.to_string(), self.term.to_string()]
    }

    fn callback(&self) -> Map<String, JsonValue> {
        let mut map = Map::new();
        map.insert("annotationID".into(), json!(self.annotation));
        map.insert("termID".into(), json!(self.term));
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures() -> (UserAnnotation, Term, ResolvedRefs) {
        let annotation = UserAnnotation {
            id: EntityId::new(),
            location: "POINT (1 1)".into(),
            image: EntityId::new(),
            project: ProjectId::new(),
            user: UserId::new(),
            geometry_compression: 0.0,
        };
        let term = Term {
            id: EntityId::new(),
            name: "Tumor".into(),
            color: "#FF0000".into(),
            ontology: EntityId::new(),
            comment: None,
        };
        let mut refs = ResolvedRefs::new();
        refs.insert(UserAnnotation::CLASS_NAME, annotation.id, serde_json::to_value(&annotation).unwrap());
        refs.insert(Term::CLASS_NAME, term.id, serde_json::to_value(&term).unwrap());
        (annotation, term, refs)
    }

    #[test]
    fn declares_both_references() {
        let (a, t, _) = fixtures();
        let refs = AnnotationTerm::references(&json!({
            "annotation": a.id.to_string(),
            "term": t.id.to_string(),
        }))
        .unwrap();
        assert_eq!(refs, vec![EntityRef::of::<UserAnnotation>(a.id), EntityRef::of::<Term>(t.id)]);
    }

    #[test]
    fn takes_project_and_user_from_annotation() {
        let (a, t, refs) = fixtures();
        let link = AnnotationTerm::from_payload(
            EntityId::new(),
            &json!({"annotation": a.id.to_string(), "term": t.id.to_string()}),
            &refs,
        )
        .unwrap();
        assert_eq!(link.project, a.project);
        assert_eq!(link.user, a.user);
        assert_eq!(link.unique_key(), Some(format!("{}:{}", a.id, t.id)));
    }

    #[test]
    fn missing_term_is_not_found() {
        let (a, _, refs) = fixtures();
        let err = AnnotationTerm::from_payload(
            EntityId::new(),
            &json!({"annotation": a.id.to_string(), "term": EntityId::new().to_string()}),
            &refs,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn links_are_not_editable() {
        let (a, t, refs) = fixtures();
        let mut link = AnnotationTerm::from_payload(
            EntityId::new(),
            &json!({"annotation": a.id.to_string(), "term": t.id.to_string()}),
            &refs,
        )
        .unwrap();
        assert!(matches!(
            link.apply_edit(&json!({}), &refs),
            Err(DomainError::Validation(_))
        ));
    }
}
