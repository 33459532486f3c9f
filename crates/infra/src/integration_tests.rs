//! Integration tests for the full command pipeline over the in-memory store.
//!
//! Tests: Service → Executor → Store (entity + ledger) → Undo/Redo
//!
//! Verifies:
//! - Undo restores the previous state exactly, redo reproduces the next one
//! - Fresh commands invalidate the redo stack
//! - Transactions undo and redo as one unit, in the right order
//! - Stacks are per user
//! - Reversal policies behave as configured on partial failure

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::{Value as JsonValue, json};

    use annostack_auth::{AccessPolicy, AllowAll, InMemoryAcl, Permission, Principal, Role};
    use annostack_commands::{CommandResponse, HistoryPrefix};
    use annostack_core::{CommandId, CommandKind, DomainEntity, EntityId, ProjectId, UserId};
    use annostack_ontology::{AnnotationTerm, Term, UserAnnotation};

    use crate::config::EngineConfig;
    use crate::engine::Engine;
    use crate::error::EngineError;
    use crate::service::response_entity_id;
    use crate::store::{HistoryFilter, Pagination};
    use crate::undo::{ReversalPolicy, UndoRedoOutcome};

    fn engine_with(policy: ReversalPolicy, acl: Arc<dyn AccessPolicy>) -> Engine {
        let config = EngineConfig {
            reversal_policy: policy,
            ..EngineConfig::default()
        };
        Engine::in_memory(acl, &config)
    }

    fn engine() -> Engine {
        engine_with(ReversalPolicy::AllOrNothing, Arc::new(AllowAll))
    }

    fn user() -> Principal {
        Principal::new(UserId::new(), vec![Role::USER])
    }

    fn term_payload(ontology: EntityId, name: &str) -> JsonValue {
        json!({ "name": name, "color": "#00ff00", "ontology": ontology })
    }

    fn annotation_payload(project: ProjectId) -> JsonValue {
        json!({
            "location": "POLYGON((0 0,10 0,10 10,0 0))",
            "image": EntityId::new(),
            "project": project,
        })
    }

    async fn add_term(engine: &Engine, principal: &Principal, ontology: EntityId, name: &str) -> (EntityId, CommandId) {
        let response = engine
            .terms
            .add(principal, term_payload(ontology, name))
            .await
            .unwrap();
        assert_eq!(response.status, 201);
        (response_entity_id(&response, "term").unwrap(), response.command_id.unwrap())
    }

    async fn stored_data(engine: &Engine, class_name: &str, id: EntityId) -> Option<JsonValue> {
        engine
            .store
            .load_entity(class_name, id)
            .await
            .unwrap()
            .map(|s| s.data)
    }

    fn applied(outcome: UndoRedoOutcome) -> Vec<CommandResponse> {
        match outcome {
            UndoRedoOutcome::Applied(responses) => responses,
            UndoRedoOutcome::Nothing(r) => panic!("expected applied reversal, got nothing: {}", r.message),
        }
    }

    #[tokio::test]
    async fn undo_restores_the_state_before_the_command() {
        let engine = engine();
        let alice = user();
        let ontology = EntityId::new();
        let (term, _) = add_term(&engine, &alice, ontology, "Tumor").await;
        let before = stored_data(&engine, Term::CLASS_NAME, term).await.unwrap();

        engine
            .terms
            .update(&alice, term, json!({ "name": "Stroma", "color": "#112233" }))
            .await
            .unwrap();
        assert_ne!(stored_data(&engine, Term::CLASS_NAME, term).await.unwrap(), before);

        let responses = applied(engine.undo_redo.undo(alice.user_id, None).await.unwrap());
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].status, 200);
        assert_eq!(stored_data(&engine, Term::CLASS_NAME, term).await.unwrap(), before);
    }

    #[tokio::test]
    async fn undo_then_redo_reproduces_the_state_after_the_command() {
        let engine = engine();
        let alice = user();
        let (term, _) = add_term(&engine, &alice, EntityId::new(), "Tumor").await;

        engine
            .terms
            .update(&alice, term, json!({ "comment": "reviewed" }))
            .await
            .unwrap();
        let after = stored_data(&engine, Term::CLASS_NAME, term).await.unwrap();

        applied(engine.undo_redo.undo(alice.user_id, None).await.unwrap());
        let responses = applied(engine.undo_redo.redo(alice.user_id, None).await.unwrap());

        assert_eq!(responses[0].status, 200);
        assert_eq!(stored_data(&engine, Term::CLASS_NAME, term).await.unwrap(), after);
    }

    #[tokio::test]
    async fn fresh_command_clears_the_redo_stack() {
        let engine = engine();
        let alice = user();
        let ontology = EntityId::new();

        add_term(&engine, &alice, ontology, "Tumor").await;
        applied(engine.undo_redo.undo(alice.user_id, None).await.unwrap());
        add_term(&engine, &alice, ontology, "Stroma").await;

        let outcome = engine.undo_redo.redo(alice.user_id, None).await.unwrap();
        assert!(matches!(outcome, UndoRedoOutcome::Nothing(_)));
        assert_eq!(outcome.status(), 200);
        assert_eq!(outcome.responses()[0].callback, None);
    }

    #[tokio::test]
    async fn empty_stacks_report_nothing_to_do() {
        let engine = engine();
        let alice = user();

        let undo = engine.undo_redo.undo(alice.user_id, None).await.unwrap();
        let redo = engine.undo_redo.redo(alice.user_id, None).await.unwrap();

        let UndoRedoOutcome::Nothing(undo) = undo else {
            panic!("expected nothing to undo");
        };
        let UndoRedoOutcome::Nothing(redo) = redo else {
            panic!("expected nothing to redo");
        };
        assert!(undo.success && redo.success);
        assert!(undo.message.contains("undo"));
        assert!(redo.message.contains("redo"));
    }

    #[tokio::test]
    async fn transaction_undoes_in_reverse_and_redoes_in_creation_order() {
        let engine = engine();
        let alice = user();
        let ontology = EntityId::new();
        let (earlier, _) = add_term(&engine, &alice, ontology, "Earlier").await;

        let transaction = engine.transactions.start().await.unwrap();
        let mut commands = Vec::new();
        let mut terms = Vec::new();
        for name in ["First", "Second"] {
            let response = engine
                .executor
                .execute(
                    CommandKind::Add,
                    Term::CLASS_NAME,
                    None,
                    term_payload(ontology, name),
                    alice.user_id,
                    Some(transaction.id),
                )
                .await
                .unwrap();
            commands.push(response.command_id.unwrap());
            terms.push(response_entity_id(&response, "term").unwrap());
        }
        let existing = engine
            .store
            .load_entity(Term::CLASS_NAME, terms[0])
            .await
            .unwrap();
        let edit = engine
            .executor
            .execute(
                CommandKind::Edit,
                Term::CLASS_NAME,
                existing,
                json!({ "name": "First renamed" }),
                alice.user_id,
                Some(transaction.id),
            )
            .await
            .unwrap();
        commands.push(edit.command_id.unwrap());

        let responses = applied(engine.undo_redo.undo(alice.user_id, None).await.unwrap());
        let undone: Vec<_> = responses.iter().map(|r| r.command_id.unwrap()).collect();
        let mut reversed = commands.clone();
        reversed.reverse();
        assert_eq!(undone, reversed);
        assert!(responses.iter().all(|r| r.status == 200));
        for term in &terms {
            assert!(stored_data(&engine, Term::CLASS_NAME, *term).await.is_none());
        }

        let history = engine
            .history
            .query_history(
                HistoryFilter {
                    user: Some(alice.user_id),
                    project: None,
                },
                Pagination::default(),
            )
            .await
            .unwrap();
        let undo_rows: Vec<_> = history
            .rows
            .iter()
            .filter(|r| r.prefix_action == HistoryPrefix::Undo)
            .map(|r| r.command_id)
            .collect();
        assert_eq!(undo_rows.len(), 3);
        for command in &commands {
            assert!(undo_rows.contains(command));
        }

        let responses = applied(engine.undo_redo.redo(alice.user_id, None).await.unwrap());
        let redone: Vec<_> = responses.iter().map(|r| r.command_id.unwrap()).collect();
        assert_eq!(redone, commands);
        assert_eq!(responses[0].status, 201);
        let first = stored_data(&engine, Term::CLASS_NAME, terms[0]).await.unwrap();
        assert_eq!(first["name"], "First renamed");

        // Undo the transaction again, then the command that preceded it.
        applied(engine.undo_redo.undo(alice.user_id, None).await.unwrap());
        let responses = applied(engine.undo_redo.undo(alice.user_id, None).await.unwrap());
        assert_eq!(responses.len(), 1);
        assert!(stored_data(&engine, Term::CLASS_NAME, earlier).await.is_none());
    }

    #[tokio::test]
    async fn undo_by_id_only_touches_that_command() {
        let engine = engine();
        let alice = user();
        let ontology = EntityId::new();
        let (first, first_command) = add_term(&engine, &alice, ontology, "First").await;
        let (second, _) = add_term(&engine, &alice, ontology, "Second").await;

        let responses = applied(engine.undo_redo.undo(alice.user_id, Some(first_command)).await.unwrap());
        assert_eq!(responses[0].command_id, Some(first_command));
        assert!(stored_data(&engine, Term::CLASS_NAME, first).await.is_none());
        assert!(stored_data(&engine, Term::CLASS_NAME, second).await.is_some());

        applied(engine.undo_redo.undo(alice.user_id, None).await.unwrap());
        assert!(stored_data(&engine, Term::CLASS_NAME, second).await.is_none());

        let again = engine.undo_redo.undo(alice.user_id, Some(first_command)).await.unwrap();
        assert!(matches!(again, UndoRedoOutcome::Nothing(_)));
    }

    #[tokio::test]
    async fn unknown_command_id_is_not_found() {
        let engine = engine();
        let err = engine
            .undo_redo
            .undo(UserId::new(), Some(CommandId::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
        assert_eq!(err.status(), 404);
    }

    #[tokio::test]
    async fn users_have_independent_stacks() {
        let engine = engine();
        let alice = user();
        let bob = user();
        let (term, command) = add_term(&engine, &alice, EntityId::new(), "Tumor").await;

        let outcome = engine.undo_redo.undo(bob.user_id, None).await.unwrap();
        assert!(matches!(outcome, UndoRedoOutcome::Nothing(_)));
        let outcome = engine.undo_redo.undo(bob.user_id, Some(command)).await.unwrap();
        assert!(matches!(outcome, UndoRedoOutcome::Nothing(_)));
        assert!(stored_data(&engine, Term::CLASS_NAME, term).await.is_some());

        applied(engine.undo_redo.undo(alice.user_id, None).await.unwrap());
        assert!(stored_data(&engine, Term::CLASS_NAME, term).await.is_none());
    }

    async fn latest_undo_command(engine: &Engine, user: UserId) -> Option<CommandId> {
        let mut tx = engine.store.begin().await.unwrap();
        let item = tx.latest_undo(user, None).await.unwrap();
        tx.rollback().await.unwrap();
        item.map(|i| i.command_id)
    }

    #[tokio::test]
    async fn stacks_stay_per_user_over_the_same_entity() {
        let engine = engine();
        let alice = user();
        let bob = user();
        let (term, alice_add) = add_term(&engine, &alice, EntityId::new(), "Tumor").await;
        let added = stored_data(&engine, Term::CLASS_NAME, term).await.unwrap();

        let bob_edit = engine
            .terms
            .update(&bob, term, json!({ "name": "Stroma" }))
            .await
            .unwrap()
            .command_id
            .unwrap();

        let responses = applied(engine.undo_redo.undo(alice.user_id, None).await.unwrap());
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].command_id, Some(alice_add));
        assert!(stored_data(&engine, Term::CLASS_NAME, term).await.is_none());
        assert_eq!(latest_undo_command(&engine, bob.user_id).await, Some(bob_edit));

        applied(engine.undo_redo.redo(alice.user_id, None).await.unwrap());
        let responses = applied(engine.undo_redo.undo(bob.user_id, None).await.unwrap());
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].command_id, Some(bob_edit));
        assert_eq!(responses[0].status, 200);
        assert_eq!(stored_data(&engine, Term::CLASS_NAME, term).await.unwrap(), added);

        assert_eq!(latest_undo_command(&engine, bob.user_id).await, None);
        assert_eq!(latest_undo_command(&engine, alice.user_id).await, Some(alice_add));
    }

    #[tokio::test]
    async fn annotation_add_undo_redo_round_trip() {
        let engine = engine();
        let alice = user();
        let project = ProjectId::new();

        let added = engine
            .annotations
            .add_with_terms(&alice, annotation_payload(project))
            .await
            .unwrap();
        assert_eq!(added.status, 201);
        assert!(added.payload("annotation").is_some());
        let id = response_entity_id(&added, "annotation").unwrap();
        let location = added.payload("annotation").unwrap()["location"].clone();
        assert_eq!(location, "POLYGON ((0 0, 10 0, 10 10, 0 0))");
        assert_eq!(added.callback.as_ref().unwrap()["annotationID"], json!(id));

        let undone = applied(engine.undo_redo.undo(alice.user_id, None).await.unwrap());
        assert_eq!(undone[0].status, 200);
        assert!(stored_data(&engine, UserAnnotation::CLASS_NAME, id).await.is_none());

        let redone = applied(engine.undo_redo.redo(alice.user_id, None).await.unwrap());
        assert_eq!(redone[0].status, 201);
        let restored = stored_data(&engine, UserAnnotation::CLASS_NAME, id).await.unwrap();
        assert_eq!(restored["location"], location);
        assert_eq!(restored["user"], json!(alice.user_id));
    }

    #[tokio::test]
    async fn annotation_with_terms_undoes_as_one_unit() {
        let engine = engine();
        let alice = user();
        let ontology = EntityId::new();
        let (tumor, _) = add_term(&engine, &alice, ontology, "Tumor").await;
        let (stroma, _) = add_term(&engine, &alice, ontology, "Stroma").await;

        let mut payload = annotation_payload(ProjectId::new());
        payload["terms"] = json!([tumor, stroma]);
        let added = engine.annotations.add_with_terms(&alice, payload).await.unwrap();
        let annotation = response_entity_id(&added, "annotation").unwrap();
        assert_eq!(added.payload("annotation").unwrap()["term"], json!([tumor, stroma]));

        let links = engine
            .store
            .find_entities(AnnotationTerm::CLASS_NAME, "annotation", &annotation.to_string())
            .await
            .unwrap();
        assert_eq!(links.len(), 2);

        let responses = applied(engine.undo_redo.undo(alice.user_id, None).await.unwrap());
        assert_eq!(responses.len(), 3);
        assert!(stored_data(&engine, UserAnnotation::CLASS_NAME, annotation).await.is_none());
        assert!(
            engine
                .store
                .list_entities(AnnotationTerm::CLASS_NAME)
                .await
                .unwrap()
                .is_empty()
        );
        assert!(stored_data(&engine, Term::CLASS_NAME, tumor).await.is_some());
    }

    #[tokio::test]
    async fn unknown_term_fails_the_whole_composite_add() {
        let engine = engine();
        let alice = user();
        let mut payload = annotation_payload(ProjectId::new());
        payload["term"] = json!(EntityId::new());

        let err = engine.annotations.add_with_terms(&alice, payload).await.unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
        assert!(
            engine
                .store
                .list_entities(UserAnnotation::CLASS_NAME)
                .await
                .unwrap()
                .is_empty()
        );
        let outcome = engine.undo_redo.undo(alice.user_id, None).await.unwrap();
        assert!(matches!(outcome, UndoRedoOutcome::Nothing(_)));
    }

    #[tokio::test]
    async fn deleting_a_term_cascades_links_and_undo_restores_them() {
        let engine = engine();
        let alice = user();
        let (term, _) = add_term(&engine, &alice, EntityId::new(), "Tumor").await;
        let mut payload = annotation_payload(ProjectId::new());
        payload["term"] = json!(term);
        let added = engine.annotations.add_with_terms(&alice, payload).await.unwrap();
        let annotation = response_entity_id(&added, "annotation").unwrap();

        let deleted = engine.terms.delete(&alice, term).await.unwrap();
        assert_eq!(deleted.status, 200);
        assert!(stored_data(&engine, Term::CLASS_NAME, term).await.is_none());
        assert!(
            engine
                .store
                .list_entities(AnnotationTerm::CLASS_NAME)
                .await
                .unwrap()
                .is_empty()
        );

        let responses = applied(engine.undo_redo.undo(alice.user_id, None).await.unwrap());
        assert_eq!(responses.len(), 2);
        assert!(responses.iter().all(|r| r.status == 201));
        assert!(stored_data(&engine, Term::CLASS_NAME, term).await.is_some());
        let links = engine
            .store
            .find_entities(AnnotationTerm::CLASS_NAME, "annotation", &annotation.to_string())
            .await
            .unwrap();
        assert_eq!(links.len(), 1);
    }

    #[tokio::test]
    async fn deleting_an_annotation_with_dependencies_is_one_undo() {
        let engine = engine();
        let alice = user();
        let (term, _) = add_term(&engine, &alice, EntityId::new(), "Tumor").await;
        let mut payload = annotation_payload(ProjectId::new());
        payload["term"] = json!(term);
        let added = engine.annotations.add_with_terms(&alice, payload).await.unwrap();
        let annotation = response_entity_id(&added, "annotation").unwrap();

        engine
            .annotations
            .delete_with_dependencies(&alice, annotation)
            .await
            .unwrap();
        assert!(stored_data(&engine, UserAnnotation::CLASS_NAME, annotation).await.is_none());

        let responses = applied(engine.undo_redo.undo(alice.user_id, None).await.unwrap());
        // The annotation comes back before the link that references it.
        assert_eq!(responses.len(), 2);
        assert!(responses[0].payload("annotation").is_some());
        assert!(responses[1].payload("annotationterm").is_some());
        assert!(stored_data(&engine, UserAnnotation::CLASS_NAME, annotation).await.is_some());
    }

    #[tokio::test]
    async fn stale_existing_entity_is_a_concurrent_modification() {
        let engine = engine();
        let alice = user();
        let (term, _) = add_term(&engine, &alice, EntityId::new(), "Tumor").await;
        let stale = engine
            .store
            .load_entity(Term::CLASS_NAME, term)
            .await
            .unwrap();

        engine
            .terms
            .update(&alice, term, json!({ "name": "Stroma" }))
            .await
            .unwrap();

        let err = engine
            .executor
            .execute(
                CommandKind::Edit,
                Term::CLASS_NAME,
                stale,
                json!({ "name": "Lymphocyte" }),
                alice.user_id,
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::ConcurrentModification(_)));
        assert_eq!(err.status(), 409);
        let data = stored_data(&engine, Term::CLASS_NAME, term).await.unwrap();
        assert_eq!(data["name"], "Stroma");
    }

    #[tokio::test]
    async fn restored_entity_still_rejects_a_snapshot_from_before_its_delete() {
        let engine = engine();
        let alice = user();
        let bob = user();
        let (term, _) = add_term(&engine, &alice, EntityId::new(), "Tumor").await;
        let snapshot = engine
            .store
            .load_entity(Term::CLASS_NAME, term)
            .await
            .unwrap();
        assert_eq!(snapshot.as_ref().unwrap().version, 1);

        engine
            .terms
            .update(&bob, term, json!({ "name": "Stroma" }))
            .await
            .unwrap();
        engine.terms.delete(&bob, term).await.unwrap();
        applied(engine.undo_redo.undo(bob.user_id, None).await.unwrap());

        let restored = engine
            .store
            .load_entity(Term::CLASS_NAME, term)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(restored.data["name"], "Stroma");
        assert!(restored.version > 2);

        let err = engine
            .executor
            .execute(
                CommandKind::Edit,
                Term::CLASS_NAME,
                snapshot,
                json!({ "name": "Lymphocyte" }),
                alice.user_id,
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::ConcurrentModification(_)));
        let data = stored_data(&engine, Term::CLASS_NAME, term).await.unwrap();
        assert_eq!(data["name"], "Stroma");
    }

    #[tokio::test]
    async fn duplicate_term_name_in_an_ontology_already_exists() {
        let engine = engine();
        let alice = user();
        let ontology = EntityId::new();
        add_term(&engine, &alice, ontology, "Tumor").await;

        let err = engine
            .terms
            .add(&alice, term_payload(ontology, "tumor"))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::AlreadyExists(_)));

        // Another ontology may reuse the name.
        add_term(&engine, &alice, EntityId::new(), "Tumor").await;
    }

    /// Alice records [First, Second] in one transaction, then Bob deletes
    /// First, so undoing the transaction fails on its second step.
    async fn transaction_with_a_doomed_member(engine: &Engine) -> (Principal, EntityId, EntityId) {
        let alice = user();
        let bob = user();
        let ontology = EntityId::new();
        let transaction = engine.transactions.start().await.unwrap();

        let mut ids = Vec::new();
        for name in ["First", "Second"] {
            let response = engine
                .executor
                .execute(
                    CommandKind::Add,
                    Term::CLASS_NAME,
                    None,
                    term_payload(ontology, name),
                    alice.user_id,
                    Some(transaction.id),
                )
                .await
                .unwrap();
            ids.push(response_entity_id(&response, "term").unwrap());
        }

        engine.terms.delete(&bob, ids[0]).await.unwrap();
        (alice, ids[0], ids[1])
    }

    #[tokio::test]
    async fn all_or_nothing_rolls_back_a_partial_reversal() {
        let engine = engine();
        let (alice, _, second) = transaction_with_a_doomed_member(&engine).await;

        let outcome = engine.undo_redo.undo(alice.user_id, None).await.unwrap();
        assert_eq!(outcome.status(), 400);
        let responses = applied(outcome);
        assert_eq!(responses.len(), 1);
        assert!(!responses[0].success);
        assert_eq!(responses[0].status, 404);

        // Second survived the rollback and its undo item is still there.
        assert!(stored_data(&engine, Term::CLASS_NAME, second).await.is_some());
        let outcome = engine.undo_redo.redo(alice.user_id, None).await.unwrap();
        assert!(matches!(outcome, UndoRedoOutcome::Nothing(_)));
    }

    #[tokio::test]
    async fn per_command_keeps_applied_steps_and_reports_the_failure() {
        let engine = engine_with(ReversalPolicy::PerCommand, Arc::new(AllowAll));
        let (alice, _, second) = transaction_with_a_doomed_member(&engine).await;

        let outcome = engine.undo_redo.undo(alice.user_id, None).await.unwrap();
        assert_eq!(outcome.status(), 400);
        let responses = applied(outcome);
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].status, 200);
        assert!(!responses[1].success);

        assert!(stored_data(&engine, Term::CLASS_NAME, second).await.is_none());
        let redone = applied(engine.undo_redo.redo(alice.user_id, None).await.unwrap());
        assert_eq!(redone.len(), 1);
        assert_eq!(redone[0].status, 201);
    }

    #[tokio::test]
    async fn access_policy_guards_every_service_call() {
        let acl = Arc::new(InMemoryAcl::new());
        let engine = engine_with(ReversalPolicy::AllOrNothing, acl.clone());
        let alice = user();
        let ontology = EntityId::new();

        let err = engine
            .terms
            .add(&alice, term_payload(ontology, "Tumor"))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Permission(_)));
        assert_eq!(err.status(), 403);

        acl.grant(ontology, alice.user_id, Permission::WRITE);
        let (term, _) = add_term(&engine, &alice, ontology, "Tumor").await;

        let err = engine.terms.entities().get(&alice, term).await.unwrap_err();
        assert!(matches!(err, EngineError::Permission(_)));
        assert!(engine.terms.entities().list(&alice).await.unwrap().is_empty());

        acl.grant(ontology, alice.user_id, Permission::READ);
        assert_eq!(engine.terms.entities().get(&alice, term).await.unwrap().name, "Tumor");
        assert_eq!(engine.terms.entities().list(&alice).await.unwrap().len(), 1);

        let err = engine.terms.delete(&alice, term).await.unwrap_err();
        assert!(matches!(err, EngineError::Permission(_)));

        let admin = Principal::new(UserId::new(), vec![Role::ADMIN]);
        engine.terms.delete(&admin, term).await.unwrap();
    }
}
