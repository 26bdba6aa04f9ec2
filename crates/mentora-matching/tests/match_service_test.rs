//! Integration tests for the matching service against an in-memory
//! database.

use std::sync::Arc;

use mentora_core::error::MentoraError;
use mentora_core::models::availability::AvailabilitySlot;
use mentora_core::models::match_suggestion::MatchStatus;
use mentora_core::models::mentorship::MentorshipStatus;
use mentora_core::models::user::{CreateUser, UpdateUser, User, UserRole, UserStatus};
use mentora_core::repository::{MatchSuggestionRepository, UserRepository};
use mentora_db::repository::{
    SurrealMatchSuggestionRepository, SurrealMentorshipRepository, SurrealUserRepository,
};
use mentora_matching::{BackfillOptions, MatchService, MatchingConfig};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

type Service = MatchService<
    SurrealUserRepository<Db>,
    SurrealMatchSuggestionRepository<Db>,
    SurrealMentorshipRepository<Db>,
>;

/// Spin up in-memory DB, run migrations, build the service.
async fn setup(config: MatchingConfig) -> (Service, Surreal<Db>) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    mentora_db::run_migrations(&db).await.unwrap();

    let svc = MatchService::new(
        SurrealUserRepository::new(db.clone()),
        SurrealMatchSuggestionRepository::new(db.clone()),
        SurrealMentorshipRepository::new(db.clone()),
        config,
    )
    .unwrap();

    (svc, db)
}

fn tags(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn mentor_input(name: &str, expertise: &[&str], capacity: u32) -> CreateUser {
    CreateUser {
        name: name.into(),
        email: format!("{name}@example.com"),
        role: UserRole::Mentor,
        expertise: tags(expertise),
        interests: vec![],
        goals: vec![],
        availability: vec!["Mon 09:00-12:00".parse::<AvailabilitySlot>().unwrap()],
        program: None,
        priority: false,
        capacity,
    }
}

fn mentee_input(name: &str, interests: &[&str]) -> CreateUser {
    CreateUser {
        name: name.into(),
        email: format!("{name}@example.com"),
        role: UserRole::Mentee,
        expertise: vec![],
        interests: tags(interests),
        goals: vec![],
        availability: vec!["Mon 10:00-11:00".parse::<AvailabilitySlot>().unwrap()],
        program: None,
        priority: false,
        capacity: 0,
    }
}

/// Create a user and approve them.
async fn approved(db: &Surreal<Db>, input: CreateUser) -> User {
    let repo = SurrealUserRepository::new(db.clone());
    let user = repo.create(input).await.unwrap();
    repo.update(
        user.id,
        UpdateUser {
            status: Some(UserStatus::Approved),
            ..Default::default()
        },
    )
    .await
    .unwrap()
}

async fn user(db: &Surreal<Db>, id: Uuid) -> User {
    SurrealUserRepository::new(db.clone())
        .get_by_id(id)
        .await
        .unwrap()
}

/// Generate for the mentor and move the suggestion for `mentee` to
/// `mentor_accepted`. Returns the suggestion id.
async fn mentor_accepted(svc: &Service, mentor: &User, mentee: &User) -> Uuid {
    let generated = svc.generate_for_mentor(mentor.id, None).await.unwrap();
    let id = generated
        .suggestions
        .iter()
        .find(|s| s.mentee_id == mentee.id)
        .and_then(|s| s.suggestion.as_ref())
        .map(|s| s.id)
        .unwrap();
    svc.mentor_accept(id).await.unwrap();
    id
}

// ---------------------------------------------------------------------------
// Candidate generation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn mentor_without_candidates_gets_empty_list() {
    let (svc, db) = setup(MatchingConfig::default()).await;
    let mentor = approved(&db, mentor_input("ada", &["rust"], 2)).await;

    let result = svc.generate_for_mentor(mentor.id, None).await.unwrap();
    assert!(result.suggestions.is_empty());
    assert_eq!(result.created, 0);
    assert!(!result.capacity_reached);
}

#[tokio::test]
async fn pending_mentees_are_not_candidates() {
    let (svc, db) = setup(MatchingConfig::default()).await;
    let mentor = approved(&db, mentor_input("ada", &["rust"], 2)).await;
    SurrealUserRepository::new(db.clone())
        .create(mentee_input("pending", &["rust"]))
        .await
        .unwrap();

    let result = svc.generate_for_mentor(mentor.id, None).await.unwrap();
    assert!(result.suggestions.is_empty());
}

#[tokio::test]
async fn suggestions_are_ranked_by_score() {
    let (svc, db) = setup(MatchingConfig::default()).await;
    let mentor = approved(&db, mentor_input("ada", &["Rust", "Databases"], 3)).await;
    let weak = approved(&db, mentee_input("weak", &["cooking"])).await;
    let strong = approved(&db, mentee_input("strong", &["rust", "databases"])).await;
    let partial = approved(&db, mentee_input("partial", &["rust", "gardening"])).await;

    let result = svc.generate_for_mentor(mentor.id, None).await.unwrap();
    let order: Vec<Uuid> = result.suggestions.iter().map(|s| s.mentee_id).collect();
    assert_eq!(order, vec![strong.id, partial.id, weak.id]);
    assert_eq!(result.created, 3);
    assert_eq!(
        result.suggestions[0].score.matched_expertise,
        vec!["databases".to_string(), "rust".to_string()]
    );

    let stored = result.suggestions[0].suggestion.as_ref().unwrap();
    assert_eq!(stored.status, MatchStatus::Suggested);
    assert!(stored.expires_at.is_some());
}

#[tokio::test]
async fn regeneration_rescores_instead_of_duplicating() {
    let (svc, db) = setup(MatchingConfig::default()).await;
    let mentor = approved(&db, mentor_input("ada", &["rust"], 2)).await;
    approved(&db, mentee_input("bob", &["rust"])).await;
    approved(&db, mentee_input("cy", &["go"])).await;

    let first = svc.generate_for_mentor(mentor.id, None).await.unwrap();
    let second = svc.generate_for_mentor(mentor.id, None).await.unwrap();

    assert_eq!(first.created, 2);
    assert_eq!(second.created, 0);
    assert_eq!(second.updated, 2);

    let ids = |r: &mentora_matching::MentorSuggestions| -> Vec<Uuid> {
        r.suggestions
            .iter()
            .map(|s| s.suggestion.as_ref().unwrap().id)
            .collect()
    };
    assert_eq!(ids(&first), ids(&second));

    let stored = SurrealMatchSuggestionRepository::new(db.clone())
        .list_by_mentor(mentor.id)
        .await
        .unwrap();
    assert_eq!(stored.len(), 2);
}

#[tokio::test]
async fn limit_is_applied_after_ranking() {
    let (svc, db) = setup(MatchingConfig::default()).await;
    let mentor = approved(&db, mentor_input("ada", &["rust"], 2)).await;
    approved(&db, mentee_input("bob", &["go"])).await;
    let best = approved(&db, mentee_input("cy", &["rust"])).await;

    let result = svc.generate_for_mentor(mentor.id, Some(1)).await.unwrap();
    assert_eq!(result.suggestions.len(), 1);
    assert_eq!(result.suggestions[0].mentee_id, best.id);

    // Zero is clamped up to one.
    let result = svc.generate_for_mentor(mentor.id, Some(0)).await.unwrap();
    assert_eq!(result.suggestions.len(), 1);
}

#[tokio::test]
async fn generation_checks_role_and_existence() {
    let (svc, db) = setup(MatchingConfig::default()).await;
    let mentee = approved(&db, mentee_input("bob", &["rust"])).await;

    let err = svc.generate_for_mentor(mentee.id, None).await.unwrap_err();
    assert!(matches!(err, MentoraError::Validation { .. }), "got: {err:?}");

    let err = svc
        .generate_for_mentor(Uuid::new_v4(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, MentoraError::NotFound { .. }), "got: {err:?}");
}

#[tokio::test]
async fn full_mentor_gets_read_only_preview() {
    let (svc, db) = setup(MatchingConfig::default()).await;
    let mentor = approved(&db, mentor_input("ada", &["rust"], 1)).await;
    let first = approved(&db, mentee_input("bob", &["rust"])).await;

    let id = mentor_accepted(&svc, &mentor, &first).await;
    svc.mentee_accept(id).await.unwrap();

    let other = approved(&db, mentee_input("cy", &["rust"])).await;
    let result = svc.generate_for_mentor(mentor.id, None).await.unwrap();

    assert!(result.capacity_reached);
    assert_eq!(result.capacity, 1);
    assert_eq!(result.active_mentees, 1);
    assert_eq!(result.created, 0);
    assert_eq!(result.suggestions.len(), 1);
    assert_eq!(result.suggestions[0].mentee_id, other.id);
    assert!(result.suggestions[0].suggestion.is_none());

    let stored = SurrealMatchSuggestionRepository::new(db.clone())
        .list_by_mentee(other.id)
        .await
        .unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn mentee_side_skips_full_mentors() {
    let (svc, db) = setup(MatchingConfig::default()).await;
    let full = approved(&db, mentor_input("full", &["rust"], 1)).await;
    let open = approved(&db, mentor_input("open", &["go"], 1)).await;
    let taken = approved(&db, mentee_input("taken", &["rust"])).await;

    let id = mentor_accepted(&svc, &full, &taken).await;
    svc.mentee_accept(id).await.unwrap();

    let mentee = approved(&db, mentee_input("bob", &["rust"])).await;
    let result = svc.generate_for_mentee(mentee.id, None).await.unwrap();

    let mentors: Vec<Uuid> = result.suggestions.iter().map(|s| s.mentor_id).collect();
    assert_eq!(mentors, vec![open.id]);
    assert_eq!(result.created, 1);
    assert_eq!(result.awaiting_mentor, 1);
    assert_eq!(result.awaiting_mentee, 0);
}

#[tokio::test]
async fn declined_pair_is_blocked_during_cooldown() {
    let (svc, db) = setup(MatchingConfig::default()).await;
    let mentor = approved(&db, mentor_input("ada", &["rust"], 2)).await;
    approved(&db, mentee_input("bob", &["rust"])).await;

    let generated = svc.generate_for_mentor(mentor.id, None).await.unwrap();
    let id = generated.suggestions[0].suggestion.as_ref().unwrap().id;
    svc.mentor_decline(id, Some("no time".into())).await.unwrap();

    let again = svc.generate_for_mentor(mentor.id, None).await.unwrap();
    assert!(again.suggestions.is_empty());
}

#[tokio::test]
async fn declined_pair_returns_after_cooldown_with_lower_score() {
    let config = MatchingConfig {
        decline_cooldown_secs: 0,
        ..Default::default()
    };
    let (svc, db) = setup(config).await;
    let mentor = approved(&db, mentor_input("ada", &["rust"], 2)).await;
    approved(&db, mentee_input("bob", &["rust"])).await;

    let first = svc.generate_for_mentor(mentor.id, None).await.unwrap();
    let id = first.suggestions[0].suggestion.as_ref().unwrap().id;
    svc.mentor_decline(id, None).await.unwrap();

    let again = svc.generate_for_mentor(mentor.id, None).await.unwrap();
    assert_eq!(again.created, 1);
    assert!(again.suggestions[0].score.total < first.suggestions[0].score.total);
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn mutual_acceptance_connects_the_pair() {
    let (svc, db) = setup(MatchingConfig::default()).await;
    let mentor = approved(&db, mentor_input("ada", &["rust"], 2)).await;
    let mentee = approved(&db, mentee_input("bob", &["rust"])).await;

    let id = mentor_accepted(&svc, &mentor, &mentee).await;
    let accepted = SurrealMatchSuggestionRepository::new(db.clone())
        .get_by_id(id)
        .await
        .unwrap();
    assert_eq!(accepted.status, MatchStatus::MentorAccepted);
    assert!(accepted.mentor_responded_at.is_some());

    let outcome = svc.mentee_accept(id).await.unwrap();
    assert_eq!(outcome.suggestion.status, MatchStatus::Connected);
    let mentorship = outcome.mentorship.unwrap();
    assert_eq!(mentorship.status, MentorshipStatus::Active);
    assert_eq!(mentorship.suggestion_id, id);
    assert_eq!(user(&db, mentor.id).await.active_mentee_count, 1);

    // Connected pairs drop out of generation.
    let again = svc.generate_for_mentor(mentor.id, None).await.unwrap();
    assert!(again.suggestions.is_empty());
}

#[tokio::test]
async fn mentee_accept_at_full_capacity_changes_nothing() {
    let (svc, db) = setup(MatchingConfig::default()).await;
    let mentor = approved(&db, mentor_input("ada", &["rust"], 2)).await;
    let a = approved(&db, mentee_input("a", &["rust"])).await;
    let b = approved(&db, mentee_input("b", &["rust"])).await;
    let c = approved(&db, mentee_input("c", &["rust"])).await;

    let id_a = mentor_accepted(&svc, &mentor, &a).await;
    let id_b = mentor_accepted(&svc, &mentor, &b).await;
    let id_c = mentor_accepted(&svc, &mentor, &c).await;

    svc.mentee_accept(id_a).await.unwrap();
    svc.mentee_accept(id_b).await.unwrap();
    assert_eq!(user(&db, mentor.id).await.active_mentee_count, 2);

    let err = svc.mentee_accept(id_c).await.unwrap_err();
    assert!(
        matches!(err, MentoraError::CapacityExceeded { capacity: 2, .. }),
        "got: {err:?}"
    );

    let stuck = SurrealMatchSuggestionRepository::new(db.clone())
        .get_by_id(id_c)
        .await
        .unwrap();
    assert_eq!(stuck.status, MatchStatus::MentorAccepted);
    assert_eq!(user(&db, mentor.id).await.active_mentee_count, 2);
}

#[tokio::test]
async fn mentor_accept_at_full_capacity_fails() {
    let (svc, db) = setup(MatchingConfig::default()).await;
    let mentor = approved(&db, mentor_input("ada", &["rust"], 1)).await;
    let a = approved(&db, mentee_input("a", &["rust"])).await;
    let b = approved(&db, mentee_input("b", &["rust"])).await;

    let generated = svc.generate_for_mentor(mentor.id, None).await.unwrap();
    let pending_b = generated
        .suggestions
        .iter()
        .find(|s| s.mentee_id == b.id)
        .and_then(|s| s.suggestion.as_ref())
        .map(|s| s.id)
        .unwrap();

    let id_a = mentor_accepted(&svc, &mentor, &a).await;
    svc.mentee_accept(id_a).await.unwrap();

    let err = svc.mentor_accept(pending_b).await.unwrap_err();
    assert!(matches!(err, MentoraError::CapacityExceeded { .. }), "got: {err:?}");
}

#[tokio::test]
async fn terminal_suggestions_reject_every_action() {
    let (svc, db) = setup(MatchingConfig::default()).await;
    let mentor = approved(&db, mentor_input("ada", &["rust"], 2)).await;
    approved(&db, mentee_input("bob", &["rust"])).await;

    let generated = svc.generate_for_mentor(mentor.id, None).await.unwrap();
    let id = generated.suggestions[0].suggestion.as_ref().unwrap().id;
    let declined = svc
        .mentor_decline(id, Some("busy".into()))
        .await
        .unwrap()
        .suggestion;
    assert_eq!(declined.decline_reason.as_deref(), Some("busy"));

    for err in [
        svc.mentor_accept(id).await.unwrap_err(),
        svc.mentor_decline(id, None).await.unwrap_err(),
        svc.mentee_accept(id).await.unwrap_err(),
        svc.mentee_decline(id, None).await.unwrap_err(),
        svc.reject(id, None).await.unwrap_err(),
    ] {
        assert!(matches!(err, MentoraError::InvalidState { .. }), "got: {err:?}");
    }

    let after = SurrealMatchSuggestionRepository::new(db.clone())
        .get_by_id(id)
        .await
        .unwrap();
    assert_eq!(after.status, MatchStatus::MentorDeclined);
    assert_eq!(after.updated_at, declined.updated_at);
    assert_eq!(after.decline_reason.as_deref(), Some("busy"));
}

#[tokio::test]
async fn mentee_cannot_accept_before_mentor() {
    let (svc, db) = setup(MatchingConfig::default()).await;
    let mentor = approved(&db, mentor_input("ada", &["rust"], 2)).await;
    approved(&db, mentee_input("bob", &["rust"])).await;

    let generated = svc.generate_for_mentor(mentor.id, None).await.unwrap();
    let id = generated.suggestions[0].suggestion.as_ref().unwrap().id;

    let err = svc.mentee_accept(id).await.unwrap_err();
    assert!(matches!(err, MentoraError::InvalidState { .. }), "got: {err:?}");
    assert_eq!(user(&db, mentor.id).await.active_mentee_count, 0);
}

#[tokio::test]
async fn admin_can_reject_an_accepted_suggestion() {
    let (svc, db) = setup(MatchingConfig::default()).await;
    let mentor = approved(&db, mentor_input("ada", &["rust"], 2)).await;
    let mentee = approved(&db, mentee_input("bob", &["rust"])).await;

    let id = mentor_accepted(&svc, &mentor, &mentee).await;
    let outcome = svc.reject(id, Some("program mismatch".into())).await.unwrap();
    assert_eq!(outcome.suggestion.status, MatchStatus::Rejected);
    assert!(outcome.mentorship.is_none());
}

#[tokio::test]
async fn expired_suggestion_fails_on_access() {
    let config = MatchingConfig {
        suggestion_ttl_secs: 0,
        ..Default::default()
    };
    let (svc, db) = setup(config).await;
    let mentor = approved(&db, mentor_input("ada", &["rust"], 2)).await;
    approved(&db, mentee_input("bob", &["rust"])).await;

    let generated = svc.generate_for_mentor(mentor.id, None).await.unwrap();
    let id = generated.suggestions[0].suggestion.as_ref().unwrap().id;

    let err = svc.mentor_accept(id).await.unwrap_err();
    assert!(
        matches!(&err, MentoraError::InvalidState { from, .. } if from == "expired"),
        "got: {err:?}"
    );

    let stored = SurrealMatchSuggestionRepository::new(db.clone())
        .get_by_id(id)
        .await
        .unwrap();
    assert_eq!(stored.status, MatchStatus::Expired);
}

#[tokio::test]
async fn ending_a_mentorship_releases_capacity() {
    let (svc, db) = setup(MatchingConfig::default()).await;
    let mentor = approved(&db, mentor_input("ada", &["rust"], 1)).await;
    let mentee = approved(&db, mentee_input("bob", &["rust"])).await;

    let id = mentor_accepted(&svc, &mentor, &mentee).await;
    let mentorship = svc.mentee_accept(id).await.unwrap().mentorship.unwrap();

    let ended = svc
        .end_mentorship(mentorship.id, MentorshipStatus::Completed)
        .await
        .unwrap();
    assert_eq!(ended.status, MentorshipStatus::Completed);
    assert!(ended.ended_at.is_some());
    assert_eq!(user(&db, mentor.id).await.active_mentee_count, 0);

    let err = svc
        .end_mentorship(mentorship.id, MentorshipStatus::Cancelled)
        .await
        .unwrap_err();
    assert!(matches!(err, MentoraError::InvalidState { .. }), "got: {err:?}");
    assert_eq!(user(&db, mentor.id).await.active_mentee_count, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_mentee_accepts_never_exceed_capacity() {
    let config = MatchingConfig {
        connect_retries: 10,
        ..Default::default()
    };
    let (svc, db) = setup(config).await;
    let mentor = approved(&db, mentor_input("ada", &["rust"], 2)).await;

    let mut ids = Vec::new();
    for i in 0..5 {
        let mentee = approved(&db, mentee_input(&format!("mentee{i}"), &["rust"])).await;
        ids.push(mentor_accepted(&svc, &mentor, &mentee).await);
    }

    let svc = Arc::new(svc);
    let handles: Vec<_> = ids
        .into_iter()
        .map(|id| {
            let svc = Arc::clone(&svc);
            tokio::spawn(async move { svc.mentee_accept(id).await })
        })
        .collect();

    let mut connected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => connected += 1,
            Err(MentoraError::CapacityExceeded { .. }) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(connected, 2);
    let count = user(&db, mentor.id).await.active_mentee_count;
    assert_eq!(count, 2);
}

// ---------------------------------------------------------------------------
// Backfill
// ---------------------------------------------------------------------------

#[tokio::test]
async fn backfill_covers_every_approved_mentor() {
    let config = MatchingConfig {
        directory_page_size: 1,
        ..Default::default()
    };
    let (svc, db) = setup(config).await;
    approved(&db, mentor_input("ada", &["rust"], 2)).await;
    approved(&db, mentor_input("grace", &["cobol"], 2)).await;
    SurrealUserRepository::new(db.clone())
        .create(mentor_input("pending", &["go"], 2))
        .await
        .unwrap();
    approved(&db, mentee_input("bob", &["rust"])).await;
    approved(&db, mentee_input("cy", &["cobol"])).await;

    let summary = svc
        .generate_for_all_mentors(BackfillOptions::default())
        .await
        .unwrap();
    assert_eq!(summary.mentors_processed, 2);
    assert_eq!(summary.mentors_failed, 0);
    assert_eq!(summary.created, 4);
    assert!(summary.failures.is_empty());

    let again = svc
        .generate_for_all_mentors(BackfillOptions { limit: Some(1) })
        .await
        .unwrap();
    assert_eq!(again.created, 0);
    assert_eq!(again.updated, 2);
}

#[tokio::test]
async fn backfill_skips_a_failing_mentor_and_continues() {
    let (svc, db) = setup(MatchingConfig::default()).await;
    approved(&db, mentor_input("ada", &["rust"], 2)).await;
    let broken = approved(&db, mentor_input("grace", &["rust"], 2)).await;
    approved(&db, mentee_input("bob", &["rust"])).await;

    // A stored suggestion whose mentee id cannot be decoded makes every
    // read of grace's suggestions fail.
    db.query(
        "CREATE match_suggestion SET mentor_id = $mentor_id, \
         mentee_id = 'not-a-uuid', active_pair_key = 'corrupt', \
         score = 10.0, score_expertise = 10.0, score_availability = 0.0, \
         score_interactions = 0.0, score_priority = 0.0, \
         status = 'mentor_declined'",
    )
    .bind(("mentor_id", broken.id.to_string()))
    .await
    .unwrap()
    .check()
    .unwrap();

    let summary = svc
        .generate_for_all_mentors(BackfillOptions::default())
        .await
        .unwrap();
    assert_eq!(summary.mentors_processed, 1);
    assert_eq!(summary.mentors_failed, 1);
    assert_eq!(summary.created, 1);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].mentor_id, broken.id);
    assert_eq!(summary.failures[0].code, "storage_error");

    // The read path degrades to an empty list instead of failing.
    let view = svc.mentor_view(broken.id, None).await.unwrap();
    assert!(view.suggestions.is_empty());
}

#[tokio::test]
async fn backfill_counts_expired_suggestions() {
    let config = MatchingConfig {
        suggestion_ttl_secs: 0,
        ..Default::default()
    };
    let (svc, db) = setup(config).await;
    let mentor = approved(&db, mentor_input("ada", &["rust"], 2)).await;
    approved(&db, mentee_input("bob", &["rust"])).await;

    let first = svc
        .generate_for_single_mentor(mentor.id, BackfillOptions::default())
        .await
        .unwrap();
    assert_eq!(first.created, 1);

    let summary = svc
        .generate_for_all_mentors(BackfillOptions::default())
        .await
        .unwrap();
    assert_eq!(summary.expired, 1);
    // Expired pairs are not blocked; a fresh suggestion replaces it.
    assert_eq!(summary.created, 1);
}

#[tokio::test]
async fn single_mentor_backfill_propagates_errors() {
    let (svc, _db) = setup(MatchingConfig::default()).await;
    let err = svc
        .generate_for_single_mentor(Uuid::new_v4(), BackfillOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, MentoraError::NotFound { .. }));
}

#[tokio::test]
async fn invalid_config_is_rejected() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    let mut config = MatchingConfig::default();
    config.weights.expertise = -1.0;
    let result = MatchService::new(
        SurrealUserRepository::new(db.clone()),
        SurrealMatchSuggestionRepository::new(db.clone()),
        SurrealMentorshipRepository::new(db.clone()),
        config,
    );
    assert!(matches!(result, Err(MentoraError::Validation { .. })));
}
