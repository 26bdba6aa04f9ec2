//! Integration tests for the match suggestion and mentorship
//! repositories using in-memory SurrealDB.

use chrono::{Duration, Utc};
use mentora_core::error::MentoraError;
use mentora_core::models::match_suggestion::{
    CreateMatchSuggestion, MatchStatus, RescoreMatchSuggestion, ScoreBreakdown, TransitionChanges,
};
use mentora_core::models::mentorship::MentorshipStatus;
use mentora_core::models::user::{CreateUser, UpdateUser, User, UserRole, UserStatus};
use mentora_core::repository::{MatchSuggestionRepository, MentorshipRepository, UserRepository};
use mentora_db::repository::{
    SurrealMatchSuggestionRepository, SurrealMentorshipRepository, SurrealUserRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

struct Fixture {
    users: SurrealUserRepository<Db>,
    suggestions: SurrealMatchSuggestionRepository<Db>,
    mentorships: SurrealMentorshipRepository<Db>,
    mentor: User,
    mentee: User,
}

async fn setup(capacity: u32) -> Fixture {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    mentora_db::run_migrations(&db).await.unwrap();

    let users = SurrealUserRepository::new(db.clone());
    let mentor = user(&users, "ada", UserRole::Mentor, capacity).await;
    let mentee = user(&users, "bob", UserRole::Mentee, 0).await;

    Fixture {
        users,
        suggestions: SurrealMatchSuggestionRepository::new(db.clone()),
        mentorships: SurrealMentorshipRepository::new(db),
        mentor,
        mentee,
    }
}

async fn user(repo: &SurrealUserRepository<Db>, name: &str, role: UserRole, capacity: u32) -> User {
    let created = repo
        .create(CreateUser {
            name: name.into(),
            email: format!("{name}@example.com"),
            role,
            expertise: vec![],
            interests: vec![],
            goals: vec![],
            availability: vec![],
            program: None,
            priority: false,
            capacity,
        })
        .await
        .unwrap();
    repo.update(
        created.id,
        UpdateUser {
            status: Some(UserStatus::Approved),
            ..Default::default()
        },
    )
    .await
    .unwrap()
}

fn suggestion_input(mentor: &User, mentee: &User) -> CreateMatchSuggestion {
    CreateMatchSuggestion {
        mentor_id: mentor.id,
        mentee_id: mentee.id,
        score: 72.5,
        breakdown: ScoreBreakdown {
            expertise: 50.0,
            availability: 15.0,
            interactions: 5.0,
            priority: 2.5,
        },
        matched_expertise: vec!["rust".into()],
        expires_at: Some(Utc::now() + Duration::days(14)),
        notes: None,
        metadata: None,
    }
}

#[tokio::test]
async fn create_and_get_suggestion() {
    let f = setup(2).await;
    let created = f
        .suggestions
        .create(suggestion_input(&f.mentor, &f.mentee))
        .await
        .unwrap();

    assert_eq!(created.status, MatchStatus::Suggested);
    assert_eq!(created.breakdown.expertise, 50.0);
    assert_eq!(created.matched_expertise, vec!["rust".to_string()]);

    let fetched = f.suggestions.get_by_id(created.id).await.unwrap();
    assert_eq!(fetched.mentor_id, f.mentor.id);
    assert_eq!(fetched.score, 72.5);

    assert_eq!(f.suggestions.list_by_mentor(f.mentor.id).await.unwrap().len(), 1);
    assert_eq!(f.suggestions.list_by_mentee(f.mentee.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn second_active_suggestion_for_pair_is_rejected() {
    let f = setup(2).await;
    f.suggestions
        .create(suggestion_input(&f.mentor, &f.mentee))
        .await
        .unwrap();

    let err = f
        .suggestions
        .create(suggestion_input(&f.mentor, &f.mentee))
        .await
        .unwrap_err();
    assert!(matches!(err, MentoraError::AlreadyExists { .. }), "got: {err:?}");
}

#[tokio::test]
async fn terminal_suggestion_frees_the_pair() {
    let f = setup(2).await;
    let first = f
        .suggestions
        .create(suggestion_input(&f.mentor, &f.mentee))
        .await
        .unwrap();

    f.suggestions
        .transition(
            first.id,
            MatchStatus::Suggested,
            MatchStatus::MentorDeclined,
            TransitionChanges {
                decline_reason: Some("busy".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    f.suggestions
        .create(suggestion_input(&f.mentor, &f.mentee))
        .await
        .unwrap();
}

#[tokio::test]
async fn transition_is_compare_and_swap() {
    let f = setup(2).await;
    let s = f
        .suggestions
        .create(suggestion_input(&f.mentor, &f.mentee))
        .await
        .unwrap();

    let moved = f
        .suggestions
        .transition(
            s.id,
            MatchStatus::Suggested,
            MatchStatus::MentorAccepted,
            TransitionChanges::default(),
        )
        .await
        .unwrap();
    assert_eq!(moved.unwrap().status, MatchStatus::MentorAccepted);

    // Same expected state again: the record has moved on.
    let missed = f
        .suggestions
        .transition(
            s.id,
            MatchStatus::Suggested,
            MatchStatus::MentorDeclined,
            TransitionChanges::default(),
        )
        .await
        .unwrap();
    assert!(missed.is_none());

    // Edges outside the lifecycle graph are refused outright.
    let err = f
        .suggestions
        .transition(
            s.id,
            MatchStatus::MentorAccepted,
            MatchStatus::Suggested,
            TransitionChanges::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MentoraError::InvalidState { .. }));
}

#[tokio::test]
async fn rescore_updates_only_active_suggestions() {
    let f = setup(2).await;
    let s = f
        .suggestions
        .create(suggestion_input(&f.mentor, &f.mentee))
        .await
        .unwrap();

    let rescored = f
        .suggestions
        .rescore(
            s.id,
            RescoreMatchSuggestion {
                score: 40.0,
                breakdown: ScoreBreakdown {
                    expertise: 25.0,
                    availability: 15.0,
                    interactions: 0.0,
                    priority: 0.0,
                },
                matched_expertise: vec![],
            },
        )
        .await
        .unwrap();
    assert_eq!(rescored.score, 40.0);
    assert!(rescored.updated_at >= s.updated_at);

    f.suggestions
        .transition(
            s.id,
            MatchStatus::Suggested,
            MatchStatus::Rejected,
            TransitionChanges::default(),
        )
        .await
        .unwrap();

    let err = f
        .suggestions
        .rescore(
            s.id,
            RescoreMatchSuggestion {
                score: 90.0,
                breakdown: ScoreBreakdown::default(),
                matched_expertise: vec![],
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MentoraError::InvalidState { .. }), "got: {err:?}");
}

#[tokio::test]
async fn expire_stale_only_touches_past_deadlines() {
    let f = setup(2).await;
    let other = user(&f.users, "cy", UserRole::Mentee, 0).await;

    let stale = f
        .suggestions
        .create(CreateMatchSuggestion {
            expires_at: Some(Utc::now() - Duration::minutes(1)),
            ..suggestion_input(&f.mentor, &f.mentee)
        })
        .await
        .unwrap();
    let fresh = f
        .suggestions
        .create(suggestion_input(&f.mentor, &other))
        .await
        .unwrap();

    let expired = f.suggestions.expire_stale(Utc::now()).await.unwrap();
    assert_eq!(expired.len(), 1);
    assert_eq!(expired[0].id, stale.id);
    assert_eq!(expired[0].status, MatchStatus::Expired);

    let untouched = f.suggestions.get_by_id(fresh.id).await.unwrap();
    assert_eq!(untouched.status, MatchStatus::Suggested);
}

async fn accepted_by_mentor(f: &Fixture, mentee: &User) -> uuid::Uuid {
    let s = f
        .suggestions
        .create(suggestion_input(&f.mentor, mentee))
        .await
        .unwrap();
    f.suggestions
        .transition(
            s.id,
            MatchStatus::Suggested,
            MatchStatus::MentorAccepted,
            TransitionChanges::default(),
        )
        .await
        .unwrap()
        .unwrap();
    s.id
}

#[tokio::test]
async fn connect_creates_mentorship_and_claims_capacity() {
    let f = setup(1).await;
    let id = accepted_by_mentor(&f, &f.mentee).await;

    let (suggestion, mentorship) = f.suggestions.connect(id).await.unwrap();
    assert_eq!(suggestion.status, MatchStatus::Connected);
    assert!(suggestion.mentee_responded_at.is_some());
    assert_eq!(mentorship.suggestion_id, id);
    assert_eq!(mentorship.status, MentorshipStatus::Active);

    let mentor = f.users.get_by_id(f.mentor.id).await.unwrap();
    assert_eq!(mentor.active_mentee_count, 1);

    let listed = f.mentorships.list_by_mentor(f.mentor.id).await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn plain_transition_cannot_connect() {
    let f = setup(1).await;
    let id = accepted_by_mentor(&f, &f.mentee).await;

    let err = f
        .suggestions
        .transition(
            id,
            MatchStatus::MentorAccepted,
            MatchStatus::Connected,
            TransitionChanges::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MentoraError::InvalidState { .. }), "got: {err:?}");

    let untouched = f.suggestions.get_by_id(id).await.unwrap();
    assert_eq!(untouched.status, MatchStatus::MentorAccepted);
    let mentor = f.users.get_by_id(f.mentor.id).await.unwrap();
    assert_eq!(mentor.active_mentee_count, 0);
}

#[tokio::test]
async fn connect_rolls_back_when_mentor_is_full() {
    let f = setup(1).await;
    let other = user(&f.users, "cy", UserRole::Mentee, 0).await;

    let first = accepted_by_mentor(&f, &f.mentee).await;
    let second = accepted_by_mentor(&f, &other).await;
    f.suggestions.connect(first).await.unwrap();

    let err = f.suggestions.connect(second).await.unwrap_err();
    assert!(
        matches!(err, MentoraError::CapacityExceeded { capacity: 1, .. }),
        "got: {err:?}"
    );

    let untouched = f.suggestions.get_by_id(second).await.unwrap();
    assert_eq!(untouched.status, MatchStatus::MentorAccepted);
    assert!(f.mentorships.list_by_mentee(other.id).await.unwrap().is_empty());

    let mentor = f.users.get_by_id(f.mentor.id).await.unwrap();
    assert_eq!(mentor.active_mentee_count, 1);
}

#[tokio::test]
async fn connect_requires_mentor_acceptance() {
    let f = setup(1).await;
    let s = f
        .suggestions
        .create(suggestion_input(&f.mentor, &f.mentee))
        .await
        .unwrap();

    let err = f.suggestions.connect(s.id).await.unwrap_err();
    assert!(matches!(err, MentoraError::InvalidState { .. }), "got: {err:?}");

    let mentor = f.users.get_by_id(f.mentor.id).await.unwrap();
    assert_eq!(mentor.active_mentee_count, 0);
}

#[tokio::test]
async fn ending_mentorship_releases_capacity_once() {
    let f = setup(1).await;
    let id = accepted_by_mentor(&f, &f.mentee).await;
    let (_, mentorship) = f.suggestions.connect(id).await.unwrap();

    let ended = f
        .mentorships
        .end(mentorship.id, MentorshipStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(ended.status, MentorshipStatus::Cancelled);
    assert!(ended.ended_at.is_some());
    assert_eq!(f.users.get_by_id(f.mentor.id).await.unwrap().active_mentee_count, 0);

    let err = f
        .mentorships
        .end(mentorship.id, MentorshipStatus::Completed)
        .await
        .unwrap_err();
    assert!(matches!(err, MentoraError::InvalidState { .. }), "got: {err:?}");

    let err = f
        .mentorships
        .end(mentorship.id, MentorshipStatus::Active)
        .await
        .unwrap_err();
    assert!(matches!(err, MentoraError::Validation { .. }));
}
