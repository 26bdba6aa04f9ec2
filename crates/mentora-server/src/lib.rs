//! Mentora Server: HTTP API over the matching engine, plus the shared
//! startup pieces of the `mentora-server` and `mentora-backfill`
//! binaries.

pub mod config;
pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

use axum::Router;
use axum::routing::{get, post};
use surrealdb::Connection;
use tracing_subscriber::EnvFilter;

pub use config::ServerConfig;
pub use error::ApiError;
pub use state::AppState;

pub fn build_router<C: Connection>(state: AppState<C>) -> Router {
    Router::new()
        .route("/healthz", get(routes::healthz))
        .route(
            "/mentors/{mentor_id}/match-suggestions",
            get(routes::mentor_suggestions::<C>),
        )
        .route(
            "/mentees/{mentee_id}/match-suggestions",
            get(routes::mentee_suggestions::<C>),
        )
        .route("/matches/generate", post(routes::generate::<C>))
        .route("/matches/{id}/accept", post(routes::mentor_accept::<C>))
        .route("/matches/{id}/decline", post(routes::mentor_decline::<C>))
        .route(
            "/matches/{id}/mentee-accept",
            post(routes::mentee_accept::<C>),
        )
        .route(
            "/matches/{id}/mentee-decline",
            post(routes::mentee_decline::<C>),
        )
        .route("/matches/{id}/reject", post(routes::reject::<C>))
        .route(
            "/mentorships/{id}/complete",
            post(routes::complete_mentorship::<C>),
        )
        .route(
            "/mentorships/{id}/cancel",
            post(routes::cancel_mentorship::<C>),
        )
        .with_state(state)
}

/// Install the global tracing subscriber. `RUST_LOG` directives are
/// added to the default `mentora=info`.
pub fn init_tracing(json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("mentora=info".parse()?);
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    Ok(())
}
