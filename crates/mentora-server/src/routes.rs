//! HTTP handlers.

use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use mentora_core::models::mentorship::MentorshipStatus;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use surrealdb::Connection;
use uuid::Uuid;

use crate::dto::{
    BackfillDto, GenerateBody, LimitQuery, MenteeMeta, MentorMeta, MentorshipDto, ReasonBody,
    SuggestionList, TransitionDto,
};
use crate::error::ApiError;
use crate::state::AppState;

type ApiResult<T> = Result<Json<T>, ApiError>;

fn parse_id(raw: &str, what: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::validation(format!("invalid {what} id: {raw}")))
}

/// Parse an optional JSON body. An empty body is the default value.
fn optional_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::validation(format!("invalid body: {e}")))
}

pub async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn mentor_suggestions<C: Connection>(
    State(state): State<AppState<C>>,
    Path(mentor_id): Path<String>,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> ApiResult<SuggestionList<MentorMeta>> {
    let mentor_id = parse_id(&mentor_id, "mentor")?;
    let Query(query) = query?;
    let result = state.service.mentor_view(mentor_id, query.limit()).await?;
    Ok(Json(result.into()))
}

pub async fn mentee_suggestions<C: Connection>(
    State(state): State<AppState<C>>,
    Path(mentee_id): Path<String>,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> ApiResult<SuggestionList<MenteeMeta>> {
    let mentee_id = parse_id(&mentee_id, "mentee")?;
    let Query(query) = query?;
    let result = state.service.mentee_view(mentee_id, query.limit()).await?;
    Ok(Json(result.into()))
}

pub async fn mentor_accept<C: Connection>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
) -> ApiResult<TransitionDto> {
    let id = parse_id(&id, "suggestion")?;
    Ok(Json(state.service.mentor_accept(id).await?.into()))
}

pub async fn mentor_decline<C: Connection>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<TransitionDto> {
    let id = parse_id(&id, "suggestion")?;
    let body: ReasonBody = optional_body(&body)?;
    Ok(Json(state.service.mentor_decline(id, body.reason).await?.into()))
}

pub async fn mentee_accept<C: Connection>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
) -> ApiResult<TransitionDto> {
    let id = parse_id(&id, "suggestion")?;
    Ok(Json(state.service.mentee_accept(id).await?.into()))
}

pub async fn mentee_decline<C: Connection>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<TransitionDto> {
    let id = parse_id(&id, "suggestion")?;
    let body: ReasonBody = optional_body(&body)?;
    Ok(Json(state.service.mentee_decline(id, body.reason).await?.into()))
}

pub async fn reject<C: Connection>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<TransitionDto> {
    let id = parse_id(&id, "suggestion")?;
    let body: ReasonBody = optional_body(&body)?;
    Ok(Json(state.service.reject(id, body.reason).await?.into()))
}

pub async fn generate<C: Connection>(
    State(state): State<AppState<C>>,
    body: Bytes,
) -> ApiResult<BackfillDto> {
    let body: GenerateBody = optional_body(&body)?;
    let options = mentora_matching::BackfillOptions { limit: body.limit };
    let summary = match body.mentor_id {
        Some(mentor_id) => {
            state
                .service
                .generate_for_single_mentor(mentor_id, options)
                .await?
        }
        None => state.service.generate_for_all_mentors(options).await?,
    };
    Ok(Json(summary.into()))
}

pub async fn complete_mentorship<C: Connection>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
) -> ApiResult<MentorshipDto> {
    end_mentorship(state, &id, MentorshipStatus::Completed).await
}

pub async fn cancel_mentorship<C: Connection>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
) -> ApiResult<MentorshipDto> {
    end_mentorship(state, &id, MentorshipStatus::Cancelled).await
}

async fn end_mentorship<C: Connection>(
    state: AppState<C>,
    id: &str,
    status: MentorshipStatus,
) -> ApiResult<MentorshipDto> {
    let id = parse_id(id, "mentorship")?;
    Ok(Json(state.service.end_mentorship(id, status).await?.into()))
}
