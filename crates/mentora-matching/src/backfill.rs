//! Batch regeneration of suggestions across mentors.

use chrono::Utc;
use mentora_core::error::MentoraResult;
use mentora_core::models::user::UserRole;
use mentora_core::repository::{
    MatchSuggestionRepository, MentorshipRepository, Pagination, UserFilter, UserRepository,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::service::MatchService;

#[derive(Debug, Clone, Default)]
pub struct BackfillOptions {
    /// Suggestions per mentor. `None` uses the configured default.
    pub limit: Option<usize>,
}

/// A mentor the batch could not process.
#[derive(Debug, Clone, Serialize)]
pub struct MentorFailure {
    pub mentor_id: Uuid,
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BackfillSummary {
    pub mentors_processed: usize,
    pub mentors_failed: usize,
    pub created: usize,
    pub updated: usize,
    pub expired: usize,
    pub failures: Vec<MentorFailure>,
}

impl<U, S, M> MatchService<U, S, M>
where
    U: UserRepository,
    S: MatchSuggestionRepository,
    M: MentorshipRepository,
{
    /// Expire stale suggestions, then regenerate for every approved
    /// mentor. A failing mentor is recorded and skipped.
    pub async fn generate_for_all_mentors(
        &self,
        options: BackfillOptions,
    ) -> MentoraResult<BackfillSummary> {
        let now = Utc::now();
        let limit = self.config.resolve_limit(options.limit);
        let mut summary = BackfillSummary {
            expired: self.expire_stale(now).await?.len(),
            ..Default::default()
        };

        let mut offset = 0;
        loop {
            let page = self
                .user_repo
                .list(
                    UserFilter::approved(UserRole::Mentor),
                    Pagination {
                        offset,
                        limit: self.config.directory_page_size,
                    },
                )
                .await?;
            let more = page.has_more();
            let fetched = page.items.len() as u64;

            for mentor in page.items {
                match self.build_for_mentor(&mentor, limit, now).await {
                    Ok(result) => {
                        summary.mentors_processed += 1;
                        summary.created += result.created;
                        summary.updated += result.updated;
                    }
                    Err(e) => {
                        warn!(mentor_id = %mentor.id, error = %e, "Backfill failed for mentor");
                        summary.mentors_failed += 1;
                        summary.failures.push(MentorFailure {
                            mentor_id: mentor.id,
                            code: e.code(),
                            message: e.to_string(),
                        });
                    }
                }
            }

            offset += fetched;
            if !more || fetched == 0 {
                break;
            }
        }

        info!(
            mentors_processed = summary.mentors_processed,
            mentors_failed = summary.mentors_failed,
            created = summary.created,
            updated = summary.updated,
            expired = summary.expired,
            "Backfill finished"
        );
        Ok(summary)
    }

    /// Regenerate for one mentor. Errors propagate.
    pub async fn generate_for_single_mentor(
        &self,
        mentor_id: Uuid,
        options: BackfillOptions,
    ) -> MentoraResult<BackfillSummary> {
        let result = self.generate_for_mentor(mentor_id, options.limit).await?;

        info!(
            %mentor_id,
            created = result.created,
            updated = result.updated,
            expired = result.expired,
            "Backfill finished for mentor"
        );
        Ok(BackfillSummary {
            mentors_processed: 1,
            created: result.created,
            updated: result.updated,
            expired: result.expired,
            ..Default::default()
        })
    }
}
