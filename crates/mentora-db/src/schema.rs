//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1: initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Users (mentors, mentees, admins)
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD name ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD role ON TABLE user TYPE string \
    ASSERT $value IN ['mentee', 'mentor', 'admin'];
DEFINE FIELD status ON TABLE user TYPE string \
    ASSERT $value IN ['pending', 'approved', 'rejected', 'inactive'];
DEFINE FIELD expertise ON TABLE user TYPE array<string> DEFAULT [];
DEFINE FIELD interests ON TABLE user TYPE array<string> DEFAULT [];
DEFINE FIELD goals ON TABLE user TYPE array<string> DEFAULT [];
DEFINE FIELD availability ON TABLE user TYPE array<string> DEFAULT [];
DEFINE FIELD program ON TABLE user TYPE option<string>;
DEFINE FIELD priority ON TABLE user TYPE bool DEFAULT false;
DEFINE FIELD capacity ON TABLE user TYPE int DEFAULT 0 \
    ASSERT $value >= 0;
DEFINE FIELD active_mentee_count ON TABLE user TYPE int DEFAULT 0 \
    ASSERT $value >= 0;
DEFINE FIELD approved_at ON TABLE user TYPE option<datetime>;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;
DEFINE INDEX idx_user_role_status ON TABLE user COLUMNS role, status;

-- =======================================================================
-- Match suggestions
-- =======================================================================
-- active_pair_key is '<mentor>:<mentee>' while the suggestion is active
-- and the suggestion's own id once terminal, so the unique index allows
-- at most one active suggestion per pair.
DEFINE TABLE match_suggestion SCHEMAFULL;
DEFINE FIELD mentor_id ON TABLE match_suggestion TYPE string;
DEFINE FIELD mentee_id ON TABLE match_suggestion TYPE string;
DEFINE FIELD active_pair_key ON TABLE match_suggestion TYPE string;
DEFINE FIELD score ON TABLE match_suggestion TYPE float \
    ASSERT $value >= 0 AND $value <= 100;
DEFINE FIELD score_expertise ON TABLE match_suggestion TYPE float;
DEFINE FIELD score_availability ON TABLE match_suggestion TYPE float;
DEFINE FIELD score_interactions ON TABLE match_suggestion TYPE float;
DEFINE FIELD score_priority ON TABLE match_suggestion TYPE float;
DEFINE FIELD matched_expertise ON TABLE match_suggestion \
    TYPE array<string> DEFAULT [];
DEFINE FIELD status ON TABLE match_suggestion TYPE string \
    ASSERT $value IN ['suggested', 'mentor_accepted', 'mentor_declined', \
    'mentee_accepted', 'mentee_declined', 'rejected', 'expired', \
    'connected'];
DEFINE FIELD decline_reason ON TABLE match_suggestion \
    TYPE option<string>;
DEFINE FIELD notes ON TABLE match_suggestion TYPE option<string>;
DEFINE FIELD metadata ON TABLE match_suggestion TYPE object FLEXIBLE \
    DEFAULT {};
DEFINE FIELD expires_at ON TABLE match_suggestion \
    TYPE option<datetime>;
DEFINE FIELD mentor_responded_at ON TABLE match_suggestion \
    TYPE option<datetime>;
DEFINE FIELD mentee_responded_at ON TABLE match_suggestion \
    TYPE option<datetime>;
DEFINE FIELD created_at ON TABLE match_suggestion TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE match_suggestion TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_suggestion_active_pair ON TABLE match_suggestion \
    COLUMNS active_pair_key UNIQUE;
DEFINE INDEX idx_suggestion_mentor ON TABLE match_suggestion \
    COLUMNS mentor_id;
DEFINE INDEX idx_suggestion_mentee ON TABLE match_suggestion \
    COLUMNS mentee_id;
DEFINE INDEX idx_suggestion_status ON TABLE match_suggestion \
    COLUMNS status, expires_at;

-- =======================================================================
-- Mentorships
-- =======================================================================
DEFINE TABLE mentorship SCHEMAFULL;
DEFINE FIELD mentor_id ON TABLE mentorship TYPE string;
DEFINE FIELD mentee_id ON TABLE mentorship TYPE string;
DEFINE FIELD suggestion_id ON TABLE mentorship TYPE string;
DEFINE FIELD status ON TABLE mentorship TYPE string \
    ASSERT $value IN ['active', 'completed', 'cancelled'];
DEFINE FIELD started_at ON TABLE mentorship TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD ended_at ON TABLE mentorship TYPE option<datetime>;
DEFINE INDEX idx_mentorship_suggestion ON TABLE mentorship \
    COLUMNS suggestion_id UNIQUE;
DEFINE INDEX idx_mentorship_mentor ON TABLE mentorship \
    COLUMNS mentor_id;
DEFINE INDEX idx_mentorship_mentee ON TABLE mentorship \
    COLUMNS mentee_id;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
