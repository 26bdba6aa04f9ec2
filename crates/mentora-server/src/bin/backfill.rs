//! Mentora backfill: regenerate match suggestions from the command line.

use anyhow::{Result, bail};
use clap::Parser;
use mentora_db::{DbManager, run_migrations};
use mentora_matching::BackfillOptions;
use mentora_server::dto::BackfillDto;
use mentora_server::{AppState, ServerConfig, init_tracing};
use uuid::Uuid;

/// Parse and validate a per-mentor limit (at least 1)
fn parse_limit(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("limit must be at least 1".to_string())
    } else {
        Ok(n)
    }
}

/// Regenerate mentor/mentee match suggestions.
///
/// Expires stale suggestions, then rescores and persists the top
/// candidates for every approved mentor (or a single one). Database
/// and matching settings come from the `MENTORA_*` environment.
#[derive(Parser, Debug)]
#[command(name = "mentora-backfill", version)]
struct Args {
    /// Only regenerate for this mentor
    #[arg(long)]
    mentor_id: Option<Uuid>,

    /// Suggestions to keep per mentor (default: configured default)
    #[arg(long, value_parser = parse_limit)]
    limit: Option<usize>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = ServerConfig::from_env();
    init_tracing(config.log_json)?;

    let manager = DbManager::connect(&config.db).await?;
    run_migrations(manager.client()).await?;
    let state = AppState::new(manager.client().clone(), config.matching.clone())?;

    let options = BackfillOptions { limit: args.limit };
    let summary = match args.mentor_id {
        Some(mentor_id) => {
            state
                .service
                .generate_for_single_mentor(mentor_id, options)
                .await?
        }
        None => state.service.generate_for_all_mentors(options).await?,
    };
    let failed = summary.mentors_failed;
    let report = BackfillDto::from(summary);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "processed {} mentors ({} failed): {} created, {} updated, {} expired",
            report.mentors_processed,
            report.mentors_failed,
            report.created,
            report.updated,
            report.expired
        );
        for failure in &report.failures {
            println!("  {} [{}] {}", failure.mentor_id, failure.code, failure.message);
        }
    }

    if failed > 0 {
        bail!("{failed} mentors failed");
    }
    Ok(())
}
