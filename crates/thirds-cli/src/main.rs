//! The `thirds` binary.
//!
//! Scores photos for rule-of-thirds composition, records submissions in the
//! JSON ledger, and answers leaderboard queries.
//!
//! # Startup Sequence
//!
//! 1. Parse the command line
//! 2. Load configuration from `thirds.yaml` (defaults if absent)
//! 3. Initialize structured logging (tracing) on stderr
//! 4. Open the ledger and build the submission gate, if the command needs it
//! 5. Run the command and print its result on stdout

mod args;
mod batch;
mod error;
mod render;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use thirds_core::config::LoggingConfig;
use thirds_core::{
    Clock, ImageSource, IngestOutcome, LogFormat, SubmissionGate, ThirdsConfig, prompts,
};
use thirds_store::LedgerStore;
use thirds_types::{SubmissionId, UserId};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::args::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ThirdsConfig::load(&cli.config)
        .map_err(CliError::from)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(path) = &cli.scores_file {
        config.storage.scores_file.clone_from(path);
    }

    init_logging(&config.logging);
    info!(
        config = %cli.config.display(),
        scores_file = %config.storage.scores_file.display(),
        "thirds starting"
    );

    run(cli.command, &config).await?;
    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    match logging.format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn open_gate(config: &ThirdsConfig) -> Result<SubmissionGate, CliError> {
    let store = LedgerStore::json(&config.storage.scores_file);
    Ok(SubmissionGate::open(store, &config.scoring, Clock::System).await?)
}

async fn run(command: Command, config: &ThirdsConfig) -> Result<(), CliError> {
    let boards = &config.leaderboard;

    let output = match command {
        Command::Daily => render::daily_line(prompts::daily_prompt()),

        Command::Score { source } => {
            let gate = open_gate(config).await?;
            let report = gate.score_source(&ImageSource::parse(&source)).await?;
            render::score_line(report.score)
        }

        Command::Ingest {
            submission,
            user,
            source,
        } => {
            let gate = open_gate(config).await?;
            let outcome = gate
                .ingest_source(
                    &SubmissionId::new(submission.as_str()),
                    &UserId::new(user),
                    &ImageSource::parse(&source),
                )
                .await?;
            match outcome {
                IngestOutcome::Recorded(event) => render::score_line(event.score),
                IngestOutcome::Skipped(_) => {
                    format!("Submission {submission} was already processed.")
                }
            }
        }

        Command::IngestBatch {
            manifest,
            concurrency,
        } => {
            let entries = batch::load_manifest(&manifest).await?;
            let gate = Arc::new(open_gate(config).await?);
            let results = batch::run(&gate, entries, usize::from(concurrency)).await;
            let summary = batch::BatchSummary::of(&results);

            for result in &results {
                let line = match &result.outcome {
                    Ok(IngestOutcome::Recorded(event)) => render::score_line(event.score),
                    Ok(IngestOutcome::Skipped(_)) => "already processed".to_owned(),
                    Err(e) => format!("error [{}]: {e}", e.kind()),
                };
                println!("{}\t{}\t{line}", result.entry.submission, result.entry.user);
            }
            println!(
                "{} recorded, {} skipped, {} failed",
                summary.recorded, summary.skipped, summary.failed
            );
            if summary.failed > 0 {
                return Err(CliError::BatchFailures {
                    failed: summary.failed,
                    total: summary.total(),
                });
            }
            return Ok(());
        }

        Command::Avg { user } => {
            let gate = open_gate(config).await?;
            render::average_line(gate.average(&UserId::new(user)).await)
        }

        Command::Rank { user } => {
            let gate = open_gate(config).await?;
            render::rank_line(gate.rank(&UserId::new(user)).await.as_ref())
        }

        Command::Top { limit } => {
            let n = limit.unwrap_or(boards.top_users);
            let gate = open_gate(config).await?;
            render::user_board(
                &format!("Top {n} Averages"),
                &gate.top_users(n).await,
                "No scores yet.",
            )
        }

        Command::TopImages { limit } => {
            let n = limit.unwrap_or(boards.top_images);
            let gate = open_gate(config).await?;
            render::image_board(&format!("Top {n} Images"), &gate.top_images(n).await)
        }

        Command::Week { limit } => {
            let n = limit.unwrap_or(boards.top_users);
            let gate = open_gate(config).await?;
            render::user_board(
                &format!("Weekly Top {n}"),
                &gate.weekly_top(n).await,
                "No activity in the last 7 days.",
            )
        }

        Command::Streak { user } => {
            let gate = open_gate(config).await?;
            render::streak_line(gate.streak(&UserId::new(user)).await)
        }

        Command::Reset { user } => {
            let gate = open_gate(config).await?;
            let user = UserId::new(user);
            let outcome = gate.reset(&user).await?;
            render::reset_line(&user, outcome)
        }
    };

    println!("{output}");
    Ok(())
}
