//! Command-line surface of the `thirds` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Rule-of-thirds composition scoring for photo submissions.
#[derive(Parser, Debug)]
#[command(name = "thirds", version)]
#[command(
    about = "Score photo composition against the rule of thirds and keep a ledger of results",
    after_help = "\
Examples:
  thirds score photo.jpg                               Score without recording
  thirds ingest --submission 1187 --user 42 photo.jpg  Score and record
  thirds ingest-batch uploads.jsonl                    Record many submissions
  thirds top                                           All-time leaderboard
  thirds week --limit 10                               Last seven days"
)]
pub struct Cli {
    /// Configuration file (missing file means defaults)
    #[arg(long, short = 'c', global = true, default_value = "thirds.yaml", env = "THIRDS_CONFIG")]
    pub config: PathBuf,

    /// Ledger file, overriding `storage.scores_file`
    #[arg(long, global = true)]
    pub scores_file: Option<PathBuf>,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score an image without recording it
    Score {
        /// Image file path or http(s) URL
        source: String,
    },

    /// Score an image and record it for a user
    Ingest {
        /// Unique id of the submission (message id, upload id)
        #[arg(long)]
        submission: String,

        /// Id of the submitting user
        #[arg(long)]
        user: String,

        /// Image file path or http(s) URL
        source: String,
    },

    /// Record every submission listed in a JSON-lines manifest
    #[command(after_help = "\
Each line is an object with `submission`, `user`, and `source` keys:
  {\"submission\": \"m-1\", \"user\": \"42\", \"source\": \"uploads/a.png\"}")]
    IngestBatch {
        /// Path of the manifest
        manifest: PathBuf,

        /// Submissions processed at once
        #[arg(long, default_value = "8", value_parser = clap::value_parser!(u16).range(1..=256))]
        concurrency: u16,
    },

    /// Lifetime average score for a user
    Avg {
        /// User id
        #[arg(long)]
        user: String,
    },

    /// All-time rank for a user
    Rank {
        /// User id
        #[arg(long)]
        user: String,
    },

    /// Best lifetime averages
    Top {
        /// Number of entries (default: `leaderboard.top_users`)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Best single images
    TopImages {
        /// Number of entries (default: `leaderboard.top_images`)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Best averages over the last seven days
    Week {
        /// Number of entries (default: `leaderboard.top_users`)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Consecutive posting days ending today
    Streak {
        /// User id
        #[arg(long)]
        user: String,
    },

    /// Remove every score a user owns
    Reset {
        /// User id
        #[arg(long)]
        user: String,
    },

    /// Print a random photo theme
    Daily,
}
