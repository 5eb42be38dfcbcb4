// Command-line interface definitions.

use std::path::PathBuf;

use boxscore_baseball::feed::FeedQuery;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Boxscore - baseball play aggregation, leaderboards and frame signals.
#[derive(Parser, Debug)]
#[command(name = "boxscore")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (default: ./config/boxscore.toml, then the
    /// platform config directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the log filter (RUST_LOG syntax)
    #[arg(long, global = true)]
    pub log_filter: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rank participants by one or more metrics
    Leaders(LeadersArgs),

    /// Show the full stat line for one participant
    Player(PlayerArgs),

    /// Classify an image-annotation response into play signals
    Classify(ClassifyArgs),
}

/// Where events come from: a local file or the live feed.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Event file (.json array or .csv)
    #[arg(short, long, conflicts_with = "fetch", required_unless_present = "fetch")]
    pub events: Option<PathBuf>,

    /// Fetch events from the play-by-play feed instead of a file
    #[arg(long)]
    pub fetch: bool,

    /// First game date to fetch (YYYY-MM-DD)
    #[arg(long, requires = "fetch")]
    pub start: Option<NaiveDate>,

    /// Last game date to fetch (YYYY-MM-DD)
    #[arg(long, requires = "fetch")]
    pub end: Option<NaiveDate>,

    /// Skip cached feed data and fetch fresh
    #[arg(long, requires = "fetch")]
    pub refresh: bool,
}

impl SourceArgs {
    pub fn feed_query(&self) -> FeedQuery {
        FeedQuery {
            start_date: self.start,
            end_date: self.end,
        }
    }
}

/// Arguments for the `leaders` subcommand.
#[derive(Args, Debug)]
pub struct LeadersArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Metric to rank by (repeatable; e.g. avg, ops, hr). Defaults to config
    #[arg(short, long = "metric")]
    pub metrics: Vec<String>,

    /// Number of leaders per board
    #[arg(short, long)]
    pub top: Option<usize>,

    /// Minimum at-bats to qualify
    #[arg(long)]
    pub min_ab: Option<u32>,

    /// Earlier event file to compute trends against
    #[arg(long)]
    pub baseline: Option<PathBuf>,

    /// Re-fetch every N seconds, trending against the previous refresh
    #[arg(long, requires = "fetch")]
    pub watch: Option<u64>,

    /// Emit JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `player` subcommand.
#[derive(Args, Debug)]
pub struct PlayerArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Participant name (case-insensitive)
    #[arg(short, long)]
    pub name: String,

    /// Emit JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `classify` subcommand.
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Vision annotation response (JSON)
    #[arg(short, long)]
    pub annotations: PathBuf,

    /// Credit the signals to this participant and print the resulting line
    #[arg(short, long)]
    pub participant: Option<String>,

    /// Team label for --participant
    #[arg(long, requires = "participant")]
    pub team: Option<String>,

    /// Emit JSON instead of text
    #[arg(long)]
    pub json: bool,
}
