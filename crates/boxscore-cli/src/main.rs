// Boxscore entry point.
//
// Startup sequence:
// 1. Parse arguments
// 2. Load config (explicit path, ./config, platform dir, or defaults)
// 3. Initialize tracing (stderr, or the configured log file)
// 4. Run the subcommand and print its report to stdout

use std::time::Duration;

use anyhow::{bail, Context};
use boxscore_cli::cli::{ClassifyArgs, Cli, Commands, LeadersArgs, PlayerArgs, SourceArgs};
use boxscore_cli::commands::{self, LeaderSettings};
use boxscore_cli::config::{self, Config, LoggingConfig};
use boxscore_cli::report;
use boxscore_baseball::stats::metrics::PlayerLine;
use clap::Parser;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, source) =
        config::load_config(cli.config.as_deref()).context("failed to load configuration")?;

    init_tracing(&config.logging, cli.log_filter.as_deref())?;
    match source {
        Some(path) => info!("Config loaded from {}", path.display()),
        None => info!("No config file found, using defaults"),
    }

    match cli.command {
        Commands::Leaders(args) => run_leaders(args, &config).await,
        Commands::Player(args) => run_player(args, &config).await,
        Commands::Classify(args) => run_classify(args),
    }
}

// ---------------------------------------------------------------------------
// Subcommands
// ---------------------------------------------------------------------------

async fn run_leaders(args: LeadersArgs, config: &Config) -> anyhow::Result<()> {
    let settings = LeaderSettings::resolve(config, &args.metrics, args.top, args.min_ab)?;
    let baseline = match &args.baseline {
        Some(path) => Some(commands::lines_from_file(path)?),
        None => None,
    };

    if let Some(path) = &args.source.events {
        let lines = commands::lines_from_file(path)?;
        let boards = commands::build_leaderboards(&lines, &settings, baseline.as_deref());
        return print_boards(&boards, args.json);
    }

    if args.watch == Some(0) {
        bail!("--watch interval must be at least 1 second");
    }

    let mut feed = commands::build_feed(&config.feed)?;
    let query = args.source.feed_query();
    let mut previous = baseline;
    let mut refresh = args.source.refresh;

    loop {
        let lines = commands::lines_from_feed(&mut feed, &query, refresh).await?;
        let boards = commands::build_leaderboards(&lines, &settings, previous.as_deref());
        print_boards(&boards, args.json)?;

        let Some(secs) = args.watch else {
            break;
        };
        previous = Some(lines);
        refresh = false;

        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(secs)) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C received, stopping watch");
                break;
            }
        }
    }

    Ok(())
}

async fn run_player(args: PlayerArgs, config: &Config) -> anyhow::Result<()> {
    let lines = load_lines(&args.source, config).await?;
    let Some(line) = commands::find_player(&lines, &args.name) else {
        bail!("no events found for participant '{}'", args.name);
    };

    if args.json {
        println!("{}", report::to_json(line)?);
    } else {
        print!("{}", report::render_player(line));
    }
    Ok(())
}

fn run_classify(args: ClassifyArgs) -> anyhow::Result<()> {
    let result = commands::classify_file(
        &args.annotations,
        args.participant.as_deref(),
        args.team.as_deref(),
    )?;

    if args.json {
        println!("{}", report::to_json(&result)?);
        return Ok(());
    }

    print!("{}", report::render_frame(&result.frame));
    if let Some(line) = &result.line {
        println!();
        print!("{}", report::render_player(line));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load_lines(source: &SourceArgs, config: &Config) -> anyhow::Result<Vec<PlayerLine>> {
    match &source.events {
        Some(path) => commands::lines_from_file(path),
        None => {
            let mut feed = commands::build_feed(&config.feed)?;
            commands::lines_from_feed(&mut feed, &source.feed_query(), source.refresh).await
        }
    }
}

fn print_boards(boards: &[report::Leaderboard], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", report::to_json(boards)?);
    } else {
        print!("{}", report::render_leaderboards(boards));
    }
    Ok(())
}

/// Filter precedence: `--log-filter`, then `RUST_LOG`, then the config.
fn init_tracing(logging: &LoggingConfig, override_filter: Option<&str>) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = match override_filter {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid log filter '{directives}'"))?,
        None => EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&logging.filter))
            .with_context(|| format!("invalid log filter '{}'", logging.filter))?,
    };

    match &logging.file {
        Some(path) => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("failed to create log directory {}", dir.display()))?;
            }
            let log_file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;

            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(filter)
                .with_writer(log_file)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .context("failed to set tracing subscriber")?;
        }
        None => {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(true)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .context("failed to set tracing subscriber")?;
        }
    }

    Ok(())
}
