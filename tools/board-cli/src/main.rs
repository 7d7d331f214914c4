//! Board CLI - Operator and debug tool for the listing board.
//!
//! Commands:
//! - `board rank` - Rank a listings file for a rotation window
//! - `board rotation` - Show the current rotation window
//! - `board pick` - Simulate weighted ad selection for a placement
//! - `board slots` - Show slot usage per placement
//! - `board replay-events` - Feed recorded ad events through the event queue

mod commands;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{PickArgs, RankArgs, ReplayEventsArgs, RotationArgs, SlotsArgs};

/// Board CLI - Inspect listing rotation, ad serving and event telemetry
#[derive(Parser)]
#[command(name = "board")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank listings for a rotation window
    Rank(RankArgs),

    /// Show the rotation window for an instant
    Rotation(RotationArgs),

    /// Simulate weighted selection for a placement
    Pick(PickArgs),

    /// Show slot usage per placement
    Slots(SlotsArgs),

    /// Replay ad events through the event queue
    ReplayEvents(ReplayEventsArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        std::env::var("RUST_LOG")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(Level::WARN)
    };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let output = output::Output::new(cli.verbose, cli.json);
    let ctx = context::Context::load(cli.config.as_deref(), output)?;

    let result = match cli.command {
        Commands::Rank(args) => commands::rank::run(args, &ctx).await,
        Commands::Rotation(args) => commands::rotation::run(args, &ctx).await,
        Commands::Pick(args) => commands::pick::run(args, &ctx).await,
        Commands::Slots(args) => commands::slots::run(args, &ctx).await,
        Commands::ReplayEvents(args) => commands::replay::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
