// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "woodglass")]
#[command(about = "Live Wood's-glass camera filter")]
#[command(version = env!("WOODGLASS_BUILD_VERSION"))]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Live filtered preview in the terminal (default)
    Preview {
        #[command(flatten)]
        source: cli::SourceArgs,
    },

    /// Take a filtered, watermarked photo
    Photo {
        #[command(flatten)]
        source: cli::SourceArgs,

        /// Filter intensity override (0.0 - 1.0)
        #[arg(long)]
        intensity: Option<f32>,

        /// Output directory (default: ~/Pictures/Woodglass)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Record a filtered clip
    Video {
        #[command(flatten)]
        source: cli::SourceArgs,

        /// Recording duration in seconds, capped at 30
        #[arg(short, long, default_value = "10")]
        duration: u64,

        /// Output directory (default: ~/Videos/Woodglass)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the app share link
    ShareLink {
        /// Open the link in the default browser
        #[arg(long)]
        open: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=woodglass=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Preview { source }) => run_preview(source),
        Some(Commands::Photo {
            source,
            intensity,
            output,
        }) => cli::take_photo(source, intensity, output),
        Some(Commands::Video {
            source,
            duration,
            output,
        }) => cli::record_video(source, duration, output),
        Some(Commands::ShareLink { open }) => cli::share_link(open),
        None => run_preview(cli::SourceArgs::default()),
    }
}

fn run_preview(source: cli::SourceArgs) -> Result<(), Box<dyn std::error::Error>> {
    woodglass::terminal::run(source.config(None, None), source.spec())
}
