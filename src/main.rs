// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use photobooth::capture::Facing;
use photobooth::config::Config;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "photobooth")]
#[command(about = "Photo booth for the terminal: four webcam shots, one strip")]
#[command(version = env!("GIT_VERSION"))]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List available cameras
    List,

    /// Run a booth session without the interactive UI
    Strip {
        /// Camera facing to use (front or back)
        #[arg(short, long)]
        facing: Option<String>,

        /// Output directory (default: ~/Pictures/PhotoBooth)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compose a strip from existing photo files
    Compose {
        /// Image files or directories (PNG/JPEG), used in filename order
        input: Vec<PathBuf>,

        /// Output directory (default: ~/Pictures/PhotoBooth)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=photobooth=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let config = Config::load();

    match cli.command {
        Some(Commands::List) => cli::list_cameras(),
        Some(Commands::Strip { facing, output }) => {
            let facing = facing.map(|s| s.parse::<Facing>()).transpose()?;
            cli::capture_strip(facing, output, &config)
        }
        Some(Commands::Compose { input, output }) => cli::compose_strip(input, output, &config),
        None => photobooth::booth::run(config),
    }
}
