//! Mapgen - Development Tools

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mapgen_tools::report::{run_generate, validate_mission, GenerateOptions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mapgen-tools")]
#[command(about = "Development tools for the mission map engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a mission on an ASCII layout and print the result
    Generate {
        /// Mission RON file
        mission: PathBuf,
        /// ASCII layout file
        layout: PathBuf,
        /// Map config RON file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Seed for placement randomness
        #[arg(long)]
        seed: Option<u64>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check that a mission file parses
    Validate {
        /// Mission RON file
        mission: PathBuf,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            mission,
            layout,
            config,
            seed,
            json,
        } => {
            let options = GenerateOptions {
                mission,
                layout,
                config,
                seed,
            };
            let output = run_generate(&options).and_then(|report| {
                if json {
                    report.to_json()
                } else {
                    Ok(report.to_text())
                }
            });
            match output {
                Ok(text) => println!("{text}"),
                Err(e) => {
                    tracing::error!("Generation failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Validate { mission } => match validate_mission(&mission) {
            Ok(spec) => tracing::info!(
                title = %spec.title,
                objectives = spec.objectives.len(),
                "Mission is valid"
            ),
            Err(e) => {
                tracing::error!("Validation failed: {e}");
                std::process::exit(1);
            }
        },
    }
}
