#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for preparing the surveillance dataset.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "epi_dash_prepare", about = "Surveillance dataset preparation tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert the raw export into a Druid-ready CSV with a `__time` column
    Prepare {
        /// Raw export to read
        #[arg(long)]
        input: PathBuf,
        /// Where to write the prepared CSV
        #[arg(long)]
        output: PathBuf,
    },
    /// Print row, column, distinct and missing value counts for a CSV
    Summary {
        /// CSV file to profile
        #[arg(long)]
        input: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Prepare { input, output } => {
            let stats = epi_dash_prepare::prepare_file(&input, &output)?;
            println!(
                "Wrote {} records to {}",
                stats.records,
                output.display()
            );
        }
        Commands::Summary { input } => {
            let summary = epi_dash_prepare::summarize_file(&input)?;
            print!("{summary}");
        }
    }

    Ok(())
}
