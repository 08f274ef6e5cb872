use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(version, about = "Prepare per-subject clinical time-series for modeling", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the chunked ingestion and imputation pipeline
    Prep(PrepArgs),
    /// Validate the configuration and global-means table without touching data
    Check(CheckArgs),
}

#[derive(Debug, Args)]
pub struct PrepArgs {
    /// Pipeline configuration file
    #[arg(short, long, default_value = "config.yml")]
    pub config: PathBuf,
    /// Global per-column mean values (one-row CSV)
    #[arg(short, long, default_value = "summary_data/mean_values.csv")]
    pub means: PathBuf,
    /// Clear an existing dataset destination without prompting
    #[arg(short = 'y', long = "yes")]
    pub yes: bool,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Pipeline configuration file
    #[arg(short, long, default_value = "config.yml")]
    pub config: PathBuf,
    /// Global per-column mean values (one-row CSV)
    #[arg(short, long, default_value = "summary_data/mean_values.csv")]
    pub means: PathBuf,
}

/// Ask a yes/no question on stdin, re-prompting until the answer is 'y' or
/// 'n'. End of input counts as a decline.
pub fn confirm(question: &str) -> bool {
    let stdin = io::stdin();
    loop {
        print!("{question} (y/n)\n> ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => return false,
            Ok(_) => {}
        }
        match line.trim() {
            "y" => return true,
            "n" => return false,
            _ => println!("Response must be 'y' or 'n'"),
        }
    }
}
