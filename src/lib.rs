pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod frame;
pub mod impute;
pub mod means;
pub mod normalize;
pub mod pipeline;
pub mod writer;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, info};

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("physio_prep", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Prep(args) => pipeline::execute(&args),
        Commands::Check(args) => handle_check(&args),
    }
}

fn handle_check(args: &cli::CheckArgs) -> Result<()> {
    let config = config::Config::load(&args.config)?;
    let means = means::GlobalMeans::load(&args.means)?;
    info!(
        "Configuration {:?} is valid: raw data root {:?}, dataset destination {:?}",
        args.config,
        config.raw_data,
        config.dataset_path()
    );
    info!(
        "Imputation policy: some_nulls={:?}, all_nulls={:?}",
        config.imputations.some_nulls, config.imputations.all_nulls
    );
    info!(
        "{} kept column(s), {} omitted column(s), flush every {} file(s), at most {} fragment(s) per directory pass",
        config.kept_columns.len(),
        config.omitted_columns.len(),
        config.write_every,
        config.npackets
    );
    info!("Global means table {:?} holds {} column(s)", args.means, means.len());
    Ok(())
}
