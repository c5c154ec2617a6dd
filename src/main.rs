//! # Voxel Pipeline Entry Point
//!
//! Generates the configured zone once, saves it, and exits.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release -- [config.json]
//! ```
//!
//! Without an argument the default configuration is used.

use std::{path::PathBuf, process::ExitCode};

use log::error;
use voxel_pipeline::GenerationConfig;

const MAX_TICKS: usize = 100_000;

fn main() -> ExitCode {
    voxel_pipeline::init_logging();

    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => match GenerationConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                error!("Cannot read config {:?}: {}", path, err);
                return ExitCode::FAILURE;
            }
        },
        None => GenerationConfig::default(),
    };

    match voxel_pipeline::run(config, MAX_TICKS) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
