#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Pipeline
//!
//! Procedural generation of a chunked voxel world, from noise to meshes.
//!
//! Chunks go through a sequence of stages, each computed on a worker pool
//! from the finished output of the previous stage over the 3×3×3
//! neighborhood of the chunk:
//!
//! 1. PTG: a signed terrain density per block
//! 2. PTT: a block type per block, derived from the densities
//! 3. B: the final blocks, derived from the types (or loaded from disk)
//! 4. Mesh: renderable triangles of the visible block faces
//!
//! ## Key Modules
//!
//! * `core` - Error type and generation configuration
//! * `engine_state` - The world, its generation scheduler, its worker pool and its meshing
//!
//! ## Usage
//!
//! ```no_run
//! use voxel_pipeline::{EngineState, GenerationConfig};
//!
//! voxel_pipeline::init_logging();
//! let mut engine_state = EngineState::new(GenerationConfig::default())?;
//! while !engine_state.zone_is_meshed() {
//!     engine_state.tick();
//! }
//! engine_state.save()?;
//! # Ok::<(), voxel_pipeline::Error>(())
//! ```

use std::{thread, time::Duration};

use log::{error, info};
use web_time::Instant;

pub mod core;
pub mod engine_state;

pub use crate::core::{Error, GenerationConfig, Result};
pub use engine_state::{
    voxels::{
        coords::{BlockCoords, ChunkCoords},
        generation_manager::{ChunkGeneratingStep, ManageReport},
    },
    EngineState,
};

/// Pause between two ticks of [`run`] while waiting on the workers.
const TICK_INTERVAL: Duration = Duration::from_millis(2);

/// Sets up the global logger: records go to stdout, filtered by `RUST_LOG`
/// (`info` when unset). Later calls are no-ops.
pub fn init_logging() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .filter_level(log::LevelFilter::Info)
        .parse_env("RUST_LOG");
    if log_builder.try_init().is_ok() {
        info!("Logger initialized");
    }
}

/// Generates the zone described by `config` until every chunk in it is
/// meshed or `max_ticks` ticks went by, then saves the world if loading and
/// saving is enabled.
///
/// Returns the number of ticks it took.
pub fn run(config: GenerationConfig, max_ticks: usize) -> Result<usize> {
    let start = Instant::now();
    let load_save_enabled = config.load_save_enabled;
    let mut engine_state = EngineState::new(config)?;

    let mut ticks = 0;
    while ticks < max_ticks {
        let report = engine_state.tick();
        ticks += 1;
        if report.submitted > 0 {
            info!(
                "Tick {}: {} chunks meshed, {} steps in flight",
                ticks,
                engine_state.grid().mesh_count(),
                engine_state.generation_manager().in_flight_count()
            );
        }
        if engine_state.zone_is_meshed() {
            break;
        }
        if engine_state.generation_manager().in_flight_count() > 0 {
            thread::sleep(TICK_INTERVAL);
        }
    }

    if engine_state.zone_is_meshed() {
        info!(
            "Zone meshed in {} ticks ({:?}), {} chunks",
            ticks,
            start.elapsed(),
            engine_state.grid().mesh_count()
        );
    } else {
        error!(
            "Zone still incomplete after {} ticks, {} chunks meshed",
            ticks,
            engine_state.grid().mesh_count()
        );
    }

    if load_save_enabled {
        engine_state.save()?;
    }
    Ok(ticks)
}
