//! # Generation Configuration
//!
//! Tunables for a single world instance. They are read once at startup
//! (optionally from a JSON file) and threaded through construction of the
//! grid, the worker pool and the generation manager.
//!
//! ## Example
//! ```json
//! {
//!     "chunk_side": 15,
//!     "generation_radius": 40.0,
//!     "save_directory": "save/chunks"
//! }
//! ```
//! Omitted keys take their default value.

use std::{fs, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};

use super::error::Result;

/// Configuration of the chunk generation pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Edge length of a chunk in blocks. Must be odd.
    pub chunk_side: i32,
    /// Block-level coords at the center of the generation zone.
    pub generation_center: [f32; 3],
    /// Radius (in blocks) of the generation zone.
    pub generation_radius: f32,
    pub generation_enabled: bool,
    pub load_save_enabled: bool,
    /// Directory holding one file per saved chunk.
    pub save_directory: PathBuf,
    /// Number of worker threads. Zero runs every task on the driving thread.
    pub worker_count: usize,
    /// Upper bound on tasks waiting for a free worker.
    pub max_queued_tasks: usize,
    /// Upper bound on stage submissions in a single `manage` call.
    pub max_submissions_per_tick: usize,
    /// Seed of the default world context.
    pub seed: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            chunk_side: 15,
            generation_center: [0.0, 0.0, 0.0],
            generation_radius: 40.0,
            generation_enabled: true,
            load_save_enabled: true,
            save_directory: PathBuf::from("save/chunks"),
            worker_count: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            max_queued_tasks: 4096,
            max_submissions_per_tick: 256,
            seed: 0,
        }
    }
}

impl GenerationConfig {
    /// Reads a configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parses a configuration from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
