//! Error types for the chunk generation pipeline.

use std::path::PathBuf;

use thiserror::Error;

use crate::engine_state::voxels::coords::{BlockCoords, ChunkCoords};

/// Main error type for the pipeline
#[derive(Debug, Error)]
pub enum Error {
    /// A field or neighborhood was indexed outside of the region it covers.
    #[error("block {coords:?} is outside of the region covered by chunk {chunk_coords:?}")]
    OutOfRange {
        coords: BlockCoords,
        chunk_coords: ChunkCoords,
    },

    #[error("invalid chunk side {0}: it must be odd and at least 3")]
    InvalidChunkSide(i32),

    #[error("invalid generation zone: center {center:?}, radius {radius}")]
    InvalidGenerationZone { center: [f32; 3], radius: f32 },

    #[error("field data has {actual} values, expected {expected}")]
    FieldSizeMismatch { expected: usize, actual: usize },

    #[error("neighborhood of chunk {0:?} is missing or has foreign fields")]
    IncompleteNeighborhood(ChunkCoords),

    #[error("chunk {0:?} has no committed block field")]
    ChunkNotLoaded(ChunkCoords),

    #[error("chunk file {path:?} is unreadable: {reason}")]
    DiskRead { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("task queue is full ({0} tasks waiting)")]
    PoolSaturated(usize),

    #[error("worker {0} disconnected")]
    WorkerDisconnected(usize),
}

pub type Result<T> = std::result::Result<T, Error>;
