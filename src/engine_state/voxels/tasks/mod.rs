//! # Voxel Task System
//!
//! Tasks computing one generation step of one chunk on a worker thread.
//! Every task owns its inputs: copies of the neighborhood it reads and a
//! shared snapshot of the world context. None of them can observe the grid
//! while it is being modified on the driving thread.
//!
//! All tasks produce a `SomeChunkData`, so a single pool runs every step.

pub mod chunk_field_tasks;
pub mod disk_tasks;

pub use chunk_field_tasks::{ChunkBFieldTask, ChunkPtgFieldTask, ChunkPttFieldTask};
pub use disk_tasks::{DiskReadTask, DiskSearchTask};

use crate::{
    core::Error,
    engine_state::rendering::vertex::ChunkMeshData,
};

use super::{
    chunk::{ChunkBField, ChunkPtgField, ChunkPttField},
    disk::ChunkDiskStorage,
};

/// Output of any generation step.
///
/// The variant tells which mapping of the grid the result belongs to.
#[derive(Debug)]
pub enum SomeChunkData {
    PtgField(ChunkPtgField),
    PttField(ChunkPttField),
    /// Generated procedurally or read from disk.
    BField(ChunkBField),
    Mesh(ChunkMeshData),
    DiskStorage(ChunkDiskStorage),
    /// The saved copy of the chunk could not be used.
    DiskReadFailed(ChunkDiskStorage, Error),
}
