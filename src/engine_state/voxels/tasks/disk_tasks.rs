//! Tasks looking for and reading saved chunks.

use std::path::PathBuf;

use log::warn;

use crate::engine_state::{
    task_management::task::Task,
    voxels::{
        coords::{ChunkCoords, ChunkSide},
        disk::{read_disk_chunk_b_field, search_disk_for_chunk, ChunkDiskStorage},
    },
};

use super::SomeChunkData;

/// Checks whether a chunk was saved, producing its disk storage record.
pub struct DiskSearchTask {
    save_directory: PathBuf,
    chunk_coords: ChunkCoords,
}

impl DiskSearchTask {
    pub fn new(save_directory: PathBuf, chunk_coords: ChunkCoords) -> Self {
        DiskSearchTask {
            save_directory,
            chunk_coords,
        }
    }
}

impl Task for DiskSearchTask {
    type Output = SomeChunkData;

    fn process(self: Box<Self>) -> SomeChunkData {
        SomeChunkData::DiskStorage(search_disk_for_chunk(&self.save_directory, self.chunk_coords))
    }
}

/// Reads the B field of a saved chunk.
pub struct DiskReadTask {
    storage: ChunkDiskStorage,
    side: ChunkSide,
}

impl DiskReadTask {
    pub fn new(storage: ChunkDiskStorage, side: ChunkSide) -> Self {
        DiskReadTask { storage, side }
    }
}

impl Task for DiskReadTask {
    type Output = SomeChunkData;

    fn process(self: Box<Self>) -> SomeChunkData {
        match read_disk_chunk_b_field(&self.storage, self.side) {
            Ok(field) => SomeChunkData::BField(field),
            Err(error) => {
                warn!("Falling back to generation: {}", error);
                SomeChunkData::DiskReadFailed(self.storage, error)
            }
        }
    }
}
