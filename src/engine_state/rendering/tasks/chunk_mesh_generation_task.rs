//! Task for generating the mesh of a chunk in a background thread.
//!
//! Meshing reads every block of the chunk plus the one block shell around it,
//! which makes it the most expensive step of the pipeline. Running it off
//! the driving thread keeps ticks short.

use std::sync::Arc;

use crate::engine_state::{
    rendering::meshing::generate_chunk_mesh,
    task_management::task::Task,
    voxels::{
        chunk::{BFieldValue, ChunkNeighborhood},
        context::WorldContext,
        tasks::SomeChunkData,
    },
};

/// A task that generates the mesh of a chunk from a copy of its B neighborhood.
pub struct ChunkMeshGenerationTask {
    /// Blocks of the chunk and of its 26 neighbors
    b_field: ChunkNeighborhood<BFieldValue>,
    /// Source of the atlas coordinates of each face
    context: Arc<dyn WorldContext>,
}

impl ChunkMeshGenerationTask {
    pub fn new(b_field: ChunkNeighborhood<BFieldValue>, context: Arc<dyn WorldContext>) -> Self {
        ChunkMeshGenerationTask { b_field, context }
    }
}

impl Task for ChunkMeshGenerationTask {
    type Output = SomeChunkData;

    fn process(self: Box<Self>) -> SomeChunkData {
        SomeChunkData::Mesh(generate_chunk_mesh(
            self.b_field.center(),
            &self.b_field,
            self.context.as_ref(),
        ))
    }
}
