//! Tasks running the field-producing stage functions.

use std::sync::Arc;

use crate::engine_state::{
    task_management::task::Task,
    voxels::{
        chunk::{ChunkNeighborhood, PtgFieldValue, PttFieldValue},
        context::WorldContext,
        coords::{ChunkCoords, ChunkSide},
        generation::{generate_chunk_b_field, generate_chunk_ptg_field, generate_chunk_ptt_field},
    },
};

use super::SomeChunkData;

/// Generates the PTG field of a chunk.
pub struct ChunkPtgFieldTask {
    side: ChunkSide,
    chunk_coords: ChunkCoords,
    context: Arc<dyn WorldContext>,
}

impl ChunkPtgFieldTask {
    pub fn new(side: ChunkSide, chunk_coords: ChunkCoords, context: Arc<dyn WorldContext>) -> Self {
        ChunkPtgFieldTask {
            side,
            chunk_coords,
            context,
        }
    }
}

impl Task for ChunkPtgFieldTask {
    type Output = SomeChunkData;

    fn process(self: Box<Self>) -> SomeChunkData {
        SomeChunkData::PtgField(generate_chunk_ptg_field(
            self.side,
            self.chunk_coords,
            self.context.as_ref(),
        ))
    }
}

/// Generates the PTT field of a chunk from a copy of its PTG neighborhood.
pub struct ChunkPttFieldTask {
    ptg: ChunkNeighborhood<PtgFieldValue>,
    context: Arc<dyn WorldContext>,
}

impl ChunkPttFieldTask {
    pub fn new(ptg: ChunkNeighborhood<PtgFieldValue>, context: Arc<dyn WorldContext>) -> Self {
        ChunkPttFieldTask { ptg, context }
    }
}

impl Task for ChunkPttFieldTask {
    type Output = SomeChunkData;

    fn process(self: Box<Self>) -> SomeChunkData {
        SomeChunkData::PttField(generate_chunk_ptt_field(
            self.ptg.center(),
            &self.ptg,
            self.context.as_ref(),
        ))
    }
}

/// Generates the B field of a chunk from a copy of its PTT neighborhood.
pub struct ChunkBFieldTask {
    ptt: ChunkNeighborhood<PttFieldValue>,
    context: Arc<dyn WorldContext>,
}

impl ChunkBFieldTask {
    pub fn new(ptt: ChunkNeighborhood<PttFieldValue>, context: Arc<dyn WorldContext>) -> Self {
        ChunkBFieldTask { ptt, context }
    }
}

impl Task for ChunkBFieldTask {
    type Output = SomeChunkData;

    fn process(self: Box<Self>) -> SomeChunkData {
        SomeChunkData::BField(generate_chunk_b_field(
            self.ptt.center(),
            &self.ptt,
            self.context.as_ref(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::{context::NoiseWorldContext, coords::ChunkRect};

    #[test]
    fn test_ptg_then_ptt_tasks() {
        let side = ChunkSide::new(15).unwrap();
        let context: Arc<dyn WorldContext> = Arc::new(NoiseWorldContext::new(2));
        let center = ChunkCoords::new(0, 0, -1);

        let fields = ChunkRect::around(center, 1).iter().map(|chunk_coords| {
            let task = Box::new(ChunkPtgFieldTask::new(side, chunk_coords, context.clone()));
            match task.process() {
                SomeChunkData::PtgField(field) => field,
                other => panic!("unexpected output {:?}", other),
            }
        });
        let ptg = ChunkNeighborhood::from_fields(center, side, fields).unwrap();
        let expected = generate_chunk_ptt_field(center, &ptg, context.as_ref());

        let output = Box::new(ChunkPttFieldTask::new(ptg, context)).process();
        assert!(matches!(output, SomeChunkData::PttField(field) if field == expected));
    }
}
