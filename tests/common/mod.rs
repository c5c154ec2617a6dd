//! Helpers shared by the integration tests.

#![allow(dead_code)]

use std::{path::Path, sync::Arc};

use voxel_pipeline::{
    engine_state::voxels::{
        block::{block_side::BlockSide, block_type::BlockType, Block, BlockTypeId, AIR},
        chunk::{BFieldValue, ChunkNeighborhood, PtgFieldValue, PttFieldValue},
        context::{AtlasRect, WorldContext},
    },
    BlockCoords, EngineState, GenerationConfig,
};

/// Side of the chunks used by the tests. Small, to keep the tests fast.
pub const SIDE: i32 = 7;

/// Vertices of a mesh face.
pub const FACE_VERTICES: usize = 6;

/// A world that is solid stone below `z = 0` and air above.
pub struct FlatWorldContext;

impl WorldContext for FlatWorldContext {
    fn ptg_value(&self, coords: BlockCoords) -> PtgFieldValue {
        -coords.z
    }

    fn ptt_value(&self, coords: BlockCoords, ptg: &ChunkNeighborhood<PtgFieldValue>) -> PttFieldValue {
        if ptg[coords] > 0 {
            BlockType::STONE.id()
        } else {
            AIR
        }
    }

    fn b_value(&self, coords: BlockCoords, ptt: &ChunkNeighborhood<PttFieldValue>) -> BFieldValue {
        Block::new(ptt[coords])
    }

    fn primary_block_type(&self) -> BlockTypeId {
        BlockType::STONE.id()
    }

    fn atlas_rect(&self, _type_id: BlockTypeId, _side: BlockSide) -> AtlasRect {
        AtlasRect {
            min: [0.0, 0.0],
            max: [0.25, 0.25],
        }
    }
}

/// A world made of the origin chunk only, generated on the calling thread.
pub fn flat_config(save_directory: &Path) -> GenerationConfig {
    GenerationConfig {
        chunk_side: SIDE,
        generation_center: [0.0, 0.0, 0.0],
        generation_radius: 1.0,
        worker_count: 0,
        max_submissions_per_tick: 1024,
        load_save_enabled: false,
        save_directory: save_directory.to_path_buf(),
        ..GenerationConfig::default()
    }
}

pub fn flat_engine(config: GenerationConfig) -> EngineState {
    EngineState::with_context(config, Arc::new(FlatWorldContext)).unwrap()
}

/// Ticks until the whole zone is meshed. Returns the number of ticks.
pub fn tick_until_meshed(engine_state: &mut EngineState, max_ticks: usize) -> usize {
    for ticks in 1..=max_ticks {
        engine_state.tick();
        if engine_state.zone_is_meshed() {
            return ticks;
        }
        if engine_state.generation_manager().in_flight_count() > 0 {
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
    }
    panic!("zone not meshed after {} ticks", max_ticks);
}
