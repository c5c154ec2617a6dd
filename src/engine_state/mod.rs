//! # Engine State Module
//!
//! Headless driver of the chunk pipeline.
//!
//! ## Key Components
//!
//! * `EngineState` - Owns the world and drives its generation, one tick at a time
//! * `rendering` - Mesh generation and the vertex data handed to a renderer
//! * `task_management` - Manages asynchronous tasks and worker threads
//! * `voxels` - Handles voxel data, chunks, and the generation scheduler
//!
//! ## Architecture
//!
//! The `EngineState` is the single owner of the chunk grid and of the
//! generation manager, and is meant to live on the thread running the main
//! loop. Embedding applications call `tick()` once per frame, read meshes
//! with `mesh()`, and forward player edits to `set_block()`.

use std::sync::Arc;

use cgmath::Point3;
use log::info;

use crate::core::{GenerationConfig, Result};

use rendering::vertex::ChunkMeshData;
use voxels::{
    block::BlockTypeId,
    context::{NoiseWorldContext, WorldContext},
    coords::{BlockCoords, ChunkCoords, ChunkSide},
    generation_manager::{ChunkGenerationManager, ManageReport},
    grid::ChunkGrid,
};

pub mod rendering;
pub mod task_management;
pub mod voxels;

/// The world being generated, and everything needed to generate it.
///
/// # Examples
///
/// ```no_run
/// use voxel_pipeline::{EngineState, GenerationConfig};
///
/// let mut engine_state = EngineState::new(GenerationConfig::default())?;
/// loop {
///     engine_state.tick();
///     // hand engine_state.mesh(..) to the renderer
/// #   break;
/// }
/// # Ok::<(), voxel_pipeline::Error>(())
/// ```
pub struct EngineState {
    config: GenerationConfig,
    /// Snapshot shared with the workers, never mutated
    context: Arc<dyn WorldContext>,
    grid: ChunkGrid,
    generation_manager: ChunkGenerationManager,
}

impl EngineState {
    /// Creates a world generated by the default [`NoiseWorldContext`].
    ///
    /// # Errors
    /// Returns `Error::InvalidChunkSide` for an even or too small chunk side,
    /// `Error::InvalidGenerationZone` for an unusable zone, or `Error::Io` if
    /// the worker threads cannot be spawned.
    pub fn new(config: GenerationConfig) -> Result<Self> {
        let context = Arc::new(NoiseWorldContext::new(config.seed));
        Self::with_context(config, context)
    }

    /// Creates a world generated by the given context.
    pub fn with_context(config: GenerationConfig, context: Arc<dyn WorldContext>) -> Result<Self> {
        let side = ChunkSide::new(config.chunk_side)?;
        let grid = ChunkGrid::new(side);
        let generation_manager = ChunkGenerationManager::new(&config)?;
        info!(
            "Engine state created: chunk side {}, radius {}, save directory {:?}",
            side.get(),
            config.generation_radius,
            config.save_directory
        );
        Ok(EngineState {
            config,
            context,
            grid,
            generation_manager,
        })
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn grid(&self) -> &ChunkGrid {
        &self.grid
    }

    pub fn generation_manager(&self) -> &ChunkGenerationManager {
        &self.generation_manager
    }

    pub fn generation_manager_mut(&mut self) -> &mut ChunkGenerationManager {
        &mut self.generation_manager
    }

    pub fn primary_block_type(&self) -> BlockTypeId {
        self.context.primary_block_type()
    }

    /// Runs one scheduler tick. Never blocks on the workers.
    pub fn tick(&mut self) -> ManageReport {
        self.generation_manager.manage(&mut self.grid, &self.context)
    }

    /// Moves the center of the generation zone, typically to the player.
    ///
    /// # Errors
    /// Returns `Error::InvalidGenerationZone` for a non-finite or far away
    /// center.
    pub fn set_generation_center(&mut self, generation_center: Point3<f32>) -> Result<()> {
        self.generation_manager
            .set_generation_center(generation_center)
    }

    pub fn block_is_air_or_unloaded(&self, coords: BlockCoords) -> bool {
        self.grid.block_is_air_or_unloaded(coords)
    }

    /// Edits a block and schedules the affected meshes for recomputation.
    ///
    /// Returns the chunks whose mesh is now outdated.
    pub fn set_block(&mut self, coords: BlockCoords, type_id: BlockTypeId) -> Result<Vec<ChunkCoords>> {
        self.generation_manager
            .set_block(&mut self.grid, &self.context, coords, type_id)
    }

    /// The latest mesh of a chunk. It may be outdated by a recent edit until
    /// its replacement is harvested.
    pub fn mesh(&self, chunk_coords: ChunkCoords) -> Option<&ChunkMeshData> {
        self.grid.mesh(chunk_coords)
    }

    /// Whether every chunk of the generation zone has an up to date mesh.
    pub fn zone_is_meshed(&self) -> bool {
        self.generation_manager
            .generation_zone(&self.grid)
            .into_iter()
            .all(|chunk_coords| self.grid.has_mesh(chunk_coords))
    }

    /// Writes every chunk with a B field to the save directory, whether or not
    /// loading from it is enabled.
    ///
    /// # Errors
    /// Returns `Error::Io` on the first failed write.
    pub fn save(&mut self) -> Result<usize> {
        let save_directory = self.config.save_directory.clone();
        self.grid.write_all_to_disk(&save_directory)
    }
}
