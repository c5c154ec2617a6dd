//! # World Context
//!
//! The procedural side of world generation: what each stage computes for a
//! single block. The pipeline treats it as a set of pure functions and only
//! schedules their evaluation.
//!
//! A context is shared with the workers as an `Arc` snapshot. It must not be
//! mutated while any stage task referencing it is outstanding; changing the
//! world's rules means building a new context.

use cgmath::Vector3;
use noise::{NoiseFn, Perlin};

use super::{
    block::{
        block_side::BlockSide,
        block_type::{BlockType, BLOCK_TYPE_TO_TEXTURE_INDICES},
        Block, BlockTypeId, AIR,
    },
    chunk::{BFieldValue, ChunkNeighborhood, PtgFieldValue, PttFieldValue},
    coords::BlockCoords,
};

/// A rectangle of the texture atlas, in normalized texture coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AtlasRect {
    pub min: [f32; 2],
    pub max: [f32; 2],
}

/// The per-block generation rules and appearance of a world.
pub trait WorldContext: Send + Sync {
    /// Raw generation signal of a block. Positive means "solid material".
    fn ptg_value(&self, coords: BlockCoords) -> PtgFieldValue;

    /// Material of a block, reading the PTG values around it.
    ///
    /// `coords` lies in the center chunk of `ptg`, and every block within
    /// one chunk side of it may be read.
    fn ptt_value(
        &self,
        coords: BlockCoords,
        ptg: &ChunkNeighborhood<PtgFieldValue>,
    ) -> PttFieldValue;

    /// Final block, reading the PTT values around it.
    fn b_value(&self, coords: BlockCoords, ptt: &ChunkNeighborhood<PttFieldValue>) -> BFieldValue;

    /// Block type placed on exposed surfaces, chosen once per world.
    fn primary_block_type(&self) -> BlockTypeId;

    /// Atlas rectangle of the texture used by one face of a block type.
    fn atlas_rect(&self, type_id: BlockTypeId, side: BlockSide) -> AtlasRect;
}

/// Number of texture tiles per row (and per column) of the atlas.
pub const ATLAS_TILES_PER_ROW: usize = 4;
/// Horizontal scale of the height map.
pub const PERLIN_SCALE_FACTOR: f64 = 0.02;
/// Scale of the 3D noise that carves caves.
pub const CAVE_SCALE_FACTOR: f64 = 0.07;
/// Blocks whose cave noise lies above this threshold are hollowed out.
pub const CAVE_THRESHOLD: f64 = 0.45;
/// Height in blocks of the tallest hills above zero.
pub const TERRAIN_AMPLITUDE: f64 = 12.0;
/// Depth below the surface where dirt turns to stone.
pub const DIRT_DEPTH: i32 = 3;
/// Fixed point precision of PTG values.
const PTG_UNIT: f64 = 16.0;

/// The default world: Perlin hills with caves, stone under a few layers of
/// dirt, and the primary block type on top.
#[derive(Clone, Debug)]
pub struct NoiseWorldContext {
    seed: u32,
    height_noise: Perlin,
    cave_noise: Perlin,
    primary_block_type: BlockType,
}

impl NoiseWorldContext {
    pub fn new(seed: u32) -> Self {
        let mut rng = fastrand::Rng::with_seed(seed as u64);
        let primary_block_type = BlockType::get_random_type(&mut rng);
        log::info!(
            "World context seeded with {}, primary block type {:?}",
            seed,
            primary_block_type
        );
        Self {
            seed,
            height_noise: Perlin::new(seed),
            cave_noise: Perlin::new(seed.wrapping_add(1)),
            primary_block_type,
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Height of the terrain surface above the given column.
    fn surface_height(&self, x: i32, y: i32) -> f64 {
        let sample = self
            .height_noise
            .get([x as f64 * PERLIN_SCALE_FACTOR, y as f64 * PERLIN_SCALE_FACTOR]);
        sample * TERRAIN_AMPLITUDE
    }

    fn is_cave(&self, coords: BlockCoords) -> bool {
        let sample = self.cave_noise.get([
            coords.x as f64 * CAVE_SCALE_FACTOR,
            coords.y as f64 * CAVE_SCALE_FACTOR,
            coords.z as f64 * CAVE_SCALE_FACTOR,
        ]);
        sample > CAVE_THRESHOLD
    }
}

fn above(coords: BlockCoords, distance: i32) -> BlockCoords {
    let up: Vector3<i32> = BlockSide::TOP.normal() * distance;
    BlockCoords::new(coords.x + up.x, coords.y + up.y, coords.z + up.z)
}

impl WorldContext for NoiseWorldContext {
    fn ptg_value(&self, coords: BlockCoords) -> PtgFieldValue {
        if self.is_cave(coords) {
            return 0;
        }
        let depth = self.surface_height(coords.x, coords.y) - coords.z as f64;
        (depth * PTG_UNIT).round() as PtgFieldValue
    }

    fn ptt_value(
        &self,
        coords: BlockCoords,
        ptg: &ChunkNeighborhood<PtgFieldValue>,
    ) -> PttFieldValue {
        if ptg[coords] <= 0 {
            return AIR;
        }
        // Dirt is whatever lies within a few blocks under open air.
        let near_surface = (1..=DIRT_DEPTH).any(|distance| ptg[above(coords, distance)] <= 0);
        if near_surface {
            BlockType::DIRT.id()
        } else {
            BlockType::STONE.id()
        }
    }

    fn b_value(&self, coords: BlockCoords, ptt: &ChunkNeighborhood<PttFieldValue>) -> BFieldValue {
        let type_id = ptt[coords];
        if type_id != AIR && ptt[above(coords, 1)] == AIR {
            return Block::new(self.primary_block_type());
        }
        Block::new(type_id)
    }

    fn primary_block_type(&self) -> BlockTypeId {
        self.primary_block_type.id()
    }

    fn atlas_rect(&self, type_id: BlockTypeId, side: BlockSide) -> AtlasRect {
        let tile = BlockType::from_id(type_id)
            .map(|block_type| BLOCK_TYPE_TO_TEXTURE_INDICES[block_type as usize][side as usize])
            .unwrap_or(0);
        let tile_size = 1.0 / ATLAS_TILES_PER_ROW as f32;
        let column = (tile % ATLAS_TILES_PER_ROW) as f32;
        let row = (tile / ATLAS_TILES_PER_ROW) as f32;
        AtlasRect {
            min: [column * tile_size, row * tile_size],
            max: [(column + 1.0) * tile_size, (row + 1.0) * tile_size],
        }
    }
}
