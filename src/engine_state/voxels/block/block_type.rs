//! # Block Type Module
//!
//! The block palette of the default world context, and the atlas texture each
//! of its faces uses.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use super::{block_side::BlockSide, BlockTypeId};

/// Block types known to the default world context.
///
/// `AIR` is the zero id so that it matches [`super::AIR`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockType {
    AIR = 0,
    DIRT = 1,
    GRASS = 2,
    STONE = 3,
    SAND = 4,
    WOOD = 5,
}

/// Maps each block type to the atlas tile used by each of its faces.
///
/// Indexed by `BlockType as usize`, then by `BlockSide as usize`, in the order
/// [Front, Back, Bottom, Top, Left, Right].
pub static BLOCK_TYPE_TO_TEXTURE_INDICES: [[usize; 6]; 6] = [
    [0, 0, 0, 0, 0, 0], // AIR (never meshed)
    [1, 1, 1, 1, 1, 1], // DIRT
    [2, 2, 1, 3, 2, 2], // GRASS (top: 3, bottom: dirt, sides: 2)
    [4, 4, 4, 4, 4, 4], // STONE
    [5, 5, 5, 5, 5, 5], // SAND
    [6, 6, 7, 7, 6, 6], // WOOD (rings on top and bottom)
];

/// Block types a world may pick as its primary block type.
pub const SOLID_BLOCK_TYPES: [BlockType; 5] = [
    BlockType::DIRT,
    BlockType::GRASS,
    BlockType::STONE,
    BlockType::SAND,
    BlockType::WOOD,
];

impl BlockType {
    /// Converts a type id back into a palette entry, if it is one.
    pub fn from_id(type_id: BlockTypeId) -> Option<Self> {
        FromPrimitive::from_u32(type_id)
    }

    pub fn id(self) -> BlockTypeId {
        self as BlockTypeId
    }

    /// Picks a random solid block type from the given generator.
    pub fn get_random_type(rng: &mut fastrand::Rng) -> Self {
        SOLID_BLOCK_TYPES[rng.usize(..SOLID_BLOCK_TYPES.len())]
    }

    /// Atlas tile of one face of this block type.
    pub fn texture_index(self, side: BlockSide) -> usize {
        BLOCK_TYPE_TO_TEXTURE_INDICES[self as usize][side as usize]
    }
}
