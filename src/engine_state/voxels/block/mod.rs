//! # Block Module
//!
//! The value stored in the final (B) field of a chunk, plus the default block
//! palette and block face definitions used by the mesh stage.

pub mod block_side;
pub mod block_type;

/// Numeric identifier of a block type. Also the value of the PTT field.
pub type BlockTypeId = u32;

/// The type id meaning "no solid block here".
pub const AIR: BlockTypeId = 0;

/// Represents a single voxel block in the world.
///
/// # Memory Layout
/// The `#[repr(C)]` attribute and `Pod` derive let a whole field of blocks be
/// viewed as raw bytes, which is how chunks are written to disk.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Block {
    pub type_id: BlockTypeId,
}

impl Block {
    pub const AIR: Block = Block { type_id: AIR };

    pub fn new(type_id: BlockTypeId) -> Self {
        Block { type_id }
    }

    pub fn is_air(&self) -> bool {
        self.type_id == AIR
    }
}
