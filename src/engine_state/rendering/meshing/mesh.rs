use bitvec::vec::BitVec;

use crate::engine_state::{
    rendering::vertex::ChunkMeshData,
    voxels::{
        block::block_side::BlockSide,
        chunk::{BFieldValue, ChunkNeighborhood},
        context::WorldContext,
        coords::{BlockCoords, BlockRect, ChunkCoords},
    },
};

use super::face::Face;

/// Solidity of the blocks of one chunk plus a one block margin around it.
///
/// This is stored with padding (`side + 2` in each dimension) so that every
/// neighbor lookup of a block of the chunk, diagonals included, is a single
/// bit read.
pub struct SolidMask {
    rect: BlockRect,
    dimension_wrapped: usize,
    solid_array: BitVec,
}

impl SolidMask {
    pub fn new(chunk_coords: ChunkCoords, b_field: &ChunkNeighborhood<BFieldValue>) -> Self {
        let rect = b_field.side().chunk_block_rect(chunk_coords).expanded(1);
        let dimension_wrapped = (b_field.side().get() + 2) as usize;
        let mut solid_array = BitVec::with_capacity(rect.volume());
        for coords in rect.iter() {
            solid_array.push(!b_field[coords].is_air());
        }
        SolidMask {
            rect,
            dimension_wrapped,
            solid_array,
        }
    }

    /// Whether the block is solid. Blocks outside of the padded chunk count
    /// as air.
    pub fn is_solid(&self, coords: BlockCoords) -> bool {
        if !self.rect.contains(coords) {
            return false;
        }
        let x = (coords.x - self.rect.min.x) as usize;
        let y = (coords.y - self.rect.min.y) as usize;
        let z = (coords.z - self.rect.min.z) as usize;
        let index = x + self.dimension_wrapped * (y + self.dimension_wrapped * z);
        self.solid_array[index]
    }
}

/// Generates the mesh of a chunk from the B fields around it.
///
/// Every side of a solid block facing an air block gets a face. The result
/// is a deterministic function of the chunk's blocks and of the blocks of
/// the one block thick shell around it.
///
/// # Panics
/// Panics if `b_field` is not centered on `chunk_coords`.
pub fn generate_chunk_mesh(
    chunk_coords: ChunkCoords,
    b_field: &ChunkNeighborhood<BFieldValue>,
    context: &dyn WorldContext,
) -> ChunkMeshData {
    assert_eq!(b_field.center(), chunk_coords, "B neighborhood off center");
    let mask = SolidMask::new(chunk_coords, b_field);
    let mut mesh = ChunkMeshData::new();

    for (coords, block) in b_field.center_field().iter() {
        if block.is_air() {
            continue;
        }
        for side in BlockSide::all() {
            let normal = side.normal();
            let facing = BlockCoords::new(
                coords.x + normal.x,
                coords.y + normal.y,
                coords.z + normal.z,
            );
            if mask.is_solid(facing) {
                continue;
            }
            let face = Face::new(coords, side, |coords| mask.is_solid(coords));
            mesh.extend(face.vertices(context.atlas_rect(block.type_id, side)));
        }
    }

    mesh
}
