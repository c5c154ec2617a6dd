//! Dense per-chunk storage of one value per block.

use std::ops::{Index, IndexMut};

use crate::{
    core::{Error, Result},
    engine_state::voxels::{
        block::{Block, BlockTypeId},
        coords::{BlockCoords, BlockRect, ChunkCoords, ChunkSide},
    },
};

/// Grid of values, one value per block, for one chunk.
///
/// Values are addressed by world-space block coords, which must lie inside
/// the chunk's own block rect. The storage is owned: cloning a field copies
/// all `side³` values.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkField<V> {
    chunk_coords: ChunkCoords,
    side: ChunkSide,
    data: Box<[V]>,
}

/// Value of the PTG field, the output of the first generation stage.
pub type PtgFieldValue = i32;
pub type ChunkPtgField = ChunkField<PtgFieldValue>;

/// Value of the PTT field, the output of the second generation stage.
pub type PttFieldValue = BlockTypeId;
pub type ChunkPttField = ChunkField<PttFieldValue>;

/// Value of the B field, the blocks actually placed in the chunk.
pub type BFieldValue = Block;
pub type ChunkBField = ChunkField<BFieldValue>;

impl<V: Clone + Default> ChunkField<V> {
    /// Creates a field where every value is `V::default()`.
    pub fn new(side: ChunkSide, chunk_coords: ChunkCoords) -> Self {
        Self {
            chunk_coords,
            side,
            data: vec![V::default(); side.volume()].into_boxed_slice(),
        }
    }
}

impl<V> ChunkField<V> {
    /// Creates a field by evaluating `value_at` on every block of the chunk.
    pub fn from_fn(
        side: ChunkSide,
        chunk_coords: ChunkCoords,
        value_at: impl FnMut(BlockCoords) -> V,
    ) -> Self {
        // The walker visits blocks in storage order.
        let data = side
            .chunk_block_rect(chunk_coords)
            .iter()
            .map(value_at)
            .collect::<Vec<V>>()
            .into_boxed_slice();
        Self {
            chunk_coords,
            side,
            data,
        }
    }

    /// Wraps already laid out values, as produced by [`Self::raw_data`].
    pub fn from_raw(side: ChunkSide, chunk_coords: ChunkCoords, data: Vec<V>) -> Result<Self> {
        if data.len() != side.volume() {
            return Err(Error::FieldSizeMismatch {
                expected: side.volume(),
                actual: data.len(),
            });
        }
        Ok(Self {
            chunk_coords,
            side,
            data: data.into_boxed_slice(),
        })
    }

    pub fn chunk_coords(&self) -> ChunkCoords {
        self.chunk_coords
    }

    pub fn side(&self) -> ChunkSide {
        self.side
    }

    pub fn block_rect(&self) -> BlockRect {
        self.side.chunk_block_rect(self.chunk_coords)
    }

    fn offset(&self, coords: BlockCoords) -> Result<usize> {
        self.side
            .local_index(self.chunk_coords, coords)
            .ok_or(Error::OutOfRange {
                coords,
                chunk_coords: self.chunk_coords,
            })
    }

    pub fn get(&self, coords: BlockCoords) -> Result<&V> {
        let offset = self.offset(coords)?;
        Ok(&self.data[offset])
    }

    pub fn get_mut(&mut self, coords: BlockCoords) -> Result<&mut V> {
        let offset = self.offset(coords)?;
        Ok(&mut self.data[offset])
    }

    /// Access to the raw field data, x fastest, then y, then z.
    ///
    /// Access to values should be performed via indexing, this is intended
    /// for bulk operations such as writing to disk.
    pub fn raw_data(&self) -> &[V] {
        &self.data
    }

    pub fn raw_data_mut(&mut self) -> &mut [V] {
        &mut self.data
    }

    /// Iterates over every block of the chunk along with its value.
    pub fn iter(&self) -> impl Iterator<Item = (BlockCoords, &V)> {
        self.block_rect().iter().zip(self.data.iter())
    }
}

impl<V> Index<BlockCoords> for ChunkField<V> {
    type Output = V;

    /// # Panics
    /// Panics if `coords` is outside of the chunk.
    fn index(&self, coords: BlockCoords) -> &V {
        match self.get(coords) {
            Ok(value) => value,
            Err(error) => panic!("{}", error),
        }
    }
}

impl<V> IndexMut<BlockCoords> for ChunkField<V> {
    /// # Panics
    /// Panics if `coords` is outside of the chunk.
    fn index_mut(&mut self, coords: BlockCoords) -> &mut V {
        match self.get_mut(coords) {
            Ok(value) => value,
            Err(error) => panic!("{}", error),
        }
    }
}
