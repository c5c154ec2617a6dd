//! A 3x3x3 cube of chunk fields seen as one bigger field.

use std::ops::{Index, IndexMut};

use crate::{
    core::{Error, Result},
    engine_state::voxels::coords::{BlockCoords, BlockRect, ChunkCoords, ChunkRect, ChunkSide},
};

use super::field::ChunkField;

/// Number of chunks in a neighborhood.
pub const NEIGHBORHOOD_SIZE: usize = 27;

/// Holds one type of field for the 3x3x3 cube of chunks centered on a chunk.
///
/// Values are read by world-space block coords anywhere in the cube, which is
/// how a stage of the center chunk reads across its borders. The fields are
/// owned copies, so a neighborhood can be sent to a worker thread while the
/// grid it came from keeps changing.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkNeighborhood<V> {
    center: ChunkCoords,
    side: ChunkSide,
    fields: Box<[ChunkField<V>; NEIGHBORHOOD_SIZE]>,
}

/// Position of a chunk in the cube, or `None` if it is outside of it.
fn slot(center: ChunkCoords, chunk_coords: ChunkCoords) -> Option<usize> {
    let delta = [
        chunk_coords.x - center.x,
        chunk_coords.y - center.y,
        chunk_coords.z - center.z,
    ];
    if delta.iter().any(|d| !(-1..=1).contains(d)) {
        return None;
    }
    let [dx, dy, dz] = delta.map(|d| (d + 1) as usize);
    Some(dx + 3 * (dy + 3 * dz))
}

impl<V> ChunkNeighborhood<V> {
    /// Assembles a neighborhood from the fields of the 27 chunks around
    /// `center`, given in any order.
    pub fn from_fields(
        center: ChunkCoords,
        side: ChunkSide,
        fields: impl IntoIterator<Item = ChunkField<V>>,
    ) -> Result<Self> {
        let mut slots: Vec<Option<ChunkField<V>>> =
            (0..NEIGHBORHOOD_SIZE).map(|_| None).collect();
        for field in fields {
            let chunk_coords = field.chunk_coords();
            let index = slot(center, chunk_coords)
                .filter(|&index| slots[index].is_none() && field.side() == side)
                .ok_or(Error::IncompleteNeighborhood(center))?;
            slots[index] = Some(field);
        }
        let fields = slots
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or(Error::IncompleteNeighborhood(center))?;
        let fields = fields
            .into_boxed_slice()
            .try_into()
            .map_err(|_| Error::IncompleteNeighborhood(center))?;
        Ok(Self {
            center,
            side,
            fields,
        })
    }

    pub fn center(&self) -> ChunkCoords {
        self.center
    }

    pub fn side(&self) -> ChunkSide {
        self.side
    }

    /// The chunks covered by this neighborhood.
    pub fn chunk_rect(&self) -> ChunkRect {
        ChunkRect::around(self.center, 1)
    }

    /// The blocks covered by this neighborhood.
    pub fn block_rect(&self) -> BlockRect {
        self.side.chunk_rect_block_rect(self.chunk_rect())
    }

    /// The field of one of the 27 chunks.
    pub fn field(&self, chunk_coords: ChunkCoords) -> Option<&ChunkField<V>> {
        slot(self.center, chunk_coords).map(|index| &self.fields[index])
    }

    pub fn center_field(&self) -> &ChunkField<V> {
        &self.fields[NEIGHBORHOOD_SIZE / 2]
    }

    fn out_of_range(&self, coords: BlockCoords) -> Error {
        Error::OutOfRange {
            coords,
            chunk_coords: self.center,
        }
    }

    pub fn get(&self, coords: BlockCoords) -> Result<&V> {
        let chunk_coords = self.side.containing_chunk_coords(coords);
        let index = slot(self.center, chunk_coords).ok_or_else(|| self.out_of_range(coords))?;
        self.fields[index].get(coords)
    }

    pub fn get_mut(&mut self, coords: BlockCoords) -> Result<&mut V> {
        let chunk_coords = self.side.containing_chunk_coords(coords);
        let index = slot(self.center, chunk_coords).ok_or_else(|| self.out_of_range(coords))?;
        self.fields[index].get_mut(coords)
    }

    /// Takes the center field out of the neighborhood.
    pub fn into_center_field(self) -> ChunkField<V> {
        let mut fields = Vec::from(self.fields as Box<[ChunkField<V>]>);
        fields.swap_remove(NEIGHBORHOOD_SIZE / 2)
    }
}

impl<V> Index<BlockCoords> for ChunkNeighborhood<V> {
    type Output = V;

    /// # Panics
    /// Panics if `coords` is outside of the 3x3x3 cube.
    fn index(&self, coords: BlockCoords) -> &V {
        match self.get(coords) {
            Ok(value) => value,
            Err(error) => panic!("{}", error),
        }
    }
}

impl<V> IndexMut<BlockCoords> for ChunkNeighborhood<V> {
    /// # Panics
    /// Panics if `coords` is outside of the 3x3x3 cube.
    fn index_mut(&mut self, coords: BlockCoords) -> &mut V {
        match self.get_mut(coords) {
            Ok(value) => value,
            Err(error) => panic!("{}", error),
        }
    }
}
