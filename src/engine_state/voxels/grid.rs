//! # Chunk Grid
//!
//! The authoritative cache of the pipeline: one mapping per stage from chunk
//! coords to that stage's data. Which mappings hold a chunk *is* the progress
//! of that chunk through the pipeline.
//!
//! The grid lives on the driving thread. Workers only ever see copies of
//! its fields, assembled into neighborhoods at submission time.

use std::{
    collections::{HashMap, HashSet},
    path::Path,
};

use log::{debug, info};

use crate::{
    core::{Error, Result},
    engine_state::rendering::vertex::ChunkMeshData,
};

use super::{
    block::{Block, BlockTypeId},
    chunk::{
        BFieldValue, ChunkBField, ChunkField, ChunkNeighborhood, ChunkPtgField, ChunkPttField,
        PtgFieldValue, PttFieldValue,
    },
    coords::{BlockCoords, BlockRect, ChunkCoords, ChunkRect, ChunkSide},
    disk::{write_disk_chunk_b_field, ChunkDiskStorage},
};

/// Committed stage data of every chunk generated so far.
///
/// Besides the five stage mappings, the grid keeps a mesh epoch per chunk.
/// It is bumped whenever a block edit makes the chunk's mesh outdated, so
/// that a mesh computed from older blocks can be recognized and dropped.
pub struct ChunkGrid {
    side: ChunkSide,
    ptg_fields: HashMap<ChunkCoords, ChunkPtgField>,
    ptt_fields: HashMap<ChunkCoords, ChunkPttField>,
    b_fields: HashMap<ChunkCoords, ChunkBField>,
    meshes: HashMap<ChunkCoords, ChunkMeshData>,
    disk_storages: HashMap<ChunkCoords, ChunkDiskStorage>,
    mesh_epochs: HashMap<ChunkCoords, u64>,
    stale_meshes: HashSet<ChunkCoords>,
}

fn has_neighborhood<V>(fields: &HashMap<ChunkCoords, V>, center: ChunkCoords) -> bool {
    ChunkRect::around(center, 1)
        .iter()
        .all(|chunk_coords| fields.contains_key(&chunk_coords))
}

fn get_neighborhood<V: Clone>(
    side: ChunkSide,
    fields: &HashMap<ChunkCoords, ChunkField<V>>,
    center: ChunkCoords,
) -> ChunkNeighborhood<V> {
    let copies = ChunkRect::around(center, 1)
        .iter()
        .filter_map(|chunk_coords| fields.get(&chunk_coords).cloned());
    match ChunkNeighborhood::from_fields(center, side, copies) {
        Ok(neighborhood) => neighborhood,
        Err(error) => panic!("{}", error),
    }
}

/// Inserts a field unless the mapping already holds one for its chunk.
fn insert_new<V>(fields: &mut HashMap<ChunkCoords, ChunkField<V>>, field: ChunkField<V>) -> bool {
    match fields.entry(field.chunk_coords()) {
        std::collections::hash_map::Entry::Occupied(_) => false,
        std::collections::hash_map::Entry::Vacant(entry) => {
            entry.insert(field);
            true
        }
    }
}

impl ChunkGrid {
    pub fn new(side: ChunkSide) -> Self {
        ChunkGrid {
            side,
            ptg_fields: HashMap::new(),
            ptt_fields: HashMap::new(),
            b_fields: HashMap::new(),
            meshes: HashMap::new(),
            disk_storages: HashMap::new(),
            mesh_epochs: HashMap::new(),
            stale_meshes: HashSet::new(),
        }
    }

    pub fn side(&self) -> ChunkSide {
        self.side
    }

    pub fn has_ptg(&self, chunk_coords: ChunkCoords) -> bool {
        self.ptg_fields.contains_key(&chunk_coords)
    }

    pub fn has_ptt(&self, chunk_coords: ChunkCoords) -> bool {
        self.ptt_fields.contains_key(&chunk_coords)
    }

    pub fn has_b(&self, chunk_coords: ChunkCoords) -> bool {
        self.b_fields.contains_key(&chunk_coords)
    }

    /// Whether the chunk has an up to date mesh. A mesh made stale by a block
    /// edit does not count, even though it is still served by [`Self::mesh`].
    pub fn has_mesh(&self, chunk_coords: ChunkCoords) -> bool {
        self.meshes.contains_key(&chunk_coords) && !self.stale_meshes.contains(&chunk_coords)
    }

    pub fn has_disk_storage(&self, chunk_coords: ChunkCoords) -> bool {
        self.disk_storages.contains_key(&chunk_coords)
    }

    pub fn has_ptg_neighborhood(&self, center: ChunkCoords) -> bool {
        has_neighborhood(&self.ptg_fields, center)
    }

    pub fn has_ptt_neighborhood(&self, center: ChunkCoords) -> bool {
        has_neighborhood(&self.ptt_fields, center)
    }

    pub fn has_b_neighborhood(&self, center: ChunkCoords) -> bool {
        has_neighborhood(&self.b_fields, center)
    }

    /// Copies the PTG fields around `center`.
    ///
    /// # Panics
    /// Panics if `has_ptg_neighborhood(center)` does not hold.
    pub fn get_ptg_neighborhood(&self, center: ChunkCoords) -> ChunkNeighborhood<PtgFieldValue> {
        get_neighborhood(self.side, &self.ptg_fields, center)
    }

    /// Copies the PTT fields around `center`.
    ///
    /// # Panics
    /// Panics if `has_ptt_neighborhood(center)` does not hold.
    pub fn get_ptt_neighborhood(&self, center: ChunkCoords) -> ChunkNeighborhood<PttFieldValue> {
        get_neighborhood(self.side, &self.ptt_fields, center)
    }

    /// Copies the B fields around `center`.
    ///
    /// # Panics
    /// Panics if `has_b_neighborhood(center)` does not hold.
    pub fn get_b_neighborhood(&self, center: ChunkCoords) -> ChunkNeighborhood<BFieldValue> {
        get_neighborhood(self.side, &self.b_fields, center)
    }

    pub fn ptg_field(&self, chunk_coords: ChunkCoords) -> Option<&ChunkPtgField> {
        self.ptg_fields.get(&chunk_coords)
    }

    pub fn ptt_field(&self, chunk_coords: ChunkCoords) -> Option<&ChunkPttField> {
        self.ptt_fields.get(&chunk_coords)
    }

    pub fn b_field(&self, chunk_coords: ChunkCoords) -> Option<&ChunkBField> {
        self.b_fields.get(&chunk_coords)
    }

    /// The latest mesh of the chunk, stale or not.
    pub fn mesh(&self, chunk_coords: ChunkCoords) -> Option<&ChunkMeshData> {
        self.meshes.get(&chunk_coords)
    }

    pub fn disk_storage(&self, chunk_coords: ChunkCoords) -> Option<&ChunkDiskStorage> {
        self.disk_storages.get(&chunk_coords)
    }

    pub fn mesh_epoch(&self, chunk_coords: ChunkCoords) -> u64 {
        self.mesh_epochs.get(&chunk_coords).copied().unwrap_or(0)
    }

    pub fn is_mesh_stale(&self, chunk_coords: ChunkCoords) -> bool {
        self.stale_meshes.contains(&chunk_coords)
    }

    /// Number of chunks holding a mesh, stale ones included.
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Commits a PTG field. Returns `false`, leaving the grid untouched, if
    /// the chunk already has one.
    pub fn insert_ptg_field(&mut self, field: ChunkPtgField) -> bool {
        insert_new(&mut self.ptg_fields, field)
    }

    /// Commits a PTT field. Returns `false` if the chunk already has one.
    pub fn insert_ptt_field(&mut self, field: ChunkPttField) -> bool {
        insert_new(&mut self.ptt_fields, field)
    }

    /// Commits a B field. Returns `false` if the chunk already has one, which
    /// protects block edits from being reverted by a late generation result.
    pub fn insert_b_field(&mut self, field: ChunkBField) -> bool {
        insert_new(&mut self.b_fields, field)
    }

    /// Records what is known about the saved copy of a chunk.
    pub fn insert_disk_storage(&mut self, storage: ChunkDiskStorage) {
        self.disk_storages.insert(storage.chunk_coords, storage);
    }

    /// Commits a mesh computed at the given mesh epoch.
    ///
    /// Returns `false` and drops the mesh if the chunk's blocks changed since
    /// (the epoch is outdated) or if the chunk already has an up to date mesh.
    pub fn insert_mesh(&mut self, chunk_coords: ChunkCoords, mesh: ChunkMeshData, epoch: u64) -> bool {
        if epoch != self.mesh_epoch(chunk_coords) || self.has_mesh(chunk_coords) {
            return false;
        }
        self.meshes.insert(chunk_coords, mesh);
        self.stale_meshes.remove(&chunk_coords);
        true
    }

    /// The committed block at the given coords, if its chunk has a B field.
    pub fn block(&self, coords: BlockCoords) -> Option<Block> {
        let chunk_coords = self.side.containing_chunk_coords(coords);
        self.b_fields
            .get(&chunk_coords)
            .and_then(|field| field.get(coords).ok())
            .copied()
    }

    /// Whether the block is air, or not generated yet.
    ///
    /// Unloaded blocks count as air so that physics and visibility can treat
    /// the ungenerated world as passable.
    pub fn block_is_air_or_unloaded(&self, coords: BlockCoords) -> bool {
        self.block(coords).map_or(true, |block| block.is_air())
    }

    /// Chunks whose mesh reads the given block: the chunks whose blocks lie
    /// within one block of it.
    pub fn chunks_meshing_block(&self, coords: BlockCoords) -> ChunkRect {
        self.side
            .containing_chunk_rect(BlockRect::around(coords, 1))
    }

    /// Changes one committed block.
    ///
    /// Every chunk whose mesh reads the block gets its mesh epoch bumped and
    /// its mesh, if any, marked stale. Returns those chunks, or nothing if
    /// the block already had that type.
    ///
    /// # Errors
    /// Returns `Error::ChunkNotLoaded` if the block's chunk has no B field.
    pub fn set_block(&mut self, coords: BlockCoords, type_id: BlockTypeId) -> Result<Vec<ChunkCoords>> {
        let chunk_coords = self.side.containing_chunk_coords(coords);
        let field = self
            .b_fields
            .get_mut(&chunk_coords)
            .ok_or(Error::ChunkNotLoaded(chunk_coords))?;
        let block = field.get_mut(coords)?;
        if block.type_id == type_id {
            return Ok(Vec::new());
        }
        *block = Block::new(type_id);

        let affected: Vec<ChunkCoords> = self.chunks_meshing_block(coords).iter().collect();
        for &affected_coords in &affected {
            *self.mesh_epochs.entry(affected_coords).or_insert(0) += 1;
            if self.meshes.contains_key(&affected_coords) {
                self.stale_meshes.insert(affected_coords);
            }
        }
        debug!(
            "Block {:?} set to {}, {} chunk meshes outdated",
            coords,
            type_id,
            affected.len()
        );
        Ok(affected)
    }

    /// Saves every committed B field, creating or replacing its file.
    ///
    /// Chunks are written in coords order. Returns the number of chunks
    /// written.
    ///
    /// # Errors
    /// Stops at and returns the first I/O error.
    pub fn write_all_to_disk(&mut self, save_directory: &Path) -> Result<usize> {
        let mut chunk_coords_list: Vec<ChunkCoords> = self.b_fields.keys().copied().collect();
        chunk_coords_list.sort();
        for chunk_coords in &chunk_coords_list {
            let storage = write_disk_chunk_b_field(save_directory, &self.b_fields[chunk_coords])?;
            self.disk_storages.insert(*chunk_coords, storage);
        }
        info!(
            "Saved {} chunks to {:?}",
            chunk_coords_list.len(),
            save_directory
        );
        Ok(chunk_coords_list.len())
    }
}
