//! Chunk persistence.
//!
//! Each chunk with a committed B field can be saved to its own file holding
//! the raw `side³` block type ids (native-endian `u32`s, x fastest, then y,
//! then z). The file name is derived from the chunk coords only, so finding a
//! chunk on disk never needs an index.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::debug;

use crate::core::{Error, Result};

use super::{
    block::Block,
    chunk::ChunkBField,
    coords::{ChunkCoords, ChunkSide},
};

/// Extension of chunk files.
pub const CHUNK_FILE_EXTENSION: &str = "bfield";

/// What is known about the saved copy of a chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkDiskStorage {
    pub chunk_coords: ChunkCoords,
    /// Whether a readable file was found (or written) for the chunk.
    pub exists: bool,
    pub path: PathBuf,
}

/// Path of the file backing the given chunk.
pub fn chunk_file_path(save_directory: &Path, chunk_coords: ChunkCoords) -> PathBuf {
    save_directory.join(format!(
        "chunk_{}_{}_{}.{}",
        chunk_coords.x, chunk_coords.y, chunk_coords.z, CHUNK_FILE_EXTENSION
    ))
}

/// Checks whether the given chunk has been saved. Only metadata is touched.
pub fn search_disk_for_chunk(save_directory: &Path, chunk_coords: ChunkCoords) -> ChunkDiskStorage {
    let path = chunk_file_path(save_directory, chunk_coords);
    let exists = path.is_file();
    ChunkDiskStorage {
        chunk_coords,
        exists,
        path,
    }
}

/// Reads the B field of a saved chunk.
///
/// # Errors
/// Returns `Error::DiskRead` if the file is missing, unreadable, or does not
/// hold exactly one chunk worth of blocks. Partial data is never returned.
pub fn read_disk_chunk_b_field(storage: &ChunkDiskStorage, side: ChunkSide) -> Result<ChunkBField> {
    let disk_read_error = |reason: String| Error::DiskRead {
        path: storage.path.clone(),
        reason,
    };

    let bytes = fs::read(&storage.path).map_err(|error| disk_read_error(error.to_string()))?;
    let mut blocks = vec![Block::AIR; side.volume()];
    let expected_len = std::mem::size_of_val(blocks.as_slice());
    if bytes.len() != expected_len {
        return Err(disk_read_error(format!(
            "{} bytes, expected {}",
            bytes.len(),
            expected_len
        )));
    }
    bytemuck::cast_slice_mut::<Block, u8>(&mut blocks).copy_from_slice(&bytes);

    debug!("Read chunk {:?} from {:?}", storage.chunk_coords, storage.path);
    ChunkBField::from_raw(side, storage.chunk_coords, blocks)
}

/// Writes the B field of a chunk, replacing any previous save.
///
/// The data goes to a temporary file first, then replaces the chunk file, so
/// an interrupted write never leaves a truncated chunk file behind.
pub fn write_disk_chunk_b_field(
    save_directory: &Path,
    field: &ChunkBField,
) -> Result<ChunkDiskStorage> {
    fs::create_dir_all(save_directory)?;
    let chunk_coords = field.chunk_coords();
    let path = chunk_file_path(save_directory, chunk_coords);
    let temporary_path = path.with_extension(format!("{}.tmp", CHUNK_FILE_EXTENSION));

    let bytes: &[u8] = bytemuck::cast_slice(field.raw_data());
    fs::write(&temporary_path, bytes)?;
    if let Err(error) = fs::rename(&temporary_path, &path) {
        let _ = fs::remove_file(&temporary_path);
        return Err(error.into());
    }

    Ok(ChunkDiskStorage {
        chunk_coords,
        exists: true,
        path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::coords::GridCoords;

    fn side() -> ChunkSide {
        ChunkSide::new(15).unwrap()
    }

    fn sample_field(chunk_coords: ChunkCoords) -> ChunkBField {
        ChunkBField::from_fn(side(), chunk_coords, |coords| {
            Block::new(((coords.x + 2 * coords.y + 3 * coords.z).rem_euclid(6)) as u32)
        })
    }

    #[test]
    fn test_chunk_file_path_is_unique_per_chunk() {
        let dir = Path::new("saves");
        assert_eq!(
            chunk_file_path(dir, ChunkCoords::new(1, -2, 3)),
            PathBuf::from("saves/chunk_1_-2_3.bfield")
        );
        assert_ne!(
            chunk_file_path(dir, ChunkCoords::new(1, 2, 3)),
            chunk_file_path(dir, ChunkCoords::new(12, 3, 0))
        );
    }

    #[test]
    fn test_search_missing_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let storage = search_disk_for_chunk(dir.path(), ChunkCoords::new(0, 0, 0));
        assert!(!storage.exists);
        assert!(read_disk_chunk_b_field(&storage, side()).is_err());
    }

    #[test]
    fn test_write_search_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let chunk_coords = ChunkCoords::new(-3, 0, 7);
        let field = sample_field(chunk_coords);

        let written = write_disk_chunk_b_field(dir.path(), &field).unwrap();
        assert!(written.exists);

        let storage = search_disk_for_chunk(dir.path(), chunk_coords);
        assert_eq!(storage, written);
        let read = read_disk_chunk_b_field(&storage, side()).unwrap();
        assert_eq!(read, field);
        assert!(!dir.path().join("chunk_-3_0_7.bfield.tmp").exists());
    }

    #[test]
    fn test_overwrite_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let chunk_coords = ChunkCoords::new(0, 0, 0);
        let mut field = sample_field(chunk_coords);
        write_disk_chunk_b_field(dir.path(), &field).unwrap();

        let center = side().chunk_center_coords(chunk_coords);
        field[center.offset(1, 1, 1)] = Block::new(5);
        write_disk_chunk_b_field(dir.path(), &field).unwrap();

        let storage = search_disk_for_chunk(dir.path(), chunk_coords);
        assert_eq!(read_disk_chunk_b_field(&storage, side()).unwrap(), field);
    }

    #[test]
    fn test_short_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let chunk_coords = ChunkCoords::new(2, 2, 2);
        let storage = write_disk_chunk_b_field(dir.path(), &sample_field(chunk_coords)).unwrap();

        let bytes = fs::read(&storage.path).unwrap();
        fs::write(&storage.path, &bytes[..bytes.len() - 3]).unwrap();

        let result = read_disk_chunk_b_field(&storage, side());
        assert!(matches!(result, Err(Error::DiskRead { .. })));
    }

    #[test]
    fn test_file_of_another_chunk_side_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let chunk_coords = ChunkCoords::new(0, 0, 0);
        let storage = write_disk_chunk_b_field(dir.path(), &sample_field(chunk_coords)).unwrap();
        let other_side = ChunkSide::new(17).unwrap();
        assert!(read_disk_chunk_b_field(&storage, other_side).is_err());
    }
}
