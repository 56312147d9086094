//! # Chunk Persistence
//!
//! Storage of chunk records behind a coordinate-keyed blob store.
//!
//! [`BlobStore`] is the transport seam: it moves opaque bytes and knows
//! nothing about chunks. [`ChunkPersistence`] sits on top and encodes
//! [`ChunkRecord`]s as JSON. Two stores are provided:
//! - [`MemoryBlobStore`]: an in-process map, shared between clones
//! - [`DirectoryBlobStore`]: one `chunk_{x}_{z}.json` file per chunk

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use log::trace;

use super::{chunk::ChunkRecord, coords::ChunkCoord};
use crate::core::{error::PersistenceError, MtResource};

/// Coordinate-keyed byte storage.
///
/// A missing entry is `Ok(None)`, never an error.
pub trait BlobStore: Send + Sync {
    /// Reads the blob stored for a chunk.
    fn get(&self, x: i32, z: i32) -> Result<Option<Vec<u8>>, PersistenceError>;

    /// Stores a blob for a chunk, replacing any previous one.
    fn put(&self, x: i32, z: i32, bytes: &[u8]) -> Result<(), PersistenceError>;
}

/// Blob store kept in memory.
///
/// Clones share the same map, so a test can keep a handle to inspect what
/// a world saved.
#[derive(Clone, Default)]
pub struct MemoryBlobStore {
    blobs: MtResource<HashMap<(i32, i32), Vec<u8>>>,
}

impl MemoryBlobStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.get().len()
    }

    /// Whether nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.blobs.get().is_empty()
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, x: i32, z: i32) -> Result<Option<Vec<u8>>, PersistenceError> {
        Ok(self.blobs.get().get(&(x, z)).cloned())
    }

    fn put(&self, x: i32, z: i32, bytes: &[u8]) -> Result<(), PersistenceError> {
        self.blobs.get_mut().insert((x, z), bytes.to_vec());
        Ok(())
    }
}

/// Blob store writing one file per chunk into a directory.
#[derive(Debug, Clone)]
pub struct DirectoryBlobStore {
    base_dir: PathBuf,
}

impl DirectoryBlobStore {
    /// Opens a store rooted at `base_dir`, creating the directory if needed.
    pub fn open(base_dir: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir)?;
        Ok(DirectoryBlobStore { base_dir })
    }

    /// Directory holding the chunk files.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Get the file path for a chunk.
    pub fn chunk_path(&self, x: i32, z: i32) -> PathBuf {
        self.base_dir.join(format!("chunk_{x}_{z}.json"))
    }
}

impl BlobStore for DirectoryBlobStore {
    fn get(&self, x: i32, z: i32) -> Result<Option<Vec<u8>>, PersistenceError> {
        match fs::read(self.chunk_path(x, z)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn put(&self, x: i32, z: i32, bytes: &[u8]) -> Result<(), PersistenceError> {
        // Readers only ever see a complete file.
        let path = self.chunk_path(x, z);
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, bytes)?;
        fs::rename(&staging, &path)?;
        Ok(())
    }
}

/// Loads and saves chunk records through a blob store.
pub struct ChunkPersistence {
    store: Box<dyn BlobStore>,
}

impl ChunkPersistence {
    /// Wraps a blob store.
    pub fn new(store: impl BlobStore + 'static) -> Self {
        ChunkPersistence {
            store: Box::new(store),
        }
    }

    /// Loads the record stored for a chunk.
    ///
    /// # Errors
    /// Fails if the store fails, the bytes are not a valid record, or the
    /// record describes a different chunk.
    pub fn load(&self, coord: ChunkCoord) -> Result<Option<ChunkRecord>, PersistenceError> {
        let Some(bytes) = self.store.get(coord.x, coord.z)? else {
            return Ok(None);
        };

        let record: ChunkRecord = serde_json::from_slice(&bytes)?;
        if record.coord() != coord {
            return Err(PersistenceError::CoordinateMismatch {
                requested: coord,
                found: record.coord(),
            });
        }

        trace!("Loaded chunk {:?} ({} blocks)", coord, record.blocks.len());
        Ok(Some(record))
    }

    /// Stores a record under its own coordinate.
    pub fn save(&self, record: &ChunkRecord) -> Result<(), PersistenceError> {
        let bytes = serde_json::to_vec(record)?;
        self.store.put(record.x, record.z, &bytes)?;
        trace!("Saved chunk ({}, {}), {} bytes", record.x, record.z, bytes.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::{block::block_type::BlockType, chunk::Chunk};
    use tempfile::TempDir;

    fn sample_record(coord: ChunkCoord) -> ChunkRecord {
        let mut chunk = Chunk::empty(coord);
        chunk.set_block(1, 2, 3, BlockType::GRASS);
        chunk.set_block(0, 0, 0, BlockType::BEDROCK);
        chunk.serialize()
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryBlobStore::new();
        let persistence = ChunkPersistence::new(store.clone());
        let coord = ChunkCoord::new(-3, 4);

        assert_eq!(persistence.load(coord).unwrap(), None);
        persistence.save(&sample_record(coord)).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(persistence.load(coord).unwrap(), Some(sample_record(coord)));
    }

    #[test]
    fn test_directory_store_round_trip() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let store = DirectoryBlobStore::open(temp_dir.path().join("chunks")).unwrap();
        let persistence = ChunkPersistence::new(store.clone());
        let coord = ChunkCoord::new(7, -1);

        assert_eq!(persistence.load(coord).unwrap(), None);
        persistence.save(&sample_record(coord)).unwrap();

        assert!(store.chunk_path(7, -1).exists());
        assert_eq!(persistence.load(coord).unwrap(), Some(sample_record(coord)));
    }

    #[test]
    fn test_garbage_bytes_are_an_error() {
        let store = MemoryBlobStore::new();
        store.put(0, 0, b"not json").unwrap();
        let persistence = ChunkPersistence::new(store);

        assert!(matches!(
            persistence.load(ChunkCoord::new(0, 0)),
            Err(PersistenceError::Encoding(_))
        ));
    }

    #[test]
    fn test_record_under_wrong_key_is_an_error() {
        let store = MemoryBlobStore::new();
        let bytes = serde_json::to_vec(&sample_record(ChunkCoord::new(5, 5))).unwrap();
        store.put(1, 1, &bytes).unwrap();
        let persistence = ChunkPersistence::new(store);

        assert!(matches!(
            persistence.load(ChunkCoord::new(1, 1)),
            Err(PersistenceError::CoordinateMismatch { .. })
        ));
    }
}
