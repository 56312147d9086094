//! # Chunk Cache
//!
//! Capacity-bounded store of resident chunks with least-recently-used
//! eviction. Any read or write through [`ChunkCache::get`] or a
//! [`ChunkCache::touch`] moves the entry to the most-recently-used end;
//! [`ChunkCache::peek`] reads without touching.
//!
//! Eviction is synchronous and happens inside [`ChunkCache::put`], before the
//! new entry goes in, so `len() <= max_size()` holds after every insertion.
//! A chunk holding unsaved edits is handed to the persistence callback before
//! it leaves; if that save fails the chunk stays and the next least-recent
//! entry is tried instead.

use std::num::NonZeroUsize;

use log::{debug, warn};
use lru::LruCache;

use super::{chunk::Chunk, coords::ChunkCoord};
use crate::core::error::{PersistenceError, WorldError};

/// Resident chunks in access order.
pub struct ChunkCache {
    entries: LruCache<ChunkCoord, Chunk>,
    max_size: NonZeroUsize,
}

impl ChunkCache {
    /// Creates an empty cache holding at most `max_size` chunks.
    pub fn new(max_size: NonZeroUsize) -> Self {
        ChunkCache {
            entries: LruCache::unbounded(),
            max_size,
        }
    }

    /// Maximum number of resident chunks.
    pub fn max_size(&self) -> usize {
        self.max_size.get()
    }

    /// Number of resident chunks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no chunk is resident.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a chunk is resident at `coord`. Does not touch.
    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.entries.contains(&coord)
    }

    /// Returns a resident chunk and marks it most recently used.
    pub fn get(&mut self, coord: ChunkCoord) -> Option<&mut Chunk> {
        self.entries.get_mut(&coord)
    }

    /// Returns a resident chunk without changing the access order.
    pub fn peek(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.entries.peek(&coord)
    }

    /// Mutable access without changing the access order.
    pub fn peek_mut(&mut self, coord: ChunkCoord) -> Option<&mut Chunk> {
        self.entries.peek_mut(&coord)
    }

    /// Marks a chunk most recently used.
    ///
    /// # Returns
    /// `false` if no chunk is resident at `coord`.
    pub fn touch(&mut self, coord: ChunkCoord) -> bool {
        if self.entries.contains(&coord) {
            self.entries.promote(&coord);
            true
        } else {
            false
        }
    }

    /// Inserts a chunk as most recently used, evicting first if full.
    ///
    /// A chunk already resident at `coord` is disposed and replaced without
    /// evicting anything else. `persist` is called for every eviction victim
    /// that holds unsaved edits.
    ///
    /// # Returns
    /// The chunks evicted to make room, already disposed, least recent first.
    ///
    /// # Errors
    /// [`WorldError::EvictionBlocked`] if the cache is full and no entry
    /// could be saved. The new chunk is dropped and the cache is unchanged.
    pub fn put<F>(
        &mut self,
        coord: ChunkCoord,
        chunk: Chunk,
        mut persist: F,
    ) -> Result<Vec<Chunk>, WorldError>
    where
        F: FnMut(&Chunk) -> Result<(), PersistenceError>,
    {
        if let Some(existing) = self.entries.get_mut(&coord) {
            existing.dispose();
            *existing = chunk;
            return Ok(Vec::new());
        }

        let mut evicted = Vec::new();
        while self.entries.len() >= self.max_size.get() {
            match self.evict_one(&mut persist) {
                Some(victim) => evicted.push(victim),
                None => {
                    warn!(
                        "Cannot evict any of {} unsaved chunks to make room for {:?}",
                        self.entries.len(),
                        coord
                    );
                    return Err(WorldError::EvictionBlocked(coord));
                }
            }
        }

        self.entries.push(coord, chunk);
        Ok(evicted)
    }

    /// Evicts the least recently used entry that can be made durable.
    fn evict_one<F>(&mut self, persist: &mut F) -> Option<Chunk>
    where
        F: FnMut(&Chunk) -> Result<(), PersistenceError>,
    {
        let candidates: Vec<ChunkCoord> = self.entries.iter().rev().map(|(coord, _)| *coord).collect();

        for candidate in candidates {
            let Some(chunk) = self.entries.peek_mut(&candidate) else {
                continue;
            };

            if chunk.has_unsaved_changes() {
                if let Err(err) = persist(chunk) {
                    warn!("Keeping chunk {:?} resident, save failed: {}", candidate, err);
                    continue;
                }
                chunk.mark_saved();
            }

            if let Some(mut chunk) = self.entries.pop(&candidate) {
                chunk.dispose();
                debug!("Evicted chunk {:?}", candidate);
                return Some(chunk);
            }
        }

        None
    }

    /// Resident chunks, most recently used first. Does not touch.
    pub fn iter(&self) -> impl Iterator<Item = (&ChunkCoord, &Chunk)> {
        self.entries.iter()
    }

    /// Mutable access to every resident chunk. Does not touch.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&ChunkCoord, &mut Chunk)> {
        self.entries.iter_mut()
    }

    /// Resident coordinates, least recently used first.
    pub fn coords_lru_first(&self) -> Vec<ChunkCoord> {
        self.entries.iter().rev().map(|(coord, _)| *coord).collect()
    }

    /// Removes every chunk, least recently used first.
    pub fn drain(&mut self) -> Vec<(ChunkCoord, Chunk)> {
        let mut drained = Vec::with_capacity(self.entries.len());
        while let Some(entry) = self.entries.pop_lru() {
            drained.push(entry);
        }
        drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;

    fn cache(max_size: usize) -> ChunkCache {
        ChunkCache::new(NonZeroUsize::new(max_size).unwrap())
    }

    fn coord(x: i32) -> ChunkCoord {
        ChunkCoord::new(x, 0)
    }

    fn never_save(_: &Chunk) -> Result<(), PersistenceError> {
        panic!("clean chunks must not be saved")
    }

    fn positions(evicted: Vec<Chunk>) -> Vec<ChunkCoord> {
        evicted.iter().map(|chunk| chunk.position).collect()
    }

    fn insert(cache: &mut ChunkCache, at: ChunkCoord) -> Vec<ChunkCoord> {
        positions(cache.put(at, Chunk::empty(at), never_save).unwrap())
    }

    fn edited(at: ChunkCoord) -> Chunk {
        let mut chunk = Chunk::empty(at);
        chunk.set_block(0, 0, 0, BlockType::STONE);
        chunk
    }

    #[test]
    fn test_cache_new() {
        let cache = cache(3);
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
        assert_eq!(cache.max_size(), 3);
    }

    #[test]
    fn test_overflow_evicts_least_recent() {
        let mut cache = cache(3);
        for x in 0..3 {
            assert!(insert(&mut cache, coord(x)).is_empty());
        }
        assert_eq!(insert(&mut cache, coord(3)), vec![coord(0)]);
        assert_eq!(cache.len(), 3);
        assert!(!cache.contains(coord(0)));
    }

    #[test]
    fn test_get_protects_from_eviction() {
        let mut cache = cache(2);
        insert(&mut cache, coord(0));
        insert(&mut cache, coord(1));
        assert_eq!(insert(&mut cache, coord(2)), vec![coord(0)]);

        assert!(cache.get(coord(1)).is_some());
        assert_eq!(insert(&mut cache, coord(3)), vec![coord(2)]);
        assert!(cache.contains(coord(1)));
        assert!(cache.contains(coord(3)));
    }

    #[test]
    fn test_touch_and_peek() {
        let mut cache = cache(2);
        insert(&mut cache, coord(0));
        insert(&mut cache, coord(1));

        assert!(cache.peek(coord(0)).is_some());
        assert_eq!(cache.coords_lru_first(), vec![coord(0), coord(1)]);

        assert!(cache.touch(coord(0)));
        assert!(!cache.touch(coord(9)));
        assert_eq!(cache.coords_lru_first(), vec![coord(1), coord(0)]);
    }

    #[test]
    fn test_replacing_does_not_evict() {
        let mut cache = cache(2);
        insert(&mut cache, coord(0));
        insert(&mut cache, coord(1));
        assert!(insert(&mut cache, coord(0)).is_empty());
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.coords_lru_first(), vec![coord(1), coord(0)]);
    }

    #[test]
    fn test_unsaved_victim_is_saved_then_disposed() {
        let mut cache = cache(1);
        let mut chunk = edited(coord(0));
        chunk.rebuild_mesh();
        assert!(chunk.mesh().is_some());
        cache.put(coord(0), chunk, never_save).unwrap();

        let mut saved = Vec::new();
        let evicted = cache
            .put(coord(1), Chunk::empty(coord(1)), |chunk| {
                saved.push(chunk.serialize());
                Ok(())
            })
            .unwrap();

        assert_eq!(evicted.len(), 1);
        let victim = &evicted[0];
        assert_eq!(victim.position, coord(0));
        assert!(victim.mesh().is_none());
        assert!(victim.is_dirty());
        assert!(!victim.has_unsaved_changes());

        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].blocks.get("0,0,0"), Some(&BlockType::STONE));
    }

    #[test]
    fn test_failed_save_skips_to_next_entry() {
        let mut cache = cache(2);
        cache.put(coord(0), edited(coord(0)), never_save).unwrap();
        insert(&mut cache, coord(1));

        let evicted = cache
            .put(coord(2), Chunk::empty(coord(2)), |_| {
                Err(PersistenceError::Unavailable("offline".to_string()))
            })
            .unwrap();

        assert_eq!(positions(evicted), vec![coord(1)]);
        assert!(cache.contains(coord(0)));
        assert!(cache.peek(coord(0)).unwrap().has_unsaved_changes());
    }

    #[test]
    fn test_eviction_blocked_when_nothing_can_be_saved() {
        let mut cache = cache(2);
        cache.put(coord(0), edited(coord(0)), never_save).unwrap();
        cache.put(coord(1), edited(coord(1)), never_save).unwrap();

        let result = cache.put(coord(2), Chunk::empty(coord(2)), |_| {
            Err(PersistenceError::Unavailable("offline".to_string()))
        });

        assert!(matches!(result, Err(WorldError::EvictionBlocked(c)) if c == coord(2)));
        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(coord(2)));
    }

    #[test]
    fn test_drain_empties_lru_first() {
        let mut cache = cache(3);
        insert(&mut cache, coord(0));
        insert(&mut cache, coord(1));
        cache.get(coord(0));

        let drained: Vec<_> = cache.drain().into_iter().map(|(c, _)| c).collect();
        assert_eq!(drained, vec![coord(1), coord(0)]);
        assert!(cache.is_empty());
    }
}
