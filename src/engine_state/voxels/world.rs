//! # World Module
//!
//! This module provides the `World` struct, the single owner of every
//! resident chunk. It coordinates loading, generation, mutation, meshing and
//! eviction.
//!
//! ## Loading
//!
//! A chunk that is not resident is looked up in persistence first and
//! generated on the worker pool if absent. Each coordinate has at most one
//! load in flight; further requests for it coalesce on the pending entry.
//! Blocking loads wait at most `generation_timeout_ms` before installing flat
//! terrain; the late worker result is then discarded.
//!
//! ## Mutation
//!
//! Chunks are only reachable through `&mut World`, so a chunk is never
//! rebuilt while it is being edited. Edits mark the chunk dirty and the next
//! [`World::tick`] rebuilds its mesh.
//!
//! ## Eviction
//!
//! The cache evicts least-recently-used chunks. A chunk with unsaved edits
//! is written to persistence before it leaves; if that fails it stays.

use std::collections::HashMap;
use std::mem;
use std::num::NonZeroUsize;

use cgmath::Point3;
use log::{debug, error, info, warn};
use web_time::{Duration, Instant};

use super::{
    block::block_type::BlockType,
    cache::ChunkCache,
    chunk::{Chunk, CHUNK_HEIGHT},
    coords::{world_to_local, ChunkCoord},
    persistence::ChunkPersistence,
    tasks::ChunkGenerationTask,
    terrain::{BlockPlacement, TerrainGenerator},
};
use crate::{
    core::{
        error::{ConfigError, GenerationError, PersistenceError, WorldError},
        WorldConfig,
    },
    engine_state::{
        camera_state::FrustumCuller,
        rendering::ChunkMesh,
        task_management::{task::TaskResult, TaskManager},
    },
};

/// Outcome of a non-blocking chunk request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// The chunk is in the cache.
    Resident,
    /// A load is in flight; the chunk arrives with a later
    /// [`World::process_completed_tasks`].
    Pending,
}

/// State of a load the world is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingLoad {
    /// The generation task has not reported back.
    InFlight,
    /// A blocking load gave up and installed flat terrain; the task's result
    /// is dropped when it arrives.
    Abandoned,
}

/// Counters describing the world's current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorldStats {
    /// Chunks in the cache
    pub resident_chunks: usize,
    /// Loads in flight
    pub pending_chunks: usize,
    /// Non-air blocks across resident chunks
    pub block_count: usize,
    /// Resident chunks waiting for a mesh rebuild
    pub dirty_chunks: usize,
    /// Resident chunks holding edits not yet persisted
    pub unsaved_chunks: usize,
}

/// The voxel world: resident chunks plus everything needed to load more.
pub struct World {
    cache: ChunkCache,
    pending: HashMap<ChunkCoord, PendingLoad>,
    task_manager: TaskManager,
    generator: TerrainGenerator,
    persistence: Option<ChunkPersistence>,
    config: WorldConfig,
    evicted: Vec<ChunkCoord>,
    disposed: bool,
}

/// Saves a chunk through the bound persistence, if any.
///
/// Without persistence there is nowhere to keep edits; they are dropped with
/// a warning so the chunk can still be evicted.
fn persist_chunk(
    persistence: Option<&ChunkPersistence>,
    chunk: &Chunk,
) -> Result<(), PersistenceError> {
    match persistence {
        Some(persistence) => persistence.save(&chunk.serialize()),
        None => {
            warn!(
                "No persistence bound, dropping edits of chunk {:?}",
                chunk.position
            );
            Ok(())
        }
    }
}

impl World {
    /// Creates a world with no resident chunks and starts its worker pool.
    ///
    /// # Errors
    /// Fails if the configuration does not validate.
    pub fn new(config: WorldConfig) -> Result<Self, WorldError> {
        config.validate()?;
        let capacity = NonZeroUsize::new(config.cache_capacity).ok_or_else(|| {
            ConfigError::Invalid("cache_capacity must be at least 1".to_string())
        })?;

        let generator = TerrainGenerator::new(config.seed, config.terrain_params());
        let task_manager = TaskManager::new(config.resolved_worker_count());

        info!(
            "World created: seed {}, cache capacity {}, {} workers",
            config.seed,
            capacity,
            task_manager.worker_count()
        );

        Ok(World {
            cache: ChunkCache::new(capacity),
            pending: HashMap::new(),
            task_manager,
            generator,
            persistence: None,
            config,
            evicted: Vec::new(),
            disposed: false,
        })
    }

    /// Binds the persistence collaborator. Generates nothing.
    pub fn initialize(&mut self, persistence: ChunkPersistence) {
        self.persistence = Some(persistence);
    }

    /// Configuration the world was created with.
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// The terrain generator handed to generation tasks.
    pub fn generator(&self) -> &TerrainGenerator {
        &self.generator
    }

    /// Whether [`World::dispose`] has run.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn ensure_live(&self) -> Result<(), WorldError> {
        if self.disposed {
            Err(WorldError::Disposed)
        } else {
            Ok(())
        }
    }

    /// Whether a chunk is in the cache. Does not touch it.
    pub fn is_resident(&self, coord: ChunkCoord) -> bool {
        self.cache.contains(coord)
    }

    /// Number of loads in flight.
    pub fn pending_count(&self) -> usize {
        self.pending
            .values()
            .filter(|load| **load == PendingLoad::InFlight)
            .count()
    }

    /// Read access to a resident chunk without touching it.
    pub fn peek_chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.cache.peek(coord)
    }

    /// The last rebuilt mesh of a resident chunk.
    pub fn chunk_mesh(&self, coord: ChunkCoord) -> Option<&ChunkMesh> {
        self.cache.peek(coord).and_then(Chunk::mesh)
    }

    /// Starts loading a chunk without waiting for it.
    ///
    /// Resident chunks are touched. Stored chunks are loaded inline; anything
    /// else is generated on the worker pool, or inline when the pool has no
    /// workers. A request for a coordinate that is already loading joins the
    /// existing load.
    pub fn request_chunk(&mut self, coord: ChunkCoord) -> Result<LoadStatus, WorldError> {
        self.ensure_live()?;

        if self.cache.touch(coord) {
            return Ok(LoadStatus::Resident);
        }

        let abandoned = match self.pending.get(&coord) {
            Some(PendingLoad::InFlight) => return Ok(LoadStatus::Pending),
            Some(PendingLoad::Abandoned) => true,
            None => false,
        };

        if let Some(chunk) = self.load_from_persistence(coord) {
            self.insert_chunk(coord, chunk)?;
            return Ok(LoadStatus::Resident);
        }

        if abandoned {
            // The earlier task is still running and produces this same chunk.
            debug!("Re-adopting abandoned generation of {:?}", coord);
            self.pending.insert(coord, PendingLoad::InFlight);
            return Ok(LoadStatus::Pending);
        }

        self.dispatch_generation(coord)
    }

    /// Requests the square of chunks within `radius` of `center`, nearest
    /// first, up to the cache capacity.
    ///
    /// A coordinate that cannot be loaded because no resident chunk could be
    /// saved is skipped with a warning.
    ///
    /// # Returns
    /// How many of the requested chunks are still loading.
    pub fn request_chunks_around(
        &mut self,
        center: ChunkCoord,
        radius: i32,
    ) -> Result<usize, WorldError> {
        self.ensure_live()?;

        let mut coords: Vec<ChunkCoord> = center.square_around(radius).collect();
        coords.sort_by_key(|coord| {
            let (dx, dz) = ((coord.x - center.x) as i64, (coord.z - center.z) as i64);
            dx * dx + dz * dz
        });
        coords.truncate(self.cache.max_size());

        let mut pending = 0;
        for coord in coords {
            match self.request_chunk(coord) {
                Ok(LoadStatus::Pending) => pending += 1,
                Ok(LoadStatus::Resident) => {}
                Err(WorldError::EvictionBlocked(blocked)) => {
                    warn!("Skipping chunk {:?}, no room to load it", blocked);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(pending)
    }

    fn dispatch_generation(&mut self, coord: ChunkCoord) -> Result<LoadStatus, WorldError> {
        let task = ChunkGenerationTask::new(coord, self.generator.clone());

        if self.task_manager.has_workers() {
            self.pending.insert(coord, PendingLoad::InFlight);
            if !self.task_manager.publish_task(Box::new(task)) {
                debug!("All workers busy, queued generation of {:?}", coord);
            }
            Ok(LoadStatus::Pending)
        } else {
            let result = task.generate();
            self.install_generated(coord, result.placements)?;
            Ok(LoadStatus::Resident)
        }
    }

    fn load_from_persistence(&self, coord: ChunkCoord) -> Option<Chunk> {
        let persistence = self.persistence.as_ref()?;
        let loaded = persistence
            .load(coord)
            .and_then(|record| match record {
                Some(record) => Ok(Some(Chunk::deserialize(&record)?)),
                None => Ok(None),
            });

        match loaded {
            Ok(chunk) => chunk,
            Err(err) => {
                warn!("Failed to load chunk {:?}, generating instead: {}", coord, err);
                None
            }
        }
    }

    fn insert_chunk(&mut self, coord: ChunkCoord, chunk: Chunk) -> Result<(), WorldError> {
        let persistence = self.persistence.as_ref();
        let evicted = self
            .cache
            .put(coord, chunk, |victim| persist_chunk(persistence, victim))?;
        self.evicted
            .extend(evicted.into_iter().map(|chunk| chunk.position));
        Ok(())
    }

    fn install_generated(
        &mut self,
        coord: ChunkCoord,
        placements: Result<Vec<BlockPlacement>, GenerationError>,
    ) -> Result<(), WorldError> {
        let placements = placements.unwrap_or_else(|err| {
            warn!("Generation failed for chunk {:?}, using flat terrain: {}", coord, err);
            TerrainGenerator::flat_chunk()
        });
        self.insert_chunk(coord, Chunk::from_placements(coord, &placements))
    }

    /// Applies the outcome of a generation task for `coord`.
    ///
    /// Called from the generation task's result on the control thread.
    pub(crate) fn complete_generation(
        &mut self,
        coord: ChunkCoord,
        placements: Result<Vec<BlockPlacement>, GenerationError>,
    ) {
        match self.pending.remove(&coord) {
            Some(PendingLoad::InFlight) => {}
            Some(PendingLoad::Abandoned) => {
                debug!("Discarding late generation result for {:?}", coord);
                return;
            }
            None => {
                debug_assert!(false, "generation result for {coord:?} was never requested");
                warn!("Ignoring unrequested generation result for {:?}", coord);
                return;
            }
        }

        if self.cache.contains(coord) {
            debug_assert!(false, "generation result for resident chunk {coord:?}");
            warn!("Ignoring generation result for resident chunk {:?}", coord);
            return;
        }

        if let Err(err) = self.install_generated(coord, placements) {
            error!("Could not insert generated chunk {:?}: {}", coord, err);
        }
    }

    fn apply_result(&mut self, result: Box<dyn TaskResult + Send>) {
        debug!("Task finished: {}", result.describe());
        for task in result.handle_result(self) {
            self.task_manager.publish_task(task);
        }
    }

    /// Inserts every finished generation into the cache and sends queued
    /// tasks to free workers.
    ///
    /// # Returns
    /// The number of results applied.
    pub fn process_completed_tasks(&mut self) -> usize {
        if self.disposed {
            return 0;
        }

        let results = self.task_manager.drain_completed();
        let applied = results.len();
        for result in results {
            self.apply_result(result);
        }
        self.task_manager.process_queued_tasks();
        applied
    }

    fn wait_for_chunk(&mut self, coord: ChunkCoord) -> Result<(), WorldError> {
        let deadline = Instant::now() + self.config.generation_timeout();

        while self.pending.get(&coord) == Some(&PendingLoad::InFlight) {
            self.task_manager.process_queued_tasks();

            let now = Instant::now();
            if now >= deadline {
                warn!(
                    "Generation of chunk {:?} timed out after {:?}, using flat terrain",
                    coord,
                    self.config.generation_timeout()
                );
                self.pending.insert(coord, PendingLoad::Abandoned);
                let flat = Chunk::from_placements(coord, &TerrainGenerator::flat_chunk());
                return self.insert_chunk(coord, flat);
            }

            if let Some(result) = self.task_manager.wait_for_result(deadline - now) {
                self.apply_result(result);
            }
        }
        Ok(())
    }

    /// Returns a resident chunk, loading it first if needed.
    ///
    /// Blocks the caller while the chunk is generated, for at most the
    /// configured generation timeout.
    ///
    /// # Errors
    /// - [`WorldError::Disposed`] after [`World::dispose`]
    /// - [`WorldError::EvictionBlocked`] if no room could be made for it
    pub fn get_or_load_chunk(&mut self, coord: ChunkCoord) -> Result<&mut Chunk, WorldError> {
        if self.request_chunk(coord)? == LoadStatus::Pending {
            self.wait_for_chunk(coord)?;
        }
        self.cache
            .get(coord)
            .ok_or(WorldError::EvictionBlocked(coord))
    }

    /// Block at a world position.
    ///
    /// Never loads: non-resident chunks read as `AIR`. A resident chunk is
    /// touched.
    pub fn get_block(&mut self, world_x: i32, world_y: i32, world_z: i32) -> BlockType {
        let (coord, (x, y, z)) = world_to_local(world_x, world_y, world_z);
        self.cache
            .get(coord)
            .map_or(BlockType::AIR, |chunk| chunk.get_block(x, y, z))
    }

    /// Places a block at a world position, loading its chunk first.
    ///
    /// # Returns
    /// `true` if the block changed. Heights outside the world change nothing
    /// and load nothing.
    pub fn set_block(
        &mut self,
        world_x: i32,
        world_y: i32,
        world_z: i32,
        block_type: BlockType,
    ) -> Result<bool, WorldError> {
        self.ensure_live()?;
        if !(0..CHUNK_HEIGHT).contains(&world_y) {
            return Ok(false);
        }

        let (coord, (x, y, z)) = world_to_local(world_x, world_y, world_z);
        let chunk = self.get_or_load_chunk(coord)?;
        Ok(chunk.set_block(x, y, z, block_type))
    }

    /// Removes the block at a world position, loading its chunk first.
    ///
    /// # Returns
    /// `true` if a block was removed; `false` for air and unbreakable blocks.
    pub fn remove_block(&mut self, world_x: i32, world_y: i32, world_z: i32) -> Result<bool, WorldError> {
        self.ensure_live()?;
        if !(0..CHUNK_HEIGHT).contains(&world_y) {
            return Ok(false);
        }

        let (coord, (x, y, z)) = world_to_local(world_x, world_y, world_z);
        let chunk = self.get_or_load_chunk(coord)?;
        let block_type = chunk.get_block(x, y, z);
        if block_type.is_unbreakable() {
            debug!(
                "Refusing to remove {:?} at ({}, {}, {})",
                block_type, world_x, world_y, world_z
            );
            return Ok(false);
        }
        Ok(chunk.remove_block(x, y, z))
    }

    /// Coordinates of resident chunks within render distance of the viewer
    /// that pass the culler. Touches them; never loads.
    pub fn visible_chunk_coords(
        &mut self,
        viewer_position: Point3<f32>,
        culler: &FrustumCuller,
    ) -> Vec<ChunkCoord> {
        let center = ChunkCoord::from_world_position(viewer_position.x, viewer_position.z);
        let visible: Vec<ChunkCoord> = center
            .square_around(self.config.render_distance)
            .filter(|coord| self.cache.contains(*coord) && culler.is_chunk_visible(*coord))
            .collect();

        for coord in &visible {
            self.cache.touch(*coord);
        }
        visible
    }

    /// Resident chunks within render distance of the viewer that pass the
    /// culler. Touches them; never loads.
    pub fn get_visible_chunks(
        &mut self,
        viewer_position: Point3<f32>,
        culler: &FrustumCuller,
    ) -> Vec<&Chunk> {
        let coords = self.visible_chunk_coords(viewer_position, culler);
        coords
            .into_iter()
            .filter_map(|coord| self.cache.peek(coord))
            .collect()
    }

    /// Clears the visibility-dirty flag of the given resident chunks.
    ///
    /// # Returns
    /// `true` if any of them had exposed blocks change since the last call.
    pub fn take_visibility_changes(&mut self, coords: &[ChunkCoord]) -> bool {
        let mut changed = false;
        for coord in coords {
            if let Some(chunk) = self.cache.peek_mut(*coord) {
                changed |= chunk.take_visibility_dirty();
            }
        }
        changed
    }

    /// Applies finished generations, then rebuilds the mesh of every dirty
    /// resident chunk.
    ///
    /// # Returns
    /// The coordinates whose meshes were rebuilt.
    pub fn tick(&mut self, _dt: Duration) -> Vec<ChunkCoord> {
        if self.disposed {
            return Vec::new();
        }
        self.process_completed_tasks();

        let mut rebuilt = Vec::new();
        for (coord, chunk) in self.cache.iter_mut() {
            if chunk.is_dirty() {
                chunk.rebuild_mesh();
                rebuilt.push(*coord);
            }
        }
        rebuilt
    }

    /// Saves one chunk if it holds unsaved edits.
    ///
    /// # Returns
    /// `true` if the chunk was written.
    pub fn save_chunk(&mut self, coord: ChunkCoord) -> Result<bool, WorldError> {
        let Some(persistence) = self.persistence.as_ref() else {
            return Err(PersistenceError::Unavailable("no persistence bound".to_string()).into());
        };
        let Some(chunk) = self.cache.peek_mut(coord) else {
            return Ok(false);
        };
        if !chunk.has_unsaved_changes() {
            return Ok(false);
        }

        persistence.save(&chunk.serialize())?;
        chunk.mark_saved();
        Ok(true)
    }

    /// Saves every resident chunk holding unsaved edits.
    ///
    /// Every chunk is attempted even if one fails.
    ///
    /// # Returns
    /// The number of chunks written, or the first failure.
    pub fn flush(&mut self) -> Result<usize, WorldError> {
        let Some(persistence) = self.persistence.as_ref() else {
            return Ok(0);
        };

        let mut saved = 0;
        let mut first_error = None;
        for (coord, chunk) in self.cache.iter_mut() {
            if !chunk.has_unsaved_changes() {
                continue;
            }
            match persistence.save(&chunk.serialize()) {
                Ok(()) => {
                    chunk.mark_saved();
                    saved += 1;
                }
                Err(err) => {
                    error!("Failed to save chunk {:?}: {}", coord, err);
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            Some(err) => Err(err.into()),
            None => Ok(saved),
        }
    }

    /// Coordinates evicted (or disposed) since the last call.
    pub fn take_evicted(&mut self) -> Vec<ChunkCoord> {
        mem::take(&mut self.evicted)
    }

    /// Current counters.
    pub fn stats(&self) -> WorldStats {
        let mut stats = WorldStats {
            resident_chunks: self.cache.len(),
            pending_chunks: self.pending_count(),
            ..Default::default()
        };
        for (_, chunk) in self.cache.iter() {
            stats.block_count += chunk.block_count();
            stats.dirty_chunks += chunk.is_dirty() as usize;
            stats.unsaved_chunks += chunk.has_unsaved_changes() as usize;
        }
        stats
    }

    /// Shuts the world down.
    ///
    /// Stops the workers and discards their outstanding results, saves
    /// unsaved chunks, then disposes and drops every resident chunk. Every
    /// later load or edit fails with [`WorldError::Disposed`].
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }

        self.task_manager.shutdown();
        self.pending.clear();

        if let Err(err) = self.flush() {
            error!("Unsaved edits lost while disposing world: {}", err);
        }

        for (coord, mut chunk) in self.cache.drain() {
            chunk.dispose();
            self.evicted.push(coord);
        }

        self.disposed = true;
        info!("World disposed");
    }
}
