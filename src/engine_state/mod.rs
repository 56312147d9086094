//! # Engine State Module
//!
//! The module that ties the voxel world to a camera and to whatever presents
//! it.
//!
//! ## Key Components
//!
//! * `EngineState` - The main state container, advanced once per frame
//! * `camera_state` - Camera movement, projection and the view frustum
//! * `rendering` - Chunk meshes and the sinks that consume them
//! * `task_management` - The worker pool that generates chunks
//! * `voxels` - Blocks, chunks, terrain, persistence and the world
//!
//! ## Frame Order
//!
//! Each [`EngineState::update`]:
//! 1. Applies camera input; crossing a chunk border requests the chunks
//!    around the new position
//! 2. Ticks the world, which installs finished generations and rebuilds
//!    dirty meshes
//! 3. Tells the render sink about evicted chunks, then hands it rebuilt
//!    meshes
//! 4. Culls resident chunks against the frustum and publishes the visible
//!    set with its instance batches
//! 5. Reports telemetry once per stats interval

use cgmath::{Deg, Point3};
use log::{debug, info, warn};
use web_time::{Duration, Instant};

use crate::core::{error::WorldError, WorldConfig};

pub mod camera_state;
pub mod rendering;
pub mod task_management;
pub mod voxels;

use camera_state::{CameraInput, CameraState, CameraUpdates, FrustumCuller, Projection};
use rendering::{ChunkMeshUpload, InstanceBatches, RenderSink, StatsSink, StatsSnapshot};
use voxels::{
    coords::ChunkCoord,
    persistence::{ChunkPersistence, DirectoryBlobStore, MemoryBlobStore},
    world::World,
};

/// Height above the base terrain height where the camera starts.
const SPAWN_HEIGHT_ABOVE_TERRAIN: f32 = 16.0;

/// The main state container for a running world.
///
/// Owns the world, the camera and the sinks that receive render data and
/// telemetry. Everything happens on the thread calling [`EngineState::update`];
/// only terrain generation runs on workers.
pub struct EngineState {
    /// The voxel world containing all chunk data
    pub world: World,
    /// Camera state managing position, orientation and movement
    pub camera_state: CameraState,
    culler: FrustumCuller,
    render_sink: Box<dyn RenderSink>,
    stats_sink: Box<dyn StatsSink>,
    visible_chunks: Vec<ChunkCoord>,
    frames_since_report: u32,
    last_report: Instant,
}

impl EngineState {
    /// Creates the world, binds its persistence and requests the chunks
    /// around the spawn point.
    ///
    /// Chunks are stored under `config.persistence_dir` when set, otherwise
    /// in memory for the lifetime of the process.
    ///
    /// # Arguments
    /// * `config` - World configuration
    /// * `projection` - Projection used for culling
    /// * `render_sink` - Receives meshes, unloads and the visible set
    /// * `stats_sink` - Receives telemetry snapshots
    pub fn new(
        config: WorldConfig,
        projection: Projection,
        render_sink: Box<dyn RenderSink>,
        stats_sink: Box<dyn StatsSink>,
    ) -> Result<Self, WorldError> {
        let persistence = match &config.persistence_dir {
            Some(dir) => {
                info!("Persisting chunks to {}", dir.display());
                ChunkPersistence::new(DirectoryBlobStore::open(dir)?)
            }
            None => {
                warn!("No persistence directory configured, edits are kept in memory only");
                ChunkPersistence::new(MemoryBlobStore::new())
            }
        };

        let spawn = Point3::new(
            8.0,
            config.base_height as f32 + SPAWN_HEIGHT_ABOVE_TERRAIN,
            8.0,
        );

        let mut world = World::new(config)?;
        world.initialize(persistence);

        let camera_state = CameraState::new(spawn, projection);
        let culler = FrustumCuller::from_view_projection(&camera_state.view_projection());

        let render_distance = world.config().render_distance;
        let pending = world.request_chunks_around(camera_state.chunk_position(), render_distance)?;
        debug!("{} chunks generating around spawn", pending);

        Ok(EngineState {
            world,
            camera_state,
            culler,
            render_sink,
            stats_sink,
            visible_chunks: Vec::new(),
            frames_since_report: 0,
            last_report: Instant::now(),
        })
    }

    /// Chunks that passed culling on the last update.
    pub fn visible_chunks(&self) -> &[ChunkCoord] {
        &self.visible_chunks
    }

    /// The frustum used on the last update.
    pub fn culler(&self) -> &FrustumCuller {
        &self.culler
    }

    /// Updates the projection after a viewport resize.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera_state.projection.resize(width, height);
    }

    /// Advances one frame.
    ///
    /// # Arguments
    /// * `dt` - Time since the previous frame
    /// * `input` - Camera input gathered during that time
    pub fn update(&mut self, dt: Duration, input: &CameraInput) -> Result<(), WorldError> {
        self.camera_state.intake_actions(input);
        if let Some(CameraUpdates {
            new_chunk_position,
            changed_chunk: true,
        }) = self.camera_state.update(dt)
        {
            let render_distance = self.world.config().render_distance;
            self.world
                .request_chunks_around(new_chunk_position, render_distance)?;
        }

        let rebuilt = self.world.tick(dt);

        // Unloads first: a chunk can be evicted and reloaded within one frame.
        for coord in self.world.take_evicted() {
            self.render_sink.unload_chunk(coord);
        }
        for coord in rebuilt {
            if let Some(mesh) = self.world.chunk_mesh(coord) {
                self.render_sink
                    .upload_chunk_mesh(ChunkMeshUpload::from_mesh(coord, mesh));
            }
        }

        self.culler.update(&self.camera_state.view_projection());
        let visible = self
            .world
            .visible_chunk_coords(self.camera_state.camera.position, &self.culler);
        let visibility_changed = self.world.take_visibility_changes(&visible);
        let visible_set_changed = visible != self.visible_chunks;
        self.visible_chunks = visible;
        self.render_sink.set_visible_chunks(&self.visible_chunks);

        if visible_set_changed || visibility_changed {
            let instances = InstanceBatches::collect(
                self.visible_chunks
                    .iter()
                    .filter_map(|coord| self.world.peek_chunk(*coord)),
                self.world.config().max_instances_per_type,
            );
            if instances.truncated > 0 {
                debug!("{} instances over the per-type cap", instances.truncated);
            }
            self.render_sink.set_instances(&instances);
        }

        self.report_stats();
        Ok(())
    }

    fn report_stats(&mut self) {
        self.frames_since_report += 1;
        let elapsed = self.last_report.elapsed();
        if elapsed < self.world.config().stats_interval() {
            return;
        }

        let stats = self.world.stats();
        let position = self.camera_state.camera.position;
        self.stats_sink.report(&StatsSnapshot {
            fps: self.frames_since_report as f32 / elapsed.as_secs_f32().max(f32::EPSILON),
            position: [position.x, position.y, position.z],
            block_count: stats.block_count,
            resident_chunks: stats.resident_chunks,
            pending_chunks: stats.pending_chunks,
        });

        self.frames_since_report = 0;
        self.last_report = Instant::now();
    }

    /// Shuts the world down and unloads everything it held.
    pub fn dispose(&mut self) {
        self.world.dispose();
        for coord in self.world.take_evicted() {
            self.render_sink.unload_chunk(coord);
        }
        self.visible_chunks.clear();
        self.render_sink.set_visible_chunks(&self.visible_chunks);
    }
}

/// The projection the headless runner culls with.
pub fn default_projection() -> Projection {
    Projection::new(1280, 720, Deg(70.0), 0.1, 1000.0)
}
