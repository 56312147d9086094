#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel World
//!
//! The core of a chunked voxel sandbox: procedural terrain from seeded
//! gradient noise, 16 x 256 x 16 chunks kept in an LRU cache, persistence of
//! edited chunks, hidden-face culled meshes and frustum culling.
//!
//! ## Key Modules
//!
//! * `core` - Configuration, errors and the shared resource container
//! * `engine_state` - The world, its camera, worker pool and render hand-off
//!
//! ## Architecture
//!
//! The crate stops at the render boundary. Meshes, evictions and the visible
//! set go to a [`RenderSink`](engine_state::rendering::RenderSink) and
//! telemetry to a [`StatsSink`](engine_state::rendering::StatsSink); a
//! windowed frontend implements both over its own GPU device.
//!
//! ## Usage
//!
//! ```no_run
//! fn main() {
//!     voxel_world::run();
//! }
//! ```
//!
//! `run` takes an optional path to a JSON [`WorldConfig`](core::WorldConfig)
//! as its first argument and walks a camera through the world headlessly,
//! logging through `env_logger` (set `RUST_LOG=info` to see it).

use std::path::Path;

use cgmath::Point3;
use log::{error, info};
use web_time::Duration;

use crate::core::{error::WorldError, WorldConfig};
use crate::engine_state::{
    camera_state::CameraInput,
    default_projection,
    rendering::{LoggingRenderSink, LoggingStatsSink},
    voxels::block::block_type::BlockType,
    EngineState,
};

pub mod core;
pub mod engine_state;

/// Frames the headless walk simulates.
const HEADLESS_FRAMES: u32 = 240;

/// Simulated frame time of the headless walk.
const HEADLESS_FRAME_TIME: Duration = Duration::from_millis(16);

/// Runs the world headlessly.
///
/// Initializes logging, loads the config named by the first command line
/// argument (defaults otherwise), walks the camera forward, places and
/// removes a block in front of it, then disposes the world.
pub fn run() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let config = match std::env::args().nth(1) {
        Some(path) => match WorldConfig::from_path(Path::new(&path)) {
            Ok(config) => config,
            Err(err) => {
                error!("Could not load config from {}: {}", path, err);
                return;
            }
        },
        None => WorldConfig::default(),
    };

    if let Err(err) = run_headless(config) {
        error!("World stopped: {}", err);
    }
}

fn run_headless(config: WorldConfig) -> Result<(), WorldError> {
    let mut engine = EngineState::new(
        config,
        default_projection(),
        Box::new(LoggingRenderSink::new()),
        Box::new(LoggingStatsSink),
    )?;

    let walk = CameraInput {
        move_forward: true,
        ..Default::default()
    };
    for _ in 0..HEADLESS_FRAMES {
        engine.update(HEADLESS_FRAME_TIME, &walk)?;
        std::thread::sleep(HEADLESS_FRAME_TIME);
    }

    let position: Point3<f32> = engine.camera_state.camera.position;
    let (x, y, z) = (position.x as i32 + 2, position.y as i32, position.z as i32);
    if engine.world.set_block(x, y, z, BlockType::STONE)? {
        info!("Placed stone at ({}, {}, {})", x, y, z);
    }
    if engine.world.remove_block(x, y, z)? {
        info!("Removed stone at ({}, {}, {})", x, y, z);
    }
    engine.update(HEADLESS_FRAME_TIME, &CameraInput::default())?;

    let stats = engine.world.stats();
    info!(
        "Finished walk with {} chunks resident, {} blocks",
        stats.resident_chunks, stats.block_count
    );

    engine.dispose();
    Ok(())
}
