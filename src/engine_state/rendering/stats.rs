//! Telemetry snapshots for debug overlays.

use log::info;

/// One frame of telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StatsSnapshot {
    /// Frames per second averaged over the last interval
    pub fps: f32,
    /// Camera position in world space
    pub position: [f32; 3],
    /// Non-air blocks across resident chunks
    pub block_count: usize,
    /// Chunks in the cache
    pub resident_chunks: usize,
    /// Chunk loads in flight
    pub pending_chunks: usize,
}

/// Fire-and-forget consumer of telemetry.
pub trait StatsSink {
    /// Receives a snapshot. Must not block.
    fn report(&mut self, snapshot: &StatsSnapshot);
}

/// Stats sink writing each snapshot to the log.
#[derive(Debug, Default)]
pub struct LoggingStatsSink;

impl StatsSink for LoggingStatsSink {
    fn report(&mut self, snapshot: &StatsSnapshot) {
        info!(
            "fps {:.1} | pos ({:.1}, {:.1}, {:.1}) | blocks {} | chunks {} resident, {} pending",
            snapshot.fps,
            snapshot.position[0],
            snapshot.position[1],
            snapshot.position[2],
            snapshot.block_count,
            snapshot.resident_chunks,
            snapshot.pending_chunks
        );
    }
}
