//! # Voxel Task System
//!
//! This module contains tasks related to voxel world generation. These tasks
//! run on the worker pool so the control thread keeps ticking while terrain
//! is produced.

pub mod chunk_generation_task;

pub use chunk_generation_task::{ChunkGenerationTask, ChunkGenerationTaskResult};
