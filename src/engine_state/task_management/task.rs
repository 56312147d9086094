//! # Task System Core Traits
//!
//! ## Core Components
//! - `Task`: Represents a unit of work that can be executed on a worker
//! - `TaskResult`: Represents the result of a completed task
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. The task's `process()` method is called on a worker thread
//! 3. The task returns a boxed `TaskResult`
//! 4. The result's `handle_result()` is called on the control thread with
//!    the world it belongs to
//! 5. The result can spawn new tasks
//!
//! ## Thread Safety
//! - `Task` must be `Send` to be transferred between threads
//! - `TaskResult` must be `Send` to be transferred back to the control thread
//! - Tasks own their inputs; they never reach into the world

use crate::engine_state::voxels::world::World;

/// A unit of work that can be executed on a worker thread.
///
/// Tasks should be self-contained and own all the data they need. They may
/// also be run inline on the control thread when no worker is available.
pub trait Task: Send {
    /// Processes the task and returns a result.
    ///
    /// Errors are part of the result; `process` itself does not fail.
    fn process(&self) -> Box<dyn TaskResult + Send>;
}

/// The result of processing a `Task`.
pub trait TaskResult: Send {
    /// Applies the result to the world on the control thread.
    ///
    /// # Returns
    /// Follow-up tasks to schedule (can be empty)
    fn handle_result(self: Box<Self>, world: &mut World) -> Vec<Box<dyn Task + Send>>;

    /// Short description for logs.
    fn describe(&self) -> String;
}
