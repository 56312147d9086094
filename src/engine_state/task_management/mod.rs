//! # Task Management System
//!
//! This module provides the worker pool that runs chunk generation off the
//! control thread.
//!
//! ## Architecture Overview
//!
//! The task management system consists of several key components:
//! - `TaskManager`: Central coordinator for task distribution and worker management
//! - `Task`: A unit of work that can be executed on a worker
//! - `TaskResult`: The result of a completed task, applied to the world on the control thread
//! - `TaskChannel`: Communication channel between the control thread and one worker
//!
//! Workers are long-lived `std::thread`s, each fed by its own channel. All
//! workers report into one shared result channel, which lets the control
//! thread either poll for results or block on them with a timeout.
//!
//! ## Task Lifecycle
//! 1. Tasks are created and published via `TaskManager::publish_task()`
//! 2. The manager distributes tasks to available worker channels using round-robin
//! 3. Workers process tasks and send back results
//! 4. Results are collected on the control thread with `drain_completed()` or
//!    `wait_for_result()` and applied to the world
//! 5. Applying a result can spawn new tasks
//!
//! Tasks and results own all of their data; nothing is shared mutably
//! between a worker and the control thread.

pub mod task;

use log::{debug, info, warn};
use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use task::{Task, TaskResult};

/// A result tagged with the index of the worker that produced it.
type TaggedResult = (usize, Box<dyn TaskResult + Send>);

/// A communication channel between the control thread and a worker thread.
///
/// # Fields
/// - `task_sender`: Sends tasks from the control thread to the worker
/// - `num_tasks_in_flight`: Tracks number of tasks currently being processed
/// - `_worker`: Handle to the worker thread
pub struct TaskChannel {
    task_sender: Sender<Box<dyn Task + Send>>,
    num_tasks_in_flight: usize,
    _worker: JoinHandle<()>,
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// The `TaskManager` is responsible for:
/// - Creating and managing worker threads
/// - Distributing tasks across available workers
/// - Collecting task results
/// - Handling task queuing when all workers are busy
///
/// A manager created with zero workers accepts no work: `publish_task`
/// queues forever, so callers check [`TaskManager::has_workers`] and run
/// tasks inline instead.
pub struct TaskManager {
    channels: Vec<TaskChannel>,
    result_receiver: Receiver<TaggedResult>,
    queued_tasks: VecDeque<Box<dyn Task + Send>>,
    current_channel: usize,
}

/// Maximum number of tasks that can be in flight per worker channel.
///
/// Anything beyond this waits in the manager's queue.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

impl TaskManager {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// A worker that fails to spawn is logged and skipped; the pool may come
    /// up smaller than requested.
    pub fn new(num_workers: usize) -> Self {
        let mut channels = Vec::with_capacity(num_workers);
        let (result_tx, result_rx) = channel::<TaggedResult>();

        for worker_idx in 0..num_workers {
            let (task_tx, task_rx) = channel::<Box<dyn Task + Send>>();
            let result_tx = result_tx.clone();

            let task_closure = move || {
                while let Ok(task) = task_rx.recv() {
                    let result = task.process();
                    if result_tx.send((worker_idx, result)).is_err() {
                        break;
                    }
                }
            };

            let spawned = thread::Builder::new()
                .name(format!("chunk-worker-{worker_idx}"))
                .spawn(task_closure);

            match spawned {
                Ok(worker) => channels.push(TaskChannel {
                    task_sender: task_tx,
                    num_tasks_in_flight: 0,
                    _worker: worker,
                }),
                Err(err) => warn!("Failed to spawn worker {}: {}", worker_idx, err),
            }
        }

        info!(
            "Task manager started with {} workers (available parallelism: {:?})",
            channels.len(),
            thread::available_parallelism()
        );

        TaskManager {
            channels,
            result_receiver: result_rx,
            queued_tasks: VecDeque::new(),
            current_channel: 0,
        }
    }

    /// Number of live worker channels.
    pub fn worker_count(&self) -> usize {
        self.channels.len()
    }

    /// Whether any worker can accept tasks.
    pub fn has_workers(&self) -> bool {
        !self.channels.is_empty()
    }

    /// Tasks sent to workers and not yet collected.
    pub fn tasks_in_flight(&self) -> usize {
        self.channels
            .iter()
            .map(|channel| channel.num_tasks_in_flight)
            .sum()
    }

    /// Tasks waiting for a free worker.
    pub fn queued_len(&self) -> usize {
        self.queued_tasks.len()
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// # Returns
    /// - `Ok(())` if the task was successfully sent to the worker
    /// - `Err(task)` if the send failed (the worker is gone)
    fn try_send_task(
        &mut self,
        task: Box<dyn Task + Send>,
        channel_idx: usize,
    ) -> Result<(), Box<dyn Task + Send>> {
        match self.channels[channel_idx].task_sender.send(task) {
            Ok(_) => {
                self.channels[channel_idx].num_tasks_in_flight += 1;
                Ok(())
            }
            Err(task) => Err(task.0),
        }
    }

    /// Finds an available worker channel that can accept a new task.
    ///
    /// Round-robin from the channel after the last one used, skipping
    /// channels at `MAX_TASKS_IN_FLIGHT`.
    fn find_available_channel(&self) -> Option<usize> {
        if self.channels.is_empty() {
            return None;
        }

        let start_channel = self.current_channel % self.channels.len();
        let mut current = start_channel;

        loop {
            if self.channels[current].num_tasks_in_flight < MAX_TASKS_IN_FLIGHT {
                return Some(current);
            }
            current = (current + 1) % self.channels.len();
            if current == start_channel {
                return None;
            }
        }
    }

    /// Publishes a new task for execution.
    ///
    /// # Returns
    /// - `true` if the task was immediately scheduled on an available worker
    /// - `false` if the task was queued because all workers are busy
    pub fn publish_task(&mut self, task: Box<dyn Task + Send>) -> bool {
        match self.find_available_channel() {
            Some(channel_idx) => match self.try_send_task(task, channel_idx) {
                Ok(_) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                    true
                }
                Err(task) => {
                    warn!("Worker {} is gone, queueing task", channel_idx);
                    self.queued_tasks.push_back(task);
                    false
                }
            },
            None => {
                self.queued_tasks.push_back(task);
                false
            }
        }
    }

    /// Sends queued tasks to workers until the queue is empty or every
    /// worker is busy. Oldest first.
    pub fn process_queued_tasks(&mut self) {
        while !self.queued_tasks.is_empty() {
            let Some(channel_idx) = self.find_available_channel() else {
                break;
            };
            let Some(task) = self.queued_tasks.pop_front() else {
                break;
            };

            match self.try_send_task(task, channel_idx) {
                Ok(_) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => {
                    // Channel is disconnected, put task back and stop processing
                    self.queued_tasks.push_front(task);
                    break;
                }
            }
        }
    }

    fn complete(&mut self, worker_idx: usize) {
        if let Some(channel) = self.channels.get_mut(worker_idx) {
            channel.num_tasks_in_flight = channel.num_tasks_in_flight.saturating_sub(1);
        }
    }

    /// Collects every result already sent by the workers, without blocking.
    pub fn drain_completed(&mut self) -> Vec<Box<dyn TaskResult + Send>> {
        let mut results = Vec::new();
        while let Ok((worker_idx, result)) = self.result_receiver.try_recv() {
            self.complete(worker_idx);
            results.push(result);
        }
        results
    }

    /// Blocks until one result arrives or `timeout` passes.
    pub fn wait_for_result(&mut self, timeout: Duration) -> Option<Box<dyn TaskResult + Send>> {
        match self.result_receiver.recv_timeout(timeout) {
            Ok((worker_idx, result)) => {
                self.complete(worker_idx);
                Some(result)
            }
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Stops accepting work and releases the workers.
    ///
    /// Queued tasks are dropped. Workers finish the task they are on and
    /// exit; their results are discarded.
    pub fn shutdown(&mut self) {
        let dropped = self.queued_tasks.len();
        self.queued_tasks.clear();
        self.channels.clear();

        let mut discarded = 0;
        while self.result_receiver.try_recv().is_ok() {
            discarded += 1;
        }
        debug!(
            "Task manager shut down, {} queued tasks dropped, {} results discarded",
            dropped, discarded
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::world::World;

    struct Doubling(usize);

    struct Doubled(usize);

    impl Task for Doubling {
        fn process(&self) -> Box<dyn TaskResult + Send> {
            Box::new(Doubled(self.0 * 2))
        }
    }

    impl TaskResult for Doubled {
        fn handle_result(self: Box<Self>, _world: &mut World) -> Vec<Box<dyn Task + Send>> {
            Vec::new()
        }

        fn describe(&self) -> String {
            format!("doubled {}", self.0)
        }
    }

    fn collect(manager: &mut TaskManager, expected: usize) -> Vec<String> {
        let mut results = Vec::new();
        while results.len() < expected {
            let result = manager
                .wait_for_result(Duration::from_secs(5))
                .expect("worker result");
            results.push(result.describe());
            manager.process_queued_tasks();
        }
        results
    }

    #[test]
    fn test_tasks_run_on_workers() {
        let mut manager = TaskManager::new(2);
        assert_eq!(manager.worker_count(), 2);

        assert!(manager.publish_task(Box::new(Doubling(1))));
        assert!(manager.publish_task(Box::new(Doubling(2))));
        assert!(!manager.publish_task(Box::new(Doubling(3))));
        assert_eq!(manager.queued_len(), 1);

        let mut results = collect(&mut manager, 3);
        results.sort();
        assert_eq!(results, vec!["doubled 2", "doubled 4", "doubled 6"]);
        assert_eq!(manager.tasks_in_flight(), 0);
    }

    #[test]
    fn test_zero_workers_only_queue() {
        let mut manager = TaskManager::new(0);
        assert!(!manager.has_workers());
        assert!(!manager.publish_task(Box::new(Doubling(1))));
        manager.process_queued_tasks();
        assert_eq!(manager.queued_len(), 1);
        assert_eq!(manager.tasks_in_flight(), 0);
        assert!(manager.drain_completed().is_empty());
    }

    #[test]
    fn test_shutdown_drops_work() {
        let mut manager = TaskManager::new(1);
        manager.publish_task(Box::new(Doubling(1)));
        manager.publish_task(Box::new(Doubling(2)));
        manager.shutdown();

        assert!(!manager.has_workers());
        assert_eq!(manager.queued_len(), 0);
        assert!(manager.drain_completed().len() <= 1);
    }
}
