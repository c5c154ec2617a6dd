//! # Task Management System
//!
//! Executes work asynchronously on a pool of worker threads without ever
//! blocking the driving thread.
//!
//! ## Architecture Overview
//! - `TaskManager`: Central coordinator for task distribution and worker management
//! - `Task`: A unit of work that can be executed asynchronously
//! - `TaskHandle`: Identifies a published task until its output is polled
//! - `TaskChannel`: Communication channel between the driving thread and one worker
//!
//! ## Task Lifecycle
//! 1. Tasks are published via `TaskManager::publish_task()`, returning a handle
//! 2. The manager distributes tasks to available worker channels using round-robin,
//!    and queues the rest (up to `max_queued_tasks`)
//! 3. Workers process tasks and send the outputs back
//! 4. `process_completed_tasks()` drains the outputs without blocking
//! 5. `poll()` hands a finished output to the owner of its handle
//! 6. `process_queued_tasks()` feeds the queue to workers that became free
//!
//! ## Inline Mode
//! With zero workers, queued tasks run on the driving thread inside
//! `process_queued_tasks()`. Results are then fully deterministic, which is
//! what the tests rely on.
//!
//! ## Example Usage
//! ```ignore
//! let mut task_manager = TaskManager::new(4, 4096)?;
//! let handle = task_manager.publish_task(Box::new(MyTask::new(...)))?;
//!
//! // In the main loop:
//! task_manager.process_completed_tasks();
//! if let Some(output) = task_manager.poll(handle) { ... }
//! task_manager.process_queued_tasks();
//! ```

pub mod task;

use std::{
    collections::{HashMap, VecDeque},
    sync::mpsc::{channel, Receiver, Sender, TryRecvError},
    thread::{self, JoinHandle},
};

use log::{debug, error, info};

use crate::core::{Error, Result};

pub use task::{Task, TaskHandle};

/// A boxed task producing outputs of type `R`.
pub type BoxedTask<R> = Box<dyn Task<Output = R> + Send>;

/// A communication channel between the driving thread and a worker thread.
///
/// # Fields
/// - `task_sender`: Sends tasks from the driving thread to the worker
/// - `result_receiver`: Receives task outputs from the worker
/// - `num_tasks_in_flight`: Tracks number of tasks currently being processed
/// - `disconnected`: Set once the worker is known to be gone
/// - `_worker`: Handle to the worker thread
#[derive(Debug)]
pub struct TaskChannel<R> {
    task_sender: Sender<(TaskHandle, BoxedTask<R>)>,
    result_receiver: Receiver<(TaskHandle, R)>,
    num_tasks_in_flight: usize,
    disconnected: bool,
    _worker: JoinHandle<()>,
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// The `TaskManager` is responsible for:
/// - Creating and managing worker threads
/// - Distributing tasks across available workers
/// - Collecting task outputs until their handle is polled
/// - Queuing tasks, within a bound, when all workers are busy
pub struct TaskManager<R> {
    channels: Vec<TaskChannel<R>>,
    queued_tasks: VecDeque<(TaskHandle, BoxedTask<R>)>,
    completed: HashMap<TaskHandle, R>,
    current_channel: usize,
    max_queued_tasks: usize,
    next_handle: u64,
}

/// Maximum number of tasks that can be in flight per worker channel.
///
/// This is set to 1 so that a long task never delays a short one that a
/// free worker could have taken.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

impl<R: Send + 'static> TaskManager<R> {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// # Arguments
    /// * `num_workers` - Number of worker threads to create, zero for inline mode
    /// * `max_queued_tasks` - Bound of the queue of tasks waiting for a worker
    ///
    /// # Errors
    /// Returns `Error::Io` if a worker thread cannot be spawned.
    pub fn new(num_workers: usize, max_queued_tasks: usize) -> Result<Self> {
        let mut channels = Vec::with_capacity(num_workers);

        for worker_index in 0..num_workers {
            let (task_tx, task_rx) = channel::<(TaskHandle, BoxedTask<R>)>();
            let (result_tx, result_rx) = channel::<(TaskHandle, R)>();

            let task_closure = move || {
                while let Ok((handle, task)) = task_rx.recv() {
                    let output = task.process();
                    if result_tx.send((handle, output)).is_err() {
                        break;
                    }
                }
            };

            let worker = thread::Builder::new()
                .name(format!("pipeline-worker-{}", worker_index))
                .spawn(task_closure)?;

            channels.push(TaskChannel {
                task_sender: task_tx,
                result_receiver: result_rx,
                num_tasks_in_flight: 0,
                disconnected: false,
                _worker: worker,
            });
        }

        if num_workers == 0 {
            info!("Task manager running tasks inline");
        } else {
            info!(
                "Task manager started {} workers (available parallelism: {:?})",
                num_workers,
                thread::available_parallelism()
            );
        }

        Ok(TaskManager {
            channels,
            queued_tasks: VecDeque::new(),
            completed: HashMap::new(),
            current_channel: 0,
            max_queued_tasks,
            next_handle: 0,
        })
    }

    pub fn worker_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of tasks waiting for a free worker.
    pub fn queued_count(&self) -> usize {
        self.queued_tasks.len()
    }

    /// Number of tasks currently held by workers.
    pub fn in_flight_count(&self) -> usize {
        self.channels
            .iter()
            .map(|channel| channel.num_tasks_in_flight)
            .sum()
    }

    /// Number of outputs waiting to be polled.
    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// Returns the task back if the worker has disconnected, so it can be
    /// requeued.
    fn try_send_task(
        &mut self,
        handle: TaskHandle,
        task: BoxedTask<R>,
        channel_idx: usize,
    ) -> std::result::Result<(), (TaskHandle, BoxedTask<R>)> {
        let channel = &mut self.channels[channel_idx];
        match channel.task_sender.send((handle, task)) {
            Ok(_) => {
                channel.num_tasks_in_flight += 1;
                Ok(())
            }
            Err(returned) => {
                if !channel.disconnected {
                    channel.disconnected = true;
                    error!("{}", Error::WorkerDisconnected(channel_idx));
                }
                Err(returned.0)
            }
        }
    }

    /// Finds an available worker channel, round-robin from the last used one.
    ///
    /// Channels that have reached `MAX_TASKS_IN_FLIGHT` or whose worker is
    /// gone are skipped.
    fn find_available_channel(&self) -> Option<usize> {
        let count = self.channels.len();
        (0..count)
            .map(|step| (self.current_channel + step) % count)
            .find(|&index| {
                let channel = &self.channels[index];
                !channel.disconnected && channel.num_tasks_in_flight < MAX_TASKS_IN_FLIGHT
            })
    }

    /// Publishes a new task for execution.
    ///
    /// The task is sent to a free worker right away, or queued if all workers
    /// are busy.
    ///
    /// # Errors
    /// Returns `Error::PoolSaturated` if the task would have to be queued and
    /// the queue is full. The task is dropped; the caller is expected to
    /// publish it again later.
    pub fn publish_task(&mut self, mut task: BoxedTask<R>) -> Result<TaskHandle> {
        let handle = TaskHandle(self.next_handle);

        // Older queued tasks go first.
        if self.queued_tasks.is_empty() {
            // A failed send marks its channel disconnected, so the next
            // lookup moves on to another worker.
            while let Some(channel_idx) = self.find_available_channel() {
                match self.try_send_task(handle, task, channel_idx) {
                    Ok(_) => {
                        self.current_channel = (channel_idx + 1) % self.channels.len();
                        self.next_handle += 1;
                        return Ok(handle);
                    }
                    Err((_, returned)) => task = returned,
                }
            }
        }

        if self.queued_tasks.len() >= self.max_queued_tasks {
            return Err(Error::PoolSaturated(self.queued_tasks.len()));
        }
        self.next_handle += 1;
        self.queued_tasks.push_back((handle, task));
        Ok(handle)
    }

    /// Feeds queued tasks to free workers, oldest first.
    ///
    /// In inline mode every queued task is processed right here.
    pub fn process_queued_tasks(&mut self) {
        if self.queued_tasks.is_empty() {
            return;
        }

        if self.channels.is_empty() {
            let count = self.queued_tasks.len();
            while let Some((handle, task)) = self.queued_tasks.pop_front() {
                self.completed.insert(handle, task.process());
            }
            debug!("Processed {} tasks inline", count);
            return;
        }

        while let Some(channel_idx) = self.find_available_channel() {
            let Some((handle, task)) = self.queued_tasks.pop_front() else {
                break;
            };
            match self.try_send_task(handle, task, channel_idx) {
                Ok(_) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(returned) => self.queued_tasks.push_front(returned),
            }
        }
    }

    /// Collects the outputs of every finished task without blocking.
    ///
    /// Returns the number of outputs collected.
    pub fn process_completed_tasks(&mut self) -> usize {
        let mut collected = 0;
        for (channel_idx, channel) in self.channels.iter_mut().enumerate() {
            loop {
                match channel.result_receiver.try_recv() {
                    Ok((handle, output)) => {
                        channel.num_tasks_in_flight -= 1;
                        self.completed.insert(handle, output);
                        collected += 1;
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        if !channel.disconnected {
                            channel.disconnected = true;
                            error!(
                                "{} with {} tasks in flight",
                                Error::WorkerDisconnected(channel_idx),
                                channel.num_tasks_in_flight
                            );
                        }
                        break;
                    }
                }
            }
        }
        collected
    }

    /// Takes the output of a finished task, or `None` if it is not ready.
    pub fn poll(&mut self, handle: TaskHandle) -> Option<R> {
        self.completed.remove(&handle)
    }
}
