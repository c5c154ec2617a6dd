//! # Task System Core Trait
//!
//! A `Task` is a unit of work published to the `TaskManager`. It is moved to
//! a worker thread, processed there, and its output travels back to the
//! driving thread where it is collected by handle.
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`,
//!    which hands back a `TaskHandle`
//! 2. The task's `process()` method is called on a worker thread
//! 3. The output is collected on the driving thread in
//!    `TaskManager::process_completed_tasks()`
//! 4. The owner of the handle takes the output with `TaskManager::poll()`
//!
//! ## Thread Safety
//! - `Task` must be `Send` to be transferred between threads
//! - The output must be `Send` to be transferred back
//! - Tasks own all the data they read, they never borrow from the driving
//!   thread's state

/// A unit of work that can be executed on a worker thread.
///
/// # Implementation Guidelines
/// - Should own every input it needs (copies of fields, `Arc` snapshots)
/// - Should be coarse-grained to amortize the scheduling overhead
/// - Must not block on the driving thread
pub trait Task: Send {
    /// The value handed back to the driving thread.
    type Output: Send + 'static;

    /// Processes the task, consuming it.
    ///
    /// A panic here takes down the worker thread that ran it; the pool logs
    /// the disconnection and the task's handle never completes.
    fn process(self: Box<Self>) -> Self::Output;
}

/// Identifies a published task until its output is polled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(pub(super) u64);
