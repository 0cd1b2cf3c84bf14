//! Submit-and-wait execution of reorder tasks.
//!
//! A [`Stream`] stands in for the scheduler that runs reorders alongside
//! other work. `submit` hands back a [`TaskHandle`]; `wait` blocks until the
//! task has finished and returns its destination buffer.

use std::thread::{self, JoinHandle};

use tracing::debug;

use crate::buffer::Buffer;
use crate::error::{ReorderError, Result};
use crate::reorder::Reorder;

/// When submitted work runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamKind {
    /// Each task starts on its own worker thread as soon as it is submitted.
    #[default]
    Eager,
    /// Tasks run on the waiting thread when their handle is waited on.
    Lazy,
}

/// A reorder together with the buffers it owns while in flight.
#[derive(Debug)]
pub struct ReorderTask {
    reorder: Reorder,
    src: Buffer,
    dst: Buffer,
}

impl ReorderTask {
    pub fn new(reorder: Reorder, src: Buffer, dst: Buffer) -> Self {
        Self { reorder, src, dst }
    }

    /// Run the reorder, giving back the destination buffer.
    pub fn run(mut self) -> Result<Buffer> {
        self.reorder.execute(&self.src, &mut self.dst)?;
        Ok(self.dst)
    }
}

#[derive(Debug)]
enum TaskState {
    Running(JoinHandle<Result<Buffer>>),
    Deferred(ReorderTask),
    Failed(ReorderError),
}

/// Handle to a submitted task.
#[derive(Debug)]
pub struct TaskHandle {
    state: TaskState,
}

impl TaskHandle {
    /// Block until the task has finished.
    ///
    /// # Errors
    /// The task's own error, or `Task` if its worker could not be started or
    /// panicked.
    pub fn wait(self) -> Result<Buffer> {
        match self.state {
            TaskState::Running(handle) => handle
                .join()
                .map_err(|_| ReorderError::Task("reorder worker panicked".to_string()))?,
            TaskState::Deferred(task) => task.run(),
            TaskState::Failed(e) => Err(e),
        }
    }

    /// True once `wait` would return without blocking.
    pub fn is_finished(&self) -> bool {
        match &self.state {
            TaskState::Running(handle) => handle.is_finished(),
            TaskState::Deferred(_) => false,
            TaskState::Failed(_) => true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Stream {
    kind: StreamKind,
}

impl Stream {
    pub fn new(kind: StreamKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    pub fn submit(&self, task: ReorderTask) -> TaskHandle {
        debug!(kind = ?self.kind, logical_size = task.reorder.logical_size(), "task submitted");
        let state = match self.kind {
            StreamKind::Lazy => TaskState::Deferred(task),
            StreamKind::Eager => {
                match thread::Builder::new()
                    .name("lr-reorder".to_string())
                    .spawn(move || task.run())
                {
                    Ok(handle) => TaskState::Running(handle),
                    Err(e) => TaskState::Failed(ReorderError::Task(format!(
                        "failed to spawn worker: {}",
                        e
                    ))),
                }
            }
        };
        TaskHandle { state }
    }

    /// Submit every task, in order.
    pub fn submit_all(&self, tasks: impl IntoIterator<Item = ReorderTask>) -> Vec<TaskHandle> {
        tasks.into_iter().map(|t| self.submit(t)).collect()
    }

    /// Wait on every handle, returning the destination buffers in order.
    ///
    /// All handles are waited on even if one fails; the first error wins.
    pub fn wait_all(handles: Vec<TaskHandle>) -> Result<Vec<Buffer>> {
        let results: Vec<Result<Buffer>> = handles.into_iter().map(TaskHandle::wait).collect();
        results.into_iter().collect()
    }
}
