//! FIFO task queue shared between producers and the drain loop.

use std::collections::VecDeque;
use std::sync::Mutex;

use tracing::debug;

use elizao_models::Task;

use crate::error::{OrchestratorError, Result};

/// Thread-safe FIFO queue of pending tasks.
///
/// Arrival order is authoritative: `priority` is never consulted. Producers
/// on any thread may enqueue while the consumer drains; each task comes out
/// exactly once.
#[derive(Debug, Default)]
pub struct TaskQueue {
    tasks: Mutex<VecDeque<Task>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, VecDeque<Task>>> {
        self.tasks
            .lock()
            .map_err(|e| OrchestratorError::LockPoisoned(e.to_string()))
    }

    /// Appends `task` to the tail.
    pub fn enqueue(&self, task: Task) -> Result<()> {
        let mut tasks = self.lock()?;
        debug!(task_id = %task.id, task_type = %task.task_type, depth = tasks.len() + 1, "Task enqueued");
        tasks.push_back(task);
        Ok(())
    }

    /// Removes the head task, if any.
    pub fn pop_front(&self) -> Result<Option<Task>> {
        Ok(self.lock()?.pop_front())
    }

    /// Removes and returns every queued task in arrival order.
    pub fn dequeue_all(&self) -> Result<Vec<Task>> {
        Ok(self.lock()?.drain(..).collect())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }
}
