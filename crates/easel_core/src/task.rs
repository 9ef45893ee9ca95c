//! Named worker threads that run posted closures, plus the blocking
//! post-and-wait rendezvous the service handlers rely on.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle, ThreadId};

type Task = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("{0} thread is not accepting tasks")]
    Terminated(String),
    #[error("task posted to the {0} thread panicked")]
    TaskPanicked(String),
}

/// A worker thread that executes posted closures one at a time, in the
/// order they were posted.
pub struct TaskRunner {
    name: String,
    thread_id: ThreadId,
    sender: Mutex<Option<mpsc::Sender<Task>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl TaskRunner {
    /// Start a runner on a new thread named `name`.
    pub fn spawn(name: impl Into<String>) -> std::io::Result<Arc<Self>> {
        let name = name.into();
        let (sender, receiver) = mpsc::channel::<Task>();
        let loop_name = name.clone();
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || run_loop(&loop_name, receiver))?;
        tracing::debug!(runner = %name, "task runner started");

        Ok(Arc::new(Self {
            thread_id: handle.thread().id(),
            name,
            sender: Mutex::new(Some(sender)),
            handle: Mutex::new(Some(handle)),
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn runs_tasks_on_current_thread(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    /// Queue `task` behind everything already posted to this runner.
    pub fn post_task(&self, task: impl FnOnce() + Send + 'static) -> Result<(), TaskError> {
        let guard = self.sender.lock().unwrap_or_else(|e| e.into_inner());
        let sender = guard
            .as_ref()
            .ok_or_else(|| TaskError::Terminated(self.name.clone()))?;
        sender
            .send(Box::new(task))
            .map_err(|_| TaskError::Terminated(self.name.clone()))
    }

    /// Post `task` and block the calling thread until it has run to
    /// completion, returning its result.
    ///
    /// There is no timeout and no way to cancel the wait. Called from the
    /// runner's own thread, `task` runs inline.
    pub fn run_and_wait<T, F>(&self, task: F) -> Result<T, TaskError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        if self.runs_tasks_on_current_thread() {
            return Ok(task());
        }

        let (done, latch) = mpsc::sync_channel(1);
        self.post_task(move || {
            // The waiter only goes away if it was itself torn down.
            let _ = done.send(task());
        })?;

        // The sender is dropped without sending only when the task unwound.
        latch
            .recv()
            .map_err(|_| TaskError::TaskPanicked(self.name.clone()))
    }

    /// Stop accepting tasks, drain the queue and join the thread.
    pub fn shutdown(&self) {
        self.sender
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();

        let handle = self.handle.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(handle) = handle {
            if !self.runs_tasks_on_current_thread() && handle.join().is_err() {
                tracing::error!(runner = %self.name, "task runner thread panicked");
            }
        }
    }
}

impl Drop for TaskRunner {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for TaskRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskRunner")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

fn run_loop(name: &str, receiver: mpsc::Receiver<Task>) {
    for task in receiver {
        if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
            tracing::error!(runner = name, "posted task panicked");
        }
    }
    tracing::debug!(runner = name, "task runner stopped");
}

/// The GPU-affine and UI-affine runners a host engine owns.
#[derive(Debug, Clone)]
pub struct TaskRunners {
    label: String,
    gpu: Arc<TaskRunner>,
    ui: Arc<TaskRunner>,
}

impl TaskRunners {
    pub fn new(label: impl Into<String>, gpu: Arc<TaskRunner>, ui: Arc<TaskRunner>) -> Self {
        Self {
            label: label.into(),
            gpu,
            ui,
        }
    }

    /// Spawn `{label}.gpu` and `{label}.ui` runners.
    pub fn spawn(label: impl Into<String>) -> std::io::Result<Self> {
        let label = label.into();
        let gpu = TaskRunner::spawn(format!("{label}.gpu"))?;
        let ui = TaskRunner::spawn(format!("{label}.ui"))?;
        Ok(Self::new(label, gpu, ui))
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn gpu(&self) -> &Arc<TaskRunner> {
        &self.gpu
    }

    pub fn ui(&self) -> &Arc<TaskRunner> {
        &self.ui
    }

    pub fn run_on_gpu_and_wait<T, F>(&self, task: F) -> Result<T, TaskError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.gpu.run_and_wait(task)
    }

    pub fn run_on_ui_and_wait<T, F>(&self, task: F) -> Result<T, TaskError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.ui.run_and_wait(task)
    }
}
