//! The view registry: the set of live views a host exposes for inspection.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use crate::{
    Engine, IsolateRef, PlatformView, Rasterizer, ScriptLaunch, TaskError, TaskRunners, ViewId,
};

/// Outcome of launching a script in a view that exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    pub view_id: ViewId,
    /// `None` when the view exists but the launch did not produce an isolate.
    pub isolate: Option<IsolateRef>,
}

/// Capability interface over the host's live views.
pub trait ViewRegistry: Send + Sync {
    /// Visit views in creation order until `visitor` returns `false`.
    fn for_each_view(&self, visitor: &mut dyn FnMut(&PlatformView) -> bool);

    /// Run a script inside view `id` and wait for it to start.
    ///
    /// Returns `Ok(None)` if no such view is live, and an error if the
    /// thread that runs the launch never completed it.
    fn run_in_view(
        &self,
        id: ViewId,
        launch: &ScriptLaunch,
    ) -> Result<Option<RunResult>, TaskError>;
}

/// In-memory view registry that launches scripts on the UI runner.
pub struct Shell {
    task_runners: TaskRunners,
    views: RwLock<Vec<Arc<PlatformView>>>,
    next_view_id: AtomicUsize,
}

impl Shell {
    pub fn new(task_runners: TaskRunners) -> Self {
        Self {
            task_runners,
            views: RwLock::new(Vec::new()),
            next_view_id: AtomicUsize::new(1),
        }
    }

    pub fn task_runners(&self) -> &TaskRunners {
        &self.task_runners
    }

    /// Register a new view and return it.
    pub fn create_view(&self, engine: Engine, rasterizer: Arc<Rasterizer>) -> Arc<PlatformView> {
        let id = ViewId(self.next_view_id.fetch_add(1, Ordering::Relaxed));
        let view = Arc::new(PlatformView::new(id, engine, rasterizer));
        self.views
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(Arc::clone(&view));
        tracing::debug!(view = id.0, "view created");
        view
    }

    /// Unregister a view. Returns true if it was found and removed.
    pub fn remove_view(&self, id: ViewId) -> bool {
        let mut views = self.views.write().unwrap_or_else(|e| e.into_inner());
        let len_before = views.len();
        views.retain(|v| v.id() != id);
        views.len() < len_before
    }

    pub fn view(&self, id: ViewId) -> Option<Arc<PlatformView>> {
        self.views
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|v| v.id() == id)
            .cloned()
    }

    pub fn view_count(&self) -> usize {
        self.views.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl ViewRegistry for Shell {
    fn for_each_view(&self, visitor: &mut dyn FnMut(&PlatformView) -> bool) {
        // Snapshot so visitors may block without holding the lock.
        let views: Vec<Arc<PlatformView>> = self
            .views
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        for view in &views {
            if !visitor(view) {
                break;
            }
        }
    }

    fn run_in_view(
        &self,
        id: ViewId,
        launch: &ScriptLaunch,
    ) -> Result<Option<RunResult>, TaskError> {
        let Some(view) = self.view(id) else {
            return Ok(None);
        };
        let launch = launch.clone();
        let isolate = self
            .task_runners
            .run_on_ui_and_wait(move || view.engine().run_from_source(&launch))?;
        Ok(Some(RunResult {
            view_id: id,
            isolate,
        }))
    }
}

impl std::fmt::Debug for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("task_runners", &self.task_runners)
            .field("view_count", &self.view_count())
            .finish_non_exhaustive()
    }
}
