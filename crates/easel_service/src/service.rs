//! The view service protocol handlers.
//!
//! Each handler validates its parameters, hands any frame or script work to
//! the owning runner, blocks until that work signals completion, and returns
//! a structured response. Handlers share no state with each other.

use std::sync::Arc;

use easel_core::{ScriptLaunch, TaskRunners, ViewRegistry};

use crate::capture::{self, encode_base64, encode_png};
use crate::config::ServiceConfig;
use crate::error::ProtocolError;
use crate::protocol::ServiceParams;
use crate::response::{Screenshot, ScreenshotVector, Success, ViewDescriptor, ViewList};
use crate::view_id::{has_view_id_prefix, parse_view_id};

pub struct ViewServiceProtocol {
    registry: Arc<dyn ViewRegistry>,
    task_runners: TaskRunners,
    config: ServiceConfig,
}

impl ViewServiceProtocol {
    pub fn new(
        registry: Arc<dyn ViewRegistry>,
        task_runners: TaskRunners,
        config: ServiceConfig,
    ) -> Self {
        Self {
            registry,
            task_runners,
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Launch a script inside an existing view.
    ///
    /// Requires `viewId`, `assetDirectory`, `mainScript` and `packagesFile`.
    /// Blocks until the launch has run on the UI thread.
    pub fn run_script(&self, params: &ServiceParams) -> Result<Success, ProtocolError> {
        let view_id = params
            .get("viewId")
            .ok_or_else(|| ProtocolError::missing("viewId"))?;
        if !has_view_id_prefix(view_id) {
            return Err(ProtocolError::bad("viewId", view_id));
        }
        let asset_directory = params
            .get("assetDirectory")
            .ok_or_else(|| ProtocolError::missing("assetDirectory"))?;
        let main_script = params
            .get("mainScript")
            .ok_or_else(|| ProtocolError::missing("mainScript"))?;
        let packages_file = params
            .get("packagesFile")
            .ok_or_else(|| ProtocolError::missing("packagesFile"))?;

        let id = parse_view_id(view_id)?;
        let launch = ScriptLaunch {
            asset_directory: asset_directory.into(),
            main_script: main_script.into(),
            packages_file: packages_file.into(),
        };

        let result = self
            .registry
            .run_in_view(id, &launch)?
            .ok_or_else(|| ProtocolError::UnknownView(view_id.to_owned()))?;

        tracing::debug!(view = view_id, isolate = ?result.isolate, "script launched");
        Ok(Success::with_view(ViewDescriptor::new(
            result.view_id,
            result.isolate.as_ref(),
        )))
    }

    /// Every live view, in registry order.
    pub fn list_views(&self) -> ViewList {
        let mut views = Vec::new();
        self.registry.for_each_view(&mut |view| {
            views.push(ViewDescriptor::from(view));
            true
        });
        ViewList::new(views)
    }

    /// PNG of the last rendered frame, rastered on the GPU thread.
    pub fn screenshot(&self) -> Result<Screenshot, ProtocolError> {
        let registry = Arc::clone(&self.registry);
        let background = self.config.background;
        let bitmap = self
            .task_runners
            .run_on_gpu_and_wait(move || capture::rasterize_last_frame(registry.as_ref(), background))?;

        let encode_failed = || ProtocolError::Server("can not encode screenshot".into());
        let bitmap = bitmap.ok_or_else(encode_failed)?;
        let png = encode_png(&bitmap).map_err(|e| {
            tracing::warn!("png encoding failed: {e}");
            encode_failed()
        })?;
        if png.is_empty() {
            return Err(encode_failed());
        }

        Ok(Screenshot::new(encode_base64(&png)))
    }

    /// Serialized picture of the last rendered frame, recorded on the GPU thread.
    pub fn screenshot_vector(&self) -> Result<ScreenshotVector, ProtocolError> {
        let registry = Arc::clone(&self.registry);
        let picture = self
            .task_runners
            .run_on_gpu_and_wait(move || capture::record_last_frame(registry.as_ref()))?
            .ok_or_else(|| ProtocolError::Server("no frame available for vector capture".into()))?;

        let bytes = picture
            .to_bytes()
            .map_err(|e| ProtocolError::Server(format!("can not encode picture: {e}")))?;
        Ok(ScreenshotVector::new(encode_base64(&bytes)))
    }

    /// Block until every task already queued on the UI thread has run.
    ///
    /// Debug-only: a UI thread paused at a breakpoint or stuck in a loop
    /// stalls the caller indefinitely.
    pub fn flush_pending_ui_work(&self) -> Result<Success, ProtocolError> {
        self.task_runners.run_on_ui_and_wait(|| {})?;
        Ok(Success::new())
    }
}

impl std::fmt::Debug for ViewServiceProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewServiceProtocol")
            .field("task_runners", &self.task_runners)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_core::{PlatformView, RunResult, TaskError, ViewId};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;

    /// Registry with no views that records launch attempts.
    #[derive(Default)]
    struct EmptyRegistry {
        launches: Mutex<Vec<ViewId>>,
    }

    impl ViewRegistry for EmptyRegistry {
        fn for_each_view(&self, _visitor: &mut dyn FnMut(&PlatformView) -> bool) {}

        fn run_in_view(
            &self,
            id: ViewId,
            _launch: &ScriptLaunch,
        ) -> Result<Option<RunResult>, TaskError> {
            self.launches.lock().unwrap().push(id);
            Ok(None)
        }
    }

    fn protocol(registry: Arc<dyn ViewRegistry>) -> ViewServiceProtocol {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let runners = TaskRunners::spawn(format!("service-test-{id}")).unwrap();
        ViewServiceProtocol::new(registry, runners, ServiceConfig::default())
    }

    fn full_params(view_id: &str) -> Vec<(&str, String)> {
        vec![
            ("viewId", view_id.to_owned()),
            ("assetDirectory", "/app/assets".to_owned()),
            ("mainScript", "/app/main.script".to_owned()),
            ("packagesFile", "/app/.packages".to_owned()),
        ]
    }

    #[test]
    fn run_script_checks_prefix_before_other_params() {
        let registry = Arc::new(EmptyRegistry::default());
        let protocol = protocol(registry.clone());
        let params = ServiceParams::from_pairs([("viewId", "nope")]);

        assert_eq!(
            protocol.run_script(&params),
            Err(ProtocolError::bad("viewId", "nope"))
        );
        assert!(registry.launches.lock().unwrap().is_empty());
    }

    #[test]
    fn run_script_reports_each_missing_param_in_order() {
        let protocol = protocol(Arc::new(EmptyRegistry::default()));
        let all = full_params("_easelView/0x1");

        for (skip, expected) in [(1, "assetDirectory"), (2, "mainScript"), (3, "packagesFile")] {
            let params = ServiceParams::from_pairs(
                all.iter()
                    .enumerate()
                    .filter(|(i, _)| *i != skip)
                    .map(|(_, (k, v))| (*k, v.clone())),
            );
            assert_eq!(
                protocol.run_script(&params),
                Err(ProtocolError::missing(expected))
            );
        }
    }

    #[test]
    fn run_script_on_missing_view_is_unknown_view() {
        let registry = Arc::new(EmptyRegistry::default());
        let protocol = protocol(registry.clone());
        let params = ServiceParams::from_pairs(full_params("_easelView/0x2a"));

        assert_eq!(
            protocol.run_script(&params),
            Err(ProtocolError::UnknownView("_easelView/0x2a".into()))
        );
        assert_eq!(*registry.launches.lock().unwrap(), vec![ViewId(0x2a)]);
    }

    #[test]
    fn list_views_on_empty_registry() {
        let protocol = protocol(Arc::new(EmptyRegistry::default()));
        assert!(protocol.list_views().views.is_empty());
    }

    #[test]
    fn screenshots_without_views_are_server_errors() {
        let protocol = protocol(Arc::new(EmptyRegistry::default()));
        assert_eq!(
            protocol.screenshot(),
            Err(ProtocolError::Server("can not encode screenshot".into()))
        );
        assert_eq!(
            protocol.screenshot_vector(),
            Err(ProtocolError::Server("no frame available for vector capture".into()))
        );
    }

    #[test]
    fn flush_waits_for_queued_ui_work() {
        let registry: Arc<dyn ViewRegistry> = Arc::new(EmptyRegistry::default());
        let runners = TaskRunners::spawn("service-test-flush").unwrap();
        let protocol =
            ViewServiceProtocol::new(registry, runners.clone(), ServiceConfig::default());

        let done = Arc::new(AtomicU64::new(0));
        for _ in 0..3 {
            let done = Arc::clone(&done);
            runners
                .ui()
                .post_task(move || {
                    std::thread::sleep(std::time::Duration::from_millis(10));
                    done.fetch_add(1, Ordering::SeqCst);
                })
                .unwrap();
        }

        assert_eq!(protocol.flush_pending_ui_work(), Ok(Success::new()));
        assert_eq!(done.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn stopped_gpu_runner_is_a_server_error() {
        let registry: Arc<dyn ViewRegistry> = Arc::new(EmptyRegistry::default());
        let runners = TaskRunners::spawn("service-test-stopped").unwrap();
        runners.gpu().shutdown();
        let protocol = ViewServiceProtocol::new(registry, runners, ServiceConfig::default());

        match protocol.screenshot() {
            Err(ProtocolError::Server(message)) => {
                assert_eq!(message, "service-test-stopped.gpu thread is not accepting tasks")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    /// Registry whose launches never complete on the UI thread.
    struct UnreachableUi;

    impl ViewRegistry for UnreachableUi {
        fn for_each_view(&self, _visitor: &mut dyn FnMut(&PlatformView) -> bool) {}

        fn run_in_view(
            &self,
            _id: ViewId,
            _launch: &ScriptLaunch,
        ) -> Result<Option<RunResult>, TaskError> {
            Err(TaskError::TaskPanicked("host.ui".into()))
        }
    }

    #[test]
    fn run_script_surfaces_incomplete_launch_as_server_error() {
        let protocol = protocol(Arc::new(UnreachableUi));
        let params = ServiceParams::from_pairs(full_params("_easelView/0x1"));

        assert_eq!(
            protocol.run_script(&params),
            Err(ProtocolError::Server(
                "task posted to the host.ui thread panicked".into()
            ))
        );
    }
}
