//! The script engine seam: launching a program inside a view.

use std::path::PathBuf;
use std::sync::Mutex;

/// Reference to a running script isolate, echoed back to inspection tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsolateRef {
    pub main_port: i64,
    pub name: String,
}

impl IsolateRef {
    pub fn new(main_port: i64, name: impl Into<String>) -> Self {
        Self {
            main_port,
            name: name.into(),
        }
    }
}

/// Where to find the program to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLaunch {
    pub asset_directory: PathBuf,
    pub main_script: PathBuf,
    pub packages_file: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("script failed to launch: {0}")]
    LaunchFailed(String),
}

/// A script runtime capable of starting a program for a view.
pub trait ScriptRuntime: Send + Sync {
    fn launch(&self, launch: &ScriptLaunch) -> Result<IsolateRef, ScriptError>;
}

/// Per-view engine state: the runtime and the isolate currently driving the UI.
pub struct Engine {
    runtime: Box<dyn ScriptRuntime>,
    ui_isolate: Mutex<Option<IsolateRef>>,
}

impl Engine {
    pub fn new(runtime: impl ScriptRuntime + 'static) -> Self {
        Self {
            runtime: Box::new(runtime),
            ui_isolate: Mutex::new(None),
        }
    }

    /// Launch a program, replacing the current UI isolate.
    ///
    /// A failed launch leaves the view without an isolate.
    pub fn run_from_source(&self, launch: &ScriptLaunch) -> Option<IsolateRef> {
        let isolate = match self.runtime.launch(launch) {
            Ok(isolate) => Some(isolate),
            Err(e) => {
                tracing::warn!(
                    main_script = %launch.main_script.display(),
                    "failed to launch script: {e}"
                );
                None
            }
        };
        let mut guard = self.ui_isolate.lock().unwrap_or_else(|e| e.into_inner());
        *guard = isolate.clone();
        isolate
    }

    pub fn ui_isolate(&self) -> Option<IsolateRef> {
        self.ui_isolate
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("ui_isolate", &self.ui_isolate())
            .finish_non_exhaustive()
    }
}
