//! Extension registration and dispatch.
//!
//! The host's service dispatcher hands us a method name and string params;
//! we route them to the matching [`ViewServiceProtocol`] handler and return
//! the JSON reply. Debug-only extensions are never registered when the host
//! runs precompiled code.

use std::collections::BTreeMap;

use crate::error::ProtocolError;
use crate::protocol::{DebugRequest, DebugResponse, ServiceParams};
use crate::response::encode;
use crate::service::ViewServiceProtocol;

pub const LIST_VIEWS: &str = "listViews";
pub const SCREENSHOT: &str = "screenshot";
pub const SCREENSHOT_VECTOR: &str = "screenshotVector";
pub const RUN_SCRIPT: &str = "runScript";
pub const FLUSH_PENDING_UI_WORK: &str = "flushPendingUiWork";

pub type Handler = fn(&ViewServiceProtocol, &ServiceParams) -> Result<serde_json::Value, ProtocolError>;

pub struct ExtensionRegistry {
    protocol: ViewServiceProtocol,
    handlers: BTreeMap<&'static str, Handler>,
}

impl ExtensionRegistry {
    /// A registry with no extensions.
    pub fn new(protocol: ViewServiceProtocol) -> Self {
        Self {
            protocol,
            handlers: BTreeMap::new(),
        }
    }

    /// Register every extension appropriate for the protocol's build mode.
    pub fn register_hooks(protocol: ViewServiceProtocol) -> Self {
        let precompiled = protocol.config().build_mode.running_precompiled_code();
        let mut registry = Self::new(protocol);

        registry.register(LIST_VIEWS, |p, _| encode(&p.list_views()));
        registry.register(SCREENSHOT, |p, _| encode(&p.screenshot()?));
        registry.register(SCREENSHOT_VECTOR, |p, _| encode(&p.screenshot_vector()?));

        if precompiled {
            return registry;
        }
        registry.register(RUN_SCRIPT, |p, params| encode(&p.run_script(params)?));
        registry.register(FLUSH_PENDING_UI_WORK, |p, _| {
            encode(&p.flush_pending_ui_work()?)
        });
        registry
    }

    pub fn register(&mut self, method: &'static str, handler: Handler) {
        if self.handlers.insert(method, handler).is_some() {
            tracing::warn!(method, "replaced existing service extension");
        }
    }

    /// Registered method names, sorted.
    pub fn methods(&self) -> Vec<&'static str> {
        self.handlers.keys().copied().collect()
    }

    pub fn is_registered(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }

    /// Run one extension call, producing exactly one reply.
    pub fn call(
        &self,
        method: &str,
        params: &ServiceParams,
    ) -> Result<serde_json::Value, ProtocolError> {
        let _span = tracing::debug_span!("service_extension", method).entered();

        let handler = self
            .handlers
            .get(method)
            .ok_or_else(|| ProtocolError::MethodNotFound(method.to_owned()))?;
        let result = handler(&self.protocol, params);
        if let Err(e) = &result {
            tracing::warn!(code = e.code(), "service extension failed: {e}");
        }
        result
    }

    /// Host-dispatcher entry point: `Ok` holds the JSON result, `Err` the
    /// JSON error object. The caller owns the returned string.
    pub fn invoke(&self, method: &str, params: &ServiceParams) -> Result<String, String> {
        self.call(method, params).map(|v| v.to_string()).map_err(|e| {
            serde_json::to_string(&e.to_debug_error()).unwrap_or_else(|_| e.to_string())
        })
    }

    /// Answer a full request envelope.
    pub fn dispatch(&self, request: &DebugRequest) -> DebugResponse {
        let params = ServiceParams::from_json(request.params.as_ref());
        match self.call(&request.method, &params) {
            Ok(result) => DebugResponse::ok(request.id, result),
            Err(e) => DebugResponse::err(request.id, e.to_debug_error()),
        }
    }
}

impl std::fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionRegistry")
            .field("methods", &self.methods())
            .finish_non_exhaustive()
    }
}
