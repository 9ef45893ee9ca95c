//! Service protocol extensions for inspecting a running easel host.
//!
//! Lets an external development tool list the host's render views, launch a
//! script inside a view, and capture the last rendered frame as a PNG or as a
//! replayable vector picture.
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use easel_core::{Shell, TaskRunners};
//! use easel_service::{ExtensionRegistry, ServiceConfig, ServiceParams, ViewServiceProtocol};
//!
//! let runners = TaskRunners::spawn("host").expect("failed to start task runners");
//! let shell = Arc::new(Shell::new(runners.clone()));
//!
//! let protocol = ViewServiceProtocol::new(shell, runners, ServiceConfig::from_env());
//! let extensions = ExtensionRegistry::register_hooks(protocol);
//!
//! // From the host's service dispatcher:
//! let reply = extensions.invoke("listViews", &ServiceParams::new());
//! ```

pub mod capture;
pub mod config;
pub mod error;
pub mod extensions;
pub mod protocol;
pub mod response;
pub mod service;
pub mod view_id;

pub use capture::Rgba8;
pub use config::{BuildMode, ServiceConfig};
pub use error::ProtocolError;
pub use extensions::ExtensionRegistry;
pub use protocol::{DebugError, DebugRequest, DebugResponse, ServiceParams};
pub use service::ViewServiceProtocol;
pub use view_id::{format_view_id, parse_view_id, VIEW_ID_PREFIX};
