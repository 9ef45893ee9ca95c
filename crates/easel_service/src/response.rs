//! Structured response bodies.
//!
//! Every successful reply is one of these types, turned into JSON by
//! [`encode`]. Nothing in the crate builds response text by hand.

use easel_core::{IsolateRef, PlatformView, ViewId};
use serde::Serialize;

use crate::error::ProtocolError;
use crate::view_id::format_view_id;

/// Reference to the script isolate attached to a view.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IsolateDescriptor {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub fixed_id: bool,
    pub id: String,
    pub name: String,
    pub number: String,
}

impl From<&IsolateRef> for IsolateDescriptor {
    fn from(isolate: &IsolateRef) -> Self {
        Self {
            kind: "@Isolate",
            fixed_id: true,
            id: format!("isolates/{}", isolate.main_port),
            name: isolate.name.clone(),
            number: isolate.main_port.to_string(),
        }
    }
}

/// Identifying record for one active view.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ViewDescriptor {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isolate: Option<IsolateDescriptor>,
}

impl ViewDescriptor {
    pub fn new(id: ViewId, isolate: Option<&IsolateRef>) -> Self {
        Self {
            kind: "EaselView",
            id: format_view_id(id),
            isolate: isolate.map(IsolateDescriptor::from),
        }
    }
}

impl From<&PlatformView> for ViewDescriptor {
    fn from(view: &PlatformView) -> Self {
        Self::new(view.id(), view.engine().ui_isolate().as_ref())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ViewList {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub views: Vec<ViewDescriptor>,
}

impl ViewList {
    pub fn new(views: Vec<ViewDescriptor>) -> Self {
        Self {
            kind: "EaselViewList",
            views,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Success {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<ViewDescriptor>,
}

impl Success {
    pub fn new() -> Self {
        Self {
            kind: "Success",
            view: None,
        }
    }

    pub fn with_view(view: ViewDescriptor) -> Self {
        Self {
            kind: "Success",
            view: Some(view),
        }
    }
}

impl Default for Success {
    fn default() -> Self {
        Self::new()
    }
}

/// Base64 PNG of the last rendered frame.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Screenshot {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub screenshot: String,
}

impl Screenshot {
    pub fn new(png_base64: String) -> Self {
        Self {
            kind: "Screenshot",
            screenshot: png_base64,
        }
    }
}

/// Base64 serialized picture of the last rendered frame.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScreenshotVector {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub picture: String,
}

impl ScreenshotVector {
    pub fn new(picture_base64: String) -> Self {
        Self {
            kind: "ScreenshotVector",
            picture: picture_base64,
        }
    }
}

/// Turn a response body into JSON.
pub fn encode<T: Serialize>(response: &T) -> Result<serde_json::Value, ProtocolError> {
    serde_json::to_value(response)
        .map_err(|e| ProtocolError::Server(format!("can not encode response: {e}")))
}
