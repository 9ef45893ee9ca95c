//! Drawing surfaces and the replayable vector `Picture` recording.

use crate::{DevicePoint, DeviceRect, DeviceSize, FrameSize};
use palette::Srgba;
use serde::{Deserialize, Serialize};

/// Format version written into every serialized picture.
pub const PICTURE_FORMAT_VERSION: u32 = 1;

/// A surface that layer trees and pictures draw into.
pub trait Canvas {
    /// Fill the whole surface with `color`, ignoring blending.
    fn clear(&mut self, color: Srgba);

    /// Fill `rect` with `color` using source-over blending.
    fn fill_rect(&mut self, rect: DeviceRect, color: Srgba);
}

/// Serializable RGBA color.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ColorInfo {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl From<Srgba> for ColorInfo {
    fn from(c: Srgba) -> Self {
        Self {
            r: c.red,
            g: c.green,
            b: c.blue,
            a: c.alpha,
        }
    }
}

impl From<ColorInfo> for Srgba {
    fn from(c: ColorInfo) -> Self {
        Srgba::new(c.r, c.g, c.b, c.a)
    }
}

/// Serializable bounds (x, y, w, h).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BoundsInfo {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl From<DeviceRect> for BoundsInfo {
    fn from(r: DeviceRect) -> Self {
        Self {
            x: r.origin.x,
            y: r.origin.y,
            w: r.size.width,
            h: r.size.height,
        }
    }
}

impl From<BoundsInfo> for DeviceRect {
    fn from(b: BoundsInfo) -> Self {
        DeviceRect::new(DevicePoint::new(b.x, b.y), DeviceSize::new(b.w, b.h))
    }
}

/// One recorded draw command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PictureOp {
    Clear { color: ColorInfo },
    FillRect { bounds: BoundsInfo, color: ColorInfo },
}

/// Errors from decoding a serialized picture.
#[derive(Debug, thiserror::Error)]
pub enum PictureError {
    #[error("malformed picture data: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unsupported picture version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },
}

/// A resolution-independent recording of the draw commands for one frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Picture {
    pub version: u32,
    pub cull_width: f32,
    pub cull_height: f32,
    pub ops: Vec<PictureOp>,
}

impl Picture {
    pub fn op_count(&self) -> usize {
        self.ops.len()
    }

    /// Replay every recorded command onto `canvas`.
    pub fn playback(&self, canvas: &mut dyn Canvas) {
        for op in &self.ops {
            match *op {
                PictureOp::Clear { color } => canvas.clear(color.into()),
                PictureOp::FillRect { bounds, color } => canvas.fill_rect(bounds.into(), color.into()),
            }
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, PictureError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PictureError> {
        let picture: Picture = serde_json::from_slice(bytes)?;
        if picture.version != PICTURE_FORMAT_VERSION {
            return Err(PictureError::UnsupportedVersion {
                found: picture.version,
                expected: PICTURE_FORMAT_VERSION,
            });
        }
        Ok(picture)
    }
}

/// Canvas that records draw commands instead of producing pixels.
pub struct PictureRecorder {
    cull: FrameSize,
    ops: Vec<PictureOp>,
}

impl PictureRecorder {
    pub fn begin_recording(cull: FrameSize) -> Self {
        Self {
            cull,
            ops: Vec::new(),
        }
    }

    pub fn finish_recording(self) -> Picture {
        Picture {
            version: PICTURE_FORMAT_VERSION,
            cull_width: self.cull.width as f32,
            cull_height: self.cull.height as f32,
            ops: self.ops,
        }
    }
}

impl Canvas for PictureRecorder {
    fn clear(&mut self, color: Srgba) {
        self.ops.push(PictureOp::Clear {
            color: color.into(),
        });
    }

    fn fill_rect(&mut self, rect: DeviceRect, color: Srgba) {
        self.ops.push(PictureOp::FillRect {
            bounds: rect.into(),
            color: color.into(),
        });
    }
}
