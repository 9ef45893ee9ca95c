//! Layer trees: the rasterizer's record of a produced frame.

use crate::{Canvas, DevicePoint, DeviceRect, FrameSize};
use palette::Srgba;

/// A single draw command inside a layer.
#[derive(Clone, Debug)]
pub enum DrawOp {
    Clear(Srgba),
    FillRect { rect: DeviceRect, color: Srgba },
}

/// An ordered run of draw commands, positioned by `offset`.
#[derive(Clone, Debug)]
pub struct Layer {
    pub offset: DevicePoint,
    ops: Vec<DrawOp>,
}

impl Layer {
    pub fn new(offset: DevicePoint) -> Self {
        Self {
            offset,
            ops: Vec::new(),
        }
    }

    pub fn clear(&mut self, color: impl Into<Srgba>) {
        self.ops.push(DrawOp::Clear(color.into()));
    }

    pub fn fill_rect(&mut self, rect: DeviceRect, color: impl Into<Srgba>) {
        self.ops.push(DrawOp::FillRect {
            rect,
            color: color.into(),
        });
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }
}

/// Holds all layers for one frame, ready to be rastered.
#[derive(Clone, Debug)]
pub struct LayerTree {
    frame_size: FrameSize,
    layers: Vec<Layer>,
}

impl LayerTree {
    pub fn new(frame_size: FrameSize) -> Self {
        Self {
            frame_size,
            layers: Vec::new(),
        }
    }

    pub fn frame_size(&self) -> FrameSize {
        self.frame_size
    }

    pub fn push_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Draw every layer, bottom to top, onto `canvas`.
    pub fn raster(&self, canvas: &mut dyn Canvas) {
        for layer in &self.layers {
            for op in &layer.ops {
                match op {
                    DrawOp::Clear(color) => canvas.clear(*color),
                    DrawOp::FillRect { rect, color } => {
                        let moved = DeviceRect::new(
                            DevicePoint::new(
                                rect.origin.x + layer.offset.x,
                                rect.origin.y + layer.offset.y,
                            ),
                            rect.size,
                        );
                        canvas.fill_rect(moved, *color);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DeviceSize, PictureOp, PictureRecorder};

    #[test]
    fn raster_applies_layer_offsets() {
        let mut tree = LayerTree::new(FrameSize::new(100, 100));
        let mut base = Layer::new(DevicePoint::new(0.0, 0.0));
        base.clear(Srgba::new(1.0, 1.0, 1.0, 1.0));
        tree.push_layer(base);

        let mut shifted = Layer::new(DevicePoint::new(5.0, 7.0));
        shifted.fill_rect(
            DeviceRect::new(DevicePoint::new(10.0, 10.0), DeviceSize::new(20.0, 20.0)),
            Srgba::new(1.0, 0.0, 0.0, 1.0),
        );
        tree.push_layer(shifted);

        let mut recorder = PictureRecorder::begin_recording(tree.frame_size());
        tree.raster(&mut recorder);
        let picture = recorder.finish_recording();

        assert_eq!(picture.op_count(), 2);
        match picture.ops[1] {
            PictureOp::FillRect { bounds, .. } => {
                assert_eq!(bounds.x, 15.0);
                assert_eq!(bounds.y, 17.0);
                assert_eq!(bounds.w, 20.0);
            }
            _ => panic!("expected a fill"),
        }
    }

    #[test]
    fn empty_tree_draws_nothing() {
        let tree = LayerTree::new(FrameSize::new(10, 10));
        let mut recorder = PictureRecorder::begin_recording(tree.frame_size());
        tree.raster(&mut recorder);
        assert_eq!(recorder.finish_recording().op_count(), 0);
    }
}
