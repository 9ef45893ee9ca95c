//! Frame capture: rastering or recording the last layer tree, and the
//! encodings the responses carry.
//!
//! The `rasterize_*` and `record_*` functions are meant to run on the GPU
//! runner; they only read the rasterizer's last frame.

use std::sync::{Arc, Weak};

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use easel_core::{Canvas, DeviceRect, Picture, PictureRecorder, Rasterizer, ViewRegistry};
use image::{ImageEncoder, ImageResult, Rgba, RgbaImage};
use palette::Srgba;
use serde::Deserialize;

/// An 8-bit straight-alpha RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Rgba8(pub [u8; 4]);

impl From<Srgba> for Rgba8 {
    fn from(c: Srgba) -> Self {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self([
            channel(c.red),
            channel(c.green),
            channel(c.blue),
            channel(c.alpha),
        ])
    }
}

/// Largest bitmap a raster capture will allocate, in bytes.
pub const MAX_BITMAP_BYTES: usize = 1 << 30;

/// Canvas backed by an RGBA bitmap.
pub struct PixelCanvas {
    image: RgbaImage,
}

impl PixelCanvas {
    /// Allocate a transparent `width` x `height` bitmap.
    ///
    /// `None` if the bitmap would exceed [`MAX_BITMAP_BYTES`] or the
    /// allocation fails.
    pub fn try_new(width: u32, height: u32) -> Option<Self> {
        let len = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)
            .filter(|len| *len <= MAX_BITMAP_BYTES)?;
        let mut buf = Vec::new();
        buf.try_reserve_exact(len).ok()?;
        buf.resize(len, 0);
        RgbaImage::from_raw(width, height, buf).map(|image| Self { image })
    }

    pub fn fill(&mut self, color: Rgba8) {
        for pixel in self.image.pixels_mut() {
            *pixel = Rgba(color.0);
        }
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Pixel span covered by `[start, start + len)`, clamped to `limit`.
    fn span(start: f32, len: f32, limit: u32) -> (u32, u32) {
        let clamp = |v: f32| v.round().clamp(0.0, limit as f32) as u32;
        (clamp(start), clamp(start + len))
    }
}

impl Canvas for PixelCanvas {
    fn clear(&mut self, color: Srgba) {
        self.fill(color.into());
    }

    fn fill_rect(&mut self, rect: DeviceRect, color: Srgba) {
        let (x0, x1) = Self::span(rect.origin.x, rect.size.width, self.image.width());
        let (y0, y1) = Self::span(rect.origin.y, rect.size.height, self.image.height());
        let src = Rgba8::from(color);
        for y in y0..y1 {
            for x in x0..x1 {
                let dst = self.image.get_pixel_mut(x, y);
                *dst = Rgba(blend_over(src.0, dst.0));
            }
        }
    }
}

/// Source-over compositing of straight-alpha colors.
fn blend_over(src: [u8; 4], dst: [u8; 4]) -> [u8; 4] {
    let sa = src[3] as f32 / 255.0;
    if sa >= 1.0 {
        return src;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return [0, 0, 0, 0];
    }
    let mut out = [0u8; 4];
    for i in 0..3 {
        let sc = src[i] as f32 / 255.0;
        let dc = dst[i] as f32 / 255.0;
        let c = (sc * sa + dc * da * (1.0 - sa)) / out_a;
        out[i] = (c * 255.0).round() as u8;
    }
    out[3] = (out_a * 255.0).round() as u8;
    out
}

/// The rasterizer of the first registered view.
///
/// Any view will do; captures only need one frame.
pub fn first_rasterizer(registry: &dyn ViewRegistry) -> Weak<Rasterizer> {
    let mut rasterizer = Weak::new();
    registry.for_each_view(&mut |view| {
        rasterizer = Arc::downgrade(view.rasterizer());
        false
    });
    rasterizer
}

/// Raster the last frame into a bitmap cleared to `background`.
///
/// `None` when there is no view, no frame yet, or the frame is empty or
/// too large to allocate.
pub fn rasterize_last_frame(registry: &dyn ViewRegistry, background: Rgba8) -> Option<RgbaImage> {
    let rasterizer = first_rasterizer(registry).upgrade()?;
    let layer_tree = rasterizer.last_layer_tree()?;

    let frame_size = layer_tree.frame_size();
    if frame_size.is_empty() {
        return None;
    }

    let Some(mut canvas) = PixelCanvas::try_new(frame_size.width, frame_size.height) else {
        tracing::warn!(
            width = frame_size.width,
            height = frame_size.height,
            "frame too large to raster"
        );
        return None;
    };
    canvas.fill(background);
    layer_tree.raster(&mut canvas);
    Some(canvas.into_image())
}

/// Record the last frame as a picture culled to the frame size.
pub fn record_last_frame(registry: &dyn ViewRegistry) -> Option<Picture> {
    let rasterizer = first_rasterizer(registry).upgrade()?;
    let layer_tree = rasterizer.last_layer_tree()?;

    let mut recorder = PictureRecorder::begin_recording(layer_tree.frame_size());
    layer_tree.raster(&mut recorder);
    Some(recorder.finish_recording())
}

pub fn encode_png(image: &RgbaImage) -> ImageResult<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        encoder.write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ColorType::Rgba8.into(),
        )?;
    }
    Ok(buf)
}

pub fn encode_base64(bytes: &[u8]) -> String {
    BASE64_STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_core::{DevicePoint, DeviceSize};

    fn rect(x: f32, y: f32, w: f32, h: f32) -> DeviceRect {
        DeviceRect::new(DevicePoint::new(x, y), DeviceSize::new(w, h))
    }

    #[test]
    fn opaque_fill_overwrites_pixels() {
        let mut canvas = PixelCanvas::try_new(4, 4).unwrap();
        canvas.fill(Rgba8([0, 0, 0, 255]));
        canvas.fill_rect(rect(1.0, 1.0, 2.0, 2.0), Srgba::new(1.0, 0.0, 0.0, 1.0));
        let image = canvas.into_image();

        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0, 255]);
        assert_eq!(image.get_pixel(1, 1).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(2, 2).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(3, 3).0, [0, 0, 0, 255]);
    }

    #[test]
    fn translucent_fill_blends() {
        let mut canvas = PixelCanvas::try_new(1, 1).unwrap();
        canvas.fill(Rgba8([0, 0, 0, 255]));
        canvas.fill_rect(rect(0.0, 0.0, 1.0, 1.0), Srgba::new(1.0, 1.0, 1.0, 0.5));
        let px = canvas.into_image().get_pixel(0, 0).0;

        assert_eq!(px[3], 255);
        assert!((126..=129).contains(&px[0]), "got {px:?}");
    }

    #[test]
    fn fill_is_clipped_to_bitmap() {
        let mut canvas = PixelCanvas::try_new(3, 3).unwrap();
        canvas.fill_rect(rect(-5.0, 2.0, 100.0, 100.0), Srgba::new(0.0, 0.0, 1.0, 1.0));
        let image = canvas.into_image();
        assert_eq!(image.get_pixel(0, 2).0, [0, 0, 255, 255]);
        assert_eq!(image.get_pixel(2, 2).0, [0, 0, 255, 255]);
        assert_eq!(image.get_pixel(0, 1).0, [0, 0, 0, 0]);
    }

    #[test]
    fn png_round_trips_dimensions() {
        let mut canvas = PixelCanvas::try_new(7, 3).unwrap();
        canvas.fill(Rgba8([10, 20, 30, 255]));
        let png = encode_png(&canvas.into_image()).unwrap();

        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (7, 3));
        assert_eq!(decoded.get_pixel(6, 2).0, [10, 20, 30, 255]);
    }

    #[test]
    fn oversized_bitmap_is_refused() {
        assert!(PixelCanvas::try_new(u32::MAX, u32::MAX).is_none());
        assert!(PixelCanvas::try_new(1 << 15, 1 << 15).is_none());
        assert!(PixelCanvas::try_new(1 << 14, (1 << 14) + 1).is_none());
    }

    #[test]
    fn base64_uses_standard_padded_alphabet() {
        assert_eq!(encode_base64(b"easel"), "ZWFzZWw=");
        assert_eq!(encode_base64(&[0xfb, 0xff]), "+/8=");
    }
}
