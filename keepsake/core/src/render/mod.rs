//! Artifact rendering
//!
//! [`ArtifactRenderer`] turns a record into a bitmap without touching any
//! live scene: each render resolves its template, lays out its own
//! composition and paints its own buffer. The only implementation is
//! [`RasterRenderer`], which does the work on Tokio's blocking pool.
//!
//! # Sizing
//!
//! ```text
//!   pixel width  = round(target_width × max(scale, 1))
//!   pixel height = round(max(natural height, canvas floor) × scale)
//! ```
//!
//! The canvas floor is `target_width / family aspect`, so short entries
//! keep their silhouette and photo-heavy ones grow taller.

mod raster;
mod renderer;

use std::sync::Arc;

use async_trait::async_trait;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, RgbaImage};

pub use raster::paint;
pub use renderer::RasterRenderer;

use crate::model::Record;

/// Smallest canvas used when layout degenerates to nothing
pub const MIN_CANVAS: u32 = 64;

/// Largest pixel width or height a renderer allocates
///
/// Bounds a single RGBA buffer to 256 MiB. Larger requests are clamped and
/// the overflow is clipped.
pub const MAX_PIXEL_DIMENSION: u32 = 8192;

/// Rendering errors
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// PNG encoding failed
    #[error("Failed to encode PNG: {0}")]
    Encode(#[from] image::ImageError),
}

/// Whether an image is a stand-in or the real render
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageKind {
    /// Cheap stand-in shown while rendering
    Placeholder,
    /// Final raster of the record
    Rendered,
}

/// A rendered (or placeholder) artifact bitmap
#[derive(Clone, Debug)]
pub struct ArtifactImage {
    kind: ImageKind,
    logical_width: f32,
    logical_height: f32,
    scale: f32,
    pixels: Arc<RgbaImage>,
}

impl ArtifactImage {
    pub(crate) fn new(
        kind: ImageKind,
        logical_width: f32,
        logical_height: f32,
        scale: f32,
        pixels: RgbaImage,
    ) -> Self {
        Self {
            kind,
            logical_width,
            logical_height,
            scale,
            pixels: Arc::new(pixels),
        }
    }

    /// Placeholder or rendered
    #[must_use]
    pub fn kind(&self) -> ImageKind {
        self.kind
    }

    /// Whether this is the placeholder
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.kind == ImageKind::Placeholder
    }

    /// Pixel width
    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Pixel height
    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Size in logical points
    #[must_use]
    pub fn logical_size(&self) -> (f32, f32) {
        (self.logical_width, self.logical_height)
    }

    /// Pixels per logical point
    #[must_use]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Pixel buffer
    #[must_use]
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Whether both images share the same pixel buffer
    #[must_use]
    pub fn same_pixels(&self, other: &ArtifactImage) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }

    /// Encode as PNG
    pub fn encode_png(&self) -> Result<Vec<u8>, RenderError> {
        let mut buf = Vec::new();
        PngEncoder::new(&mut buf).write_image(
            self.pixels.as_raw(),
            self.width(),
            self.height(),
            ColorType::Rgba8,
        )?;
        Ok(buf)
    }
}

/// Converts records to bitmaps
#[async_trait]
pub trait ArtifactRenderer: Send + Sync {
    /// Render a record at `target_width` logical points and `scale` pixels
    /// per point. Never fails: problems degrade to a placeholder.
    async fn render(&self, record: Arc<Record>, target_width: u32, scale: f32) -> ArtifactImage;

    /// Cheap stand-in with the same pixel width as a render
    fn placeholder(&self, record: &Record, target_width: u32, scale: f32) -> ArtifactImage;
}

/// Scale below 1 (or not a number) is clamped to 1
#[must_use]
pub fn effective_scale(scale: f32) -> f32 {
    if scale.is_finite() {
        scale.max(1.0)
    } else {
        1.0
    }
}

/// Pixel dimensions for a logical size
///
/// A dimension that rounds to zero is replaced by [`MIN_CANVAS`]; one above
/// [`MAX_PIXEL_DIMENSION`] is clamped to it.
#[must_use]
pub fn pixel_size(logical_width: f32, logical_height: f32, scale: f32) -> (u32, u32) {
    pixel_size_with_floor(logical_width, logical_height, scale, MIN_CANVAS)
}

/// [`pixel_size`] with a custom fallback for degenerate dimensions
#[must_use]
pub fn pixel_size_with_floor(
    logical_width: f32,
    logical_height: f32,
    scale: f32,
    min_canvas: u32,
) -> (u32, u32) {
    pixel_size_bounded(
        logical_width,
        logical_height,
        scale,
        min_canvas,
        MAX_PIXEL_DIMENSION,
    )
}

/// [`pixel_size`] with custom floor and ceiling
///
/// The ceiling wins when `min_canvas > max_canvas`.
#[must_use]
pub fn pixel_size_bounded(
    logical_width: f32,
    logical_height: f32,
    scale: f32,
    min_canvas: u32,
    max_canvas: u32,
) -> (u32, u32) {
    let ceiling = max_canvas.max(1);
    let to_px = |v: f32| -> u32 {
        let px = (v * scale).round();
        if px.is_nan() || px < 1.0 {
            0
        } else if px >= ceiling as f32 {
            ceiling
        } else {
            px as u32
        }
    };
    let floor = |px: u32| {
        if px == 0 {
            min_canvas.clamp(1, ceiling)
        } else {
            px
        }
    };
    (floor(to_px(logical_width)), floor(to_px(logical_height)))
}
