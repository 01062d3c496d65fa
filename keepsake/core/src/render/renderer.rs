//! Raster renderer backed by the template registry

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use image::RgbaImage;

use super::raster::paint;
use super::{
    effective_scale, pixel_size_bounded, ArtifactImage, ArtifactRenderer, ImageKind,
    MAX_PIXEL_DIMENSION, MIN_CANVAS,
};
use crate::composition::{layout, DisplayList, DrawOp, Rect};
use crate::model::Record;
use crate::template::builtin::palette_for;
use crate::template::TemplateRegistry;

/// Renders records by laying out their template and painting the result
///
/// Cloning is cheap; clones share the registry.
#[derive(Clone)]
pub struct RasterRenderer {
    registry: Arc<TemplateRegistry>,
    min_canvas: u32,
    max_canvas: u32,
}

impl RasterRenderer {
    /// Renderer over a registry
    #[must_use]
    pub fn new(registry: Arc<TemplateRegistry>) -> Self {
        Self {
            registry,
            min_canvas: MIN_CANVAS,
            max_canvas: MAX_PIXEL_DIMENSION,
        }
    }

    /// Override the fallback canvas used for degenerate layouts
    #[must_use]
    pub fn with_min_canvas(mut self, min_canvas: u32) -> Self {
        self.min_canvas = min_canvas.max(1);
        self
    }

    /// Override the largest pixel width or height, capped at
    /// [`MAX_PIXEL_DIMENSION`]
    #[must_use]
    pub fn with_max_canvas(mut self, max_canvas: u32) -> Self {
        self.max_canvas = max_canvas.clamp(1, MAX_PIXEL_DIMENSION);
        self
    }

    fn pixel_size(&self, logical_width: f32, logical_height: f32, scale: f32) -> (u32, u32) {
        pixel_size_bounded(
            logical_width,
            logical_height,
            scale,
            self.min_canvas,
            self.max_canvas,
        )
    }

    /// Registry used for layout
    #[must_use]
    pub fn registry(&self) -> &Arc<TemplateRegistry> {
        &self.registry
    }

    /// Lay out a record without painting it
    #[must_use]
    pub fn display_list(&self, record: &Record, target_width: u32) -> DisplayList {
        let template = self.registry.resolve_lenient(record.style);
        layout(&template.layout(record), target_width as f32)
    }

    /// Render on the calling thread
    #[must_use]
    pub fn render_blocking(&self, record: &Record, target_width: u32, scale: f32) -> ArtifactImage {
        let scale = effective_scale(scale);
        let list = self.display_list(record, target_width);
        let (width, height) = self.pixel_size(list.width, list.height, scale);
        let pixels = paint(&list, record.visible_photos(), width, height, scale);
        ArtifactImage::new(ImageKind::Rendered, list.width, list.height, scale, pixels)
    }
}

#[async_trait]
impl ArtifactRenderer for RasterRenderer {
    async fn render(&self, record: Arc<Record>, target_width: u32, scale: f32) -> ArtifactImage {
        let started = Instant::now();
        let renderer = self.clone();
        let task_record = Arc::clone(&record);
        let result = tokio::task::spawn_blocking(move || {
            renderer.render_blocking(&task_record, target_width, scale)
        })
        .await;

        match result {
            Ok(image) => {
                tracing::debug!(
                    record = %record.id,
                    style = %record.style,
                    width = image.width(),
                    height = image.height(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Artifact rendered"
                );
                image
            }
            Err(e) => {
                tracing::warn!(
                    record = %record.id,
                    style = %record.style,
                    error = %e,
                    "Render task failed, keeping placeholder"
                );
                self.placeholder(&record, target_width, scale)
            }
        }
    }

    fn placeholder(&self, record: &Record, target_width: u32, scale: f32) -> ArtifactImage {
        let scale = effective_scale(scale);
        let logical_width = target_width as f32;
        let logical_height = record.style.canvas().min_height_at(logical_width);
        let (width, height) = self.pixel_size(logical_width, logical_height, scale);

        let palette = palette_for(record.style);
        let paper = record.decoration.background.unwrap_or(palette.paper);
        let inset = (logical_width * 0.08).max(4.0);
        let card = Rect::new(
            inset,
            inset,
            logical_width - inset * 2.0,
            logical_height - inset * 2.0,
        );
        let list = DisplayList {
            width: logical_width,
            height: logical_height,
            natural_height: 0.0,
            background: paper,
            ops: vec![DrawOp::Fill {
                rect: card,
                color: palette.muted.with_alpha(36),
                corner_radius: 8.0,
            }],
        };
        let pixels: RgbaImage = paint(&list, &[], width, height, scale);
        ArtifactImage::new(
            ImageKind::Placeholder,
            logical_width,
            logical_height,
            scale,
            pixels,
        )
    }
}

impl fmt::Debug for RasterRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterRenderer")
            .field("styles", &self.registry.len())
            .field("min_canvas", &self.min_canvas)
            .field("max_canvas", &self.max_canvas)
            .finish()
    }
}

impl Default for RasterRenderer {
    fn default() -> Self {
        Self::new(Arc::new(TemplateRegistry::with_builtin()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ArtifactStyle, Decoration, Draft, DraftPatch, RecordId};

    fn record(style: ArtifactStyle, content: &str) -> Record {
        let mut draft = Draft::new();
        draft.apply(DraftPatch::new().style(style).content(content));
        draft.finalize(RecordId::new(), Decoration::none())
    }

    #[tokio::test]
    async fn test_render_width_is_exact() {
        let renderer = RasterRenderer::default();
        let record = Arc::new(record(ArtifactStyle::Simple, "A quiet Sunday."));

        let first = renderer.render(Arc::clone(&record), 700, 2.0).await;
        let second = renderer.render(record, 700, 2.0).await;

        assert_eq!(first.width(), 1400);
        assert_eq!(first.kind(), ImageKind::Rendered);
        assert_eq!(
            (first.width(), first.height()),
            (second.width(), second.height())
        );
    }

    #[tokio::test]
    async fn test_scale_below_one_is_clamped() {
        let renderer = RasterRenderer::default();
        let image = renderer
            .render(Arc::new(record(ArtifactStyle::Simple, "hi")), 300, 0.25)
            .await;
        assert_eq!(image.width(), 300);
        assert_eq!(image.scale(), 1.0);
    }

    #[test]
    fn test_canvas_floor_keeps_silhouette() {
        let renderer = RasterRenderer::default();
        let image = renderer.render_blocking(&record(ArtifactStyle::Simple, ""), 300, 1.0);
        // 3:4 card at 300 points wide
        assert!(image.height() >= 400);
    }

    #[test]
    fn test_zero_width_falls_back_to_min_canvas() {
        let renderer = RasterRenderer::default().with_min_canvas(32);
        let image = renderer.render_blocking(&record(ArtifactStyle::Simple, "x"), 0, 1.0);
        assert_eq!(image.width(), 32);
        assert!(image.height() > 0);
    }

    #[test]
    fn test_placeholder_matches_render_width() {
        let renderer = RasterRenderer::default();
        let record = record(ArtifactStyle::BoardingPass, "Lisbon");
        let placeholder = renderer.placeholder(&record, 700, 2.0);
        let rendered = renderer.render_blocking(&record, 700, 2.0);

        assert!(placeholder.is_placeholder());
        assert_eq!(placeholder.width(), rendered.width());
        assert!(placeholder.height() > 0);
    }

    #[test]
    fn test_oversized_width_is_clamped_not_allocated() {
        let renderer = RasterRenderer::default().with_max_canvas(256);
        let record = record(ArtifactStyle::Polaroid, "Very wide");

        let placeholder = renderer.placeholder(&record, 200_000, 2.0);
        let rendered = renderer.render_blocking(&record, 200_000, 2.0);

        assert_eq!((placeholder.width(), placeholder.height()), (256, 256));
        assert_eq!(rendered.width(), 256);
        assert!(rendered.height() <= 256);
    }

    #[test]
    fn test_max_canvas_never_exceeds_global_ceiling() {
        let renderer = RasterRenderer::default().with_max_canvas(u32::MAX);
        assert_eq!(renderer.max_canvas, MAX_PIXEL_DIMENSION);
    }

    #[test]
    fn test_empty_registry_still_renders() {
        let renderer = RasterRenderer::new(Arc::new(TemplateRegistry::empty()));
        let image = renderer.render_blocking(&record(ArtifactStyle::Polaroid, "beach"), 200, 1.0);
        assert_eq!(image.width(), 200);
        assert!(!image.is_placeholder());
    }
}
