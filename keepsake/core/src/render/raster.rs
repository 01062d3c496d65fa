//! Display list rasterizer
//!
//! Paints draw operations into an `RgbaImage` with straight-alpha "over"
//! blending. Text is greeked: each glyph becomes a block the width of its
//! cell, which keeps rendering deterministic without shipping fonts.

use image::imageops::FilterType;
use image::{Rgba, RgbaImage};
use unicode_width::UnicodeWidthChar;

use crate::composition::{Color, DisplayList, DrawOp, Rect};
use crate::model::Photo;

/// Hatch colors for photos that are missing or fail to decode
const HATCH_LIGHT: Color = Color::rgb(214, 210, 204);
const HATCH_DARK: Color = Color::rgb(188, 184, 178);

/// Paint a display list into a new image of `width × height` pixels
///
/// `scale` maps logical points to pixels. `photos` are the record's visible
/// photos; photo ops index into it.
#[must_use]
pub fn paint(list: &DisplayList, photos: &[Photo], width: u32, height: u32, scale: f32) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(width, height, to_rgba(list.background));
    for op in &list.ops {
        paint_op(&mut canvas, op, photos, scale);
    }
    canvas
}

fn to_rgba(color: Color) -> Rgba<u8> {
    Rgba([color.r, color.g, color.b, color.a])
}

fn from_rgba(px: Rgba<u8>) -> Color {
    let [r, g, b, a] = px.0;
    Color::rgba(r, g, b, a)
}

fn blend(canvas: &mut RgbaImage, x: u32, y: u32, color: Color) {
    if color.is_transparent() {
        return;
    }
    let px = canvas.get_pixel_mut(x, y);
    *px = to_rgba(color.blend_over(from_rgba(*px)));
}

/// Visit every pixel whose center lies in `rect`
///
/// The callback gets the pixel and the center's offset from the rect
/// origin, in pixels, and returns the color to blend (if any).
fn shade<F>(canvas: &mut RgbaImage, rect: Rect, mut f: F)
where
    F: FnMut(f32, f32) -> Option<Color>,
{
    if rect.is_empty() {
        return;
    }
    let x0 = rect.x.max(0.0).floor() as u32;
    let y0 = rect.y.max(0.0).floor() as u32;
    let x1 = (rect.right().ceil().max(0.0) as u32).min(canvas.width());
    let y1 = (rect.bottom().ceil().max(0.0) as u32).min(canvas.height());
    for y in y0..y1 {
        let cy = y as f32 + 0.5;
        if cy < rect.y || cy >= rect.bottom() {
            continue;
        }
        for x in x0..x1 {
            let cx = x as f32 + 0.5;
            if cx < rect.x || cx >= rect.right() {
                continue;
            }
            if let Some(color) = f(cx - rect.x, cy - rect.y) {
                blend(canvas, x, y, color);
            }
        }
    }
}

fn in_rounded(rect: &Rect, radius: f32, dx: f32, dy: f32) -> bool {
    let r = radius.min(rect.width / 2.0).min(rect.height / 2.0);
    if r <= 0.0 {
        return true;
    }
    let cx = dx.clamp(r, rect.width - r);
    let cy = dy.clamp(r, rect.height - r);
    (dx - cx).powi(2) + (dy - cy).powi(2) <= r * r
}

fn in_ellipse(rect: &Rect, dx: f32, dy: f32) -> bool {
    let rx = rect.width / 2.0;
    let ry = rect.height / 2.0;
    if rx <= 0.0 || ry <= 0.0 {
        return false;
    }
    let nx = (dx - rx) / rx;
    let ny = (dy - ry) / ry;
    nx * nx + ny * ny <= 1.0
}

/// 32-bit FNV-1a; seeds the QR and barcode patterns
fn fnv1a(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0x811c_9dc5_u32, |hash, byte| {
        (hash ^ u32::from(*byte)).wrapping_mul(0x0100_0193)
    })
}

fn paint_op(canvas: &mut RgbaImage, op: &DrawOp, photos: &[Photo], scale: f32) {
    match op {
        DrawOp::Fill {
            rect,
            color,
            corner_radius,
        } => {
            let rect = rect.scaled(scale);
            let radius = corner_radius * scale;
            shade(canvas, rect, |dx, dy| {
                in_rounded(&rect, radius, dx, dy).then_some(*color)
            });
        }
        DrawOp::Stroke {
            rect,
            color,
            thickness,
        } => {
            let rect = rect.scaled(scale);
            let t = (thickness * scale).max(1.0);
            shade(canvas, rect, |dx, dy| {
                let edge = dx < t || dy < t || dx >= rect.width - t || dy >= rect.height - t;
                edge.then_some(*color)
            });
        }
        DrawOp::Ellipse { rect, color } => {
            let rect = rect.scaled(scale);
            shade(canvas, rect, |dx, dy| in_ellipse(&rect, dx, dy).then_some(*color));
        }
        DrawOp::Seal {
            rect,
            color,
            rotation,
        } => paint_seal(canvas, rect.scaled(scale), *color, *rotation),
        DrawOp::Glyphs {
            rect,
            text,
            advance,
            color,
        } => paint_glyphs(canvas, rect.scaled(scale), text, advance * scale, *color),
        DrawOp::Photo {
            rect,
            index,
            corner_radius,
        } => paint_photo(
            canvas,
            rect.scaled(scale),
            photos.get(*index),
            corner_radius * scale,
        ),
        DrawOp::Qr {
            rect,
            payload,
            color,
        } => paint_qr(canvas, rect.scaled(scale), payload, *color),
        DrawOp::Barcode {
            rect,
            payload,
            color,
        } => paint_barcode(canvas, rect.scaled(scale), payload, *color),
        DrawOp::Perforation { rect, pitch, color } => {
            let rect = rect.scaled(scale);
            let pitch = (pitch * scale).max(2.0);
            let radius = (rect.height / 2.0).min(pitch / 4.0);
            shade(canvas, rect, |dx, dy| {
                let cx = (dx / pitch).floor() * pitch + pitch / 2.0;
                let cy = rect.height / 2.0;
                ((dx - cx).powi(2) + (dy - cy).powi(2) <= radius * radius).then_some(*color)
            });
        }
        DrawOp::Dashes { rect, color } => {
            let rect = rect.scaled(scale);
            let period = 10.0 * scale;
            let dash = 6.0 * scale;
            shade(canvas, rect, |dx, _| (dx % period < dash).then_some(*color));
        }
    }
}

fn paint_seal(canvas: &mut RgbaImage, rect: Rect, wax: Color, rotation: f32) {
    let emboss = wax.lerp(Color::rgb(255, 255, 255), 0.25);
    let rim = wax.lerp(Color::rgb(0, 0, 0), 0.2);
    let (sin, cos) = rotation.to_radians().sin_cos();
    let r = rect.width.min(rect.height) / 2.0;
    shade(canvas, rect, |dx, dy| {
        if !in_ellipse(&rect, dx, dy) {
            return None;
        }
        let x = dx - rect.width / 2.0;
        let y = dy - rect.height / 2.0;
        if (x * x + y * y).sqrt() > r * 0.85 {
            return Some(rim);
        }
        // Rotate into the emboss frame
        let u = x * cos + y * sin;
        let v = -x * sin + y * cos;
        if u.abs() < r * 0.55 && v.abs() < r * 0.12 {
            Some(emboss)
        } else {
            Some(wax)
        }
    });
}

fn paint_glyphs(canvas: &mut RgbaImage, rect: Rect, text: &str, advance: f32, color: Color) {
    let glyph_height = rect.height * 0.5;
    let top = rect.y + (rect.height - glyph_height) / 2.0;
    let mut x = rect.x;
    for ch in text.chars() {
        let cells = ch.width().unwrap_or(0) as f32;
        let w = cells * advance;
        if !ch.is_whitespace() && w > 0.0 {
            let block = Rect::new(x + advance * 0.08, top, w - advance * 0.16, glyph_height);
            shade(canvas, block, |_, _| Some(color));
        }
        x += w;
        if x >= rect.right() {
            break;
        }
    }
}

fn paint_photo(canvas: &mut RgbaImage, rect: Rect, photo: Option<&Photo>, radius: f32) {
    if rect.width.round() < 1.0 || rect.height.round() < 1.0 {
        return;
    }
    // Frames larger than the canvas are decoded at canvas resolution
    let shrink = (canvas.width() as f32 / rect.width)
        .min(canvas.height() as f32 / rect.height)
        .min(1.0);
    let w = ((rect.width * shrink).round() as u32).max(1);
    let h = ((rect.height * shrink).round() as u32).max(1);
    let decoded = photo.and_then(|photo| match image::load_from_memory(photo.bytes()) {
        Ok(img) => Some(img.resize_to_fill(w, h, FilterType::Triangle).to_rgba8()),
        Err(err) => {
            tracing::debug!(error = %err, bytes = photo.len(), "Photo failed to decode, hatching");
            None
        }
    });

    match decoded {
        Some(pixels) => shade(canvas, rect, |dx, dy| {
            if !in_rounded(&rect, radius, dx, dy) {
                return None;
            }
            let px = ((dx * shrink) as u32).min(pixels.width() - 1);
            let py = ((dy * shrink) as u32).min(pixels.height() - 1);
            Some(from_rgba(*pixels.get_pixel(px, py)))
        }),
        None => shade(canvas, rect, |dx, dy| {
            if !in_rounded(&rect, radius, dx, dy) {
                return None;
            }
            let stripe = ((dx + dy) / 8.0).floor() as i64 % 2 == 0;
            Some(if stripe { HATCH_LIGHT } else { HATCH_DARK })
        }),
    }
}

fn paint_qr(canvas: &mut RgbaImage, rect: Rect, payload: &str, color: Color) {
    const MODULES: u32 = 21;
    let module = rect.width.min(rect.height) / MODULES as f32;
    if module <= 0.0 {
        return;
    }
    let seed = fnv1a(payload.as_bytes());
    let finder = |mx: u32, my: u32| -> Option<bool> {
        for (ox, oy) in [(0, 0), (MODULES - 7, 0), (0, MODULES - 7)] {
            if (ox..ox + 7).contains(&mx) && (oy..oy + 7).contains(&my) {
                let (lx, ly) = (mx - ox, my - oy);
                let ring = lx == 0 || ly == 0 || lx == 6 || ly == 6;
                let core = (2..=4).contains(&lx) && (2..=4).contains(&ly);
                return Some(ring || core);
            }
        }
        None
    };
    shade(canvas, rect, |dx, dy| {
        let mx = (dx / module) as u32;
        let my = (dy / module) as u32;
        if mx >= MODULES || my >= MODULES {
            return None;
        }
        let dark = finder(mx, my).unwrap_or_else(|| {
            let bit = seed.rotate_left((mx * 7 + my * 13) % 32) ^ (mx * 31 + my * 17);
            bit & 1 == 1
        });
        dark.then_some(color)
    });
}

fn paint_barcode(canvas: &mut RgbaImage, rect: Rect, payload: &str, color: Color) {
    // Guard bars plus one bar per payload bit
    let mut bars: Vec<bool> = vec![true, false, true];
    let seed = fnv1a(payload.as_bytes());
    for (i, byte) in payload.bytes().enumerate() {
        let mixed = byte ^ (seed.rotate_left(i as u32 % 32) as u8);
        bars.extend((0..8).map(|bit| mixed & (1 << bit) != 0));
    }
    bars.extend([true, false, true]);

    let bar = rect.width / bars.len() as f32;
    if bar <= 0.0 {
        return;
    }
    shade(canvas, rect, |dx, _| {
        let i = ((dx / bar) as usize).min(bars.len() - 1);
        bars[i].then_some(color)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(ops: Vec<DrawOp>) -> DisplayList {
        DisplayList {
            width: 20.0,
            height: 20.0,
            natural_height: 20.0,
            background: Color::rgb(255, 255, 255),
            ops,
        }
    }

    #[test]
    fn test_background_and_fill() {
        let list = list(vec![DrawOp::Fill {
            rect: Rect::new(0.0, 0.0, 10.0, 20.0),
            color: Color::rgb(0, 0, 0),
            corner_radius: 0.0,
        }]);
        let img = paint(&list, &[], 40, 40, 2.0);
        assert_eq!(img.get_pixel(5, 5).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(30, 5).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_translucent_fill_blends() {
        let list = list(vec![DrawOp::Fill {
            rect: Rect::new(0.0, 0.0, 20.0, 20.0),
            color: Color::rgba(0, 0, 0, 128),
            corner_radius: 0.0,
        }]);
        let img = paint(&list, &[], 20, 20, 1.0);
        let [r, _, _, a] = img.get_pixel(10, 10).0;
        assert!((120..=135).contains(&r), "r = {r}");
        assert_eq!(a, 255);
    }

    #[test]
    fn test_undecodable_photo_is_hatched() {
        let list = list(vec![DrawOp::Photo {
            rect: Rect::new(0.0, 0.0, 20.0, 20.0),
            index: 0,
            corner_radius: 0.0,
        }]);
        let junk = [Photo::new(vec![1, 2, 3])];
        let img = paint(&list, &junk, 20, 20, 1.0);
        let px = from_rgba(*img.get_pixel(3, 3));
        assert!(px == HATCH_LIGHT || px == HATCH_DARK);
    }

    #[test]
    fn test_decoded_photo_is_drawn() {
        let source = RgbaImage::from_pixel(4, 4, Rgba([10, 200, 30, 255]));
        let mut png = Vec::new();
        image::DynamicImage::ImageRgba8(source)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageOutputFormat::Png)
            .unwrap();

        let list = list(vec![DrawOp::Photo {
            rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            index: 0,
            corner_radius: 0.0,
        }]);
        let img = paint(&list, &[Photo::new(png)], 20, 20, 1.0);
        assert_eq!(img.get_pixel(5, 5).0, [10, 200, 30, 255]);
    }

    #[test]
    fn test_qr_is_deterministic_per_payload() {
        let op = |payload: &str| DrawOp::Qr {
            rect: Rect::new(0.0, 0.0, 21.0, 21.0),
            payload: payload.to_string(),
            color: Color::INK,
        };
        let a = paint(&list(vec![op("keepsake:1")]), &[], 21, 21, 1.0);
        let b = paint(&list(vec![op("keepsake:1")]), &[], 21, 21, 1.0);
        let c = paint(&list(vec![op("keepsake:2")]), &[], 21, 21, 1.0);
        assert_eq!(a, b);
        assert_ne!(a, c);
        // Finder ring corner is always dark
        assert_eq!(from_rgba(*a.get_pixel(0, 0)), Color::INK);
    }

    #[test]
    fn test_glyphs_leave_spaces_blank() {
        let list = list(vec![DrawOp::Glyphs {
            rect: Rect::new(0.0, 0.0, 20.0, 10.0),
            text: "a b".to_string(),
            advance: 5.0,
            color: Color::rgb(0, 0, 0),
        }]);
        let img = paint(&list, &[], 20, 20, 1.0);
        assert_eq!(img.get_pixel(2, 5).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(7, 5).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(12, 5).0, [0, 0, 0, 255]);
    }
}
