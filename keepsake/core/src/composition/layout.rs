//! Layout pass: composition tree to display list
//!
//! Two walks over the tree. `measure` computes the natural height of a node
//! at a given width, `place` emits draw operations into absolute rectangles.
//! Text is wrapped with `textwrap` on column counts derived from the font's
//! average advance, and measured with `unicode-width` so wide glyphs take
//! two cells.

use unicode_width::UnicodeWidthStr;

use super::{
    Align, Anchor, Color, Composition, Node, PanelStyle, ShapeKind, ShapeSize, TextSpec,
};

/// Line height as a multiple of font size
const LINE_HEIGHT: f32 = 1.35;

/// Axis-aligned rectangle in logical points
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect {
    /// Construct a rectangle
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Whether the rectangle covers no area
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Scale every coordinate
    #[must_use]
    pub fn scaled(&self, factor: f32) -> Self {
        Self::new(
            self.x * factor,
            self.y * factor,
            self.width * factor,
            self.height * factor,
        )
    }
}

/// A single positioned drawing instruction
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// Solid (optionally rounded) rectangle
    Fill {
        /// Area
        rect: Rect,
        /// Color
        color: Color,
        /// Corner radius
        corner_radius: f32,
    },
    /// Rectangle outline
    Stroke {
        /// Area
        rect: Rect,
        /// Color
        color: Color,
        /// Line thickness
        thickness: f32,
    },
    /// Ellipse inscribed in a rectangle
    Ellipse {
        /// Bounding box
        rect: Rect,
        /// Color
        color: Color,
    },
    /// Wax seal
    Seal {
        /// Bounding box
        rect: Rect,
        /// Wax color
        color: Color,
        /// Emboss rotation in degrees
        rotation: f32,
    },
    /// One line of text
    Glyphs {
        /// Line box
        rect: Rect,
        /// Line content
        text: String,
        /// Width of one cell
        advance: f32,
        /// Ink color
        color: Color,
    },
    /// Photo slot
    Photo {
        /// Frame
        rect: Rect,
        /// Index into the record's visible photos
        index: usize,
        /// Corner radius
        corner_radius: f32,
    },
    /// QR-style block
    Qr {
        /// Area
        rect: Rect,
        /// Payload
        payload: String,
        /// Module color
        color: Color,
    },
    /// Barcode stripes
    Barcode {
        /// Area
        rect: Rect,
        /// Payload
        payload: String,
        /// Bar color
        color: Color,
    },
    /// Perforation holes
    Perforation {
        /// Area
        rect: Rect,
        /// Hole pitch
        pitch: f32,
        /// Hole color
        color: Color,
    },
    /// Dashed horizontal rule
    Dashes {
        /// Area
        rect: Rect,
        /// Dash color
        color: Color,
    },
}

impl DrawOp {
    /// Bounding rectangle of the operation
    #[must_use]
    pub fn rect(&self) -> Rect {
        match self {
            Self::Fill { rect, .. }
            | Self::Stroke { rect, .. }
            | Self::Ellipse { rect, .. }
            | Self::Seal { rect, .. }
            | Self::Glyphs { rect, .. }
            | Self::Photo { rect, .. }
            | Self::Qr { rect, .. }
            | Self::Barcode { rect, .. }
            | Self::Perforation { rect, .. }
            | Self::Dashes { rect, .. } => *rect,
        }
    }
}

/// Flat, positioned output of the layout pass
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayList {
    /// Logical width
    pub width: f32,
    /// Logical height (natural height, floored by the canvas minimum)
    pub height: f32,
    /// Height the content needs, before the canvas floor
    pub natural_height: f32,
    /// Canvas background
    pub background: Color,
    /// Operations in paint order
    pub ops: Vec<DrawOp>,
}

impl DisplayList {
    /// Number of photo slots referenced
    #[must_use]
    pub fn photo_slots(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Photo { .. }))
            .count()
    }

    /// All text lines, in paint order
    pub fn text_lines(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Glyphs { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Lay out a composition at a logical width
#[must_use]
pub fn layout(composition: &Composition, width: f32) -> DisplayList {
    let width = width.max(0.0);
    let natural_height = measure(&composition.root, width);
    let min_height = if composition.min_aspect > 0.0 {
        width / composition.min_aspect
    } else {
        0.0
    };
    let height = natural_height.max(min_height);

    let mut ops = Vec::new();
    place(
        &composition.root,
        Rect::new(0.0, 0.0, width, natural_height),
        &mut ops,
    );

    DisplayList {
        width,
        height,
        natural_height,
        background: composition.background,
        ops,
    }
}

fn measure(node: &Node, width: f32) -> f32 {
    let width = width.max(0.0);
    match node {
        Node::Column {
            spacing, children, ..
        } => {
            let heights: Vec<f32> = children
                .iter()
                .map(|child| measure(child, child_width(child, width)))
                .filter(|h| *h > 0.0)
                .collect();
            let gaps = heights.len().saturating_sub(1) as f32 * spacing;
            heights.iter().sum::<f32>() + gaps
        }
        Node::Row { spacing, children } => {
            let share = row_share(width, *spacing, children.len());
            children
                .iter()
                .map(|child| measure(child, share))
                .fold(0.0, f32::max)
        }
        Node::Layers(children) => children
            .iter()
            .filter(|child| !matches!(child, Node::Anchored { .. }))
            .map(|child| measure(child, width))
            .fold(0.0, f32::max),
        Node::Anchored { width: w, child, .. } => measure(child, w.min(width)),
        Node::Padded { insets, child } => {
            let inner = measure(child, width - insets.left - insets.right);
            if inner > 0.0 {
                inner + insets.top + insets.bottom
            } else {
                0.0
            }
        }
        Node::Panel { child, .. } => measure(child, width),
        Node::Text(spec) => {
            let lines = wrap_lines(spec, width);
            lines.len() as f32 * spec.size * LINE_HEIGHT
        }
        Node::Photo { aspect_ratio, .. } => {
            if *aspect_ratio > 0.0 {
                width / aspect_ratio
            } else {
                width
            }
        }
        Node::Shape { size, .. } => size.height,
        Node::Spacer(height) => height.max(0.0),
        Node::Divider { thickness, .. } => *thickness,
    }
}

/// Width a fixed-size node occupies, if it has one
fn intrinsic_width(node: &Node) -> Option<f32> {
    match node {
        Node::Shape {
            size: ShapeSize { width, .. },
            ..
        } => *width,
        Node::Anchored { width, .. } => Some(*width),
        Node::Padded { insets, child } => {
            intrinsic_width(child).map(|w| w + insets.left + insets.right)
        }
        Node::Panel { child, .. } => intrinsic_width(child),
        _ => None,
    }
}

fn child_width(child: &Node, available: f32) -> f32 {
    intrinsic_width(child).map_or(available, |w| w.min(available))
}

fn row_share(width: f32, spacing: f32, count: usize) -> f32 {
    if count == 0 {
        return 0.0;
    }
    let gaps = (count - 1) as f32 * spacing;
    ((width - gaps) / count as f32).max(0.0)
}

fn aligned_x(align: Align, outer: Rect, inner_width: f32) -> f32 {
    match align {
        Align::Start => outer.x,
        Align::Center => outer.x + (outer.width - inner_width) / 2.0,
        Align::End => outer.right() - inner_width,
    }
}

fn place(node: &Node, rect: Rect, ops: &mut Vec<DrawOp>) {
    match node {
        Node::Column {
            spacing,
            align,
            children,
        } => {
            let mut y = rect.y;
            for child in children {
                let w = child_width(child, rect.width);
                let h = measure(child, w);
                if h <= 0.0 {
                    continue;
                }
                let x = aligned_x(*align, rect, w);
                place(child, Rect::new(x, y, w, h), ops);
                y += h + spacing;
            }
        }
        Node::Row { spacing, children } => {
            let share = row_share(rect.width, *spacing, children.len());
            for (i, child) in children.iter().enumerate() {
                let x = rect.x + i as f32 * (share + spacing);
                let h = measure(child, share);
                place(child, Rect::new(x, rect.y, share, h), ops);
            }
        }
        Node::Layers(children) => {
            for child in children {
                match child {
                    Node::Anchored {
                        anchor,
                        width,
                        child: inner,
                    } => {
                        let w = width.min(rect.width);
                        let h = measure(inner, w);
                        place(inner, anchored_rect(*anchor, rect, w, h), ops);
                    }
                    _ => {
                        let h = measure(child, rect.width);
                        place(child, Rect::new(rect.x, rect.y, rect.width, h), ops);
                    }
                }
            }
        }
        Node::Anchored { width, child, .. } => {
            let w = width.min(rect.width);
            let h = measure(child, w);
            place(child, Rect::new(rect.x, rect.y, w, h), ops);
        }
        Node::Padded { insets, child } => {
            let inner = Rect::new(
                rect.x + insets.left,
                rect.y + insets.top,
                (rect.width - insets.left - insets.right).max(0.0),
                (rect.height - insets.top - insets.bottom).max(0.0),
            );
            place(child, inner, ops);
        }
        Node::Panel { style, child } => {
            paint_panel(style, rect, ops);
            place(child, rect, ops);
        }
        Node::Text(spec) => place_text(spec, rect, ops),
        Node::Photo {
            index,
            corner_radius,
            ..
        } => ops.push(DrawOp::Photo {
            rect,
            index: *index,
            corner_radius: *corner_radius,
        }),
        Node::Shape { kind, size, color } => {
            let w = size.width.map_or(rect.width, |w| w.min(rect.width));
            let area = Rect::new(rect.x, rect.y, w, size.height);
            ops.push(shape_op(kind, area, *color));
        }
        Node::Spacer(_) => {}
        Node::Divider {
            thickness,
            color,
            dashed,
        } => {
            let area = Rect::new(rect.x, rect.y, rect.width, *thickness);
            if *dashed {
                ops.push(DrawOp::Dashes { rect: area, color: *color });
            } else {
                ops.push(DrawOp::Fill {
                    rect: area,
                    color: *color,
                    corner_radius: 0.0,
                });
            }
        }
    }
}

fn anchored_rect(anchor: Anchor, base: Rect, w: f32, h: f32) -> Rect {
    let (x, y) = match anchor {
        Anchor::TopLeft => (base.x, base.y),
        Anchor::TopRight => (base.right() - w, base.y),
        Anchor::BottomLeft => (base.x, base.bottom() - h),
        Anchor::BottomRight => (base.right() - w, base.bottom() - h),
        Anchor::Center => (
            base.x + (base.width - w) / 2.0,
            base.y + (base.height - h) / 2.0,
        ),
    };
    Rect::new(x, y, w, h)
}

fn paint_panel(style: &PanelStyle, rect: Rect, ops: &mut Vec<DrawOp>) {
    if !style.fill.is_transparent() {
        ops.push(DrawOp::Fill {
            rect,
            color: style.fill,
            corner_radius: style.corner_radius,
        });
    }
    if let Some((color, thickness)) = style.border {
        ops.push(DrawOp::Stroke {
            rect,
            color,
            thickness,
        });
    }
}

fn shape_op(kind: &ShapeKind, rect: Rect, color: Color) -> DrawOp {
    match kind {
        ShapeKind::Rect { corner_radius } => DrawOp::Fill {
            rect,
            color,
            corner_radius: *corner_radius,
        },
        ShapeKind::Circle => DrawOp::Ellipse { rect, color },
        ShapeKind::Seal { rotation } => DrawOp::Seal {
            rect,
            color,
            rotation: *rotation,
        },
        ShapeKind::Qr { payload } => DrawOp::Qr {
            rect,
            payload: payload.clone(),
            color,
        },
        ShapeKind::Barcode { payload } => DrawOp::Barcode {
            rect,
            payload: payload.clone(),
            color,
        },
        ShapeKind::Perforation { pitch } => DrawOp::Perforation {
            rect,
            pitch: *pitch,
            color,
        },
    }
}

fn advance(spec: &TextSpec) -> f32 {
    spec.size * spec.face.advance_ratio()
}

/// Wrap text into display lines for the given width
fn wrap_lines(spec: &TextSpec, width: f32) -> Vec<String> {
    if spec.content.trim().is_empty() || spec.size <= 0.0 {
        return Vec::new();
    }
    let text = if spec.uppercase {
        spec.content.to_uppercase()
    } else {
        spec.content.clone()
    };

    let columns = ((width / advance(spec)).floor() as usize).max(1);
    let mut lines: Vec<String> = textwrap::wrap(&text, columns)
        .into_iter()
        .map(|line| line.into_owned())
        .collect();

    if let Some(max) = spec.max_lines {
        if lines.len() > max {
            lines.truncate(max);
            if let Some(last) = lines.last_mut() {
                while !last.is_empty() && last.width() + 1 > columns {
                    last.pop();
                }
                last.push('\u{2026}');
            }
        }
    }
    lines
}

fn place_text(spec: &TextSpec, rect: Rect, ops: &mut Vec<DrawOp>) {
    let advance = advance(spec);
    let line_height = spec.size * LINE_HEIGHT;
    for (i, line) in wrap_lines(spec, rect.width).into_iter().enumerate() {
        let line_width = (line.width() as f32 * advance).min(rect.width);
        let x = aligned_x(spec.align, rect, line_width);
        ops.push(DrawOp::Glyphs {
            rect: Rect::new(x, rect.y + i as f32 * line_height, line_width, line_height),
            text: line,
            advance,
            color: spec.color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::{Insets, TextSpec};

    fn composition(root: Node) -> Composition {
        Composition {
            background: Color::PAPER,
            min_aspect: 0.0,
            root,
        }
    }

    #[test]
    fn test_column_stacks_children_with_spacing() {
        let root = Node::column(
            10.0,
            vec![Node::Spacer(20.0), Node::photo(0, 2.0), Node::Spacer(5.0)],
        );
        let list = layout(&composition(root), 200.0);

        assert_eq!(list.natural_height, 20.0 + 10.0 + 100.0 + 10.0 + 5.0);
        assert_eq!(list.photo_slots(), 1);
        let DrawOp::Photo { rect, .. } = &list.ops[0] else {
            panic!("expected photo op");
        };
        assert_eq!(*rect, Rect::new(0.0, 30.0, 200.0, 100.0));
    }

    #[test]
    fn test_narrower_width_wraps_more_lines() {
        let text = Node::text(TextSpec::new(
            "a quiet afternoon with tea and the window open",
            14.0,
        ));
        let wide = layout(&composition(text.clone()), 400.0);
        let narrow = layout(&composition(text), 120.0);

        assert!(narrow.text_lines().count() > wide.text_lines().count());
        assert!(narrow.natural_height > wide.natural_height);
    }

    #[test]
    fn test_empty_text_takes_no_space() {
        let root = Node::column(8.0, vec![Node::text(TextSpec::new("   ", 12.0))]);
        let list = layout(&composition(root), 300.0);
        assert_eq!(list.natural_height, 0.0);
        assert!(list.ops.is_empty());
    }

    #[test]
    fn test_max_lines_truncates_with_ellipsis() {
        let spec = TextSpec::new("one two three four five six seven eight nine ten", 10.0)
            .face(crate::composition::Face::Mono)
            .max_lines(2);
        let list = layout(&composition(Node::text(spec)), 60.0);
        let lines: Vec<&str> = list.text_lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].ends_with('\u{2026}'));
    }

    #[test]
    fn test_min_aspect_floors_height() {
        let comp = Composition {
            background: Color::PAPER,
            min_aspect: 0.5,
            root: Node::Spacer(10.0),
        };
        let list = layout(&comp, 100.0);
        assert_eq!(list.natural_height, 10.0);
        assert_eq!(list.height, 200.0);
    }

    #[test]
    fn test_anchored_overlay_sits_in_corner() {
        let root = Node::Layers(vec![
            Node::band(ShapeKind::Rect { corner_radius: 0.0 }, 100.0, Color::PAPER),
            Node::shape(ShapeKind::Circle, 20.0, 20.0, Color::INK)
                .anchored(Anchor::BottomRight, 20.0),
        ]);
        let list = layout(&composition(root), 200.0);

        assert_eq!(list.natural_height, 100.0);
        let DrawOp::Ellipse { rect, .. } = &list.ops[1] else {
            panic!("expected ellipse");
        };
        assert_eq!(*rect, Rect::new(180.0, 80.0, 20.0, 20.0));
    }

    #[test]
    fn test_padding_and_panel() {
        let root = Node::Spacer(10.0)
            .padded(Insets::all(5.0))
            .on_panel(PanelStyle::fill(Color::INK).bordered(Color::GRAPHITE, 1.0));
        let list = layout(&composition(root), 50.0);
        assert_eq!(list.natural_height, 20.0);
        assert!(matches!(list.ops[0], DrawOp::Fill { .. }));
        assert!(matches!(list.ops[1], DrawOp::Stroke { .. }));
    }

    #[test]
    fn test_row_splits_width() {
        let root = Node::row(10.0, vec![Node::photo(0, 1.0), Node::photo(1, 1.0)]);
        let list = layout(&composition(root), 210.0);
        assert_eq!(list.natural_height, 100.0);
        let rects: Vec<Rect> = list.ops.iter().map(DrawOp::rect).collect();
        assert_eq!(rects[1].x, 110.0);
    }

    #[test]
    fn test_centered_fixed_width_child() {
        let root = Node::centered_column(
            0.0,
            vec![Node::shape(ShapeKind::Circle, 40.0, 40.0, Color::INK)],
        );
        let list = layout(&composition(root), 100.0);
        assert_eq!(list.ops[0].rect().x, 30.0);
    }
}
