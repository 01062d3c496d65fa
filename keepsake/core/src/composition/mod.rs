//! Composition - declarative artifact descriptions
//!
//! Templates return a [`Node`] tree describing shapes, text and photos.
//! The tree says nothing about pixels: [`layout`] positions it at a given
//! logical width and produces a flat [`DisplayList`] that the rasterizer
//! (or a live preview) consumes.
//!
//! # Layout Model
//!
//! ```text
//! Column ── stacks children vertically, each at full width
//! Row    ── splits width evenly between children, height = tallest
//! Layers ── z-stack; first child sets the size, later children overlay it
//! Padded ── insets a child
//! Panel  ── paints a background/border behind a child
//! ```

mod color;
mod layout;

pub use color::Color;
pub use layout::{layout, DisplayList, DrawOp, Rect};

/// Horizontal alignment for fixed-width content
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Align {
    /// Left edge
    #[default]
    Start,
    /// Centered
    Center,
    /// Right edge
    End,
}

/// Corner an overlay is pinned to inside a [`Node::Layers`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
    /// Top-left corner
    TopLeft,
    /// Top-right corner
    TopRight,
    /// Bottom-left corner
    BottomLeft,
    /// Bottom-right corner
    BottomRight,
    /// Center of the base layer
    Center,
}

/// Edge insets in logical points
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Insets {
    /// Top inset
    pub top: f32,
    /// Right inset
    pub right: f32,
    /// Bottom inset
    pub bottom: f32,
    /// Left inset
    pub left: f32,
}

impl Insets {
    /// Same inset on all sides
    #[must_use]
    pub const fn all(v: f32) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    /// Vertical and horizontal insets
    #[must_use]
    pub const fn symmetric(vertical: f32, horizontal: f32) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }
}

/// Typeface family hint
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Face {
    /// Proportional serif
    #[default]
    Serif,
    /// Proportional sans-serif
    Sans,
    /// Fixed-width
    Mono,
}

impl Face {
    /// Average advance as a fraction of the font size
    #[must_use]
    pub const fn advance_ratio(self) -> f32 {
        match self {
            Self::Serif => 0.52,
            Self::Sans => 0.55,
            Self::Mono => 0.6,
        }
    }
}

/// A run of wrapped text
#[derive(Clone, Debug, PartialEq)]
pub struct TextSpec {
    /// The text itself
    pub content: String,
    /// Font size in logical points
    pub size: f32,
    /// Ink color
    pub color: Color,
    /// Typeface hint
    pub face: Face,
    /// Line alignment
    pub align: Align,
    /// Truncate after this many lines
    pub max_lines: Option<usize>,
    /// Render in capitals
    pub uppercase: bool,
}

impl TextSpec {
    /// Text at a given size in ink color
    pub fn new(content: impl Into<String>, size: f32) -> Self {
        Self {
            content: content.into(),
            size,
            color: Color::INK,
            face: Face::default(),
            align: Align::Start,
            max_lines: None,
            uppercase: false,
        }
    }

    /// Set color
    #[must_use]
    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Set face
    #[must_use]
    pub fn face(mut self, face: Face) -> Self {
        self.face = face;
        self
    }

    /// Set alignment
    #[must_use]
    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    /// Limit line count
    #[must_use]
    pub fn max_lines(mut self, lines: usize) -> Self {
        self.max_lines = Some(lines);
        self
    }

    /// Capitalize
    #[must_use]
    pub fn uppercase(mut self) -> Self {
        self.uppercase = true;
        self
    }
}

/// Primitive shapes
#[derive(Clone, Debug, PartialEq)]
pub enum ShapeKind {
    /// Rectangle with optional rounded corners
    Rect {
        /// Corner radius
        corner_radius: f32,
    },
    /// Circle inscribed in the shape box
    Circle,
    /// Wax seal: disc with a rotated emboss bar
    Seal {
        /// Rotation in degrees
        rotation: f32,
    },
    /// Square QR-style block derived from a payload
    Qr {
        /// Encoded payload
        payload: String,
    },
    /// Barcode stripes derived from a payload
    Barcode {
        /// Encoded payload
        payload: String,
    },
    /// Row of punched holes
    Perforation {
        /// Hole pitch in logical points
        pitch: f32,
    },
}

/// Shape dimensions; `width: None` fills the available width
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeSize {
    /// Fixed width, or fill
    pub width: Option<f32>,
    /// Height
    pub height: f32,
}

/// Background painted behind a child
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanelStyle {
    /// Fill color
    pub fill: Color,
    /// Border color and thickness
    pub border: Option<(Color, f32)>,
    /// Corner radius
    pub corner_radius: f32,
}

impl PanelStyle {
    /// Flat fill without border
    #[must_use]
    pub const fn fill(color: Color) -> Self {
        Self {
            fill: color,
            border: None,
            corner_radius: 0.0,
        }
    }

    /// Add a border
    #[must_use]
    pub const fn bordered(mut self, color: Color, thickness: f32) -> Self {
        self.border = Some((color, thickness));
        self
    }

    /// Round the corners
    #[must_use]
    pub const fn rounded(mut self, radius: f32) -> Self {
        self.corner_radius = radius;
        self
    }
}

/// A node in the composition tree
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// Vertical stack
    Column {
        /// Gap between children
        spacing: f32,
        /// Alignment of fixed-width children
        align: Align,
        /// Children, top to bottom
        children: Vec<Node>,
    },
    /// Horizontal split with equal shares
    Row {
        /// Gap between children
        spacing: f32,
        /// Children, left to right
        children: Vec<Node>,
    },
    /// Z-stack; the first child is the base
    Layers(Vec<Node>),
    /// Overlay pinned to a corner of the enclosing layers' base
    Anchored {
        /// Corner
        anchor: Anchor,
        /// Fixed width of the overlay box
        width: f32,
        /// Content
        child: Box<Node>,
    },
    /// Inset child
    Padded {
        /// Insets
        insets: Insets,
        /// Content
        child: Box<Node>,
    },
    /// Child drawn over a panel
    Panel {
        /// Panel look
        style: PanelStyle,
        /// Content
        child: Box<Node>,
    },
    /// Wrapped text
    Text(TextSpec),
    /// Photo slot referencing the record's photo list
    Photo {
        /// Index into the record's visible photos
        index: usize,
        /// Width over height of the slot
        aspect_ratio: f32,
        /// Corner radius
        corner_radius: f32,
    },
    /// Primitive shape
    Shape {
        /// Which shape
        kind: ShapeKind,
        /// Its size
        size: ShapeSize,
        /// Fill color
        color: Color,
    },
    /// Fixed vertical gap
    Spacer(f32),
    /// Horizontal rule
    Divider {
        /// Line thickness
        thickness: f32,
        /// Line color
        color: Color,
        /// Dashed instead of solid
        dashed: bool,
    },
}

impl Node {
    /// Vertical stack with start alignment
    #[must_use]
    pub fn column(spacing: f32, children: Vec<Node>) -> Self {
        Self::Column {
            spacing,
            align: Align::Start,
            children,
        }
    }

    /// Vertical stack with centered fixed-width children
    #[must_use]
    pub fn centered_column(spacing: f32, children: Vec<Node>) -> Self {
        Self::Column {
            spacing,
            align: Align::Center,
            children,
        }
    }

    /// Horizontal split
    #[must_use]
    pub fn row(spacing: f32, children: Vec<Node>) -> Self {
        Self::Row { spacing, children }
    }

    /// Text node
    #[must_use]
    pub fn text(spec: TextSpec) -> Self {
        Self::Text(spec)
    }

    /// Photo slot
    #[must_use]
    pub fn photo(index: usize, aspect_ratio: f32) -> Self {
        Self::Photo {
            index,
            aspect_ratio,
            corner_radius: 0.0,
        }
    }

    /// Shape with fixed size
    #[must_use]
    pub fn shape(kind: ShapeKind, width: f32, height: f32, color: Color) -> Self {
        Self::Shape {
            kind,
            size: ShapeSize {
                width: Some(width),
                height,
            },
            color,
        }
    }

    /// Shape spanning the available width
    #[must_use]
    pub fn band(kind: ShapeKind, height: f32, color: Color) -> Self {
        Self::Shape {
            kind,
            size: ShapeSize {
                width: None,
                height,
            },
            color,
        }
    }

    /// Solid divider
    #[must_use]
    pub fn divider(color: Color) -> Self {
        Self::Divider {
            thickness: 1.0,
            color,
            dashed: false,
        }
    }

    /// Dashed divider
    #[must_use]
    pub fn dashed_divider(color: Color) -> Self {
        Self::Divider {
            thickness: 1.0,
            color,
            dashed: true,
        }
    }

    /// Wrap in padding
    #[must_use]
    pub fn padded(self, insets: Insets) -> Self {
        Self::Padded {
            insets,
            child: Box::new(self),
        }
    }

    /// Put on a panel
    #[must_use]
    pub fn on_panel(self, style: PanelStyle) -> Self {
        Self::Panel {
            style,
            child: Box::new(self),
        }
    }

    /// Pin as an overlay
    #[must_use]
    pub fn anchored(self, anchor: Anchor, width: f32) -> Self {
        Self::Anchored {
            anchor,
            width,
            child: Box::new(self),
        }
    }

    /// Number of nodes in this subtree
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + match self {
            Self::Column { children, .. } | Self::Row { children, .. } | Self::Layers(children) => {
                children.iter().map(Node::node_count).sum()
            }
            Self::Anchored { child, .. } | Self::Padded { child, .. } | Self::Panel { child, .. } => {
                child.node_count()
            }
            Self::Text(_)
            | Self::Photo { .. }
            | Self::Shape { .. }
            | Self::Spacer(_)
            | Self::Divider { .. } => 0,
        }
    }
}

/// A template's output: a root node plus the canvas background
#[derive(Clone, Debug, PartialEq)]
pub struct Composition {
    /// Canvas background
    pub background: Color,
    /// Minimum canvas height at a given width is `width / min_aspect`
    pub min_aspect: f32,
    /// Content tree
    pub root: Node,
}

impl Composition {
    /// Whether the composition has anything besides its root container
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.root.node_count() <= 1
            && matches!(
                self.root,
                Node::Column { .. } | Node::Row { .. } | Node::Layers(_)
            )
    }
}
