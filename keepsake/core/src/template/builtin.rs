//! Built-in template library
//!
//! One template type per style family. Each is parameterized by the concrete
//! style, which picks the palette and the family-specific arrangement. The
//! artwork is intentionally plain: these templates exist so every style has
//! a layout with the right silhouette, photo cap and decoration hooks.

use std::sync::Arc;

use super::Template;
use crate::composition::{
    Align, Anchor, Color, Composition, Face, Insets, Node, PanelStyle, ShapeKind, TextSpec,
};
use crate::model::{ArtifactStyle, CanvasSpec, Record, StyleFamily};

/// Colors a style paints with
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    /// Canvas
    pub paper: Color,
    /// Body text
    pub ink: Color,
    /// Seals, ribbons, highlights
    pub accent: Color,
    /// Secondary text and rules
    pub muted: Color,
}

impl Palette {
    const fn new(paper: Color, ink: Color, accent: Color, muted: Color) -> Self {
        Self {
            paper,
            ink,
            accent,
            muted,
        }
    }
}

/// Palette for a style
#[must_use]
#[rustfmt::skip]
pub fn palette_for(style: ArtifactStyle) -> Palette {
    use ArtifactStyle as S;
    let ink = Color::INK;
    let muted = Color::GRAPHITE;
    match style {
        S::Simple => Palette::new(Color::PAPER, ink, Color::rgb(90, 110, 140), muted),
        S::WaxEnvelope => Palette::new(Color::rgb(241, 229, 204), ink, Color::rgb(142, 28, 36), muted),
        S::Postcard => Palette::new(Color::rgb(247, 240, 226), ink, Color::rgb(36, 92, 140), muted),
        S::Telegram => Palette::new(Color::rgb(238, 226, 180), ink, Color::rgb(60, 60, 60), muted),
        S::Typewriter => Palette::new(Color::rgb(252, 250, 244), Color::rgb(20, 20, 20), Color::rgb(160, 30, 30), muted),
        S::LoveLetter => Palette::new(Color::rgb(252, 236, 238), ink, Color::rgb(196, 40, 80), muted),
        S::Polaroid => Palette::new(Color::rgb(250, 250, 248), ink, Color::rgb(40, 40, 40), muted),
        S::Leica => Palette::new(Color::rgb(30, 30, 32), Color::rgb(236, 236, 232), Color::rgb(208, 20, 26), Color::rgb(150, 150, 150)),
        S::FilmStrip => Palette::new(Color::rgb(24, 20, 18), Color::rgb(240, 200, 120), Color::rgb(250, 250, 250), Color::rgb(120, 100, 80)),
        S::ContactSheet => Palette::new(Color::rgb(20, 20, 20), Color::rgb(230, 230, 230), Color::rgb(240, 60, 60), Color::rgb(140, 140, 140)),
        S::Receipt => Palette::new(Color::rgb(255, 255, 255), Color::rgb(40, 40, 40), Color::rgb(40, 40, 40), muted),
        S::MovieTicket => Palette::new(Color::rgb(250, 234, 200), ink, Color::rgb(170, 30, 40), muted),
        S::BoardingPass => Palette::new(Color::rgb(244, 248, 252), ink, Color::rgb(20, 80, 160), muted),
        S::ConcertStub => Palette::new(Color::rgb(30, 24, 48), Color::rgb(250, 240, 255), Color::rgb(255, 80, 180), Color::rgb(170, 150, 200)),
        S::TradingCard => Palette::new(Color::rgb(248, 214, 92), ink, Color::rgb(200, 60, 30), Color::rgb(120, 90, 20)),
        S::PostageStamp => Palette::new(Color::rgb(252, 248, 240), ink, Color::rgb(60, 120, 90), muted),
        S::Bookmark => Palette::new(Color::rgb(234, 222, 200), ink, Color::rgb(120, 40, 40), muted),
        S::Cassette => Palette::new(Color::rgb(60, 60, 66), Color::rgb(250, 250, 250), Color::rgb(255, 160, 40), Color::rgb(180, 180, 180)),
        S::JewelryBox => Palette::new(Color::rgb(70, 18, 40), Color::rgb(250, 232, 200), Color::rgb(212, 175, 55), Color::rgb(190, 150, 160)),
        S::Vault => Palette::new(Color::rgb(58, 64, 70), Color::rgb(230, 232, 236), Color::rgb(196, 160, 60), Color::rgb(150, 156, 162)),
        S::MusicBox => Palette::new(Color::rgb(110, 70, 44), Color::rgb(252, 240, 220), Color::rgb(230, 190, 120), Color::rgb(200, 170, 140)),
    }
}

/// Built-in template for a style
#[must_use]
pub fn template_for(style: ArtifactStyle) -> Arc<dyn Template> {
    match style.family() {
        StyleFamily::Letters => Arc::new(LetterTemplate::new(style)),
        StyleFamily::Photographic => Arc::new(PhotographicTemplate::new(style)),
        StyleFamily::Ticket => Arc::new(TicketTemplate::new(style)),
        StyleFamily::Collectible => Arc::new(CollectibleTemplate::new(style)),
        StyleFamily::Haute => Arc::new(HauteTemplate::new(style)),
    }
}

// ============================================================================
// Shared pieces
// ============================================================================

fn date_line(record: &Record, palette: &Palette, face: Face) -> Node {
    Node::text(
        TextSpec::new(record.date.format("%B %-d, %Y").to_string(), 12.0)
            .color(palette.muted)
            .face(face),
    )
}

fn mood_line(record: &Record, palette: &Palette) -> Node {
    Node::text(
        TextSpec::new(
            format!("{} {}", record.mood.glyph(), record.mood.label()),
            11.0,
        )
        .color(palette.muted),
    )
}

fn body(record: &Record, palette: &Palette, face: Face, size: f32) -> Node {
    Node::text(
        TextSpec::new(record.content.clone(), size)
            .color(palette.ink)
            .face(face),
    )
}

fn weather_line(record: &Record, palette: &Palette) -> Option<Node> {
    let weather = record.weather?;
    let mut line = weather.label().to_string();
    if let Some(summary) = record.weather_detail.as_ref().and_then(|d| d.summary()) {
        line.push_str(" \u{00b7} ");
        line.push_str(&summary);
    }
    Some(Node::text(TextSpec::new(line, 10.0).color(palette.muted)))
}

/// Photo slots for the visible photos, `per_row` to a row
fn photo_grid(record: &Record, per_row: usize, aspect: f32, spacing: f32) -> Option<Node> {
    let count = record.visible_photos().len();
    if count == 0 {
        return None;
    }
    let per_row = per_row.max(1);
    let rows: Vec<Node> = (0..count)
        .collect::<Vec<_>>()
        .chunks(per_row)
        .map(|chunk| {
            let mut cells: Vec<Node> = chunk.iter().map(|i| Node::photo(*i, aspect)).collect();
            // Keep cell widths uniform on a short last row
            while cells.len() < per_row {
                cells.push(Node::Spacer(0.0));
            }
            Node::row(spacing, cells)
        })
        .collect();
    Some(Node::column(spacing, rows))
}

fn seal(record: &Record, palette: &Palette, diameter: f32) -> Node {
    Node::shape(
        ShapeKind::Seal {
            rotation: record.decoration.seal_rotation.unwrap_or(0.0),
        },
        diameter,
        diameter,
        palette.accent,
    )
}

/// Wrap a family layout with the record's decoration overlays
fn decorate(record: &Record, palette: &Palette, canvas: CanvasSpec, root: Node) -> Composition {
    let decoration = &record.decoration;
    let mut layers = vec![root];

    if let Some(stickers) = &decoration.stickers {
        let corners = [Anchor::TopRight, Anchor::BottomLeft, Anchor::TopLeft];
        for (glyph, anchor) in stickers.iter().zip(corners) {
            layers.push(
                Node::text(TextSpec::new(glyph.clone(), 22.0).color(palette.accent))
                    .padded(Insets::all(6.0))
                    .anchored(anchor, 40.0),
            );
        }
    }

    if let Some(payload) = &decoration.qr_payload {
        layers.push(
            Node::shape(
                ShapeKind::Qr {
                    payload: payload.clone(),
                },
                44.0,
                44.0,
                palette.ink,
            )
            .padded(Insets::all(10.0))
            .anchored(Anchor::BottomRight, 64.0),
        );
    }

    let root = if layers.len() == 1 {
        layers.remove(0)
    } else {
        Node::Layers(layers)
    };

    Composition {
        background: decoration.background.unwrap_or(palette.paper),
        min_aspect: canvas.aspect_ratio,
        root,
    }
}

fn push_some(children: &mut Vec<Node>, node: Option<Node>) {
    if let Some(node) = node {
        children.push(node);
    }
}

macro_rules! family_template {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $name {
            style: ArtifactStyle,
            palette: Palette,
        }

        impl $name {
            /// Template for one style of the family
            #[must_use]
            pub fn new(style: ArtifactStyle) -> Self {
                Self {
                    style,
                    palette: palette_for(style),
                }
            }

            /// Style this instance lays out
            #[must_use]
            pub fn style(&self) -> ArtifactStyle {
                self.style
            }
        }

        impl Template for $name {
            fn layout(&self, record: &Record) -> Composition {
                let root = self.arrange(record);
                decorate(record, &self.palette, self.canvas(), root)
            }

            fn canvas(&self) -> CanvasSpec {
                self.style.canvas()
            }

            fn name(&self) -> &str {
                self.style.id()
            }
        }
    };
}

// ============================================================================
// Letters
// ============================================================================

family_template!(
    /// Envelopes, postcards and typed pages
    LetterTemplate
);

impl LetterTemplate {
    fn arrange(&self, record: &Record) -> Node {
        let p = &self.palette;
        match self.style {
            ArtifactStyle::WaxEnvelope | ArtifactStyle::LoveLetter => {
                let mut sheet = vec![date_line(record, p, Face::Serif), body(record, p, Face::Serif, 15.0)];
                push_some(&mut sheet, photo_grid(record, 1, 4.0 / 3.0, 8.0));
                push_some(&mut sheet, weather_line(record, p));
                sheet.push(mood_line(record, p));

                let mut stack = Vec::new();
                if self.style == ArtifactStyle::LoveLetter {
                    stack.push(Node::band(ShapeKind::Rect { corner_radius: 0.0 }, 10.0, p.accent));
                }
                stack.push(Node::column(12.0, sheet).padded(Insets::symmetric(24.0, 28.0)));
                stack.push(seal(record, p, 56.0));
                Node::centered_column(14.0, stack)
                    .padded(Insets::all(12.0))
                    .on_panel(PanelStyle::fill(p.paper).bordered(p.muted, 1.0))
            }
            ArtifactStyle::Postcard => {
                let stamp = Node::Layers(vec![
                    Node::shape(ShapeKind::Rect { corner_radius: 2.0 }, 48.0, 58.0, p.accent),
                    Node::band(ShapeKind::Perforation { pitch: 6.0 }, 4.0, p.paper),
                ])
                .anchored(Anchor::TopRight, 48.0);

                let mut front = Vec::new();
                push_some(&mut front, photo_grid(record, 1, 3.0 / 2.0, 0.0));
                front.push(Node::divider(p.muted));
                front.push(Node::row(
                    16.0,
                    vec![
                        body(record, p, Face::Sans, 13.0),
                        Node::column(
                            6.0,
                            vec![date_line(record, p, Face::Sans), mood_line(record, p)],
                        ),
                    ],
                ));
                push_some(&mut front, weather_line(record, p));
                Node::Layers(vec![Node::column(14.0, front).padded(Insets::all(20.0)), stamp])
            }
            ArtifactStyle::Telegram => {
                let mut text = record.content.trim().to_string();
                if !text.is_empty() {
                    text.push_str(" STOP");
                }
                Node::column(
                    10.0,
                    vec![
                        Node::text(TextSpec::new("TELEGRAM", 18.0).face(Face::Mono).color(p.accent).align(Align::Center)),
                        Node::dashed_divider(p.ink),
                        date_line(record, p, Face::Mono),
                        Node::text(TextSpec::new(text, 13.0).face(Face::Mono).uppercase().color(p.ink)),
                        Node::dashed_divider(p.ink),
                        mood_line(record, p),
                    ],
                )
                .padded(Insets::all(22.0))
            }
            ArtifactStyle::Typewriter => {
                let mut lines = vec![date_line(record, p, Face::Mono), Node::Spacer(6.0), body(record, p, Face::Mono, 13.0)];
                push_some(&mut lines, weather_line(record, p));
                lines.push(mood_line(record, p));
                Node::column(10.0, lines).padded(Insets::symmetric(36.0, 30.0))
            }
            _ => {
                let mut lines = vec![
                    date_line(record, p, Face::Serif),
                    mood_line(record, p),
                    body(record, p, Face::Serif, 15.0),
                ];
                push_some(&mut lines, photo_grid(record, 1, 4.0 / 3.0, 8.0));
                push_some(&mut lines, weather_line(record, p));
                Node::column(12.0, lines).padded(Insets::all(24.0))
            }
        }
    }
}

// ============================================================================
// Photographic
// ============================================================================

family_template!(
    /// Instant prints, camera backs, negatives
    PhotographicTemplate
);

impl PhotographicTemplate {
    fn arrange(&self, record: &Record) -> Node {
        let p = &self.palette;
        // An empty frame still reads as a photo
        let frames = photo_grid(record, self.per_row(), self.frame_aspect(), 6.0)
            .unwrap_or_else(|| Node::photo(0, self.frame_aspect()));
        let caption = Node::text(
            TextSpec::new(record.content.clone(), 13.0)
                .color(p.ink)
                .face(Face::Sans)
                .max_lines(self.caption_lines()),
        );

        match self.style {
            ArtifactStyle::Polaroid => Node::column(
                16.0,
                vec![frames, caption, date_line(record, p, Face::Sans)],
            )
            .padded(Insets {
                top: 18.0,
                right: 18.0,
                bottom: 48.0,
                left: 18.0,
            }),
            ArtifactStyle::Leica => Node::column(
                12.0,
                vec![
                    Node::row(
                        12.0,
                        vec![
                            Node::shape(ShapeKind::Circle, 14.0, 14.0, p.accent),
                            Node::text(TextSpec::new("LEICA", 12.0).color(p.ink).align(Align::End)),
                        ],
                    ),
                    frames.on_panel(PanelStyle::fill(Color::rgb(0, 0, 0)).rounded(4.0)),
                    Node::centered_column(
                        0.0,
                        vec![Node::shape(ShapeKind::Circle, 72.0, 72.0, p.muted)],
                    ),
                    caption,
                    date_line(record, p, Face::Sans),
                ],
            )
            .padded(Insets::all(20.0)),
            ArtifactStyle::FilmStrip => Node::column(
                4.0,
                vec![
                    Node::band(ShapeKind::Perforation { pitch: 14.0 }, 8.0, p.accent),
                    frames,
                    Node::band(ShapeKind::Perforation { pitch: 14.0 }, 8.0, p.accent),
                    caption,
                    date_line(record, p, Face::Mono),
                ],
            )
            .padded(Insets::symmetric(16.0, 12.0)),
            _ => {
                let mut sheet = vec![
                    Node::text(TextSpec::new(record.date.format("%Y-%m-%d").to_string(), 10.0).face(Face::Mono).color(p.accent)),
                    frames,
                    caption,
                ];
                push_some(&mut sheet, weather_line(record, p));
                Node::column(10.0, sheet).padded(Insets::all(14.0))
            }
        }
    }

    fn per_row(&self) -> usize {
        match self.style {
            ArtifactStyle::ContactSheet => 3,
            ArtifactStyle::FilmStrip => 2,
            _ => 1,
        }
    }

    fn frame_aspect(&self) -> f32 {
        match self.style {
            ArtifactStyle::Polaroid => 1.0,
            ArtifactStyle::Leica | ArtifactStyle::FilmStrip => 3.0 / 2.0,
            _ => 1.0,
        }
    }

    fn caption_lines(&self) -> usize {
        match self.style {
            ArtifactStyle::Polaroid => 3,
            ArtifactStyle::ContactSheet => 4,
            _ => 6,
        }
    }
}

// ============================================================================
// Ticket
// ============================================================================

family_template!(
    /// Receipts, stubs and passes
    TicketTemplate
);

impl TicketTemplate {
    fn arrange(&self, record: &Record) -> Node {
        let p = &self.palette;
        let serial = record.id.to_string().replace('-', "");
        let serial = serial.get(..12).unwrap_or(&serial).to_uppercase();
        let barcode = Node::band(ShapeKind::Barcode { payload: serial.clone() }, 40.0, p.ink);

        match self.style {
            ArtifactStyle::Receipt => {
                let mut lines = vec![
                    Node::text(TextSpec::new("KEEPSAKE", 16.0).face(Face::Mono).align(Align::Center).color(p.ink)),
                    Node::text(TextSpec::new(record.date.format("%d/%m/%Y").to_string(), 11.0).face(Face::Mono).align(Align::Center).color(p.muted)),
                    Node::dashed_divider(p.muted),
                    Node::text(TextSpec::new(record.content.clone(), 12.0).face(Face::Mono).color(p.ink)),
                    Node::dashed_divider(p.muted),
                    Node::text(TextSpec::new(format!("MOOD {}", record.mood.label().to_uppercase()), 11.0).face(Face::Mono).color(p.ink)),
                ];
                push_some(&mut lines, weather_line(record, p));
                lines.push(barcode);
                lines.push(Node::text(TextSpec::new(serial, 9.0).face(Face::Mono).align(Align::Center).color(p.muted)));
                Node::column(8.0, lines).padded(Insets::symmetric(18.0, 16.0))
            }
            ArtifactStyle::BoardingPass => {
                let mut lines = vec![
                    Node::text(TextSpec::new("BOARDING PASS", 12.0).face(Face::Sans).color(p.accent)),
                    Node::row(
                        8.0,
                        vec![
                            Node::text(TextSpec::new("FROM\nYESTERDAY", 11.0).face(Face::Mono).color(p.ink)),
                            Node::text(TextSpec::new(format!("TO\n{}", record.mood.label().to_uppercase()), 11.0).face(Face::Mono).color(p.ink).align(Align::End)),
                        ],
                    ),
                    date_line(record, p, Face::Mono),
                ];
                push_some(&mut lines, photo_grid(record, 1, 16.0 / 9.0, 0.0));
                lines.push(body(record, p, Face::Sans, 12.0));
                lines.push(Node::band(ShapeKind::Perforation { pitch: 10.0 }, 6.0, p.muted));
                lines.push(barcode);
                Node::column(10.0, lines).padded(Insets::all(16.0))
            }
            _ => {
                let title = if self.style == ArtifactStyle::MovieTicket {
                    "ADMIT ONE"
                } else {
                    "LIVE"
                };
                let mut lines = vec![
                    Node::text(TextSpec::new(title, 20.0).face(Face::Sans).uppercase().align(Align::Center).color(p.accent)),
                    date_line(record, p, Face::Sans),
                ];
                push_some(&mut lines, photo_grid(record, 1, 1.0, 0.0));
                lines.push(body(record, p, Face::Sans, 12.0));
                lines.push(mood_line(record, p));
                lines.push(Node::band(ShapeKind::Perforation { pitch: 10.0 }, 6.0, p.muted));
                lines.push(barcode);
                Node::column(10.0, lines)
                    .padded(Insets::all(14.0))
                    .on_panel(PanelStyle::fill(p.paper).bordered(p.accent, 2.0).rounded(6.0))
            }
        }
    }
}

// ============================================================================
// Collectible
// ============================================================================

family_template!(
    /// Cards, stamps and tapes
    CollectibleTemplate
);

impl CollectibleTemplate {
    fn arrange(&self, record: &Record) -> Node {
        let p = &self.palette;
        match self.style {
            ArtifactStyle::TradingCard => {
                let mut card = vec![Node::row(
                    8.0,
                    vec![
                        Node::text(TextSpec::new(record.mood.label(), 14.0).face(Face::Sans).uppercase().color(p.ink)),
                        Node::text(TextSpec::new(record.mood.glyph(), 14.0).align(Align::End).color(p.accent)),
                    ],
                )];
                card.push(
                    photo_grid(record, 2, 1.0, 6.0)
                        .unwrap_or_else(|| Node::photo(0, 4.0 / 3.0))
                        .on_panel(PanelStyle::fill(p.muted)),
                );
                card.push(body(record, p, Face::Sans, 12.0));
                card.push(date_line(record, p, Face::Sans));
                Node::column(10.0, card)
                    .padded(Insets::all(12.0))
                    .on_panel(PanelStyle::fill(Color::PAPER).bordered(p.accent, 3.0).rounded(10.0))
                    .padded(Insets::all(14.0))
            }
            ArtifactStyle::PostageStamp => {
                let mut inner = Vec::new();
                push_some(&mut inner, photo_grid(record, 1, 4.0 / 5.0, 0.0));
                inner.push(body(record, p, Face::Serif, 12.0));
                inner.push(Node::text(
                    TextSpec::new(record.date.format("%Y").to_string(), 18.0)
                        .align(Align::End)
                        .color(p.accent),
                ));
                Node::column(
                    0.0,
                    vec![
                        Node::band(ShapeKind::Perforation { pitch: 12.0 }, 10.0, p.muted),
                        Node::column(10.0, inner).padded(Insets::all(18.0)),
                        Node::band(ShapeKind::Perforation { pitch: 12.0 }, 10.0, p.muted),
                    ],
                )
            }
            ArtifactStyle::Bookmark => {
                let mut strip = vec![
                    Node::shape(ShapeKind::Circle, 18.0, 18.0, p.accent),
                    date_line(record, p, Face::Serif),
                ];
                push_some(&mut strip, photo_grid(record, 1, 2.0 / 3.0, 0.0));
                strip.push(body(record, p, Face::Serif, 13.0));
                strip.push(mood_line(record, p));
                Node::centered_column(12.0, strip).padded(Insets::symmetric(26.0, 60.0))
            }
            _ => {
                let reels = Node::row(
                    40.0,
                    vec![
                        Node::centered_column(0.0, vec![Node::shape(ShapeKind::Circle, 56.0, 56.0, p.muted)]),
                        Node::centered_column(0.0, vec![Node::shape(ShapeKind::Circle, 56.0, 56.0, p.muted)]),
                    ],
                );
                let label = Node::column(
                    8.0,
                    vec![
                        Node::text(TextSpec::new(format!("SIDE A \u{00b7} {}", record.date.format("%b %Y")), 11.0).face(Face::Mono).color(Color::INK)),
                        Node::text(TextSpec::new(record.content.clone(), 12.0).face(Face::Sans).max_lines(4).color(Color::INK)),
                    ],
                )
                .padded(Insets::all(10.0))
                .on_panel(PanelStyle::fill(Color::PAPER).rounded(4.0));
                Node::column(
                    16.0,
                    vec![label, reels, Node::band(ShapeKind::Rect { corner_radius: 2.0 }, 6.0, p.accent)],
                )
                .padded(Insets::all(20.0))
            }
        }
    }
}

// ============================================================================
// Haute
// ============================================================================

family_template!(
    /// Novelty keepsake containers
    HauteTemplate
);

impl HauteTemplate {
    fn arrange(&self, record: &Record) -> Node {
        let p = &self.palette;
        let centerpiece = match self.style {
            ArtifactStyle::Vault => Node::Layers(vec![
                Node::shape(ShapeKind::Circle, 120.0, 120.0, p.muted),
                Node::shape(ShapeKind::Circle, 40.0, 40.0, p.accent).anchored(Anchor::Center, 40.0),
            ]),
            ArtifactStyle::MusicBox => Node::Layers(vec![
                Node::shape(ShapeKind::Rect { corner_radius: 8.0 }, 160.0, 60.0, p.accent),
                Node::band(ShapeKind::Barcode { payload: record.mood.label().to_string() }, 60.0, p.paper),
            ]),
            _ => Node::shape(ShapeKind::Rect { corner_radius: 14.0 }, 140.0, 70.0, p.accent),
        };

        let mut contents = vec![
            centerpiece,
            Node::text(
                TextSpec::new(record.date.format("%B %-d, %Y").to_string(), 14.0)
                    .align(Align::Center)
                    .color(p.accent),
            ),
        ];
        push_some(&mut contents, photo_grid(record, 2, 1.0, 8.0));
        contents.push(Node::text(
            TextSpec::new(record.content.clone(), 14.0)
                .align(Align::Center)
                .color(p.ink),
        ));
        push_some(&mut contents, weather_line(record, p));
        if self.style.has_seal() {
            contents.push(seal(record, p, 48.0));
        }
        Node::centered_column(16.0, contents)
            .padded(Insets::all(22.0))
            .on_panel(PanelStyle::fill(p.paper).bordered(p.accent, 2.0).rounded(18.0))
            .padded(Insets::all(10.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::{layout, DrawOp};
    use crate::model::{Decoration, Draft, Photo, RecordId};

    fn record(style: ArtifactStyle, photos: usize) -> Record {
        let mut draft = Draft::new();
        draft.content = "Walked to the harbour and back; the gulls were loud.".to_string();
        draft.style = style;
        draft.photos = (0..photos).map(|i| Photo::new(vec![i as u8; 4])).collect();
        draft.finalize(RecordId::new(), Decoration::none())
    }

    #[test]
    fn test_every_style_lays_out_something() {
        for style in ArtifactStyle::ALL {
            let template = template_for(style);
            let list = layout(&template.layout(&record(style, 2)), 350.0);
            assert!(!list.ops.is_empty(), "{style} produced no ops");
            assert!(list.natural_height > 0.0, "{style} has no height");
            assert_eq!(template.name(), style.id());
        }
    }

    #[test]
    fn test_photo_slots_respect_cap() {
        for style in ArtifactStyle::ALL {
            let template = template_for(style);
            let list = layout(&template.layout(&record(style, 10)), 350.0);
            let cap = style.max_photos();
            let slots = list.photo_slots();
            // Empty-frame styles draw one slot even without photos
            assert!(slots <= cap.max(1), "{style}: {slots} slots for cap {cap}");
        }
    }

    #[test]
    fn test_contact_sheet_grows_with_photos() {
        let template = template_for(ArtifactStyle::ContactSheet);
        let one = layout(&template.layout(&record(ArtifactStyle::ContactSheet, 1)), 350.0);
        let six = layout(&template.layout(&record(ArtifactStyle::ContactSheet, 6)), 350.0);
        assert!(six.natural_height > one.natural_height);
    }

    #[test]
    fn test_decoration_overlays_and_background() {
        let mut rec = record(ArtifactStyle::WaxEnvelope, 0);
        rec.decoration = Decoration {
            qr_payload: Some("keepsake:20260101:abcdef12".to_string()),
            stickers: Some(vec!["\u{2605}".to_string()]),
            seal_rotation: Some(12.0),
            background: Some(Color::rgb(1, 2, 3)),
        };
        let composition = template_for(rec.style).layout(&rec);
        assert_eq!(composition.background, Color::rgb(1, 2, 3));

        let list = layout(&composition, 350.0);
        assert!(list.ops.iter().any(|op| matches!(op, DrawOp::Qr { .. })));
        assert!(list
            .ops
            .iter()
            .any(|op| matches!(op, DrawOp::Seal { rotation, .. } if *rotation == 12.0)));
    }

    #[test]
    fn test_layout_is_pure() {
        let rec = record(ArtifactStyle::Receipt, 0);
        let template = template_for(rec.style);
        assert_eq!(template.layout(&rec), template.layout(&rec));
    }

    #[test]
    fn test_canvas_follows_family() {
        assert_eq!(template_for(ArtifactStyle::Receipt).canvas(), CanvasSpec::TICKET);
        assert_eq!(template_for(ArtifactStyle::Leica).canvas(), CanvasSpec::CARD);
    }
}
