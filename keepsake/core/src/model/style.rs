//! Artifact styles and their families
//!
//! The style catalogue is closed: every record picks one of these variants,
//! and the [`TemplateRegistry`](crate::template::TemplateRegistry) maps each
//! one to a template. Families group styles that share a canvas silhouette
//! and a ritual.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Style family: shared canvas shape and ritual
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleFamily {
    /// Envelopes, postcards and typed pages
    Letters,
    /// Instant prints and camera backs
    Photographic,
    /// Receipts, stubs and passes
    Ticket,
    /// Cards, stamps and tapes
    Collectible,
    /// Novelty keepsake containers
    Haute,
}

impl StyleFamily {
    /// Canvas shared by every style of this family
    #[must_use]
    pub const fn canvas(self) -> CanvasSpec {
        match self {
            Self::Ticket => CanvasSpec::TICKET,
            _ => CanvasSpec::CARD,
        }
    }

    /// Lowercase label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Letters => "letters",
            Self::Photographic => "photographic",
            Self::Ticket => "ticket",
            Self::Collectible => "collectible",
            Self::Haute => "haute",
        }
    }
}

impl fmt::Display for StyleFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Logical canvas of a style family
///
/// `aspect_ratio` is width over height. Card-shaped families share 3:4, the
/// ticket family is narrower. Renders never come out shorter than
/// `width / aspect_ratio`; longer content grows the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanvasSpec {
    /// Design width in logical points
    pub design_width: f32,
    /// Width divided by height
    pub aspect_ratio: f32,
}

impl CanvasSpec {
    /// Card silhouette (3:4)
    pub const CARD: CanvasSpec = CanvasSpec {
        design_width: 350.0,
        aspect_ratio: 0.75,
    };

    /// Ticket silhouette (9:20)
    pub const TICKET: CanvasSpec = CanvasSpec {
        design_width: 270.0,
        aspect_ratio: 0.45,
    };

    /// Minimum height when laid out at `width`
    #[must_use]
    pub fn min_height_at(&self, width: f32) -> f32 {
        if self.aspect_ratio <= 0.0 {
            return 0.0;
        }
        width / self.aspect_ratio
    }
}

/// Every selectable artifact style
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactStyle {
    /// Plain card; also the registry fallback
    #[default]
    Simple,
    /// Envelope closed with a wax seal
    WaxEnvelope,
    /// Picture postcard with stamp corner
    Postcard,
    /// Telegram form with capitalized text
    Telegram,
    /// Typed sheet
    Typewriter,
    /// Letter with ribbon and seal
    LoveLetter,
    /// Instant print with a thick bottom border
    Polaroid,
    /// Rangefinder camera back
    Leica,
    /// Strip of negatives
    FilmStrip,
    /// Contact sheet grid
    ContactSheet,
    /// Thermal receipt
    Receipt,
    /// Cinema admission ticket
    MovieTicket,
    /// Airline boarding pass
    BoardingPass,
    /// Torn concert stub
    ConcertStub,
    /// Foil trading card
    TradingCard,
    /// Perforated postage stamp
    PostageStamp,
    /// Tasseled bookmark
    Bookmark,
    /// Cassette tape J-card
    Cassette,
    /// Velvet jewelry box
    JewelryBox,
    /// Bank vault door
    Vault,
    /// Wind-up music box
    MusicBox,
}

impl ArtifactStyle {
    /// All styles, in catalogue order
    pub const ALL: [ArtifactStyle; 21] = [
        Self::Simple,
        Self::WaxEnvelope,
        Self::Postcard,
        Self::Telegram,
        Self::Typewriter,
        Self::LoveLetter,
        Self::Polaroid,
        Self::Leica,
        Self::FilmStrip,
        Self::ContactSheet,
        Self::Receipt,
        Self::MovieTicket,
        Self::BoardingPass,
        Self::ConcertStub,
        Self::TradingCard,
        Self::PostageStamp,
        Self::Bookmark,
        Self::Cassette,
        Self::JewelryBox,
        Self::Vault,
        Self::MusicBox,
    ];

    /// Family this style belongs to
    #[must_use]
    pub const fn family(self) -> StyleFamily {
        match self {
            Self::Simple
            | Self::WaxEnvelope
            | Self::Postcard
            | Self::Telegram
            | Self::Typewriter
            | Self::LoveLetter => StyleFamily::Letters,
            Self::Polaroid | Self::Leica | Self::FilmStrip | Self::ContactSheet => {
                StyleFamily::Photographic
            }
            Self::Receipt | Self::MovieTicket | Self::BoardingPass | Self::ConcertStub => {
                StyleFamily::Ticket
            }
            Self::TradingCard | Self::PostageStamp | Self::Bookmark | Self::Cassette => {
                StyleFamily::Collectible
            }
            Self::JewelryBox | Self::Vault | Self::MusicBox => StyleFamily::Haute,
        }
    }

    /// Maximum number of photos this style displays
    #[must_use]
    pub const fn max_photos(self) -> usize {
        match self {
            Self::Telegram | Self::Typewriter | Self::Receipt | Self::Cassette => 0,
            Self::ContactSheet => 6,
            Self::FilmStrip => 4,
            Self::TradingCard | Self::JewelryBox => 2,
            _ => 1,
        }
    }

    /// Canvas of this style's family
    #[must_use]
    pub const fn canvas(self) -> CanvasSpec {
        self.family().canvas()
    }

    /// Whether the style carries a wax seal (and so a seal rotation)
    #[must_use]
    pub const fn has_seal(self) -> bool {
        matches!(
            self,
            Self::WaxEnvelope | Self::LoveLetter | Self::JewelryBox | Self::Vault
        )
    }

    /// Stable snake_case identifier
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::WaxEnvelope => "wax_envelope",
            Self::Postcard => "postcard",
            Self::Telegram => "telegram",
            Self::Typewriter => "typewriter",
            Self::LoveLetter => "love_letter",
            Self::Polaroid => "polaroid",
            Self::Leica => "leica",
            Self::FilmStrip => "film_strip",
            Self::ContactSheet => "contact_sheet",
            Self::Receipt => "receipt",
            Self::MovieTicket => "movie_ticket",
            Self::BoardingPass => "boarding_pass",
            Self::ConcertStub => "concert_stub",
            Self::TradingCard => "trading_card",
            Self::PostageStamp => "postage_stamp",
            Self::Bookmark => "bookmark",
            Self::Cassette => "cassette",
            Self::JewelryBox => "jewelry_box",
            Self::Vault => "vault",
            Self::MusicBox => "music_box",
        }
    }
}

impl fmt::Display for ArtifactStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Error for an unrecognized style identifier
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown artifact style: {0}")]
pub struct UnknownStyle(pub String);

impl FromStr for ArtifactStyle {
    type Err = UnknownStyle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|style| style.id() == wanted)
            .ok_or_else(|| UnknownStyle(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_canvas_is_narrower() {
        let card = ArtifactStyle::Polaroid.canvas();
        let ticket = ArtifactStyle::Receipt.canvas();
        assert!(ticket.aspect_ratio < card.aspect_ratio);
        assert_eq!(ArtifactStyle::Vault.canvas(), CanvasSpec::CARD);
    }

    #[test]
    fn test_style_ids_parse_back() {
        for style in ArtifactStyle::ALL {
            assert_eq!(style.id().parse::<ArtifactStyle>(), Ok(style));
        }
        assert_eq!("Wax-Envelope".parse(), Ok(ArtifactStyle::WaxEnvelope));
        assert!("hologram".parse::<ArtifactStyle>().is_err());
    }

    #[test]
    fn test_photo_caps_span_zero_to_six() {
        let caps: Vec<usize> = ArtifactStyle::ALL.iter().map(|s| s.max_photos()).collect();
        assert_eq!(caps.iter().min(), Some(&0));
        assert_eq!(caps.iter().max(), Some(&6));
    }

    #[test]
    fn test_serde_ids_match_display() {
        #[derive(Serialize)]
        struct Wrapper {
            style: ArtifactStyle,
        }
        let encoded = toml::to_string(&Wrapper {
            style: ArtifactStyle::BoardingPass,
        })
        .unwrap();
        assert!(encoded.contains("boarding_pass"));
    }
}
