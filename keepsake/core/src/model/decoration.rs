//! Randomized cosmetic extras
//!
//! A [`Decoration`] is rolled once per mint by the [`DecorationRoller`] and
//! then frozen into the record. Layout and rendering only read it, so
//! re-rendering a record never changes its stickers or seal angle.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::style::ArtifactStyle;
use super::RecordId;
use crate::composition::Color;

/// Sticker glyphs a decoration may draw from
pub const STICKER_GLYPHS: [&str; 10] = [
    "\u{2740}", // florette
    "\u{2605}", // star
    "\u{263e}", // crescent
    "\u{2665}", // heart
    "\u{2600}", // sun
    "\u{2709}", // envelope
    "\u{266a}", // note
    "\u{2618}", // shamrock
    "\u{2702}", // scissors
    "\u{273f}", // flower
];

/// Background overrides a decoration may pick
pub const BACKGROUND_PALETTE: [Color; 6] = [
    Color::rgb(246, 226, 222),
    Color::rgb(225, 236, 244),
    Color::rgb(232, 240, 224),
    Color::rgb(248, 238, 214),
    Color::rgb(236, 228, 246),
    Color::rgb(240, 240, 236),
];

/// Cosmetic metadata attached to a record at mint time
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Decoration {
    /// Payload encoded into a QR block
    pub qr_payload: Option<String>,
    /// Sticker glyphs scattered on the artifact
    pub stickers: Option<Vec<String>>,
    /// Wax seal rotation in degrees
    pub seal_rotation: Option<f32>,
    /// Replacement for the template's background color
    pub background: Option<Color>,
}

impl Decoration {
    /// Decoration with every extra absent
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether no extra is present
    #[must_use]
    pub fn is_plain(&self) -> bool {
        self.qr_payload.is_none()
            && self.stickers.is_none()
            && self.seal_rotation.is_none()
            && self.background.is_none()
    }
}

/// Probability table for decoration extras
///
/// This is the only table in the crate; previews and mints both read
/// decorations produced from it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecorationOdds {
    /// Chance of a QR payload (0.0 - 1.0)
    pub qr_chance: f64,
    /// Chance of a sticker set (0.0 - 1.0)
    pub sticker_chance: f64,
    /// Maximum stickers in one set (at least 1 when stickers roll)
    pub max_stickers: usize,
    /// Seal rotation is drawn from `-max..=max` degrees
    pub seal_rotation_max_deg: f32,
    /// Chance of a background override (0.0 - 1.0)
    pub background_chance: f64,
}

impl Default for DecorationOdds {
    fn default() -> Self {
        Self {
            qr_chance: 0.35,
            sticker_chance: 0.5,
            max_stickers: 3,
            seal_rotation_max_deg: 18.0,
            background_chance: 0.25,
        }
    }
}

/// Generates decorations from a [`DecorationOdds`] table
///
/// The RNG is owned by the roller so callers can inject a seeded one for
/// reproducible mints.
#[derive(Debug)]
pub struct DecorationRoller {
    odds: DecorationOdds,
    rng: StdRng,
}

impl DecorationRoller {
    /// Roller backed by OS entropy
    #[must_use]
    pub fn new(odds: DecorationOdds) -> Self {
        Self {
            odds,
            rng: StdRng::from_entropy(),
        }
    }

    /// Roller with a fixed seed
    #[must_use]
    pub fn seeded(odds: DecorationOdds, seed: u64) -> Self {
        Self {
            odds,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Current odds
    #[must_use]
    pub fn odds(&self) -> &DecorationOdds {
        &self.odds
    }

    /// Roll a decoration for a record about to be minted
    pub fn roll(&mut self, id: RecordId, style: ArtifactStyle, date: NaiveDate) -> Decoration {
        let odds = self.odds.clone();
        let rng = &mut self.rng;

        let qr_payload = rng.gen_bool(odds.qr_chance.clamp(0.0, 1.0)).then(|| {
            let short = id.to_string();
            format!(
                "keepsake:{}:{}",
                date.format("%Y%m%d"),
                short.get(..8).unwrap_or(&short)
            )
        });

        let stickers = (odds.max_stickers > 0
            && rng.gen_bool(odds.sticker_chance.clamp(0.0, 1.0)))
        .then(|| {
            let count = rng.gen_range(1..=odds.max_stickers.min(STICKER_GLYPHS.len()));
            STICKER_GLYPHS
                .choose_multiple(&mut *rng, count)
                .map(|glyph| (*glyph).to_string())
                .collect::<Vec<_>>()
        });

        let seal_rotation = style.has_seal().then(|| {
            let max = odds.seal_rotation_max_deg.abs();
            if max == 0.0 {
                0.0
            } else {
                rng.gen_range(-max..=max)
            }
        });

        let background = rng
            .gen_bool(odds.background_chance.clamp(0.0, 1.0))
            .then(|| BACKGROUND_PALETTE.choose(&mut *rng).copied())
            .flatten();

        Decoration {
            qr_payload,
            stickers,
            seal_rotation,
            background,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    #[test]
    fn test_seeded_rolls_repeat() {
        let id = RecordId::new();
        let mut a = DecorationRoller::seeded(DecorationOdds::default(), 7);
        let mut b = DecorationRoller::seeded(DecorationOdds::default(), 7);
        assert_eq!(
            a.roll(id, ArtifactStyle::WaxEnvelope, date()),
            b.roll(id, ArtifactStyle::WaxEnvelope, date())
        );
    }

    #[test]
    fn test_certain_odds_fill_everything() {
        let odds = DecorationOdds {
            qr_chance: 1.0,
            sticker_chance: 1.0,
            max_stickers: 3,
            seal_rotation_max_deg: 10.0,
            background_chance: 1.0,
        };
        let mut roller = DecorationRoller::seeded(odds, 1);
        let decoration = roller.roll(RecordId::new(), ArtifactStyle::Vault, date());

        let payload = decoration.qr_payload.unwrap();
        assert!(payload.starts_with("keepsake:20260314:"));
        let stickers = decoration.stickers.unwrap();
        assert!((1..=3).contains(&stickers.len()));
        let angle = decoration.seal_rotation.unwrap();
        assert!((-10.0..=10.0).contains(&angle));
        assert!(decoration.background.is_some());
    }

    #[test]
    fn test_zero_odds_stay_plain() {
        let odds = DecorationOdds {
            qr_chance: 0.0,
            sticker_chance: 0.0,
            max_stickers: 3,
            seal_rotation_max_deg: 10.0,
            background_chance: 0.0,
        };
        let mut roller = DecorationRoller::seeded(odds, 1);
        // No seal on a polaroid, so nothing at all
        let decoration = roller.roll(RecordId::new(), ArtifactStyle::Polaroid, date());
        assert!(decoration.is_plain());
    }
}
