//! Artifact Model - journal entries as data
//!
//! A [`Draft`] is what the user edits; it has no identity. At mint time the
//! draft is finalized into an immutable [`Record`] with an id, a creation
//! timestamp and a [`Decoration`] rolled exactly once.
//!
//! # Lifecycle
//!
//! ```text
//! Draft ──update(patch)──▶ Draft ──finalize(id, decoration)──▶ Record (frozen)
//! ```

pub mod decoration;
pub mod photo;
pub mod style;

use std::fmt;

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use decoration::{Decoration, DecorationOdds, DecorationRoller};
pub use photo::Photo;
pub use style::{ArtifactStyle, CanvasSpec, StyleFamily, UnknownStyle};

/// Opaque record identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Generate a fresh identifier
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Identifier used by draft previews, which have no identity yet
    #[must_use]
    pub const fn draft() -> Self {
        Self(Uuid::nil())
    }

    /// Whether this is the draft placeholder id
    #[must_use]
    pub fn is_draft(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the day felt
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    /// Bright and happy
    Joyful,
    /// Calm and content
    Peaceful,
    /// Nothing in particular
    #[default]
    Neutral,
    /// Looking back
    Nostalgic,
    /// Low and quiet
    Melancholy,
    /// Restless
    Anxious,
    /// Thankful
    Grateful,
    /// Full of energy
    Energetic,
}

impl Mood {
    /// All moods in picker order
    pub const ALL: [Mood; 8] = [
        Self::Joyful,
        Self::Peaceful,
        Self::Neutral,
        Self::Nostalgic,
        Self::Melancholy,
        Self::Anxious,
        Self::Grateful,
        Self::Energetic,
    ];

    /// Lowercase label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Joyful => "joyful",
            Self::Peaceful => "peaceful",
            Self::Neutral => "neutral",
            Self::Nostalgic => "nostalgic",
            Self::Melancholy => "melancholy",
            Self::Anxious => "anxious",
            Self::Grateful => "grateful",
            Self::Energetic => "energetic",
        }
    }

    /// Single glyph shown on compact templates
    #[must_use]
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Joyful => "\u{263a}",
            Self::Peaceful => "\u{2601}",
            Self::Neutral => "\u{25cb}",
            Self::Nostalgic => "\u{231b}",
            Self::Melancholy => "\u{2602}",
            Self::Anxious => "\u{26a1}",
            Self::Grateful => "\u{2661}",
            Self::Energetic => "\u{2604}",
        }
    }
}

impl std::str::FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|mood| mood.label() == wanted)
            .ok_or_else(|| format!("unknown mood: {s}"))
    }
}

/// Weather on the day of the entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    /// Clear sky
    Sunny,
    /// Overcast
    Cloudy,
    /// Rain
    Rainy,
    /// Thunderstorms
    Stormy,
    /// Snow
    Snowy,
    /// Fog or mist
    Foggy,
    /// Strong wind
    Windy,
}

impl Weather {
    /// All weather kinds
    pub const ALL: [Weather; 7] = [
        Self::Sunny,
        Self::Cloudy,
        Self::Rainy,
        Self::Stormy,
        Self::Snowy,
        Self::Foggy,
        Self::Windy,
    ];

    /// Lowercase label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sunny => "sunny",
            Self::Cloudy => "cloudy",
            Self::Rainy => "rainy",
            Self::Stormy => "stormy",
            Self::Snowy => "snowy",
            Self::Foggy => "foggy",
            Self::Windy => "windy",
        }
    }
}

impl std::str::FromStr for Weather {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|weather| weather.label() == wanted)
            .ok_or_else(|| format!("unknown weather: {s}"))
    }
}

/// Optional measured weather detail
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct WeatherDetail {
    /// Temperature in degrees Celsius
    pub temperature_c: Option<f32>,
    /// Air quality index
    pub air_quality_index: Option<u16>,
}

impl WeatherDetail {
    /// Short human label, e.g. `"21°C · AQI 42"`
    #[must_use]
    pub fn summary(&self) -> Option<String> {
        let parts: Vec<String> = [
            self.temperature_c.map(|t| format!("{t:.0}\u{b0}C")),
            self.air_quality_index.map(|aqi| format!("AQI {aqi}")),
        ]
        .into_iter()
        .flatten()
        .collect();

        (!parts.is_empty()).then(|| parts.join(" \u{b7} "))
    }
}

/// A finalized journal entry
///
/// Records are produced by [`Draft::finalize`] and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique id, assigned at mint
    pub id: RecordId,
    /// Calendar date the entry is about
    pub date: NaiveDate,
    /// When the record was minted
    pub created_at: DateTime<Utc>,
    /// Free-form text
    pub content: String,
    /// Mood of the day
    pub mood: Mood,
    /// Photos in display order
    pub photos: Vec<Photo>,
    /// Weather kind
    pub weather: Option<Weather>,
    /// Measured weather detail
    pub weather_detail: Option<WeatherDetail>,
    /// Selected template
    pub style: ArtifactStyle,
    /// Cosmetic extras rolled at mint
    pub decoration: Decoration,
}

impl Record {
    /// Photos the record's style actually displays
    #[must_use]
    pub fn visible_photos(&self) -> &[Photo] {
        let cap = self.style.max_photos().min(self.photos.len());
        &self.photos[..cap]
    }

    /// Whether this record is a draft preview rather than a minted record
    #[must_use]
    pub fn is_preview(&self) -> bool {
        self.id.is_draft()
    }
}

/// An entry being edited
#[derive(Clone, Debug, PartialEq)]
pub struct Draft {
    /// Calendar date the entry is about
    pub date: NaiveDate,
    /// Free-form text
    pub content: String,
    /// Mood of the day
    pub mood: Mood,
    /// Photos in display order (uncapped while editing)
    pub photos: Vec<Photo>,
    /// Weather kind
    pub weather: Option<Weather>,
    /// Measured weather detail
    pub weather_detail: Option<WeatherDetail>,
    /// Selected template
    pub style: ArtifactStyle,
    /// Decoration from the current mint, if one happened
    ///
    /// Set by the first commit and kept across later edits, so re-commits
    /// reuse it. Cleared only by an explicit redo.
    pub decoration: Option<Decoration>,
}

impl Draft {
    /// Empty draft dated today (local time)
    #[must_use]
    pub fn new() -> Self {
        Self::dated(Local::now().date_naive())
    }

    /// Empty draft for a specific date
    #[must_use]
    pub fn dated(date: NaiveDate) -> Self {
        Self {
            date,
            content: String::new(),
            mood: Mood::default(),
            photos: Vec::new(),
            weather: None,
            weather_detail: None,
            style: ArtifactStyle::default(),
            decoration: None,
        }
    }

    /// Apply a partial update
    pub fn apply(&mut self, patch: DraftPatch) {
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(mood) = patch.mood {
            self.mood = mood;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(weather) = patch.weather {
            self.weather = weather;
        }
        if let Some(detail) = patch.weather_detail {
            self.weather_detail = detail;
        }
        if let Some(style) = patch.style {
            self.style = style;
        }
        if let Some(photos) = patch.photos {
            self.photos = photos;
        }
        self.photos.extend(patch.added_photos);
    }

    /// Preview view of the draft, for layout only
    ///
    /// Uses the draft's decoration if a mint already rolled one, otherwise
    /// no decoration at all. Never rolls.
    #[must_use]
    pub fn preview(&self) -> Record {
        self.to_record(
            RecordId::draft(),
            self.decoration.clone().unwrap_or_default(),
            Utc::now(),
        )
    }

    /// Freeze the draft into a record
    #[must_use]
    pub fn finalize(&self, id: RecordId, decoration: Decoration) -> Record {
        self.to_record(id, decoration, Utc::now())
    }

    fn to_record(&self, id: RecordId, decoration: Decoration, created_at: DateTime<Utc>) -> Record {
        Record {
            id,
            date: self.date,
            created_at,
            content: self.content.clone(),
            mood: self.mood,
            photos: self.photos.clone(),
            weather: self.weather,
            weather_detail: self.weather_detail,
            style: self.style,
            decoration,
        }
    }
}

impl Default for Draft {
    fn default() -> Self {
        Self::new()
    }
}

/// Partial draft update
///
/// `None` leaves a field untouched. Optional fields use a nested `Option` so
/// they can be cleared (`Some(None)`).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DraftPatch {
    /// New text
    pub content: Option<String>,
    /// New mood
    pub mood: Option<Mood>,
    /// New date
    pub date: Option<NaiveDate>,
    /// New weather (or cleared)
    pub weather: Option<Option<Weather>>,
    /// New weather detail (or cleared)
    pub weather_detail: Option<Option<WeatherDetail>>,
    /// New style
    pub style: Option<ArtifactStyle>,
    /// Replacement photo list
    pub photos: Option<Vec<Photo>>,
    /// Photos appended after any replacement
    pub added_photos: Vec<Photo>,
}

impl DraftPatch {
    /// Empty patch
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set content
    #[must_use]
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Set mood
    #[must_use]
    pub fn mood(mut self, mood: Mood) -> Self {
        self.mood = Some(mood);
        self
    }

    /// Set date
    #[must_use]
    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Set or clear weather
    #[must_use]
    pub fn weather(mut self, weather: Option<Weather>) -> Self {
        self.weather = Some(weather);
        self
    }

    /// Set or clear weather detail
    #[must_use]
    pub fn weather_detail(mut self, detail: Option<WeatherDetail>) -> Self {
        self.weather_detail = Some(detail);
        self
    }

    /// Set style
    #[must_use]
    pub fn style(mut self, style: ArtifactStyle) -> Self {
        self.style = Some(style);
        self
    }

    /// Replace all photos
    #[must_use]
    pub fn photos(mut self, photos: Vec<Photo>) -> Self {
        self.photos = Some(photos);
        self
    }

    /// Append one photo
    #[must_use]
    pub fn add_photo(mut self, photo: Photo) -> Self {
        self.added_photos.push(photo);
        self
    }

    /// Whether the patch changes nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_applies_only_given_fields() {
        let mut draft = Draft::dated(NaiveDate::from_ymd_opt(2026, 1, 2).unwrap());
        draft.apply(DraftPatch::new().content("first snow").mood(Mood::Peaceful));

        assert_eq!(draft.content, "first snow");
        assert_eq!(draft.mood, Mood::Peaceful);
        assert_eq!(draft.style, ArtifactStyle::Simple);

        draft.apply(DraftPatch::new().weather(Some(Weather::Snowy)));
        assert_eq!(draft.content, "first snow");
        assert_eq!(draft.weather, Some(Weather::Snowy));

        draft.apply(DraftPatch::new().weather(None));
        assert_eq!(draft.weather, None);
    }

    #[test]
    fn test_photo_replacement_then_append() {
        let mut draft = Draft::new();
        draft.apply(DraftPatch::new().add_photo(Photo::new(vec![1])));
        draft.apply(
            DraftPatch::new()
                .photos(vec![Photo::new(vec![2])])
                .add_photo(Photo::new(vec![3])),
        );
        let bytes: Vec<u8> = draft.photos.iter().map(|p| p.bytes()[0]).collect();
        assert_eq!(bytes, vec![2, 3]);
    }

    #[test]
    fn test_visible_photos_truncate_to_style_cap() {
        let mut draft = Draft::new();
        let photos: Vec<Photo> = (0..8u8).map(|i| Photo::new(vec![i])).collect();
        draft.apply(DraftPatch::new().photos(photos).style(ArtifactStyle::ContactSheet));
        let record = draft.finalize(RecordId::new(), Decoration::none());
        assert_eq!(record.photos.len(), 8);
        assert_eq!(record.visible_photos().len(), 6);

        let mut telegram = draft.clone();
        telegram.style = ArtifactStyle::Telegram;
        assert!(telegram.preview().visible_photos().is_empty());
    }

    #[test]
    fn test_preview_never_rolls_decoration() {
        let draft = Draft::new();
        let preview = draft.preview();
        assert!(preview.is_preview());
        assert!(preview.decoration.is_plain());
    }

    #[test]
    fn test_weather_detail_summary() {
        let detail = WeatherDetail {
            temperature_c: Some(21.4),
            air_quality_index: Some(42),
        };
        assert_eq!(detail.summary().as_deref(), Some("21\u{b0}C \u{b7} AQI 42"));
        assert_eq!(WeatherDetail::default().summary(), None);
    }

    #[test]
    fn test_empty_patch() {
        assert!(DraftPatch::new().is_empty());
        assert!(!DraftPatch::new().mood(Mood::Anxious).is_empty());
    }
}
