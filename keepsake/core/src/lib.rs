//! Keepsake Core - Journal Artifacts, Rituals and Rendering
//!
//! Turns a journal entry into a styled keepsake: a draft is minted into an
//! immutable record, a short tactile ritual plays while the record renders
//! off-screen, and the finished `(record, image)` pair is handed to an
//! archive. The crate is headless; hosts bring their own scene, haptics and
//! storage through small traits.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       MintFlowController                          │
//! │   Draft ──update_draft──▶ preview DisplayList                     │
//! │     │                                                             │
//! │   commit ──┬──▶ ChoreographyEngine ──phases──▶ Stage, FeedbackSink│
//! │            │                                                      │
//! │            └──▶ ArtifactRenderer ──oneshot──▶ ArtifactImage       │
//! │                      │                             │              │
//! │               TemplateRegistry                  save ──▶ RecordSink
//! │               (style ─▶ Composition ─▶ layout)                    │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Module Overview
//!
//! - [`model`]: drafts, records, styles, decoration
//! - [`composition`]: layout tree, colors and the display list
//! - [`template`]: per-style layout functions and the registry
//! - [`choreography`]: rituals, timelines, the engine and the stage
//! - [`render`]: bitmap rendering
//! - [`mint`]: the draft to saved-artifact flow
//! - [`feedback`], [`archive`]: collaborator traits
//! - [`config`]: TOML and environment configuration
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use keepsake_core::{
//!     ArtifactStyle, DraftPatch, MemoryArchive, MintDependencies, MintFlowController,
//!     MintSettings,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let deps = MintDependencies::new(Arc::new(MemoryArchive::new()));
//!     let mut flow = MintFlowController::new(deps, MintSettings::default());
//!
//!     flow.update_draft(DraftPatch::new().content("First snow").style(ArtifactStyle::Polaroid));
//!     flow.commit().unwrap();
//!     flow.save().await.unwrap();
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]

pub mod archive;
pub mod choreography;
pub mod composition;
pub mod config;
pub mod feedback;
pub mod mint;
pub mod model;
pub mod render;
pub mod template;

// Model exports
pub use model::{
    ArtifactStyle, CanvasSpec, Decoration, DecorationOdds, DecorationRoller, Draft, DraftPatch,
    Mood, Photo, Record, RecordId, StyleFamily, UnknownStyle, Weather, WeatherDetail,
};

// Composition and templates
pub use composition::{Color, Composition, DisplayList, DrawOp, Node};
pub use template::{Template, TemplateRegistry};

// Choreography exports
pub use choreography::{
    ChoreographyEngine, Phase, PhaseCue, Ritual, RitualHandle, RitualState, RitualSummary,
    RitualTimeline, RunOutcome, Stage,
};

// Rendering and flow
pub use archive::{ArchiveError, MemoryArchive, RecordSink};
pub use feedback::{FeedbackEvent, FeedbackSink, NullFeedback, RecordingFeedback};
pub use mint::{MintDependencies, MintError, MintEvent, MintFlowController, MintSettings};
pub use render::{ArtifactImage, ArtifactRenderer, ImageKind, RasterRenderer, RenderError};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigOverrides,
    ConfigSource, KeepsakeConfig, KeepsakeToml,
};
