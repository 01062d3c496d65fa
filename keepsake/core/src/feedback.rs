//! Haptic and audio feedback collaborator
//!
//! Rituals attach [`FeedbackEvent`]s to phases; the engine hands them to a
//! [`FeedbackSink`] as each phase fires. Sinks are fire-and-forget: they
//! must not block and cannot fail the ritual.

use std::fmt;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// A haptic or sound cue
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackEvent {
    /// Heavy tap
    HeavyImpact,
    /// Medium tap
    MediumImpact,
    /// Light tap
    LightImpact,
    /// Sharp, stiff tap
    RigidImpact,
    /// Dull, soft tap
    SoftImpact,
    /// Completion pattern
    Success,
    /// Warning pattern
    Warning,
    /// Detent tick
    SelectionChanged,
    /// Named sound asset
    Sound(String),
}

impl FeedbackEvent {
    /// Stable identifier
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::HeavyImpact => "heavy_impact",
            Self::MediumImpact => "medium_impact",
            Self::LightImpact => "light_impact",
            Self::RigidImpact => "rigid_impact",
            Self::SoftImpact => "soft_impact",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::SelectionChanged => "selection_changed",
            Self::Sound(name) => name,
        }
    }

    /// Whether the cue is audible rather than haptic
    #[must_use]
    pub fn is_sound(&self) -> bool {
        matches!(self, Self::Sound(_))
    }
}

impl fmt::Display for FeedbackEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sound(name) => write!(f, "sound:{name}"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Receiver of feedback cues
pub trait FeedbackSink: Send + Sync {
    /// Play a cue. Must return promptly.
    fn notify(&self, event: FeedbackEvent);
}

/// Sink that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullFeedback;

impl FeedbackSink for NullFeedback {
    fn notify(&self, _event: FeedbackEvent) {}
}

/// Sink that remembers every cue in order
#[derive(Debug, Default)]
pub struct RecordingFeedback {
    events: Mutex<Vec<FeedbackEvent>>,
}

impl RecordingFeedback {
    /// Empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cues received so far
    #[must_use]
    pub fn events(&self) -> Vec<FeedbackEvent> {
        self.events.lock().clone()
    }

    /// Number of cues received
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether nothing was received
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl FeedbackSink for RecordingFeedback {
    fn notify(&self, event: FeedbackEvent) {
        self.events.lock().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_keeps_order() {
        let sink = RecordingFeedback::new();
        sink.notify(FeedbackEvent::HeavyImpact);
        sink.notify(FeedbackEvent::Sound("tear".to_string()));
        sink.notify(FeedbackEvent::Success);

        assert_eq!(
            sink.events(),
            vec![
                FeedbackEvent::HeavyImpact,
                FeedbackEvent::Sound("tear".to_string()),
                FeedbackEvent::Success,
            ]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(FeedbackEvent::RigidImpact.to_string(), "rigid_impact");
        assert_eq!(FeedbackEvent::Sound("click".into()).to_string(), "sound:click");
        assert!(FeedbackEvent::Sound("click".into()).is_sound());
    }
}
