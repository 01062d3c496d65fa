//! Ordering cursor over a ritual
//!
//! Pure and synchronous: callers supply elapsed time, the timeline returns
//! the phases that are now due. The async engine drives it from absolute
//! deadlines; frame-tick hosts can drive it from their own clock.

use std::sync::Arc;
use std::time::Duration;

use super::{PhaseCue, Ritual};

/// Cursor over a ritual's phases
#[derive(Clone, Debug)]
pub struct RitualTimeline {
    ritual: Arc<Ritual>,
    cursor: usize,
}

impl RitualTimeline {
    /// Cursor at the start of a ritual
    #[must_use]
    pub fn new(ritual: Arc<Ritual>) -> Self {
        Self { ritual, cursor: 0 }
    }

    /// The ritual being walked
    #[must_use]
    pub fn ritual(&self) -> &Ritual {
        &self.ritual
    }

    /// Phases due at `elapsed`, in order
    ///
    /// Every phase with an offset at or before `elapsed` that has not been
    /// returned yet is returned now. Time never runs backwards here: a
    /// smaller `elapsed` than before simply returns nothing.
    pub fn advance_to(&mut self, elapsed: Duration) -> Vec<PhaseCue> {
        let phases = self.ritual.phases();
        let total = phases.len();
        let mut due = Vec::new();
        while let Some(phase) = phases.get(self.cursor) {
            if phase.at > elapsed {
                break;
            }
            due.push(PhaseCue {
                index: self.cursor,
                total,
                phase: phase.clone(),
            });
            self.cursor += 1;
        }
        due
    }

    /// Offset of the next phase not yet returned
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.ritual.phases().get(self.cursor).map(|phase| phase.at)
    }

    /// Number of phases returned so far
    #[must_use]
    pub fn fired(&self) -> usize {
        self.cursor
    }

    /// Whether every phase has been returned
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.ritual.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choreography::Phase;

    fn ritual() -> Arc<Ritual> {
        Arc::new(Ritual::new(
            "seal",
            vec![
                Phase::at_ms("press", 0),
                Phase::at_ms("drip", 120),
                Phase::at_ms("stamp", 350),
                Phase::at_ms("settle", 600),
            ],
        ))
    }

    #[test]
    fn test_on_time_advance() {
        let mut timeline = RitualTimeline::new(ritual());
        assert_eq!(timeline.next_deadline(), Some(Duration::ZERO));

        let first = timeline.advance_to(Duration::ZERO);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].phase.label, "press");
        assert_eq!(timeline.next_deadline(), Some(Duration::from_millis(120)));

        assert!(timeline.advance_to(Duration::from_millis(119)).is_empty());
        assert_eq!(timeline.advance_to(Duration::from_millis(120)).len(), 1);
    }

    #[test]
    fn test_late_wake_fires_everything_due_in_order() {
        let mut timeline = RitualTimeline::new(ritual());
        let due = timeline.advance_to(Duration::from_millis(400));
        let labels: Vec<&str> = due.iter().map(|c| c.phase.label.as_str()).collect();
        assert_eq!(labels, ["press", "drip", "stamp"]);
        assert_eq!(due[2].index, 2);
        assert_eq!(timeline.fired(), 3);
        assert!(!timeline.is_finished());

        let rest = timeline.advance_to(Duration::from_secs(5));
        assert!(rest[0].is_last());
        assert!(timeline.is_finished());
        assert_eq!(timeline.next_deadline(), None);
    }

    #[test]
    fn test_empty_ritual_is_finished() {
        let timeline = RitualTimeline::new(Arc::new(Ritual::new("nothing", Vec::new())));
        assert!(timeline.is_finished());
        assert_eq!(timeline.next_deadline(), None);
    }
}
