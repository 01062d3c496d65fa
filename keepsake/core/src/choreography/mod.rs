//! Ritual choreography
//!
//! A [`Ritual`] is a named list of timed [`Phase`]s. Each phase starts at a
//! fixed offset from the trigger, changes properties on the host scene
//! (directly or through a conditional [`PhaseAction::Branch`]) and may cue
//! feedback.
//!
//! # Pieces
//!
//! ```text
//!   Ritual ──► RitualTimeline ──► ChoreographyEngine ──► on_phase(cue)
//!   (data)     (ordering cursor)   (async driver,          │
//!                                   single flight)         ▼
//!                                                        Stage::apply
//! ```
//!
//! The timeline is the single ordering authority. The engine only sleeps
//! until the timeline's next absolute deadline and hands out whatever is
//! due, so a late wake-up fires every overdue phase in order.

mod engine;
pub mod library;
mod stage;
mod timeline;
mod timing;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use engine::{
    ChoreographyEngine, RitualHandle, RitualState, RitualSummary, RunOutcome, DEFAULT_WATCHDOG_GRACE,
};
pub use stage::Stage;
pub use timeline::RitualTimeline;
pub use timing::{Easing, Transition};

use crate::composition::Color;
use crate::feedback::FeedbackEvent;

/// A property value on the stage
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Scalar (opacity, scale, angle, offset)
    Number(f32),
    /// Switch
    Flag(bool),
    /// Color
    Color(Color),
    /// Label
    Text(String),
}

impl Value {
    /// Value part-way from `self` to `to` at eased progress `t`
    ///
    /// Numbers and colors interpolate; flags and text switch once the
    /// transition completes.
    #[must_use]
    pub fn interpolate(&self, to: &Value, t: f32) -> Value {
        match (self, to) {
            (Value::Number(a), Value::Number(b)) => Value::Number(a + (b - a) * t),
            (Value::Color(a), Value::Color(b)) => Value::Color(a.lerp(*b, t)),
            _ if t >= 1.0 => to.clone(),
            _ => self.clone(),
        }
    }

    /// Scalar view, if numeric
    #[must_use]
    pub fn as_number(&self) -> Option<f32> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Flag view, if boolean
    #[must_use]
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Value::Flag(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Flag(b)
    }
}

impl From<Color> for Value {
    fn from(c: Color) -> Self {
        Value::Color(c)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

/// Set one property to a target value
#[derive(Clone, Debug, PartialEq)]
pub struct Mutation {
    /// Property name
    pub property: String,
    /// Target value
    pub target: Value,
    /// How to get there
    pub transition: Transition,
}

impl Mutation {
    /// Construct a mutation
    pub fn new(property: impl Into<String>, target: impl Into<Value>, transition: Transition) -> Self {
        Self {
            property: property.into(),
            target: target.into(),
            transition,
        }
    }
}

/// Test applied to a stage property
#[derive(Clone, Debug, PartialEq)]
pub enum Comparison {
    /// Property is set at all
    IsSet,
    /// Property equals a value
    Equals(Value),
    /// Numeric property is at least a threshold
    AtLeast(f32),
    /// Numeric property is below a threshold
    Below(f32),
}

/// Condition inspected on the host scene when a branch phase fires
#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    /// Property to inspect
    pub property: String,
    /// Test to apply
    pub comparison: Comparison,
}

impl Condition {
    /// Condition on a property
    pub fn new(property: impl Into<String>, comparison: Comparison) -> Self {
        Self {
            property: property.into(),
            comparison,
        }
    }

    /// Evaluate against the property's current value
    #[must_use]
    pub fn holds(&self, value: Option<&Value>) -> bool {
        match (&self.comparison, value) {
            (Comparison::IsSet, v) => v.is_some(),
            (Comparison::Equals(expected), Some(v)) => expected == v,
            (Comparison::AtLeast(threshold), Some(v)) => {
                v.as_number().is_some_and(|n| n >= *threshold)
            }
            (Comparison::Below(threshold), Some(v)) => {
                v.as_number().is_some_and(|n| n < *threshold)
            }
            (_, None) => false,
        }
    }
}

/// What a phase does to the stage
#[derive(Clone, Debug, PartialEq, Default)]
pub enum PhaseAction {
    /// Nothing; a pure delay or feedback-only phase
    #[default]
    Hold,
    /// Apply mutations
    Set(Vec<Mutation>),
    /// Pick one of two mutation sets by inspecting the stage
    Branch {
        /// Condition evaluated when the phase fires
        when: Condition,
        /// Applied when the condition holds
        then: Vec<Mutation>,
        /// Applied otherwise
        otherwise: Vec<Mutation>,
    },
}

/// One timed step of a ritual
#[derive(Clone, Debug, PartialEq)]
pub struct Phase {
    /// Short name for logs
    pub label: String,
    /// Offset from the trigger
    pub at: Duration,
    /// Stage change
    pub action: PhaseAction,
    /// Cue played when the phase fires
    pub feedback: Option<FeedbackEvent>,
}

impl Phase {
    /// Empty phase at an offset in milliseconds
    pub fn at_ms(label: impl Into<String>, ms: u64) -> Self {
        Self {
            label: label.into(),
            at: Duration::from_millis(ms),
            action: PhaseAction::Hold,
            feedback: None,
        }
    }

    /// Add a mutation
    ///
    /// Turns a hold into a set. On a branch phase this is ignored with a
    /// debug log, since the branch owns the phase's mutations.
    #[must_use]
    pub fn set(mut self, property: &str, target: impl Into<Value>, transition: Transition) -> Self {
        let mutation = Mutation::new(property, target, transition);
        match &mut self.action {
            PhaseAction::Hold => self.action = PhaseAction::Set(vec![mutation]),
            PhaseAction::Set(mutations) => mutations.push(mutation),
            PhaseAction::Branch { .. } => {
                tracing::debug!(phase = %self.label, property, "Ignoring set on branch phase");
            }
        }
        self
    }

    /// Make the phase a conditional branch
    #[must_use]
    pub fn branch(mut self, when: Condition, then: Vec<Mutation>, otherwise: Vec<Mutation>) -> Self {
        self.action = PhaseAction::Branch {
            when,
            then,
            otherwise,
        };
        self
    }

    /// Attach a feedback cue
    #[must_use]
    pub fn feedback(mut self, event: FeedbackEvent) -> Self {
        self.feedback = Some(event);
        self
    }
}

/// Named, time-ordered list of phases
#[derive(Clone, Debug, PartialEq)]
pub struct Ritual {
    name: String,
    phases: Vec<Phase>,
}

impl Ritual {
    /// Build a ritual; phases are stable-sorted by offset
    pub fn new(name: impl Into<String>, mut phases: Vec<Phase>) -> Self {
        phases.sort_by_key(|phase| phase.at);
        Self {
            name: name.into(),
            phases,
        }
    }

    /// Ritual name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Phases in firing order
    #[must_use]
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Number of phases
    #[must_use]
    pub fn len(&self) -> usize {
        self.phases.len()
    }

    /// Whether the ritual has no phases
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Offset of the last phase
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.phases.last().map_or(Duration::ZERO, |phase| phase.at)
    }
}

/// A phase handed to the host as it fires
#[derive(Clone, Debug, PartialEq)]
pub struct PhaseCue {
    /// Position in the ritual
    pub index: usize,
    /// Phase count of the ritual
    pub total: usize,
    /// The phase itself
    pub phase: Phase,
}

impl PhaseCue {
    /// Whether this is the final phase
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.index + 1 == self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phases_sort_stably_by_offset() {
        let ritual = Ritual::new(
            "shuffle",
            vec![
                Phase::at_ms("c", 300),
                Phase::at_ms("a1", 0),
                Phase::at_ms("b", 100),
                Phase::at_ms("a2", 0),
            ],
        );
        let labels: Vec<&str> = ritual.phases().iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, ["a1", "a2", "b", "c"]);
        assert_eq!(ritual.duration(), Duration::from_millis(300));
    }

    #[test]
    fn test_set_accumulates_mutations() {
        let phase = Phase::at_ms("press", 0)
            .set("scale", 0.9, Transition::SNAP)
            .set("shadow", 0.2, Transition::SNAP);
        let PhaseAction::Set(mutations) = phase.action else {
            panic!("expected set");
        };
        assert_eq!(mutations.len(), 2);
    }

    #[test]
    fn test_condition_checks() {
        let at_least = Condition::new("dial", Comparison::AtLeast(240.0));
        assert!(at_least.holds(Some(&Value::Number(240.0))));
        assert!(!at_least.holds(Some(&Value::Number(10.0))));
        assert!(!at_least.holds(Some(&Value::Flag(true))));
        assert!(!at_least.holds(None));

        let equals = Condition::new("sealed", Comparison::Equals(Value::Flag(true)));
        assert!(equals.holds(Some(&Value::Flag(true))));
        assert!(Condition::new("x", Comparison::IsSet).holds(Some(&Value::Text("y".into()))));
    }

    #[test]
    fn test_value_interpolation() {
        let mid = Value::Number(0.0).interpolate(&Value::Number(10.0), 0.5);
        assert_eq!(mid, Value::Number(5.0));
        assert_eq!(
            Value::Flag(false).interpolate(&Value::Flag(true), 0.5),
            Value::Flag(false)
        );
        assert_eq!(
            Value::Flag(false).interpolate(&Value::Flag(true), 1.0),
            Value::Flag(true)
        );
    }
}
