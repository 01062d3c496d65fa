//! Host scene driven by rituals
//!
//! A [`Stage`] is a bag of named properties. Rituals change targets; hosts
//! sample the eased value at their own frame time. Cloning a stage shares
//! it. After [`Stage::dispose`] every apply is a no-op, which is what makes
//! a phase that races teardown harmless.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::time::Instant;

use super::{Mutation, PhaseAction, PhaseCue, Transition, Value};

#[derive(Debug, Clone)]
struct Track {
    from: Value,
    to: Value,
    started: Instant,
    transition: Transition,
}

impl Track {
    fn at(&self, now: Instant) -> Value {
        let elapsed = now.saturating_duration_since(self.started);
        self.from
            .interpolate(&self.to, self.transition.progress(elapsed))
    }
}

#[derive(Debug, Default)]
struct StageInner {
    tracks: HashMap<String, Track>,
    mutations: usize,
    disposed: bool,
}

/// Shared, disposable property store
#[derive(Debug, Clone, Default)]
pub struct Stage {
    inner: Arc<Mutex<StageInner>>,
}

impl Stage {
    /// Empty stage
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a property without counting it as a mutation
    pub fn set_initial(&self, property: &str, value: impl Into<Value>) {
        let value = value.into();
        let mut inner = self.inner.lock();
        if inner.disposed {
            return;
        }
        inner.tracks.insert(
            property.to_string(),
            Track {
                from: value.clone(),
                to: value,
                started: Instant::now(),
                transition: Transition::SNAP,
            },
        );
    }

    /// Apply a fired phase at the current time
    ///
    /// Returns the number of mutations applied; zero once disposed.
    pub fn apply(&self, cue: &PhaseCue) -> usize {
        self.apply_action(&cue.phase.action, Instant::now())
    }

    /// Apply a phase action at a given time
    pub fn apply_action(&self, action: &PhaseAction, now: Instant) -> usize {
        let mut inner = self.inner.lock();
        if inner.disposed {
            return 0;
        }
        let chosen: &[Mutation] = match action {
            PhaseAction::Hold => &[],
            PhaseAction::Set(mutations) => mutations,
            PhaseAction::Branch {
                when,
                then,
                otherwise,
            } => {
                let current = inner.tracks.get(&when.property).map(|track| track.to.clone());
                if when.holds(current.as_ref()) {
                    then
                } else {
                    otherwise
                }
            }
        };

        for mutation in chosen {
            // Retargeting mid-transition starts from where the value is now
            let from = inner
                .tracks
                .get(&mutation.property)
                .map_or_else(|| mutation.target.clone(), |track| track.at(now));
            inner.tracks.insert(
                mutation.property.clone(),
                Track {
                    from,
                    to: mutation.target.clone(),
                    started: now,
                    transition: mutation.transition,
                },
            );
        }
        inner.mutations += chosen.len();
        chosen.len()
    }

    /// Settled (target) value of a property
    #[must_use]
    pub fn value(&self, property: &str) -> Option<Value> {
        self.inner
            .lock()
            .tracks
            .get(property)
            .map(|track| track.to.clone())
    }

    /// Eased value of a property at `now`
    #[must_use]
    pub fn sample(&self, property: &str, now: Instant) -> Option<Value> {
        self.inner.lock().tracks.get(property).map(|track| track.at(now))
    }

    /// Whether every transition has finished at `now`
    #[must_use]
    pub fn is_settled(&self, now: Instant) -> bool {
        self.inner.lock().tracks.values().all(|track| {
            track
                .transition
                .is_settled(now.saturating_duration_since(track.started))
        })
    }

    /// Total mutations applied
    #[must_use]
    pub fn mutation_count(&self) -> usize {
        self.inner.lock().mutations
    }

    /// Disconnect the stage; later applies do nothing
    pub fn dispose(&self) {
        let mut inner = self.inner.lock();
        inner.disposed = true;
        inner.tracks.clear();
    }

    /// Whether the stage has been disposed
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.inner.lock().disposed
    }
}
