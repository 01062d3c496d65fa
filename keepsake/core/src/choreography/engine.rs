//! Single-flight ritual driver
//!
//! One engine serves one trigger surface. [`ChoreographyEngine::run`] spawns
//! a task that sleeps until each absolute phase deadline (`start + at`),
//! asks the [`RitualTimeline`] what is due, and fires it. A second trigger
//! while a run is in flight is ignored.
//!
//! # Cancellation
//!
//! Every callback runs under the run's gate. Cancelling takes the same gate
//! and flips the cancelled flag, so once `cancel()` returns neither
//! `on_phase` nor `on_complete` runs again for that run. The gate is
//! reentrant so a callback may cancel its own run.
//!
//! # Watchdog
//!
//! A run that has not finished by `duration + watchdog_grace` (a stalled
//! host, a starved runtime) is force-completed: remaining phases are
//! skipped and `on_complete` receives a summary with `forced = true`.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, ReentrantMutex};
use tokio::task::AbortHandle;
use tokio::time::{sleep_until, timeout_at, Instant};

use super::{PhaseCue, Ritual, RitualTimeline};
use crate::feedback::FeedbackSink;

/// Default allowance past a ritual's last phase before the watchdog fires
pub const DEFAULT_WATCHDOG_GRACE: Duration = Duration::from_secs(2);

/// Lifecycle of one ritual run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RitualState {
    /// Not started
    Idle,
    /// Started; the count is phases fired so far
    Running(usize),
    /// Finished and `on_complete` delivered
    Completed,
    /// Torn down before completion
    Cancelled,
}

impl RitualState {
    /// Whether the run can no longer change
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for RitualState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Running(n) => write!(f, "running({n})"),
            Self::Completed => f.write_str("completed"),
            Self::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Handed to `on_complete`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RitualSummary {
    /// Ritual name
    pub name: String,
    /// Phases that fired
    pub phases_fired: usize,
    /// Phases in the ritual
    pub phases_total: usize,
    /// Time from trigger to completion
    pub elapsed: Duration,
    /// Whether the watchdog cut the run short
    pub forced: bool,
}

/// Result of a trigger
#[derive(Debug)]
pub enum RunOutcome {
    /// A new run is in flight
    Started(RitualHandle),
    /// A run was already in flight (or no runtime was available)
    Ignored,
}

impl RunOutcome {
    /// Whether the trigger started a run
    #[must_use]
    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started(_))
    }

    /// The handle, if a run started
    #[must_use]
    pub fn handle(self) -> Option<RitualHandle> {
        match self {
            Self::Started(handle) => Some(handle),
            Self::Ignored => None,
        }
    }
}

struct RunShared {
    id: u64,
    name: String,
    state: Mutex<RitualState>,
    cancelled: AtomicBool,
    gate: ReentrantMutex<()>,
    abort: Mutex<Option<AbortHandle>>,
}

impl RunShared {
    fn cancel(&self) -> bool {
        let _gate = self.gate.lock();
        let mut state = self.state.lock();
        if state.is_terminal() {
            return false;
        }
        self.cancelled.store(true, Ordering::Release);
        *state = RitualState::Cancelled;
        drop(state);
        if let Some(abort) = self.abort.lock().take() {
            abort.abort();
        }
        tracing::debug!(run = self.id, ritual = %self.name, "Ritual cancelled");
        true
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Handle to an in-flight run
#[derive(Clone)]
pub struct RitualHandle {
    shared: Arc<RunShared>,
}

impl RitualHandle {
    /// Current state
    #[must_use]
    pub fn state(&self) -> RitualState {
        *self.shared.state.lock()
    }

    /// Cancel the run; returns false if it had already finished
    pub fn cancel(&self) -> bool {
        self.shared.cancel()
    }

    /// Run identifier, unique per engine
    #[must_use]
    pub fn id(&self) -> u64 {
        self.shared.id
    }

    /// Ritual name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.shared.name
    }
}

impl fmt::Debug for RitualHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RitualHandle")
            .field("id", &self.shared.id)
            .field("name", &self.shared.name)
            .field("state", &self.state())
            .finish()
    }
}

type Slot = Arc<Mutex<Option<Arc<RunShared>>>>;

/// Runs rituals for one trigger surface, one at a time
pub struct ChoreographyEngine {
    feedback: Arc<dyn FeedbackSink>,
    watchdog_grace: Duration,
    current: Slot,
    next_id: AtomicU64,
}

impl ChoreographyEngine {
    /// Engine cueing feedback into `feedback`
    #[must_use]
    pub fn new(feedback: Arc<dyn FeedbackSink>) -> Self {
        Self {
            feedback,
            watchdog_grace: DEFAULT_WATCHDOG_GRACE,
            current: Arc::new(Mutex::new(None)),
            next_id: AtomicU64::new(1),
        }
    }

    /// Override the watchdog allowance
    #[must_use]
    pub fn with_watchdog_grace(mut self, grace: Duration) -> Self {
        self.watchdog_grace = grace;
        self
    }

    /// Play a ritual
    ///
    /// `on_phase` is called for every phase in order, after its feedback
    /// cue. `on_complete` is called once, after the last phase. Neither is
    /// called after the run is cancelled. Must be called from within a
    /// Tokio runtime; without one the trigger is ignored.
    pub fn run<P, C>(&self, ritual: Ritual, mut on_phase: P, on_complete: C) -> RunOutcome
    where
        P: FnMut(&PhaseCue) + Send + 'static,
        C: FnOnce(RitualSummary) + Send + 'static,
    {
        let mut slot = self.current.lock();
        if let Some(active) = slot.as_ref() {
            if !active.state.lock().is_terminal() {
                tracing::debug!(
                    ritual = %ritual.name(),
                    active = %active.name,
                    "Ritual already in flight, ignoring trigger"
                );
                return RunOutcome::Ignored;
            }
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(ritual = %ritual.name(), "No async runtime, ritual not played");
            return RunOutcome::Ignored;
        };

        let shared = Arc::new(RunShared {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            name: ritual.name().to_string(),
            state: Mutex::new(RitualState::Running(0)),
            cancelled: AtomicBool::new(false),
            gate: ReentrantMutex::new(()),
            abort: Mutex::new(None),
        });
        *slot = Some(Arc::clone(&shared));
        drop(slot);

        tracing::info!(
            run = shared.id,
            ritual = %shared.name,
            phases = ritual.len(),
            duration_ms = ritual.duration().as_millis() as u64,
            "Ritual started"
        );

        let start = Instant::now();
        let ritual = Arc::new(ritual);
        let task_shared = Arc::clone(&shared);
        let slot = Arc::clone(&self.current);
        let feedback = Arc::clone(&self.feedback);
        let grace = self.watchdog_grace;

        let task = runtime.spawn(async move {
            let run = task_shared;
            let total = ritual.len();
            let budget = ritual.duration() + grace;
            let mut timeline = RitualTimeline::new(Arc::clone(&ritual));

            let drive = async {
                loop {
                    for cue in timeline.advance_to(start.elapsed()) {
                        let _gate = run.gate.lock();
                        if run.is_cancelled() {
                            return;
                        }
                        if let Some(event) = &cue.phase.feedback {
                            feedback.notify(event.clone());
                        }
                        tracing::trace!(run = run.id, phase = %cue.phase.label, index = cue.index, "Phase fired");
                        on_phase(&cue);
                        let mut state = run.state.lock();
                        if !state.is_terminal() {
                            *state = RitualState::Running(cue.index + 1);
                        }
                    }
                    match timeline.next_deadline() {
                        Some(at) => sleep_until(start + at).await,
                        None => return,
                    }
                }
            };

            let forced = timeout_at(start + budget, drive).await.is_err();
            let fired = timeline.fired();

            let _gate = run.gate.lock();
            if run.is_cancelled() {
                return;
            }
            if forced {
                tracing::warn!(
                    run = run.id,
                    ritual = %run.name,
                    fired,
                    total,
                    "Ritual overran its watchdog, forcing completion"
                );
            }
            *run.state.lock() = RitualState::Completed;
            {
                let mut current = slot.lock();
                if current.as_ref().is_some_and(|active| Arc::ptr_eq(active, &run)) {
                    *current = None;
                }
            }
            let summary = RitualSummary {
                name: run.name.clone(),
                phases_fired: fired,
                phases_total: total,
                elapsed: start.elapsed(),
                forced,
            };
            tracing::info!(
                run = run.id,
                ritual = %run.name,
                elapsed_ms = summary.elapsed.as_millis() as u64,
                "Ritual completed"
            );
            on_complete(summary);
        });

        if !shared.is_cancelled() {
            *shared.abort.lock() = Some(task.abort_handle());
        }

        RunOutcome::Started(RitualHandle { shared })
    }

    /// Cancel the in-flight run, if any
    ///
    /// Returns true if a run was cancelled.
    pub fn cancel(&self) -> bool {
        let active = self.current.lock().take();
        active.is_some_and(|run| run.cancel())
    }

    /// Whether a run is in flight
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.current
            .lock()
            .as_ref()
            .is_some_and(|run| !run.state.lock().is_terminal())
    }

    /// State of the in-flight run, or `Idle`
    #[must_use]
    pub fn state(&self) -> RitualState {
        self.current
            .lock()
            .as_ref()
            .map_or(RitualState::Idle, |run| *run.state.lock())
    }
}

impl fmt::Debug for ChoreographyEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChoreographyEngine")
            .field("watchdog_grace", &self.watchdog_grace)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Drop for ChoreographyEngine {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choreography::Phase;
    use crate::feedback::{FeedbackEvent, NullFeedback, RecordingFeedback};

    fn engine() -> ChoreographyEngine {
        ChoreographyEngine::new(Arc::new(NullFeedback))
    }

    fn ritual(offsets: &[u64]) -> Ritual {
        Ritual::new(
            "test",
            offsets
                .iter()
                .map(|ms| Phase::at_ms(format!("p{ms}"), *ms))
                .collect(),
        )
    }

    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_trigger_is_ignored() {
        let engine = engine();
        let first = engine.run(ritual(&[0, 100]), |_| {}, |_| {});
        let second = engine.run(ritual(&[0]), |_| {}, |_| {});

        assert!(first.is_started());
        assert!(!second.is_started());
        assert!(engine.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_completion_frees_the_engine() {
        let engine = engine();
        let done = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&done);
        let handle = engine
            .run(ritual(&[0, 50]), |_| {}, move |_| flag.store(true, Ordering::SeqCst))
            .handle()
            .unwrap();

        tokio::time::advance(Duration::from_millis(60)).await;
        settle().await;

        assert!(done.load(Ordering::SeqCst));
        assert_eq!(handle.state(), RitualState::Completed);
        assert!(!engine.is_running());
        assert!(engine.run(ritual(&[0]), |_| {}, |_| {}).is_started());
    }

    #[tokio::test(start_paused = true)]
    async fn test_feedback_is_cued_per_phase() {
        let sink = Arc::new(RecordingFeedback::new());
        let engine = ChoreographyEngine::new(sink.clone());
        let ritual = Ritual::new(
            "cues",
            vec![
                Phase::at_ms("a", 0).feedback(FeedbackEvent::HeavyImpact),
                Phase::at_ms("b", 10),
                Phase::at_ms("c", 20).feedback(FeedbackEvent::Success),
            ],
        );
        engine.run(ritual, |_| {}, |_| {});

        tokio::time::advance(Duration::from_millis(25)).await;
        settle().await;

        assert_eq!(
            sink.events(),
            vec![FeedbackEvent::HeavyImpact, FeedbackEvent::Success]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_callbacks() {
        let engine = engine();
        let phases = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&phases);
        let completed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&completed);

        let handle = engine
            .run(
                ritual(&[0, 100, 200]),
                move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                },
                move |_| flag.store(true, Ordering::SeqCst),
            )
            .handle()
            .unwrap();

        settle().await;
        assert_eq!(phases.load(Ordering::SeqCst), 1);
        assert_eq!(handle.state(), RitualState::Running(1));

        assert!(engine.cancel());
        tokio::time::advance(Duration::from_secs(1)).await;
        settle().await;

        assert_eq!(phases.load(Ordering::SeqCst), 1);
        assert!(!completed.load(Ordering::SeqCst));
        assert_eq!(handle.state(), RitualState::Cancelled);
        assert!(!handle.cancel());
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_ritual_completes_immediately() {
        let engine = engine();
        let (tx, rx) = tokio::sync::oneshot::channel();
        engine.run(Ritual::new("empty", Vec::new()), |_| {}, move |summary| {
            let _ = tx.send(summary);
        });
        let summary = rx.await.unwrap();
        assert_eq!(summary.phases_fired, 0);
        assert!(!summary.forced);
    }

    #[test]
    fn test_run_without_runtime_is_ignored() {
        let engine = engine();
        assert!(!engine.run(ritual(&[0]), |_| {}, |_| {}).is_started());
        assert_eq!(engine.state(), RitualState::Idle);
    }
}
