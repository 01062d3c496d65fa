//! Mint Flow - draft, commit, ritual, render, save
//!
//! [`MintFlowController`] owns the draft and the committed
//! `(record, image)` pair. It is the only writer of that state: background
//! renders report through a one-shot channel that the controller drains in
//! [`MintFlowController::poll_render`] or
//! [`MintFlowController::wait_for_render`].
//!
//! ```text
//!             update_draft            commit                render done
//!   Drafting ─────────────▶ Drafting ────────▶ Committed ───────────────▶ Committed
//!      ▲                                      (placeholder,              (rendered)
//!      │                                       rendering)                    │
//!      └──────────────────────────── redo ◀──────────────────────────────────┘
//! ```
//!
//! Decoration is rolled on the first commit and stored on the draft, so
//! edits and re-commits keep it. Only [`MintFlowController::redo`] clears it.
//! A saved record is final; committing again needs a redo first.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::archive::{ArchiveError, RecordSink};
use crate::choreography::library::{prepare_stage, ritual_for};
use crate::choreography::{ChoreographyEngine, RitualState, RitualSummary, Stage};
use crate::composition::{layout, DisplayList};
use crate::config::KeepsakeConfig;
use crate::feedback::{FeedbackEvent, FeedbackSink, NullFeedback};
use crate::model::{
    ArtifactStyle, DecorationOdds, DecorationRoller, Draft, DraftPatch, Record, RecordId,
};
use crate::render::{ArtifactImage, ArtifactRenderer, RasterRenderer};
use crate::template::TemplateRegistry;

/// Mint flow errors
#[derive(Debug, thiserror::Error)]
pub enum MintError {
    /// `save()` before any commit, or after `redo()`
    #[error("Nothing has been committed")]
    NothingCommitted,

    /// `commit()` after the record was saved; saved records are final
    #[error("Record {0} is already saved, redo before committing again")]
    AlreadySaved(RecordId),

    /// The controller was torn down
    #[error("Mint flow has been torn down")]
    TornDown,

    /// The persistence collaborator failed
    #[error("Failed to archive record: {0}")]
    Archive(#[from] ArchiveError),
}

/// Notifications for a UI surface
#[derive(Clone, Debug, PartialEq)]
pub enum MintEvent {
    /// The draft changed and the preview was re-laid out
    DraftUpdated {
        /// Draw operations in the new preview
        ops: usize,
        /// Preview height in logical points
        height: f32,
    },
    /// A record was minted; a placeholder is showing
    Committed {
        /// Minted record
        id: RecordId,
        /// Its style
        style: ArtifactStyle,
    },
    /// A ritual phase fired
    PhaseFired {
        /// Phase label
        label: String,
        /// Position in the ritual
        index: usize,
        /// Phases in the ritual
        total: usize,
    },
    /// The ritual finished
    RitualCompleted(RitualSummary),
    /// A render finished in the background; call
    /// [`MintFlowController::poll_render`] to apply it
    RenderReady(RecordId),
    /// The real image replaced the placeholder
    RenderCompleted {
        /// Rendered record
        id: RecordId,
        /// Pixel width
        width: u32,
        /// Pixel height
        height: u32,
    },
    /// The committed pair was discarded
    Redo,
    /// The record was handed to the archive
    Saved(RecordId),
}

/// Sizes and timings used by the flow
#[derive(Clone, Debug, PartialEq)]
pub struct MintSettings {
    /// Export width in logical points
    pub export_width: u32,
    /// Pixels per logical point for exports
    pub export_scale: f32,
    /// Width used for draft previews
    pub preview_width: u32,
    /// Allowance past a ritual's last phase
    pub watchdog_grace: Duration,
}

impl Default for MintSettings {
    fn default() -> Self {
        Self::from_config(&KeepsakeConfig::default())
    }
}

impl MintSettings {
    /// Settings from a loaded configuration
    #[must_use]
    pub fn from_config(config: &KeepsakeConfig) -> Self {
        Self {
            export_width: config.render.export_width,
            export_scale: config.render.export_scale,
            preview_width: config.render.preview_width,
            watchdog_grace: config.watchdog_grace,
        }
    }
}

/// Collaborators injected into the controller
pub struct MintDependencies {
    /// Style to template dispatch
    pub registry: Arc<TemplateRegistry>,
    /// Bitmap producer
    pub renderer: Arc<dyn ArtifactRenderer>,
    /// Haptic and audio cues
    pub feedback: Arc<dyn FeedbackSink>,
    /// Persistence
    pub archive: Arc<dyn RecordSink>,
    /// Decoration generator
    pub decorations: DecorationRoller,
}

impl MintDependencies {
    /// Built-in templates and renderer, silent feedback, fresh entropy
    #[must_use]
    pub fn new(archive: Arc<dyn RecordSink>) -> Self {
        let registry = Arc::new(TemplateRegistry::with_builtin());
        Self {
            renderer: Arc::new(RasterRenderer::new(Arc::clone(&registry))),
            registry,
            feedback: Arc::new(NullFeedback),
            archive,
            decorations: DecorationRoller::new(DecorationOdds::default()),
        }
    }

    /// Dependencies wired from a loaded configuration
    #[must_use]
    pub fn from_config(config: &KeepsakeConfig, archive: Arc<dyn RecordSink>) -> Self {
        let registry = Arc::new(TemplateRegistry::with_builtin());
        let renderer =
            RasterRenderer::new(Arc::clone(&registry)).with_min_canvas(config.render.min_canvas);
        Self {
            renderer: Arc::new(renderer),
            registry,
            feedback: Arc::new(NullFeedback),
            archive,
            decorations: config.decoration_roller(),
        }
    }

    /// Replace the feedback sink
    #[must_use]
    pub fn with_feedback(mut self, feedback: Arc<dyn FeedbackSink>) -> Self {
        self.feedback = feedback;
        self
    }

    /// Replace the renderer
    #[must_use]
    pub fn with_renderer(mut self, renderer: Arc<dyn ArtifactRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Replace the decoration roller
    #[must_use]
    pub fn with_decorations(mut self, decorations: DecorationRoller) -> Self {
        self.decorations = decorations;
        self
    }
}

impl fmt::Debug for MintDependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MintDependencies")
            .field("registry", &self.registry)
            .field("decorations", &self.decorations)
            .finish_non_exhaustive()
    }
}

struct Committed {
    record: Arc<Record>,
    image: ArtifactImage,
    generation: u64,
    saved: bool,
}

struct PendingRender {
    generation: u64,
    rx: oneshot::Receiver<ArtifactImage>,
    task: JoinHandle<()>,
}

type EventTx = Option<mpsc::Sender<MintEvent>>;

fn emit(events: &EventTx, event: MintEvent) {
    let Some(tx) = events else {
        return;
    };
    if let Err(mpsc::error::TrySendError::Full(dropped)) = tx.try_send(event) {
        tracing::debug!(event = ?dropped, "Mint event channel full, dropping event");
    }
}

/// Drives one entry from draft to saved artifact
pub struct MintFlowController {
    registry: Arc<TemplateRegistry>,
    renderer: Arc<dyn ArtifactRenderer>,
    feedback: Arc<dyn FeedbackSink>,
    archive: Arc<dyn RecordSink>,
    decorations: DecorationRoller,
    settings: MintSettings,
    engine: ChoreographyEngine,
    stage: Stage,
    draft: Draft,
    preview: DisplayList,
    committed: Option<Committed>,
    pending: Option<PendingRender>,
    generation: u64,
    events: EventTx,
    torn_down: bool,
}

impl MintFlowController {
    /// Controller over an empty draft dated today
    #[must_use]
    pub fn new(deps: MintDependencies, settings: MintSettings) -> Self {
        Self::with_draft(deps, settings, Draft::new())
    }

    /// Controller over an existing draft
    #[must_use]
    pub fn with_draft(deps: MintDependencies, settings: MintSettings, draft: Draft) -> Self {
        let engine = ChoreographyEngine::new(Arc::clone(&deps.feedback))
            .with_watchdog_grace(settings.watchdog_grace);
        let preview = preview_layout(&deps.registry, &draft, settings.preview_width);
        Self {
            registry: deps.registry,
            renderer: deps.renderer,
            feedback: deps.feedback,
            archive: deps.archive,
            decorations: deps.decorations,
            settings,
            engine,
            stage: Stage::new(),
            draft,
            preview,
            committed: None,
            pending: None,
            generation: 0,
            events: None,
            torn_down: false,
        }
    }

    /// Open the event channel
    ///
    /// Replaces any earlier subscription. Events that do not fit in
    /// `capacity` are dropped.
    pub fn subscribe(&mut self, capacity: usize) -> mpsc::Receiver<MintEvent> {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        self.events = Some(tx);
        rx
    }

    // =========================================================================
    // Drafting
    // =========================================================================

    /// Edit the draft and re-lay out the preview
    ///
    /// Layout only; nothing is rasterized and no decoration is rolled.
    pub fn update_draft(&mut self, patch: DraftPatch) -> &DisplayList {
        self.draft.apply(patch);
        self.preview = preview_layout(&self.registry, &self.draft, self.settings.preview_width);
        emit(
            &self.events,
            MintEvent::DraftUpdated {
                ops: self.preview.ops.len(),
                height: self.preview.height,
            },
        );
        &self.preview
    }

    /// Current draft
    #[must_use]
    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Latest preview layout
    #[must_use]
    pub fn preview(&self) -> &DisplayList {
        &self.preview
    }

    // =========================================================================
    // Commit
    // =========================================================================

    /// Mint the draft
    ///
    /// Returns with a placeholder image in place and
    /// [`is_rendering`](Self::is_rendering) set. The render and the style's
    /// ritual run in the background. Committing again before a save keeps
    /// the record id and decoration.
    ///
    /// # Errors
    ///
    /// Returns [`MintError::TornDown`] after [`teardown`](Self::teardown)
    /// and [`MintError::AlreadySaved`] once the record has been saved.
    pub fn commit(&mut self) -> Result<Arc<Record>, MintError> {
        if self.torn_down {
            return Err(MintError::TornDown);
        }
        if let Some(saved) = self.committed.as_ref().filter(|committed| committed.saved) {
            return Err(MintError::AlreadySaved(saved.record.id));
        }

        let id = self
            .committed
            .as_ref()
            .map_or_else(RecordId::new, |committed| committed.record.id);
        let decoration = match &self.draft.decoration {
            Some(existing) => existing.clone(),
            None => {
                let rolled = self.decorations.roll(id, self.draft.style, self.draft.date);
                tracing::debug!(record = %id, decoration = ?rolled, "Decoration rolled");
                self.draft.decoration = Some(rolled.clone());
                rolled
            }
        };

        let record = Arc::new(self.draft.finalize(id, decoration));
        self.generation += 1;
        let generation = self.generation;

        let placeholder = self.renderer.placeholder(
            &record,
            self.settings.export_width,
            self.settings.export_scale,
        );
        self.committed = Some(Committed {
            record: Arc::clone(&record),
            image: placeholder,
            generation,
            saved: false,
        });

        self.start_render(Arc::clone(&record), generation);
        self.start_ritual(record.style);

        tracing::info!(record = %record.id, style = %record.style, "Record committed");
        emit(
            &self.events,
            MintEvent::Committed {
                id: record.id,
                style: record.style,
            },
        );
        Ok(record)
    }

    fn start_render(&mut self, record: Arc<Record>, generation: u64) {
        if let Some(stale) = self.pending.take() {
            stale.task.abort();
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(record = %record.id, "No async runtime, keeping placeholder");
            return;
        };

        let (tx, rx) = oneshot::channel();
        let renderer = Arc::clone(&self.renderer);
        let events = self.events.clone();
        let width = self.settings.export_width;
        let scale = self.settings.export_scale;
        let task = runtime.spawn(async move {
            let id = record.id;
            let image = renderer.render(record, width, scale).await;
            if tx.send(image).is_ok() {
                emit(&events, MintEvent::RenderReady(id));
            }
        });
        self.pending = Some(PendingRender {
            generation,
            rx,
            task,
        });
    }

    fn start_ritual(&mut self, style: ArtifactStyle) {
        if self.engine.is_running() {
            tracing::debug!(%style, "Ritual still playing, not restarting");
            return;
        }

        let stage = prepare_stage(style.family());
        let phase_stage = stage.clone();
        let phase_events = self.events.clone();
        let complete_events = self.events.clone();

        let outcome = self.engine.run(
            ritual_for(style),
            move |cue| {
                phase_stage.apply(cue);
                emit(
                    &phase_events,
                    MintEvent::PhaseFired {
                        label: cue.phase.label.clone(),
                        index: cue.index,
                        total: cue.total,
                    },
                );
            },
            move |summary| emit(&complete_events, MintEvent::RitualCompleted(summary)),
        );

        if outcome.is_started() {
            self.stage.dispose();
            self.stage = stage;
        }
    }

    // =========================================================================
    // Render results
    // =========================================================================

    /// Apply a finished render without waiting
    ///
    /// Returns true if the placeholder was replaced.
    pub fn poll_render(&mut self) -> bool {
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };
        match pending.rx.try_recv() {
            Ok(image) => {
                let generation = pending.generation;
                self.pending = None;
                self.apply_render(generation, image)
            }
            Err(oneshot::error::TryRecvError::Empty) => false,
            Err(oneshot::error::TryRecvError::Closed) => {
                tracing::warn!("Render task ended without a result, keeping placeholder");
                self.pending = None;
                false
            }
        }
    }

    /// Wait for the in-flight render, if any, and apply it
    ///
    /// Returns the current image.
    pub async fn wait_for_render(&mut self) -> Option<&ArtifactImage> {
        if let Some(pending) = self.pending.take() {
            match pending.rx.await {
                Ok(image) => {
                    self.apply_render(pending.generation, image);
                }
                Err(_) => {
                    tracing::warn!("Render task ended without a result, keeping placeholder");
                }
            }
        }
        self.image()
    }

    fn apply_render(&mut self, generation: u64, image: ArtifactImage) -> bool {
        let Some(committed) = self
            .committed
            .as_mut()
            .filter(|committed| committed.generation == generation)
        else {
            tracing::debug!(generation, "Discarding render for a superseded commit");
            return false;
        };
        committed.image = image;
        emit(
            &self.events,
            MintEvent::RenderCompleted {
                id: committed.record.id,
                width: committed.image.width(),
                height: committed.image.height(),
            },
        );
        true
    }

    /// Whether a render result is still to be applied
    ///
    /// Stays true until [`poll_render`](Self::poll_render) or
    /// [`wait_for_render`](Self::wait_for_render) applies the result.
    /// Event-driven hosts poll on [`MintEvent::RenderReady`].
    #[must_use]
    pub fn is_rendering(&self) -> bool {
        self.pending.is_some()
    }

    /// Committed record
    #[must_use]
    pub fn record(&self) -> Option<Arc<Record>> {
        self.committed
            .as_ref()
            .map(|committed| Arc::clone(&committed.record))
    }

    /// Current image: the placeholder until the render lands
    #[must_use]
    pub fn image(&self) -> Option<&ArtifactImage> {
        self.committed.as_ref().map(|committed| &committed.image)
    }

    /// Whether a record is committed
    #[must_use]
    pub fn is_committed(&self) -> bool {
        self.committed.is_some()
    }

    /// Whether the committed record has been saved
    #[must_use]
    pub fn is_saved(&self) -> bool {
        self.committed.as_ref().is_some_and(|committed| committed.saved)
    }

    // =========================================================================
    // Redo, save, teardown
    // =========================================================================

    /// Discard the committed pair and go back to drafting
    ///
    /// The next commit mints a new id and rolls a new decoration. A ritual
    /// that is still playing runs to completion.
    pub fn redo(&mut self) {
        if let Some(stale) = self.pending.take() {
            stale.task.abort();
        }
        self.generation += 1;
        let discarded = self.committed.take();
        self.draft.decoration = None;
        if let Some(committed) = discarded {
            tracing::debug!(record = %committed.record.id, "Committed record discarded");
        }
        emit(&self.events, MintEvent::Redo);
    }

    /// Hand the committed pair to the archive
    ///
    /// Waits for an in-flight render first. If only the placeholder is
    /// available the render is retried once; when that also fails the
    /// placeholder is archived. Returns `Ok(false)` if this record was
    /// already saved.
    ///
    /// # Errors
    ///
    /// [`MintError::NothingCommitted`] without a committed record,
    /// [`MintError::Archive`] if the archive fails (the record stays
    /// unsaved and can be retried).
    pub async fn save(&mut self) -> Result<bool, MintError> {
        if self.committed.is_none() {
            return Err(MintError::NothingCommitted);
        }
        self.wait_for_render().await;
        if !self.torn_down
            && self
                .committed
                .as_ref()
                .is_some_and(|committed| !committed.saved && committed.image.is_placeholder())
        {
            self.retry_render().await;
        }

        let Some(committed) = self.committed.as_ref() else {
            return Err(MintError::NothingCommitted);
        };
        if committed.saved {
            tracing::debug!(record = %committed.record.id, "Record already saved");
            return Ok(false);
        }
        let record = Arc::clone(&committed.record);
        let image = committed.image.clone();
        if image.is_placeholder() {
            tracing::warn!(record = %record.id, "Render unavailable, archiving placeholder image");
        }

        if let Err(e) = self.archive.save(Arc::clone(&record), image).await {
            tracing::warn!(record = %record.id, error = %e, "Archive rejected record");
            self.feedback.notify(FeedbackEvent::Warning);
            return Err(e.into());
        }

        if let Some(committed) = self.committed.as_mut() {
            committed.saved = true;
        }
        self.feedback.notify(FeedbackEvent::Success);
        tracing::info!(record = %record.id, "Record saved");
        emit(&self.events, MintEvent::Saved(record.id));
        Ok(true)
    }

    async fn retry_render(&mut self) {
        let Some((record, generation)) = self
            .committed
            .as_ref()
            .map(|committed| (Arc::clone(&committed.record), committed.generation))
        else {
            return;
        };
        tracing::debug!(record = %record.id, "No rendered image, retrying before save");
        self.start_render(record, generation);
        self.wait_for_render().await;
    }

    /// Cancel the ritual, drop the render and disconnect the stage
    ///
    /// Idempotent. After teardown no phase touches the stage.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.engine.cancel();
        self.stage.dispose();
        if let Some(pending) = self.pending.take() {
            pending.task.abort();
        }
        tracing::debug!("Mint flow torn down");
    }

    /// Stage the current ritual plays on
    #[must_use]
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// State of the current ritual
    #[must_use]
    pub fn ritual_state(&self) -> RitualState {
        self.engine.state()
    }

    /// Active settings
    #[must_use]
    pub fn settings(&self) -> &MintSettings {
        &self.settings
    }
}

fn preview_layout(registry: &TemplateRegistry, draft: &Draft, width: u32) -> DisplayList {
    let record = draft.preview();
    let template = registry.resolve_lenient(record.style);
    layout(&template.layout(&record), width as f32)
}

impl fmt::Debug for MintFlowController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MintFlowController")
            .field("style", &self.draft.style)
            .field("committed", &self.committed.as_ref().map(|c| c.record.id))
            .field("rendering", &self.is_rendering())
            .field("ritual", &self.engine.state())
            .field("torn_down", &self.torn_down)
            .finish_non_exhaustive()
    }
}

impl Drop for MintFlowController {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::MemoryArchive;
    use crate::feedback::RecordingFeedback;

    fn controller() -> (MintFlowController, Arc<MemoryArchive>, Arc<RecordingFeedback>) {
        let archive = Arc::new(MemoryArchive::new());
        let feedback = Arc::new(RecordingFeedback::new());
        let deps = MintDependencies::new(archive.clone())
            .with_feedback(feedback.clone())
            .with_decorations(DecorationRoller::seeded(DecorationOdds::default(), 11));
        let settings = MintSettings {
            export_width: 200,
            export_scale: 1.0,
            ..MintSettings::default()
        };
        (MintFlowController::new(deps, settings), archive, feedback)
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_draft_relayouts_preview() {
        let (mut flow, _, _) = controller();
        let before = flow.preview().ops.len();
        let after = flow
            .update_draft(DraftPatch::new().content("Rain all day, soup at night."))
            .ops
            .len();
        assert!(after > before);
        assert!(flow.draft().decoration.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_commit_shows_placeholder_then_render() {
        let (mut flow, _, _) = controller();
        flow.update_draft(DraftPatch::new().content("hello"));
        flow.commit().unwrap();

        assert!(flow.is_rendering());
        assert!(flow.image().unwrap().is_placeholder());

        let image = flow.wait_for_render().await.unwrap();
        assert!(!image.is_placeholder());
        assert_eq!(image.width(), 200);
        assert!(!flow.is_rendering());
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_requires_commit() {
        let (mut flow, archive, _) = controller();
        assert!(matches!(flow.save().await, Err(MintError::NothingCommitted)));
        assert!(archive.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_is_idempotent() {
        let (mut flow, archive, feedback) = controller();
        flow.commit().unwrap();

        assert!(flow.save().await.unwrap());
        assert!(!flow.save().await.unwrap());
        assert_eq!(archive.len(), 1);
        assert!(flow.is_saved());
        assert!(feedback.events().contains(&FeedbackEvent::Success));
        assert!(archive.image(flow.record().unwrap().id).is_some_and(|i| !i.is_placeholder()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_redo_returns_to_drafting() {
        let (mut flow, _, _) = controller();
        let first = flow.commit().unwrap();
        flow.redo();

        assert!(!flow.is_committed());
        assert!(!flow.is_rendering());
        assert!(flow.draft().decoration.is_none());

        let second = flow.commit().unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_rejects_commit() {
        let (mut flow, _, _) = controller();
        flow.teardown();
        flow.teardown();
        assert!(matches!(flow.commit(), Err(MintError::TornDown)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_are_emitted() {
        let (mut flow, _, _) = controller();
        let mut rx = flow.subscribe(64);
        flow.update_draft(DraftPatch::new().content("x"));
        let record = flow.commit().unwrap();
        flow.wait_for_render().await;

        assert!(matches!(rx.recv().await, Some(MintEvent::DraftUpdated { .. })));
        assert_eq!(
            rx.recv().await,
            Some(MintEvent::Committed {
                id: record.id,
                style: record.style
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_ready_event_without_polling() {
        let (mut flow, _, _) = controller();
        let mut rx = flow.subscribe(64);
        let record = flow.commit().unwrap();

        let ready = loop {
            match rx.recv().await {
                Some(MintEvent::RenderReady(id)) => break id,
                Some(_) => continue,
                None => panic!("event channel closed"),
            }
        };
        assert_eq!(ready, record.id);
        assert!(flow.is_rendering());
        assert!(flow.poll_render());
        assert!(!flow.is_rendering());
        assert!(!flow.image().unwrap().is_placeholder());
    }

    #[test]
    fn test_already_saved_message_names_record() {
        let id = RecordId::new();
        let err = MintError::AlreadySaved(id);
        assert!(err.to_string().contains(&id.to_string()));
        assert!(err.to_string().contains("redo"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_channel_drops_events() {
        let (mut flow, _, _) = controller();
        let mut rx = flow.subscribe(1);
        flow.update_draft(DraftPatch::new().content("a"));
        flow.update_draft(DraftPatch::new().content("b"));

        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }
}
