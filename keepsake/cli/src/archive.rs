//! Directory archive and logging feedback for the command line

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use keepsake_core::{
    ArchiveError, ArtifactImage, FeedbackEvent, FeedbackSink, Record, RecordSink,
};

/// Writes `<id>.png` and `<id>.json` into a directory
#[derive(Debug, Clone)]
pub struct DirectoryArchive {
    root: PathBuf,
}

impl DirectoryArchive {
    /// Archive rooted at `root`; the directory is created on first save
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of a record's image
    pub fn image_path(&self, record: &Record) -> PathBuf {
        self.root.join(format!("{}.png", record.id))
    }

    /// Path of a record's JSON sidecar
    pub fn sidecar_path(&self, record: &Record) -> PathBuf {
        self.root.join(format!("{}.json", record.id))
    }
}

#[async_trait]
impl RecordSink for DirectoryArchive {
    async fn save(&self, record: Arc<Record>, image: ArtifactImage) -> Result<(), ArchiveError> {
        tokio::fs::create_dir_all(&self.root).await?;

        let png = image.encode_png()?;
        let json = serde_json::to_vec_pretty(record.as_ref()).map_err(|e| {
            ArchiveError::Serialize {
                id: record.id,
                message: e.to_string(),
            }
        })?;

        let image_path = self.image_path(&record);
        tokio::fs::write(&image_path, png).await?;
        tokio::fs::write(self.sidecar_path(&record), json).await?;

        tracing::info!(
            record = %record.id,
            path = %image_path.display(),
            width = image.width(),
            height = image.height(),
            "Artifact written"
        );
        Ok(())
    }
}

/// Feedback sink that logs each cue
#[derive(Debug, Default)]
pub struct LogFeedback;

impl FeedbackSink for LogFeedback {
    fn notify(&self, event: FeedbackEvent) {
        tracing::info!(cue = %event, "Feedback");
    }
}
