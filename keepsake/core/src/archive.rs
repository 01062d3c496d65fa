//! Persistence collaborator
//!
//! The mint flow hands a finished `(record, image)` pair to a [`RecordSink`]
//! and never looks at storage itself. [`MemoryArchive`] keeps pairs in
//! memory for tests and previews; hosts bring their own sink for disk or
//! a database.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::model::{Record, RecordId};
use crate::render::{ArtifactImage, RenderError};

/// Archive errors
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// Storage I/O failed
    #[error("Archive I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The image could not be encoded
    #[error(transparent)]
    Render(#[from] RenderError),

    /// The record could not be serialized
    #[error("Failed to serialize record {id}: {message}")]
    Serialize {
        /// Record that failed
        id: RecordId,
        /// Serializer message
        message: String,
    },

    /// The sink refused the record
    #[error("Archive rejected record {id}: {reason}")]
    Rejected {
        /// Record that was refused
        id: RecordId,
        /// Why
        reason: String,
    },
}

/// Stores minted records
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Persist a record with its rendered image
    async fn save(&self, record: Arc<Record>, image: ArtifactImage) -> Result<(), ArchiveError>;
}

/// In-memory sink
#[derive(Debug, Default)]
pub struct MemoryArchive {
    saved: Mutex<Vec<(Arc<Record>, ArtifactImage)>>,
}

impl MemoryArchive {
    /// Empty archive
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of saved records
    #[must_use]
    pub fn len(&self) -> usize {
        self.saved.lock().len()
    }

    /// Whether nothing has been saved
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.saved.lock().is_empty()
    }

    /// Saved records in save order
    #[must_use]
    pub fn records(&self) -> Vec<Arc<Record>> {
        self.saved
            .lock()
            .iter()
            .map(|(record, _)| Arc::clone(record))
            .collect()
    }

    /// Image saved with a record
    #[must_use]
    pub fn image(&self, id: RecordId) -> Option<ArtifactImage> {
        self.saved
            .lock()
            .iter()
            .find(|(record, _)| record.id == id)
            .map(|(_, image)| image.clone())
    }
}

#[async_trait]
impl RecordSink for MemoryArchive {
    async fn save(&self, record: Arc<Record>, image: ArtifactImage) -> Result<(), ArchiveError> {
        tracing::debug!(record = %record.id, "Record archived in memory");
        self.saved.lock().push((record, image));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Decoration, Draft};
    use crate::render::{ArtifactRenderer, RasterRenderer};

    #[tokio::test]
    async fn test_memory_archive_keeps_pairs() {
        let archive = MemoryArchive::new();
        let record = Arc::new(Draft::new().finalize(RecordId::new(), Decoration::none()));
        let image = RasterRenderer::default().placeholder(&record, 100, 1.0);

        archive.save(Arc::clone(&record), image).await.unwrap();

        assert_eq!(archive.len(), 1);
        assert_eq!(archive.records()[0].id, record.id);
        assert!(archive.image(record.id).is_some());
        assert!(archive.image(RecordId::new()).is_none());
    }

    #[test]
    fn test_memory_archive_starts_empty() {
        let archive = MemoryArchive::new();
        assert!(archive.is_empty());

        let record = Arc::new(Draft::new().finalize(RecordId::new(), Decoration::none()));
        let image = RasterRenderer::default().placeholder(&record, 64, 1.0);
        tokio_test::block_on(archive.save(record, image)).unwrap();
        assert!(!archive.is_empty());
    }

    #[test]
    fn test_error_messages() {
        let id = RecordId::draft();
        let err = ArchiveError::Rejected {
            id,
            reason: "disk full".to_string(),
        };
        assert!(err.to_string().contains("disk full"));
    }
}
