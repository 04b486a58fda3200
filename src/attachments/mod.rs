//! Attachment acquisition records and scratch storage
//!
//! Downloaded files are pinned to uniquely-named slots in a scratch
//! directory for the duration of the intake session, then reclaimed after
//! submission (successful or not). Slot names combine a fresh UUID with the
//! original basename, so concurrent sessions can never clobber each other's
//! files.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Byte content of a downloaded attachment
///
/// A record normally points at its scratch-slot file; the in-memory variant
/// exists for callers that already hold the bytes (and for tests).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttachmentSource {
    /// Bytes pinned to a local scratch slot
    File(PathBuf),
    /// Bytes held in memory
    Buffer(Vec<u8>),
}

/// One downloaded file tracked by an intake session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRecord {
    /// The opaque platform file handle; dedup key within a session
    pub source_file_id: String,

    /// Best-effort original filename, used for display and as the multipart
    /// part filename
    pub display_name: String,

    /// Where the bytes live
    pub source: AttachmentSource,
}

impl AttachmentRecord {
    /// The scratch-slot path, if the bytes are file-backed
    #[must_use]
    pub fn local_path(&self) -> Option<&Path> {
        match &self.source {
            AttachmentSource::File(path) => Some(path),
            AttachmentSource::Buffer(_) => None,
        }
    }
}

/// Scratch storage for downloaded attachments
#[derive(Debug, Clone)]
pub struct AttachmentStore {
    dir: PathBuf,
}

impl AttachmentStore {
    /// Create a store rooted at `dir`, creating the directory if needed
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .map_err(|e| Error::Attachment(format!("cannot create scratch dir: {e}")))?;
        Ok(Self { dir })
    }

    /// Pin downloaded bytes to a fresh scratch slot
    ///
    /// The slot name is `<uuid>_<basename>`; it is never reused for a
    /// different handle within the process lifetime.
    ///
    /// # Errors
    ///
    /// Returns error if the slot file cannot be written
    pub async fn save(
        &self,
        file_id: &str,
        display_name: &str,
        bytes: &[u8],
    ) -> Result<AttachmentRecord> {
        let basename = Path::new(display_name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("attachment");
        let slot = self.dir.join(format!("{}_{basename}", Uuid::new_v4()));

        tokio::fs::write(&slot, bytes)
            .await
            .map_err(|e| Error::Attachment(format!("cannot write scratch slot: {e}")))?;

        tracing::debug!(
            file_id,
            slot = %slot.display(),
            size = bytes.len(),
            "attachment pinned to scratch slot"
        );

        Ok(AttachmentRecord {
            source_file_id: file_id.to_string(),
            display_name: display_name.to_string(),
            source: AttachmentSource::File(slot),
        })
    }

    /// Reclaim one record's scratch slot
    ///
    /// Idempotent: a slot that is already gone is not an error. Buffer-backed
    /// records have nothing to reclaim.
    pub async fn remove(&self, record: &AttachmentRecord) {
        let Some(path) = record.local_path() else {
            return;
        };

        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                tracing::debug!(slot = %path.display(), "attachment slot reclaimed");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(slot = %path.display(), error = %e, "failed to reclaim attachment slot");
            }
        }
    }

    /// Reclaim every record's scratch slot
    pub async fn remove_all(&self, records: &[AttachmentRecord]) {
        futures::future::join_all(records.iter().map(|r| self.remove(r))).await;
    }
}

/// Best-effort original filename for a downloaded file
///
/// Prefers the platform-supplied name, falls back to the basename of the
/// platform file path.
#[must_use]
pub fn display_name(file_name: Option<&str>, file_path: &str) -> String {
    file_name
        .map(str::to_string)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| {
            Path::new(file_path)
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("attachment")
                .to_string()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_gives_unique_slots_for_same_basename() {
        let dir = tempfile::tempdir().unwrap();
        let store = AttachmentStore::new(dir.path()).unwrap();

        let a = store.save("file-1", "report.pdf", b"aaa").await.unwrap();
        let b = store.save("file-2", "report.pdf", b"bbb").await.unwrap();

        assert_ne!(a.local_path(), b.local_path());
        assert!(a.local_path().unwrap().exists());
        assert!(b.local_path().unwrap().exists());
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = AttachmentStore::new(dir.path()).unwrap();

        let record = store.save("file-1", "report.pdf", b"aaa").await.unwrap();
        store.remove(&record).await;
        assert!(!record.local_path().unwrap().exists());

        // Second removal of the same slot must not fail
        store.remove(&record).await;
    }

    #[tokio::test]
    async fn test_remove_all_clears_every_slot() {
        let dir = tempfile::tempdir().unwrap();
        let store = AttachmentStore::new(dir.path()).unwrap();

        let records = vec![
            store.save("file-1", "a.pdf", b"aaa").await.unwrap(),
            store.save("file-2", "b.pdf", b"bbb").await.unwrap(),
        ];

        store.remove_all(&records).await;
        for record in &records {
            assert!(!record.local_path().unwrap().exists());
        }
    }

    #[test]
    fn test_display_name_prefers_supplied_name() {
        assert_eq!(
            display_name(Some("contract.pdf"), "documents/file_77.pdf"),
            "contract.pdf"
        );
        assert_eq!(display_name(None, "documents/file_77.pdf"), "file_77.pdf");
        assert_eq!(display_name(Some(""), "documents/file_77.pdf"), "file_77.pdf");
    }
}
