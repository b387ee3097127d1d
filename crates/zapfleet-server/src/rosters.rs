//! On-disk storage for uploaded contact rosters, one file per session.

use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::{debug, warn};

/// Stores each session's roster under a sanitized, session-derived
/// filename, keeping the upload's extension so the loader can dispatch
/// on it.
pub struct RosterStore {
    dir: PathBuf,
}

impl RosterStore {
    /// Store rooted at `dir`. The directory is created lazily on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory of the store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist an uploaded roster for `session`, replacing any previous
    /// one (the old file may carry a different extension).
    pub async fn save(
        &self,
        session: &str,
        original_name: &str,
        bytes: Bytes,
    ) -> io::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;

        if let Some(previous) = self.find(session).await {
            match tokio::fs::remove_file(&previous).await {
                Ok(()) => debug!(path = %previous.display(), "replaced previous roster"),
                Err(e) => warn!(path = %previous.display(), error = %e, "failed to drop previous roster"),
            }
        }

        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| e.chars().all(|c| c.is_ascii_alphanumeric()))
            .map_or_else(|| "csv".to_owned(), str::to_ascii_lowercase);
        let path = self.dir.join(format!("{}.{ext}", sanitize(session)));
        tokio::fs::write(&path, &bytes).await?;
        debug!(session, path = %path.display(), bytes = bytes.len(), "roster stored");
        Ok(path)
    }

    /// Locate the stored roster for `session`, whatever its extension.
    pub async fn find(&self, session: &str) -> Option<PathBuf> {
        let stem = sanitize(session);
        let mut entries = tokio::fs::read_dir(&self.dir).await.ok()?;
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if path.file_stem().and_then(|s| s.to_str()) == Some(stem.as_str()) {
                return Some(path);
            }
        }
        None
    }
}

/// Session names become filenames; keep them to a safe alphabet so a
/// path-ish name cannot escape the roster directory.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
