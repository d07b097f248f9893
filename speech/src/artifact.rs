//! Temporary audio artifacts.

use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use uuid::Uuid;

/// Default artifact file name prefix.
pub const DEFAULT_ARTIFACT_PREFIX: &str = "output";

/// Default artifact file extension (cloud audio is MP3).
pub const DEFAULT_ARTIFACT_EXTENSION: &str = "mp3";

/// Synthesized audio written to a uniquely named file.
///
/// An artifact is owned by exactly one playback. [`crate::Player`] releases
/// it and deletes the file with retries; an artifact dropped without being
/// played removes its file on a single best-effort attempt.
#[derive(Debug)]
pub struct AudioArtifact {
    path: PathBuf,
    size: usize,
    armed: bool,
}

impl AudioArtifact {
    /// Returns the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the size of the audio in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Gives up ownership of the file without deleting it.
    pub(crate) fn release(mut self) -> PathBuf {
        self.armed = false;
        std::mem::take(&mut self.path)
    }
}

impl Drop for AudioArtifact {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            debug!(path = %self.path.display(), error = %e, "artifact: drop cleanup failed");
        }
    }
}

/// Creates artifacts in one directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
    prefix: String,
    extension: String,
}

impl ArtifactStore {
    /// Creates a store writing `output_<uuid>.mp3` files into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: DEFAULT_ARTIFACT_PREFIX.to_string(),
            extension: DEFAULT_ARTIFACT_EXTENSION.to_string(),
        }
    }

    /// Sets the file name prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets the file extension.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Returns the artifact directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes audio to a new, process-unique file.
    pub async fn create(&self, audio: &[u8]) -> io::Result<AudioArtifact> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(format!(
            "{}_{}.{}",
            self.prefix,
            Uuid::new_v4(),
            self.extension
        ));

        if let Err(e) = tokio::fs::write(&path, audio).await {
            let _ = tokio::fs::remove_file(&path).await;
            return Err(e);
        }

        debug!(path = %path.display(), size = audio.len(), "artifact: created");
        Ok(AudioArtifact {
            path,
            size: audio.len(),
            armed: true,
        })
    }
}

#[cfg(test)]
mod artifact_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_writes_audio() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        let artifact = store.create(b"ID3audio").await.unwrap();
        assert_eq!(artifact.size(), 8);
        assert_eq!(std::fs::read(artifact.path()).unwrap(), b"ID3audio");

        let name = artifact.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("output_"));
        assert!(name.ends_with(".mp3"));
    }

    #[tokio::test]
    async fn test_names_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path()).with_prefix("hello").with_extension("wav");

        let a = store.create(b"a").await.unwrap();
        let b = store.create(b"b").await.unwrap();
        assert_ne!(a.path(), b.path());
        assert!(a.path().to_string_lossy().ends_with(".wav"));
    }

    #[tokio::test]
    async fn test_creates_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("nested/cache"));
        let artifact = store.create(b"x").await.unwrap();
        assert!(artifact.path().exists());
    }

    #[tokio::test]
    async fn test_drop_removes_unplayed_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        let artifact = store.create(b"x").await.unwrap();
        let path = artifact.path().to_path_buf();
        drop(artifact);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_release_keeps_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        let artifact = store.create(b"x").await.unwrap();
        let path = artifact.release();
        assert!(path.exists());
    }
}
