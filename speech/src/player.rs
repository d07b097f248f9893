//! Blocking playback of audio artifacts.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error};

use crate::{AudioArtifact, Cleanup, CleanupPolicy, FsRemover, Remover, remove_with_retry};

/// Default interval between `is_busy` polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Error type for playback operations.
#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("load failed: {0}")]
    Load(String),
    #[error("play failed: {0}")]
    Play(String),
}

/// An audio output that plays one file at a time.
pub trait AudioDevice: Send {
    /// Prepares the file for playback.
    fn load(&mut self, path: &Path) -> Result<(), PlaybackError>;

    /// Starts playing the loaded file.
    fn play(&mut self) -> Result<(), PlaybackError>;

    /// Returns true while playback is in progress.
    fn is_busy(&mut self) -> bool;

    /// Stops playback and releases the loaded file.
    fn unload(&mut self);
}

/// Plays artifacts to completion and deletes them afterwards.
pub struct Player {
    device: Box<dyn AudioDevice>,
    poll_interval: Duration,
    cleanup: CleanupPolicy,
    remover: Arc<dyn Remover>,
}

impl Player {
    /// Creates a player over a device with default polling and cleanup.
    pub fn new(device: Box<dyn AudioDevice>) -> Self {
        Self {
            device,
            poll_interval: DEFAULT_POLL_INTERVAL,
            cleanup: CleanupPolicy::default(),
            remover: Arc::new(FsRemover),
        }
    }

    /// Sets the busy-poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the cleanup retry bound.
    pub fn with_cleanup_policy(mut self, policy: CleanupPolicy) -> Self {
        self.cleanup = policy;
        self
    }

    /// Sets how artifact files are deleted.
    pub fn with_remover(mut self, remover: Arc<dyn Remover>) -> Self {
        self.remover = remover;
        self
    }

    /// Plays the artifact and waits until playback completes.
    ///
    /// The device is always unloaded and the artifact always cleaned up,
    /// including when load or play fails. Cleanup problems are reported in
    /// the returned [`Cleanup`], never as an error.
    pub async fn play(&mut self, artifact: AudioArtifact) -> Result<Cleanup, PlaybackError> {
        let result = self.play_to_end(artifact.path()).await;
        if let Err(e) = &result {
            error!(path = %artifact.path().display(), error = %e, "player: playback failed");
        }

        self.device.unload();
        let path = artifact.release();
        let cleanup = remove_with_retry(self.remover.as_ref(), &path, self.cleanup).await;

        result.map(|()| cleanup)
    }

    async fn play_to_end(&mut self, path: &Path) -> Result<(), PlaybackError> {
        self.device.load(path)?;
        self.device.play()?;
        debug!(path = %path.display(), "player: playing");

        while self.device.is_busy() {
            tokio::time::sleep(self.poll_interval).await;
        }
        Ok(())
    }
}
