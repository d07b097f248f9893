//! Retried deletion of played artifacts.
//!
//! Some playback backends keep a handle on the file for a short while after
//! unload, so a single delete attempt can fail spuriously. Deletion is
//! retried with a fixed backoff and gives up with a [`CleanupWarning`].

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, warn};

/// Default number of delete attempts.
pub const DEFAULT_CLEANUP_ATTEMPTS: u32 = 10;

/// Default delay between delete attempts.
pub const DEFAULT_CLEANUP_BACKOFF: Duration = Duration::from_millis(100);

/// Deletes files.
pub trait Remover: Send + Sync {
    /// Deletes the file at `path`.
    fn remove(&self, path: &Path) -> io::Result<()>;
}

/// Deletes files from the local filesystem.
///
/// A file that no longer exists counts as deleted.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsRemover;

impl Remover for FsRemover {
    fn remove(&self, path: &Path) -> io::Result<()> {
        match std::fs::remove_file(path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

/// Retry bound for artifact deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupPolicy {
    /// Maximum number of delete attempts (at least one is always made).
    pub attempts: u32,
    /// Fixed delay between attempts.
    pub backoff: Duration,
}

impl Default for CleanupPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_CLEANUP_ATTEMPTS,
            backoff: DEFAULT_CLEANUP_BACKOFF,
        }
    }
}

/// A file that could not be deleted within the retry bound.
#[derive(Debug, thiserror::Error)]
#[error("could not delete {path:?} after {attempts} attempts: {source}")]
pub struct CleanupWarning {
    pub path: PathBuf,
    pub attempts: u32,
    #[source]
    pub source: io::Error,
}

/// Result of cleaning up one artifact.
#[derive(Debug)]
pub enum Cleanup {
    /// The file was deleted on the given attempt.
    Removed { attempts: u32 },
    /// The file was left in place.
    Stale(CleanupWarning),
}

impl Cleanup {
    /// Returns true if the file was deleted.
    pub fn is_removed(&self) -> bool {
        matches!(self, Cleanup::Removed { .. })
    }

    /// Returns the warning, if the file was left in place.
    pub fn warning(&self) -> Option<&CleanupWarning> {
        match self {
            Cleanup::Removed { .. } => None,
            Cleanup::Stale(w) => Some(w),
        }
    }
}

/// Deletes `path`, retrying up to `policy.attempts` times.
///
/// Never fails: exhausting the bound logs one warning and returns
/// [`Cleanup::Stale`].
pub async fn remove_with_retry(remover: &dyn Remover, path: &Path, policy: CleanupPolicy) -> Cleanup {
    let attempts = policy.attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match remover.remove(path) {
            Ok(()) => {
                debug!(path = %path.display(), attempt, "cleanup: removed");
                return Cleanup::Removed { attempts: attempt };
            }
            Err(e) if attempt >= attempts => {
                let warning = CleanupWarning {
                    path: path.to_path_buf(),
                    attempts: attempt,
                    source: e,
                };
                warn!(error = %warning, "cleanup: leaving stale artifact");
                return Cleanup::Stale(warning);
            }
            Err(e) => {
                debug!(path = %path.display(), attempt, error = %e, "cleanup: delete failed, retrying");
                tokio::time::sleep(policy.backoff).await;
            }
        }
    }
}

#[cfg(test)]
mod cleanup_tests {
    use super::*;

    #[test]
    fn test_fs_remover_missing_file_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FsRemover.remove(&dir.path().join("gone.mp3")).is_ok());
    }

    #[tokio::test]
    async fn test_remove_real_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.mp3");
        std::fs::write(&path, b"x").unwrap();

        let cleanup = remove_with_retry(&FsRemover, &path, CleanupPolicy::default()).await;
        assert!(matches!(cleanup, Cleanup::Removed { attempts: 1 }));
        assert!(!path.exists());
    }

    #[test]
    fn test_warning_display() {
        let w = CleanupWarning {
            path: PathBuf::from("/tmp/output_1.mp3"),
            attempts: 10,
            source: io::Error::new(io::ErrorKind::PermissionDenied, "locked"),
        };
        let s = w.to_string();
        assert!(s.contains("output_1.mp3"));
        assert!(s.contains("10 attempts"));
        assert!(s.contains("locked"));
    }
}
