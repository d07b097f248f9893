//! Engines backed by external programs.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::{AudioDevice, LocalSpeaker, PlaybackError, SpeechError};

/// Default local speech program.
pub const DEFAULT_SPEAKER_PROGRAM: &str = "espeak-ng";

/// Default audio player program.
pub const DEFAULT_PLAYER_PROGRAM: &str = "mpg123";

/// Speaks text by running a local TTS program with the text as its last
/// argument.
#[derive(Debug, Clone)]
pub struct CommandSpeaker {
    program: String,
    args: Vec<String>,
}

impl CommandSpeaker {
    /// Creates a speaker running `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Creates an `espeak-ng` speaker using the given voice.
    pub fn espeak(voice: &str) -> Self {
        Self::new(DEFAULT_SPEAKER_PROGRAM).args(["-v", voice])
    }

    /// Appends arguments placed before the text.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

#[async_trait]
impl LocalSpeaker for CommandSpeaker {
    async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        debug!(program = %self.program, "speaker: running");
        let output = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| SpeechError::Local(format!("{}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SpeechError::Local(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

/// Plays files through an external player process.
///
/// `load` only records the file; `play` spawns the player; `is_busy` polls
/// the child; `unload` stops a running player and forgets the file.
#[derive(Debug)]
pub struct CommandDevice {
    program: String,
    args: Vec<String>,
    loaded: Option<PathBuf>,
    child: Option<Child>,
}

impl CommandDevice {
    /// Creates a device running `program <args> <file>`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            loaded: None,
            child: None,
        }
    }

    /// Creates a quiet `mpg123` device.
    pub fn mpg123() -> Self {
        Self::new(DEFAULT_PLAYER_PROGRAM).args(["-q"])
    }

    /// Appends arguments placed before the file path.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl AudioDevice for CommandDevice {
    fn load(&mut self, path: &Path) -> Result<(), PlaybackError> {
        if !path.is_file() {
            return Err(PlaybackError::Load(format!(
                "{} is not a file",
                path.display()
            )));
        }
        self.loaded = Some(path.to_path_buf());
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        let path = self
            .loaded
            .as_ref()
            .ok_or_else(|| PlaybackError::Play("nothing loaded".to_string()))?;

        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| PlaybackError::Play(format!("{}: {}", self.program, e)))?;
        self.child = Some(child);
        Ok(())
    }

    fn is_busy(&mut self) -> bool {
        let Some(child) = self.child.as_mut() else {
            return false;
        };
        match child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                if !status.success() {
                    warn!(program = %self.program, %status, "device: player exited with failure");
                }
                self.child = None;
                false
            }
            Err(e) => {
                warn!(program = %self.program, error = %e, "device: cannot poll player");
                false
            }
        }
    }

    fn unload(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        self.loaded = None;
    }
}

impl Drop for CommandDevice {
    fn drop(&mut self) {
        self.unload();
    }
}

#[cfg(all(test, unix))]
mod command_tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[tokio::test]
    async fn test_speaker_success() {
        let speaker = CommandSpeaker::new("true").args(["-v", "ml"]);
        assert!(speaker.speak("hello").await.is_ok());
    }

    #[tokio::test]
    async fn test_speaker_failure_status() {
        let err = CommandSpeaker::new("false").speak("hello").await.unwrap_err();
        assert!(matches!(err, SpeechError::Local(_)));
    }

    #[tokio::test]
    async fn test_speaker_missing_program() {
        let err = CommandSpeaker::new("/nonexistent/espeak-ng")
            .speak("hello")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/espeak-ng"));
    }

    #[test]
    fn test_device_load_missing_file() {
        let mut device = CommandDevice::new("true");
        assert!(matches!(
            device.load(Path::new("/nonexistent/output.mp3")),
            Err(PlaybackError::Load(_))
        ));
    }

    #[test]
    fn test_device_play_without_load() {
        let mut device = CommandDevice::new("true");
        assert!(matches!(device.play(), Err(PlaybackError::Play(_))));
        assert!(!device.is_busy());
    }

    #[test]
    fn test_device_plays_to_completion() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut device = CommandDevice::new("true");
        device.load(file.path()).unwrap();
        device.play().unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while device.is_busy() {
            assert!(Instant::now() < deadline, "player never finished");
            std::thread::sleep(Duration::from_millis(10));
        }
        device.unload();
        assert!(device.loaded.is_none());
    }

    #[test]
    fn test_device_unload_stops_player() {
        let file = tempfile::NamedTempFile::new().unwrap();
        // The file lands in `$1` and is ignored.
        let mut device = CommandDevice::new("sh").args(["-c", "exec sleep 30", "sh"]);
        device.load(file.path()).unwrap();
        device.play().unwrap();
        assert!(device.is_busy());

        device.unload();
        assert!(!device.is_busy());
        assert!(device.child.is_none());
    }
}
