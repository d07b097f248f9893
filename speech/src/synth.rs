//! Cloud-first speech synthesis with a local fallback.

use std::fmt;
use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::{ArtifactStore, AudioArtifact, PlaybackError};

/// Error type for speech operations.
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("cloud synthesis failed: {0}")]
    Cloud(String),
    #[error("cloud synthesis returned no audio")]
    EmptyAudio,
    #[error("local synthesis failed: {0}")]
    Local(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("playback error: {0}")]
    Playback(#[from] PlaybackError),
}

/// A remote text-to-speech service returning encoded audio.
#[async_trait]
pub trait CloudSynthesizer: Send + Sync {
    /// Synthesizes `text` in the given BCP-47 language.
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>, SpeechError>;
}

/// A local engine that speaks text itself, producing no audio bytes.
#[async_trait]
pub trait LocalSpeaker: Send + Sync {
    /// Speaks `text`, returning once speech has finished.
    async fn speak(&self, text: &str) -> Result<(), SpeechError>;
}

/// Why the local engine was used instead of the cloud.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// No cloud client was available at startup.
    CloudUnavailable,
    /// The cloud request or writing its audio failed.
    CloudError(String),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::CloudUnavailable => write!(f, "cloud synthesis unavailable"),
            FallbackReason::CloudError(e) => write!(f, "cloud synthesis failed: {e}"),
        }
    }
}

/// What synthesis produced.
#[derive(Debug)]
pub enum Utterance {
    /// Cloud audio that still has to be played.
    Artifact(AudioArtifact),
    /// The local engine has already spoken the text.
    SpokenLocally,
}

/// Result of one synthesis call.
#[derive(Debug)]
pub struct Synthesis {
    pub utterance: Utterance,
    /// Set when the local fallback was used.
    pub degraded: Option<FallbackReason>,
}

enum Stage<'a> {
    TryCloud(&'a dyn CloudSynthesizer),
    UseLocal(FallbackReason),
}

/// Synthesizes speech through the cloud, falling back to a local engine.
///
/// Whether a cloud client exists is decided once, at construction. Without
/// one the synthesizer stays in degraded mode for its whole lifetime.
pub struct SpeechSynthesizer {
    cloud: Option<Arc<dyn CloudSynthesizer>>,
    local: Arc<dyn LocalSpeaker>,
    store: ArtifactStore,
}

impl SpeechSynthesizer {
    /// Creates a synthesizer.
    pub fn new(
        cloud: Option<Arc<dyn CloudSynthesizer>>,
        local: Arc<dyn LocalSpeaker>,
        store: ArtifactStore,
    ) -> Self {
        if cloud.is_none() {
            warn!("synthesizer: no cloud client, running in degraded mode");
        }
        Self {
            cloud,
            local,
            store,
        }
    }

    /// Returns true if the cloud path is permanently bypassed.
    pub fn is_degraded(&self) -> bool {
        self.cloud.is_none()
    }

    /// Returns the artifact store.
    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Synthesizes `text`.
    ///
    /// Cloud failures never surface as errors; they switch this call to the
    /// local engine. Only a local engine failure is returned.
    pub async fn synthesize(&self, text: &str, language: &str) -> Result<Synthesis, SpeechError> {
        let mut stage = match &self.cloud {
            Some(cloud) => Stage::TryCloud(cloud.as_ref()),
            None => Stage::UseLocal(FallbackReason::CloudUnavailable),
        };

        loop {
            stage = match stage {
                Stage::TryCloud(cloud) => match self.try_cloud(cloud, text, language).await {
                    Ok(artifact) => {
                        return Ok(Synthesis {
                            utterance: Utterance::Artifact(artifact),
                            degraded: None,
                        });
                    }
                    Err(e) => {
                        warn!(error = %e, "synthesizer: falling back to local engine");
                        Stage::UseLocal(FallbackReason::CloudError(e.to_string()))
                    }
                },
                Stage::UseLocal(reason) => {
                    debug!(%reason, "synthesizer: speaking locally");
                    self.local.speak(text).await?;
                    return Ok(Synthesis {
                        utterance: Utterance::SpokenLocally,
                        degraded: Some(reason),
                    });
                }
            };
        }
    }

    async fn try_cloud(
        &self,
        cloud: &dyn CloudSynthesizer,
        text: &str,
        language: &str,
    ) -> Result<AudioArtifact, SpeechError> {
        let audio = cloud.synthesize(text, language).await?;
        if audio.is_empty() {
            return Err(SpeechError::EmptyAudio);
        }
        Ok(self.store.create(&audio).await?)
    }
}

#[cfg(test)]
mod synth_tests {
    use super::*;

    #[test]
    fn test_speech_error_display() {
        let err = SpeechError::Cloud("timeout".to_string());
        assert!(err.to_string().contains("timeout"));

        let err = SpeechError::Local("espeak-ng: not found".to_string());
        assert!(err.to_string().starts_with("local synthesis failed"));
    }

    #[test]
    fn test_fallback_reason_display() {
        assert_eq!(
            FallbackReason::CloudUnavailable.to_string(),
            "cloud synthesis unavailable"
        );
        assert!(
            FallbackReason::CloudError("403".into())
                .to_string()
                .contains("403")
        );
    }
}
