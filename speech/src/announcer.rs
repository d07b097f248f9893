//! Synthesis and playback as one step.

use tracing::info;

use crate::{Cleanup, FallbackReason, Player, SpeechError, SpeechSynthesizer, Utterance};

/// What happened while announcing one phrase.
#[derive(Debug)]
pub struct Announcement {
    /// Set when the local engine spoke instead of the cloud.
    pub degraded: Option<FallbackReason>,
    /// Cleanup of the played artifact; `None` when nothing was played.
    pub cleanup: Option<Cleanup>,
}

/// Speaks phrases in one language, one at a time.
pub struct Announcer {
    synthesizer: SpeechSynthesizer,
    player: Player,
    language: String,
}

impl Announcer {
    /// Creates an announcer.
    pub fn new(synthesizer: SpeechSynthesizer, player: Player, language: impl Into<String>) -> Self {
        Self {
            synthesizer,
            player,
            language: language.into(),
        }
    }

    /// Returns the synthesizer.
    pub fn synthesizer(&self) -> &SpeechSynthesizer {
        &self.synthesizer
    }

    /// Returns the language tag.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Speaks `text` and returns once it has been heard in full.
    ///
    /// Cloud audio goes through the player; local fallback speech has
    /// already been played by the time synthesis returns.
    pub async fn announce(&mut self, text: &str) -> Result<Announcement, SpeechError> {
        let synthesis = self.synthesizer.synthesize(text, &self.language).await?;

        let cleanup = match synthesis.utterance {
            Utterance::Artifact(artifact) => Some(self.player.play(artifact).await?),
            Utterance::SpokenLocally => None,
        };

        info!(
            text,
            degraded = synthesis.degraded.is_some(),
            "announcer: spoken"
        );
        Ok(Announcement {
            degraded: synthesis.degraded,
            cleanup,
        })
    }
}
