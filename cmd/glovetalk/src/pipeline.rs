//! Builds the classifier and the speech pipeline from a profile.

use std::sync::Arc;

use anyhow::Context;
use glovetalk_cli::{Paths, Profile};
use glovetalk_gesture::{GestureClassifier, ReferenceTable};
use glovetalk_speech::{
    Announcer, ArtifactStore, CleanupPolicy, CloudSynthesizer, CommandDevice, CommandSpeaker,
    GoogleTts, Player, SpeechSynthesizer,
};
use tracing::{info, warn};

/// Loads the profile's dataset and builds a classifier for it.
pub fn load_classifier(profile: &Profile) -> anyhow::Result<GestureClassifier> {
    let dataset = profile
        .dataset
        .as_ref()
        .context("no dataset configured; pass --dataset or set `dataset` in the profile")?;
    let tolerances = profile.tolerance_profile()?;

    let table = ReferenceTable::from_csv_path(dataset, profile.channels)
        .with_context(|| format!("failed to load dataset {}", dataset.display()))?;
    info!(
        dataset = %dataset.display(),
        entries = table.len(),
        channels = table.channels(),
        "reference table loaded"
    );

    Ok(GestureClassifier::with_policy(
        Arc::new(table),
        tolerances,
        profile.channel_policy,
    )?)
}

/// Builds the announcer: Google TTS when a key is configured, otherwise
/// local speech only.
pub fn build_announcer(profile: &Profile) -> anyhow::Result<Announcer> {
    let synthesizer = SpeechSynthesizer::new(
        cloud_synthesizer(profile),
        Arc::new(local_speaker(profile)),
        artifact_store(profile)?,
    );

    let device = match &profile.player {
        Some(player) => CommandDevice::new(&player.program).args(player.args.iter().cloned()),
        None => CommandDevice::mpg123(),
    };
    let player = Player::new(Box::new(device))
        .with_poll_interval(profile.playback.poll_interval())
        .with_cleanup_policy(CleanupPolicy {
            attempts: profile.playback.cleanup_attempts,
            backoff: profile.playback.cleanup_backoff(),
        });

    Ok(Announcer::new(synthesizer, player, profile.language.clone()))
}

fn cloud_synthesizer(profile: &Profile) -> Option<Arc<dyn CloudSynthesizer>> {
    let key = profile.google_api_key()?;
    let mut builder = GoogleTts::builder(key);
    if let Some(base_url) = profile
        .google
        .as_ref()
        .map(|g| g.base_url.as_str())
        .filter(|u| !u.is_empty())
    {
        builder = builder.base_url(base_url);
    }

    match builder.build() {
        Ok(client) => Some(Arc::new(client) as Arc<dyn CloudSynthesizer>),
        Err(e) => {
            warn!(error = %e, "google tts unavailable");
            None
        }
    }
}

fn local_speaker(profile: &Profile) -> CommandSpeaker {
    match &profile.speaker {
        Some(speaker) => CommandSpeaker::new(&speaker.program).args(speaker.args.iter().cloned()),
        None => CommandSpeaker::espeak(espeak_voice(&profile.language)),
    }
}

fn artifact_store(profile: &Profile) -> anyhow::Result<ArtifactStore> {
    let dir = match &profile.artifacts.dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
            dir.clone()
        }
        None => Paths::new()?.ensure_cache_dir()?,
    };

    let store = ArtifactStore::new(dir);
    Ok(match profile.artifacts.prefix.as_str() {
        "" => store,
        prefix => store.with_prefix(prefix),
    })
}

/// Maps a BCP-47 tag to an espeak voice: `ml-IN` becomes `ml`.
fn espeak_voice(language: &str) -> &str {
    language.split(['-', '_']).next().unwrap_or(language)
}
