//! Speak arbitrary text.

use clap::Args;

use super::{get_profile, print_success};
use crate::Cli;
use crate::pipeline::build_announcer;

/// Speak text through the speech pipeline.
///
/// Uses Google Cloud Text-to-Speech when the profile has an API key and
/// falls back to the local engine otherwise. Useful for checking audio
/// output and voices before wearing the glove.
#[derive(Args)]
pub struct SayCommand {
    /// Text to speak
    text: String,
}

impl SayCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let profile = get_profile(cli)?;
        let mut announcer = build_announcer(&profile)?;

        let announcement = announcer.announce(&self.text).await?;
        match &announcement.degraded {
            Some(reason) => print_success(&format!("Spoken locally ({reason})")),
            None => print_success("Spoken via Google Cloud TTS"),
        }
        if let Some(warning) = announcement.cleanup.as_ref().and_then(|c| c.warning()) {
            eprintln!("warning: {warning}");
        }
        Ok(())
    }
}
