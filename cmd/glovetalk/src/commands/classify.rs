//! One-shot classification.

use clap::Args;
use glovetalk_gesture::{DiagnosticKind, GestureClassifier, Outcome, Phrasebook, Reading};
use serde::Serialize;

use super::{get_profile, output_format};
use crate::Cli;
use crate::pipeline::{build_announcer, load_classifier};

/// Classify one sensor line against the profile's dataset.
///
/// Prints the outcome and the phrase that would be spoken. With --say the
/// phrase is also announced.
#[derive(Args)]
pub struct ClassifyCommand {
    /// Comma-separated sensor values, e.g. "512,430,300,610,220"
    #[arg(allow_hyphen_values = true)]
    line: String,

    /// Speak the phrase as well
    #[arg(long)]
    say: bool,
}

#[derive(Debug, Serialize)]
struct ClassifyReport {
    outcome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    diagnostic: Option<DiagnosticKind>,
    phrase: String,
}

impl ClassifyReport {
    fn new(outcome: &Outcome, phrase: String) -> Self {
        Self {
            outcome: outcome.to_string(),
            label: outcome.label().map(str::to_string),
            diagnostic: outcome.diagnostic_kind(),
            phrase,
        }
    }
}

/// Recognizes one command line input. A blank line counts as no data.
fn classify_line(classifier: &GestureClassifier, phrases: &Phrasebook, line: &str) -> ClassifyReport {
    let outcome = classifier.recognize(&Reading::Line(line.trim().to_string()));
    let phrase = phrases.phrase(&outcome);
    ClassifyReport::new(&outcome, phrase)
}

impl ClassifyCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let profile = get_profile(cli)?;
        let classifier = load_classifier(&profile)?;

        let report = classify_line(&classifier, &profile.phrases, &self.line);
        output_format(cli).print(&report)?;

        if self.say {
            let mut announcer = build_announcer(&profile)?;
            announcer.announce(&report.phrase).await?;
        }
        Ok(())
    }
}
