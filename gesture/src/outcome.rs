//! Classification outcomes and the phrases spoken for them.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::FrameError;

/// Placeholder replaced by the gesture label in [`Phrasebook::matched`].
pub const GESTURE_PLACEHOLDER: &str = "{gesture}";

/// Default phrase for a recognized gesture ("recognized gesture {gesture}").
pub const DEFAULT_MATCHED_PHRASE: &str = "അംഗീകരിച്ച ശൈലി {gesture}";

/// Default phrase for every diagnostic ("no valid gesture").
pub const DEFAULT_NO_GESTURE_PHRASE: &str = "സാധുവായ ശൈലി ഇല്ല";

/// The result of recognizing one reading.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A reference entry matched; carries its label.
    Matched(String),
    /// The reading could not be turned into a gesture.
    Diagnostic(Diagnostic),
}

impl Outcome {
    /// Returns the matched label, if any.
    pub fn label(&self) -> Option<&str> {
        match self {
            Outcome::Matched(label) => Some(label),
            Outcome::Diagnostic(_) => None,
        }
    }

    /// Returns the diagnostic kind, if this is not a match.
    pub fn diagnostic_kind(&self) -> Option<DiagnosticKind> {
        match self {
            Outcome::Matched(_) => None,
            Outcome::Diagnostic(d) => Some(d.kind()),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Matched(label) => write!(f, "matched {label}"),
            Outcome::Diagnostic(d) => write!(f, "{d}"),
        }
    }
}

/// Why a reading produced no gesture.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Diagnostic {
    #[error("no data received")]
    NoDataReceived,
    #[error("transport error: {0}")]
    TransportError(String),
    #[error("parse error: field {index} is not a number: {field:?}")]
    ParseError { index: usize, field: String },
    #[error("channel count mismatch: expected {expected}, got {actual}")]
    ChannelCountMismatch { expected: usize, actual: usize },
    #[error("no matching gesture found")]
    NoMatch,
}

impl Diagnostic {
    /// Returns the payload-free kind of this diagnostic.
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Diagnostic::NoDataReceived => DiagnosticKind::NoDataReceived,
            Diagnostic::TransportError(_) => DiagnosticKind::TransportError,
            Diagnostic::ParseError { .. } => DiagnosticKind::ParseError,
            Diagnostic::ChannelCountMismatch { .. } => DiagnosticKind::ChannelCountMismatch,
            Diagnostic::NoMatch => DiagnosticKind::NoMatch,
        }
    }
}

impl From<FrameError> for Diagnostic {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::Parse { index, field } => Diagnostic::ParseError { index, field },
            FrameError::ChannelCountMismatch { expected, actual } => {
                Diagnostic::ChannelCountMismatch { expected, actual }
            }
        }
    }
}

/// Payload-free diagnostic kind, used as a configuration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    NoDataReceived,
    TransportError,
    ParseError,
    ChannelCountMismatch,
    NoMatch,
}

/// Maps outcomes to the text that is spoken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Phrasebook {
    /// Template for a match; `{gesture}` is replaced by the label.
    pub matched: String,
    /// Phrase for any diagnostic without an override.
    pub no_gesture: String,
    /// Per-kind phrases.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub diagnostics: HashMap<DiagnosticKind, String>,
}

impl Default for Phrasebook {
    fn default() -> Self {
        Self {
            matched: DEFAULT_MATCHED_PHRASE.to_string(),
            no_gesture: DEFAULT_NO_GESTURE_PHRASE.to_string(),
            diagnostics: HashMap::new(),
        }
    }
}

impl Phrasebook {
    /// Returns the phrase to speak for an outcome.
    pub fn phrase(&self, outcome: &Outcome) -> String {
        match outcome {
            Outcome::Matched(label) => self.matched.replace(GESTURE_PLACEHOLDER, label),
            Outcome::Diagnostic(d) => self
                .diagnostics
                .get(&d.kind())
                .unwrap_or(&self.no_gesture)
                .clone(),
        }
    }
}
