//! First-match tolerance-band classification.

use std::sync::Arc;

use tracing::debug;

use crate::{
    ChannelPolicy, Diagnostic, Outcome, Reading, ReferenceEntry, ReferenceTable, SensorFrame,
    ToleranceProfile,
};

/// Error type for classifier construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifierError {
    #[error("tolerance profile covers {tolerances} channels, table has {channels}")]
    ToleranceLength { tolerances: usize, channels: usize },
}

/// Classifies a frame against a reference table.
///
/// Returns the label of the first entry, in table order, whose bands contain
/// every channel of the frame. A frame of the wrong length is rejected with
/// [`Diagnostic::ChannelCountMismatch`] before the table is scanned.
///
/// A channel the tolerance profile does not cover never falls inside a band,
/// so a short profile yields [`Diagnostic::NoMatch`].
pub fn classify(
    frame: &SensorFrame,
    table: &ReferenceTable,
    tolerances: &ToleranceProfile,
) -> Outcome {
    if frame.len() != table.channels() {
        return Outcome::Diagnostic(Diagnostic::ChannelCountMismatch {
            expected: table.channels(),
            actual: frame.len(),
        });
    }

    table
        .entries()
        .iter()
        .find(|entry| within_bands(frame, entry, tolerances))
        .map(|entry| Outcome::Matched(entry.label().to_string()))
        .unwrap_or(Outcome::Diagnostic(Diagnostic::NoMatch))
}

fn within_bands(frame: &SensorFrame, entry: &ReferenceEntry, tolerances: &ToleranceProfile) -> bool {
    entry
        .values()
        .iter()
        .zip(frame.values())
        .enumerate()
        .all(|(channel, (&center, &value))| {
            tolerances
                .band(channel, center)
                .is_some_and(|(lo, hi)| lo <= value && value <= hi)
        })
}

/// A classifier bound to one deployment profile.
///
/// The table is shared read-only; the classifier itself holds no mutable
/// state, so [`GestureClassifier::recognize`] is idempotent.
#[derive(Debug, Clone)]
pub struct GestureClassifier {
    table: Arc<ReferenceTable>,
    tolerances: ToleranceProfile,
    policy: ChannelPolicy,
}

impl GestureClassifier {
    /// Creates a classifier with the exact-count channel policy.
    pub fn new(
        table: Arc<ReferenceTable>,
        tolerances: ToleranceProfile,
    ) -> Result<Self, ClassifierError> {
        Self::with_policy(table, tolerances, ChannelPolicy::Exact)
    }

    /// Creates a classifier with an explicit channel policy.
    pub fn with_policy(
        table: Arc<ReferenceTable>,
        tolerances: ToleranceProfile,
        policy: ChannelPolicy,
    ) -> Result<Self, ClassifierError> {
        if tolerances.len() != table.channels() {
            return Err(ClassifierError::ToleranceLength {
                tolerances: tolerances.len(),
                channels: table.channels(),
            });
        }
        Ok(Self {
            table,
            tolerances,
            policy,
        })
    }

    /// Returns the shared reference table.
    pub fn table(&self) -> &Arc<ReferenceTable> {
        &self.table
    }

    /// Returns the tolerance profile.
    pub fn tolerances(&self) -> &ToleranceProfile {
        &self.tolerances
    }

    /// Returns the channel policy.
    pub fn policy(&self) -> ChannelPolicy {
        self.policy
    }

    /// Classifies an already parsed frame.
    pub fn classify(&self, frame: &SensorFrame) -> Outcome {
        classify(frame, &self.table, &self.tolerances)
    }

    /// Turns a transport reading into an outcome.
    pub fn recognize(&self, reading: &Reading) -> Outcome {
        let line = match reading {
            Reading::Line(line) if !line.trim().is_empty() => line,
            Reading::Line(_) | Reading::NoData => {
                return Outcome::Diagnostic(Diagnostic::NoDataReceived);
            }
            Reading::TransportError(msg) => {
                return Outcome::Diagnostic(Diagnostic::TransportError(msg.clone()));
            }
        };

        let frame = match SensorFrame::parse(line, self.table.channels(), self.policy) {
            Ok(frame) => frame,
            Err(e) => return Outcome::Diagnostic(e.into()),
        };

        let outcome = self.classify(&frame);
        debug!(frame = ?frame.values(), %outcome, "classified");
        outcome
    }
}

#[cfg(test)]
mod classifier_tests {
    use super::*;

    fn table(entries: Vec<(Vec<f64>, &str)>) -> ReferenceTable {
        let channels = entries.first().map(|(v, _)| v.len()).unwrap_or(3);
        ReferenceTable::new(
            channels,
            entries
                .into_iter()
                .map(|(v, l)| ReferenceEntry::new(v, l))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_band_edges_are_inclusive() {
        let t = table(vec![(vec![100.0], "edge")]);
        let tol = ToleranceProfile::uniform(0.5, 1).unwrap();

        for v in [50.0, 100.0, 150.0] {
            assert_eq!(
                classify(&SensorFrame::new(vec![v]), &t, &tol),
                Outcome::Matched("edge".into())
            );
        }
        for v in [49.9, 150.1] {
            assert_eq!(
                classify(&SensorFrame::new(vec![v]), &t, &tol),
                Outcome::Diagnostic(Diagnostic::NoMatch)
            );
        }
    }

    #[test]
    fn test_all_channels_must_pass() {
        let t = table(vec![(vec![10.0, 20.0, 30.0], "open")]);
        let tol = ToleranceProfile::uniform(0.1, 3).unwrap();

        let frame = SensorFrame::new(vec![10.0, 20.0, 40.0]);
        assert_eq!(
            classify(&frame, &t, &tol),
            Outcome::Diagnostic(Diagnostic::NoMatch)
        );
    }

    #[test]
    fn test_first_match_wins() {
        let t = table(vec![
            (vec![100.0, 100.0], "first"),
            (vec![104.0, 104.0], "second"),
        ]);
        let tol = ToleranceProfile::uniform(0.1, 2).unwrap();
        let frame = SensorFrame::new(vec![103.0, 103.0]);

        for _ in 0..10 {
            assert_eq!(classify(&frame, &t, &tol), Outcome::Matched("first".into()));
        }
    }

    #[test]
    fn test_later_entry_when_earlier_fails() {
        let t = table(vec![(vec![100.0, 100.0], "first"), (vec![200.0, 200.0], "second")]);
        let tol = ToleranceProfile::uniform(0.1, 2).unwrap();
        let frame = SensorFrame::new(vec![205.0, 190.0]);
        assert_eq!(classify(&frame, &t, &tol), Outcome::Matched("second".into()));
    }

    #[test]
    fn test_zero_center() {
        let t = table(vec![(vec![0.0, 50.0], "zero")]);
        let tol = ToleranceProfile::uniform(0.2, 2).unwrap();

        assert_eq!(
            classify(&SensorFrame::new(vec![0.0, 50.0]), &t, &tol),
            Outcome::Matched("zero".into())
        );
        for v in [1e-9, -1e-9, 0.5] {
            assert_eq!(
                classify(&SensorFrame::new(vec![v, 50.0]), &t, &tol),
                Outcome::Diagnostic(Diagnostic::NoMatch)
            );
        }
    }

    #[test]
    fn test_zero_tolerance_requires_exact() {
        let t = table(vec![(vec![7.0], "seven")]);
        let tol = ToleranceProfile::uniform(0.0, 1).unwrap();
        assert_eq!(
            classify(&SensorFrame::new(vec![7.0]), &t, &tol),
            Outcome::Matched("seven".into())
        );
        assert_eq!(
            classify(&SensorFrame::new(vec![7.001]), &t, &tol),
            Outcome::Diagnostic(Diagnostic::NoMatch)
        );
    }

    #[test]
    fn test_negative_center() {
        let t = table(vec![(vec![-100.0], "neg")]);
        let tol = ToleranceProfile::uniform(0.1, 1).unwrap();
        assert_eq!(
            classify(&SensorFrame::new(vec![-95.0]), &t, &tol),
            Outcome::Matched("neg".into())
        );
    }

    #[test]
    fn test_nan_never_matches() {
        let t = table(vec![(vec![1.0], "one")]);
        let tol = ToleranceProfile::uniform(0.5, 1).unwrap();
        assert_eq!(
            classify(&SensorFrame::new(vec![f64::NAN]), &t, &tol),
            Outcome::Diagnostic(Diagnostic::NoMatch)
        );
    }

    #[test]
    fn test_length_mismatch_before_scan() {
        let t = table(vec![(vec![1.0, 2.0, 3.0], "x")]);
        let tol = ToleranceProfile::uniform(0.1, 3).unwrap();
        assert_eq!(
            classify(&SensorFrame::new(vec![1.0, 2.0]), &t, &tol),
            Outcome::Diagnostic(Diagnostic::ChannelCountMismatch {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_short_tolerance_profile_is_no_match() {
        let t = table(vec![(vec![1.0, 2.0, 3.0], "x")]);
        let tol = ToleranceProfile::uniform(0.1, 2).unwrap();
        assert_eq!(
            classify(&SensorFrame::new(vec![1.0, 2.0, 3.0]), &t, &tol),
            Outcome::Diagnostic(Diagnostic::NoMatch)
        );
    }

    #[test]
    fn test_tolerance_length_checked() {
        let t = Arc::new(table(vec![(vec![1.0, 2.0, 3.0], "x")]));
        let err = GestureClassifier::new(t, ToleranceProfile::uniform(0.1, 5).unwrap())
            .unwrap_err();
        assert_eq!(
            err,
            ClassifierError::ToleranceLength {
                tolerances: 5,
                channels: 3
            }
        );
    }

    #[test]
    fn test_recognize_sentinels() {
        let t = Arc::new(table(vec![(vec![1.0, 2.0, 3.0], "x")]));
        let c = GestureClassifier::new(t, ToleranceProfile::uniform(0.1, 3).unwrap()).unwrap();

        assert_eq!(
            c.recognize(&Reading::NoData),
            Outcome::Diagnostic(Diagnostic::NoDataReceived)
        );
        for blank in ["", "  \r"] {
            assert_eq!(
                c.recognize(&Reading::Line(blank.into())),
                Outcome::Diagnostic(Diagnostic::NoDataReceived)
            );
        }
        assert_eq!(
            c.recognize(&Reading::TransportError("unplugged".into())),
            Outcome::Diagnostic(Diagnostic::TransportError("unplugged".into()))
        );
        assert!(matches!(
            c.recognize(&Reading::Line("1,two,3".into())),
            Outcome::Diagnostic(Diagnostic::ParseError { index: 1, .. })
        ));
    }
}
