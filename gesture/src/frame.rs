//! Raw readings and parsed sensor frames.

use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Field delimiter of the glove's line protocol.
pub const FIELD_DELIMITER: char = ',';

/// One unit of input from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reading {
    /// A complete line, already stripped of its line terminator.
    Line(String),
    /// Nothing arrived within the read timeout.
    NoData,
    /// The transport failed (e.g. the device was disconnected).
    TransportError(String),
}

/// How a parsed line is fitted to the expected channel count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelPolicy {
    /// The line must carry exactly the expected number of fields.
    #[default]
    Exact,
    /// Only the leading fields are used; extra trailing fields are dropped.
    Leading,
}

/// Error type for frame parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrameError {
    #[error("field {index} is not a number: {field:?}")]
    Parse { index: usize, field: String },
    #[error("expected {expected} channels, got {actual}")]
    ChannelCountMismatch { expected: usize, actual: usize },
}

/// A fixed-length vector of channel values captured at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorFrame {
    values: Vec<f64>,
}

impl SensorFrame {
    /// Creates a frame from channel values.
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Parses a comma-separated line into a frame of `expected` channels.
    ///
    /// Every field is parsed, including trailing fields that
    /// [`ChannelPolicy::Leading`] drops afterwards.
    pub fn parse(line: &str, expected: usize, policy: ChannelPolicy) -> Result<Self, FrameError> {
        let mut values = line
            .split(FIELD_DELIMITER)
            .enumerate()
            .map(|(index, field)| {
                let field = field.trim();
                field.parse::<f64>().map_err(|_| FrameError::Parse {
                    index,
                    field: field.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let actual = values.len();
        match policy {
            ChannelPolicy::Exact if actual != expected => {
                Err(FrameError::ChannelCountMismatch { expected, actual })
            }
            ChannelPolicy::Leading if actual < expected => {
                Err(FrameError::ChannelCountMismatch { expected, actual })
            }
            _ => {
                values.truncate(expected);
                Ok(Self { values })
            }
        }
    }

    /// Returns the number of channels.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the frame has no channels.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the channel values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

impl Index<usize> for SensorFrame {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.values[index]
    }
}

#[cfg(test)]
mod frame_tests {
    use super::*;

    #[test]
    fn test_parse_exact() {
        let frame = SensorFrame::parse("1.0,2.5,-3,4e2,5", 5, ChannelPolicy::Exact).unwrap();
        assert_eq!(frame.values(), &[1.0, 2.5, -3.0, 400.0, 5.0]);
    }

    #[test]
    fn test_parse_trims_fields() {
        let frame = SensorFrame::parse(" 1.0 , 2.0,3.0 ", 3, ChannelPolicy::Exact).unwrap();
        assert_eq!(frame.values(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_parse_non_numeric() {
        let err = SensorFrame::parse("1.0,abc,3.0", 3, ChannelPolicy::Exact).unwrap_err();
        assert_eq!(
            err,
            FrameError::Parse {
                index: 1,
                field: "abc".to_string()
            }
        );
    }

    #[test]
    fn test_parse_empty_field() {
        let err = SensorFrame::parse("1.0,,3.0", 3, ChannelPolicy::Exact).unwrap_err();
        assert!(matches!(err, FrameError::Parse { index: 1, .. }));
    }

    #[test]
    fn test_exact_rejects_extra_fields() {
        let err = SensorFrame::parse("1,2,3,4,5,6", 5, ChannelPolicy::Exact).unwrap_err();
        assert_eq!(
            err,
            FrameError::ChannelCountMismatch {
                expected: 5,
                actual: 6
            }
        );
    }

    #[test]
    fn test_leading_truncates() {
        let frame =
            SensorFrame::parse("1,2,3,4,5,6,7,8,9,10,11", 5, ChannelPolicy::Leading).unwrap();
        assert_eq!(frame.values(), &[1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_leading_rejects_short_line() {
        let err = SensorFrame::parse("1,2,3,4", 5, ChannelPolicy::Leading).unwrap_err();
        assert!(matches!(
            err,
            FrameError::ChannelCountMismatch {
                expected: 5,
                actual: 4
            }
        ));
    }

    #[test]
    fn test_leading_still_parses_dropped_fields() {
        let err = SensorFrame::parse("1,2,3,4,5,oops", 5, ChannelPolicy::Leading).unwrap_err();
        assert!(matches!(err, FrameError::Parse { index: 5, .. }));
    }

    #[test]
    fn test_frame_error_display() {
        let err = FrameError::ChannelCountMismatch {
            expected: 11,
            actual: 3,
        };
        assert_eq!(err.to_string(), "expected 11 channels, got 3");
    }
}
