//! Per-channel tolerance ratios.

/// Default tolerance ratio applied to every channel.
pub const DEFAULT_TOLERANCE: f64 = 0.05;

/// Error type for tolerance profiles.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ToleranceError {
    #[error("tolerance for channel {channel} must be a finite non-negative ratio, got {ratio}")]
    InvalidRatio { channel: usize, ratio: f64 },
    #[error("tolerance profile has no channels")]
    Empty,
}

/// Fractional tolerance per channel.
///
/// A ratio of `0.1` accepts readings within ±10% of the reference value;
/// `0.0` requires an exact match on that channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ToleranceProfile {
    ratios: Vec<f64>,
}

impl ToleranceProfile {
    /// Creates a profile applying the same ratio to `channels` channels.
    pub fn uniform(ratio: f64, channels: usize) -> Result<Self, ToleranceError> {
        Self::per_channel(vec![ratio; channels])
    }

    /// Creates a profile with a distinct ratio per channel.
    pub fn per_channel(ratios: Vec<f64>) -> Result<Self, ToleranceError> {
        if ratios.is_empty() {
            return Err(ToleranceError::Empty);
        }
        if let Some((channel, &ratio)) = ratios
            .iter()
            .enumerate()
            .find(|(_, r)| !r.is_finite() || **r < 0.0)
        {
            return Err(ToleranceError::InvalidRatio { channel, ratio });
        }
        Ok(Self { ratios })
    }

    /// Returns the number of channels covered.
    pub fn len(&self) -> usize {
        self.ratios.len()
    }

    /// Always false; profiles cannot be empty.
    pub fn is_empty(&self) -> bool {
        self.ratios.is_empty()
    }

    /// Returns the ratio for a channel, or `None` past the last channel.
    pub fn ratio(&self, channel: usize) -> Option<f64> {
        self.ratios.get(channel).copied()
    }

    /// Returns all ratios.
    pub fn ratios(&self) -> &[f64] {
        &self.ratios
    }

    /// Returns the inclusive band around `center` for a channel.
    ///
    /// Bounds are ordered, so negative centers yield a valid range. A zero
    /// center always yields `[0, 0]`. Returns `None` for a channel the
    /// profile does not cover.
    pub fn band(&self, channel: usize, center: f64) -> Option<(f64, f64)> {
        let ratio = self.ratio(channel)?;
        let a = center * (1.0 - ratio);
        let b = center * (1.0 + ratio);
        Some(if a <= b { (a, b) } else { (b, a) })
    }
}
