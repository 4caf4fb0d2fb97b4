//! Confidence arithmetic
//!
//! Every field candidate's confidence is computed with the same formula:
//!
//! ```text
//! resolved = clamp(base × cue_boost × frequency_boost, 0, 1)
//! ```
//!
//! where `base` is the recognizer's confidence and each boost factor lies in
//! `(0, MAX_BOOST]`. A factor below 1 is a penalty.

/// Upper bound for a single boost factor
pub const MAX_BOOST: f64 = 2.0;

/// Neutral boost factor
pub const NEUTRAL_BOOST: f64 = 1.0;

/// Whether a value is usable as a boost factor
pub fn is_valid_boost(factor: f64) -> bool {
    factor.is_finite() && factor > 0.0 && factor <= MAX_BOOST
}

/// Clamp a confidence to [0, 1], mapping NaN to 0
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Inputs of the confidence formula for one candidate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceFactors {
    /// Recognizer-provided base confidence
    pub base: f64,
    /// Boost from a nearby cue token (or penalty for missing one)
    pub cue_boost: f64,
    /// Boost from repeated mentions of the same value
    pub frequency_boost: f64,
}

impl ConfidenceFactors {
    /// Start from a base confidence with neutral boosts
    pub fn new(base: f64) -> Self {
        Self {
            base,
            cue_boost: NEUTRAL_BOOST,
            frequency_boost: NEUTRAL_BOOST,
        }
    }

    /// Set the cue boost
    pub fn with_cue_boost(mut self, factor: f64) -> Self {
        self.cue_boost = factor;
        self
    }

    /// Set the frequency boost
    pub fn with_frequency_boost(mut self, factor: f64) -> Self {
        self.frequency_boost = factor;
        self
    }

    /// Compute the resolved confidence
    ///
    /// Boost factors outside `(0, MAX_BOOST]` are clamped into range before
    /// multiplication.
    pub fn resolve(&self) -> f64 {
        let cue = clamp_boost(self.cue_boost);
        let frequency = clamp_boost(self.frequency_boost);
        clamp_confidence(clamp_confidence(self.base) * cue * frequency)
    }
}

/// Frequency boost for a value mentioned `occurrences` times
///
/// Grows linearly by `step` per extra mention and saturates at `max`.
pub fn frequency_boost(occurrences: usize, step: f64, max: f64) -> f64 {
    if occurrences <= 1 {
        return NEUTRAL_BOOST;
    }
    let boost = NEUTRAL_BOOST + step * (occurrences - 1) as f64;
    clamp_boost(boost.min(max))
}

fn clamp_boost(factor: f64) -> f64 {
    if factor.is_nan() {
        NEUTRAL_BOOST
    } else {
        factor.clamp(f64::MIN_POSITIVE, MAX_BOOST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_factors_keep_base() {
        assert_eq!(ConfidenceFactors::new(0.8).resolve(), 0.8);
    }

    #[test]
    fn test_boosts_multiply_and_clamp() {
        let factors = ConfidenceFactors::new(0.8).with_cue_boost(1.5).with_frequency_boost(1.2);
        assert_eq!(factors.resolve(), 1.0);

        let factors = ConfidenceFactors::new(0.8).with_cue_boost(0.5);
        assert!((factors.resolve() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_range_boost_is_clamped() {
        let factors = ConfidenceFactors::new(0.25).with_cue_boost(10.0);
        assert_eq!(factors.resolve(), 0.5);
    }

    #[test]
    fn test_frequency_boost_saturates() {
        assert_eq!(frequency_boost(0, 0.15, 1.6), 1.0);
        assert_eq!(frequency_boost(1, 0.15, 1.6), 1.0);
        assert!((frequency_boost(3, 0.15, 1.6) - 1.3).abs() < 1e-12);
        assert_eq!(frequency_boost(50, 0.15, 1.6), 1.6);
    }

    #[test]
    fn test_valid_boost_range() {
        assert!(is_valid_boost(2.0));
        assert!(is_valid_boost(0.01));
        assert!(!is_valid_boost(0.0));
        assert!(!is_valid_boost(2.01));
        assert!(!is_valid_boost(f64::NAN));
    }
}
