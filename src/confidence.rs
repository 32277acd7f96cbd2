//! Match confidence.
//!
//! A confidence is a score in [0.0, 1.0] quantifying how strongly a
//! candidate entity matches a stored record. Scores are heuristic: they are
//! built from exact-match, containment, edit-distance and contextual boosts,
//! and every arithmetic step clamps back into range.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Bounded match confidence.
///
/// # Examples
///
/// ```
/// use crm_resolve::Confidence;
///
/// let conf = Confidence::new(0.6).unwrap().boost(0.2);
/// assert!((conf.value() - 0.8).abs() < 1e-6);
/// assert_eq!(Confidence::one().boost(0.3).value(), 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct Confidence(f32);

impl Confidence {
    /// Minimum valid confidence value.
    pub const MIN_VALUE: f32 = 0.0;

    /// Maximum valid confidence value.
    pub const MAX_VALUE: f32 = 1.0;

    /// Creates a new confidence with validation.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::ConfidenceOutOfRange` if the value is NaN or
    /// not in [0.0, 1.0].
    pub fn new(value: f32) -> Result<Self, ValidationError> {
        Self::validate_value(value)?;
        Ok(Self(value))
    }

    /// Creates a confidence by clamping into [0.0, 1.0]. NaN maps to zero.
    #[must_use]
    pub fn clamped(value: f32) -> Self {
        if value.is_nan() {
            return Self::zero();
        }
        Self(value.clamp(Self::MIN_VALUE, Self::MAX_VALUE))
    }

    /// No evidence of a match.
    #[must_use]
    pub const fn zero() -> Self {
        Self(0.0)
    }

    /// Certain match.
    #[must_use]
    pub const fn one() -> Self {
        Self(1.0)
    }

    /// Raw score.
    pub const fn value(self) -> f32 {
        self.0
    }

    /// Adds `delta` and clamps the result back into range.
    #[must_use]
    pub fn boost(self, delta: f32) -> Self {
        Self::clamped(self.0 + delta)
    }

    /// Multiplies by `factor` and clamps the result back into range.
    #[must_use]
    pub fn scale(self, factor: f32) -> Self {
        Self::clamped(self.0 * factor)
    }

    /// Total order used for ranking (descending sorts call this reversed).
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }

    fn validate_value(value: f32) -> Result<(), ValidationError> {
        if value.is_nan() || !(Self::MIN_VALUE..=Self::MAX_VALUE).contains(&value) {
            return Err(ValidationError::ConfidenceOutOfRange { value });
        }
        Ok(())
    }
}

impl TryFrom<f32> for Confidence {
    type Error = ValidationError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Confidence> for f32 {
    fn from(conf: Confidence) -> Self {
        conf.0
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_valid_values() {
        assert!(Confidence::new(0.0).is_ok());
        assert!(Confidence::new(0.5).is_ok());
        assert!(Confidence::new(1.0).is_ok());
    }

    #[test]
    fn test_confidence_invalid_values() {
        assert!(Confidence::new(-0.1).is_err());
        assert!(Confidence::new(1.1).is_err());
        assert!(Confidence::new(f32::NAN).is_err());
    }

    #[test]
    fn test_boost_clamps_at_one() {
        let conf = Confidence::new(0.9).unwrap().boost(0.2);
        assert_eq!(conf.value(), 1.0);
    }

    #[test]
    fn test_boosts_stack() {
        let conf = Confidence::zero().boost(0.3).boost(0.3).boost(0.2);
        assert!((conf.value() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_scale() {
        let conf = Confidence::new(0.5).unwrap().scale(0.7);
        assert!((conf.value() - 0.35).abs() < 1e-6);
    }

    #[test]
    fn test_clamped_handles_nan_and_negative() {
        assert_eq!(Confidence::clamped(f32::NAN), Confidence::zero());
        assert_eq!(Confidence::clamped(-3.0), Confidence::zero());
    }

    #[test]
    fn test_confidence_display() {
        let conf = Confidence::new(0.857).unwrap();
        assert_eq!(format!("{conf}"), "0.86");
    }

    #[test]
    fn test_confidence_serialization() {
        let conf = Confidence::new(0.75).unwrap();
        let json = serde_json::to_string(&conf).unwrap();
        assert_eq!(json, "0.75");

        let back: Confidence = serde_json::from_str(&json).unwrap();
        assert_eq!(back, conf);

        assert!(serde_json::from_str::<Confidence>("1.5").is_err());
    }
}
