//! Action classification.
//!
//! Maps a match confidence onto the disposition of a candidate: reuse the
//! stored record, ask for confirmation, or create a new record.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::confidence::Confidence;
use crate::error::ValidationError;

/// Confidence below which a candidate is always created fresh.
///
/// The same value is the ranking floor used by every resolver, so a ranked
/// candidate never lands in `Create` through [`classify`].
pub const CREATION_THRESHOLD: f32 = 0.2;

/// Default `use_existing` threshold shared by all entity kinds.
pub const DEFAULT_HIGH_THRESHOLD: f32 = 0.85;

/// Disposition assigned to a resolved candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Reuse the matched record.
    UseExisting,
    /// Probable match; needs confirmation.
    Validate,
    /// No usable match; create a new record.
    Create,
}

impl Action {
    /// Stable snake_case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UseExisting => "use_existing",
            Self::Validate => "validate",
            Self::Create => "create",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Action {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "use_existing" => Ok(Self::UseExisting),
            "validate" => Ok(Self::Validate),
            "create" => Ok(Self::Create),
            other => Err(ValidationError::UnknownLabel {
                what: "action",
                value: other.to_string(),
            }),
        }
    }
}

/// Classify a confidence against a `use_existing` threshold.
///
/// - `confidence >= high_threshold` is `UseExisting`
/// - `CREATION_THRESHOLD <= confidence < high_threshold` is `Validate`
/// - `confidence < CREATION_THRESHOLD` is `Create`
#[must_use]
pub fn classify(confidence: Confidence, high_threshold: f32) -> Action {
    classify_with_floor(confidence, high_threshold, CREATION_THRESHOLD)
}

/// Like [`classify`] with an explicit creation floor.
#[must_use]
pub fn classify_with_floor(confidence: Confidence, high_threshold: f32, floor: f32) -> Action {
    let value = confidence.value();
    if value >= high_threshold {
        Action::UseExisting
    } else if value >= floor {
        Action::Validate
    } else {
        Action::Create
    }
}
