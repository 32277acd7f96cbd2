//! Resolution configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::action::{CREATION_THRESHOLD, DEFAULT_HIGH_THRESHOLD};
use crate::entity::EntityKind;
use crate::error::{CrmResult, ValidationError};

/// Classification thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// `use_existing` threshold for companies.
    pub company: f32,
    /// `use_existing` threshold for contacts.
    pub contact: f32,
    /// `use_existing` threshold for opportunities.
    pub opportunity: f32,
    /// Shared creation floor; also the ranking filter.
    pub creation: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            company: DEFAULT_HIGH_THRESHOLD,
            contact: DEFAULT_HIGH_THRESHOLD,
            opportunity: DEFAULT_HIGH_THRESHOLD,
            creation: CREATION_THRESHOLD,
        }
    }
}

impl Thresholds {
    /// `use_existing` threshold for `kind`.
    #[must_use]
    pub const fn high(&self, kind: EntityKind) -> f32 {
        match kind {
            EntityKind::Company => self.company,
            EntityKind::Contact => self.contact,
            EntityKind::Opportunity => self.opportunity,
        }
    }

    /// Checks ranges and ordering.
    ///
    /// # Errors
    ///
    /// Returns `ThresholdOutOfRange` for values outside [0, 1] and
    /// `FloorAboveThreshold` when the creation floor exceeds a high threshold.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let named = [
            ("company", self.company),
            ("contact", self.contact),
            ("opportunity", self.opportunity),
            ("creation", self.creation),
        ];
        for (name, value) in named {
            if value.is_nan() || !(0.0..=1.0).contains(&value) {
                return Err(ValidationError::ThresholdOutOfRange {
                    name: name.to_string(),
                    value,
                });
            }
        }
        for kind in EntityKind::ALL {
            let threshold = self.high(kind);
            if self.creation > threshold {
                return Err(ValidationError::FloorAboveThreshold {
                    kind,
                    floor: self.creation,
                    threshold,
                });
            }
        }
        Ok(())
    }
}

/// Configuration for [`ResolutionEngine`](crate::engine::ResolutionEngine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionConfig {
    /// Per-kind `use_existing` thresholds and the creation floor.
    pub thresholds: Thresholds,
    /// Runner-ups kept on a `validate` match.
    pub max_alternatives: usize,
    /// Deadline for each kind's resolver task, in milliseconds.
    /// `None` waits indefinitely.
    pub kind_timeout_ms: Option<u64>,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            max_alternatives: 3,
            kind_timeout_ms: None,
        }
    }
}

impl ResolutionConfig {
    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns `CrmError::Config` for malformed JSON and
    /// `CrmError::Validation` for out-of-range values.
    pub fn from_json_str(json: &str) -> CrmResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every field.
    ///
    /// # Errors
    ///
    /// See [`Thresholds::validate`]; a zero timeout is also rejected.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.thresholds.validate()?;
        if self.kind_timeout_ms == Some(0) {
            return Err(ValidationError::InvalidConfig {
                reason: "kind_timeout_ms must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Per-kind deadline as a [`Duration`].
    #[must_use]
    pub fn kind_timeout(&self) -> Option<Duration> {
        self.kind_timeout_ms.map(Duration::from_millis)
    }

    /// Sets the shared deadline for the three kind tasks.
    #[must_use]
    pub fn with_kind_timeout(mut self, timeout: Duration) -> Self {
        self.kind_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX).max(1));
        self
    }
}
