//! Error types for crm-resolve.
//!
//! All errors are strongly typed using thiserror so callers can match on
//! specific conditions. None of the resolution errors is fatal to a batch:
//! the engine downgrades them to warnings on the report.

use thiserror::Error;

use crate::action::Action;
use crate::entity::EntityKind;
use crate::storage::RepositoryError;

/// Validation errors that occur during input validation.
///
/// Raised for candidates before dispatch and for configuration on load.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A confidence was NaN or outside [0, 1].
    #[error("Confidence value {value} is out of range [0.0, 1.0]")]
    ConfidenceOutOfRange {
        /// Offending value.
        value: f32,
    },

    /// A configured threshold was outside [0, 1].
    #[error("Threshold '{name}' = {value} is out of range [0.0, 1.0]")]
    ThresholdOutOfRange {
        /// Threshold name.
        name: String,
        /// Offending value.
        value: f32,
    },

    /// The creation floor sits above a kind's threshold.
    #[error("Creation floor {floor} must not exceed the {kind} threshold {threshold}")]
    FloorAboveThreshold {
        /// Kind whose threshold is too low.
        kind: EntityKind,
        /// Configured floor.
        floor: f32,
        /// Configured threshold.
        threshold: f32,
    },

    /// Name or title normalized to nothing.
    #[error("{kind} name cannot be empty")]
    EmptyName {
        /// Kind of the candidate.
        kind: EntityKind,
    },

    /// Email failed the syntax check.
    #[error("Invalid email address: '{value}'")]
    InvalidEmail {
        /// Offending value.
        value: String,
    },

    /// Domain failed the syntax check.
    #[error("Invalid domain: '{value}'")]
    InvalidDomain {
        /// Offending value.
        value: String,
    },

    /// Amount was negative or not finite.
    #[error("Amount {value} must be a finite, non-negative number")]
    InvalidAmount {
        /// Offending value.
        value: f64,
    },

    /// A text field is too long.
    #[error("Field '{field}' exceeds maximum length of {max_length}")]
    FieldTooLong {
        /// Field name.
        field: String,
        /// Limit in characters.
        max_length: usize,
    },

    /// A required field is absent.
    #[error("Required field '{field}' is missing")]
    MissingField {
        /// Field name.
        field: String,
    },

    /// A label matched no known variant.
    #[error("Unknown {what}: '{value}'")]
    UnknownLabel {
        /// What was being parsed.
        what: &'static str,
        /// Offending value.
        value: String,
    },

    /// Configuration is inconsistent.
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// What is wrong.
        reason: String,
    },
}

/// A single candidate failed to resolve.
///
/// Caught at the per-candidate level; the candidate is dropped from its
/// kind's output and the failure is recorded as a warning.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// Candidate failed validation.
    #[error("Invalid candidate: {0}")]
    InvalidCandidate(#[from] ValidationError),

    /// Repository lookup failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl ResolutionError {
    /// Returns true if the repository could not be reached at all.
    ///
    /// Such failures abort the whole kind instead of a single candidate.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Repository(RepositoryError::Unavailable(_)))
    }
}

/// Illegal transitions requested through the disambiguation gate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisambiguationError {
    /// The entity already left `validate`.
    #[error("Entity '{name}' is not awaiting validation (action: {action})")]
    NotPending {
        /// Entity name.
        name: String,
        /// Its current action.
        action: Action,
    },

    /// No alternative at that index.
    #[error("Alternative {index} out of range ({available} available)")]
    AlternativeOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of alternatives.
        available: usize,
    },
}

/// Errors raised while validating an action plan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    /// Two actions share an id.
    #[error("Duplicate action id {action_id}")]
    DuplicateActionId {
        /// Repeated id.
        action_id: u32,
    },

    /// A dependency names no action in the plan.
    #[error("Action {action_id} depends on unknown action {dependency}")]
    UnknownDependency {
        /// Dependent action.
        action_id: u32,
        /// Missing id.
        dependency: u32,
    },

    /// An action lists itself as a dependency.
    #[error("Action {action_id} depends on itself")]
    SelfDependency {
        /// Offending action.
        action_id: u32,
    },

    /// Dependencies form a cycle.
    #[error("Dependency cycle detected among actions {action_ids:?}")]
    DependencyCycle {
        /// Actions on the cycle, sorted.
        action_ids: Vec<u32>,
    },

    /// A placeholder points at an undeclared dependency.
    #[error("Action {action_id} references [DEPENDS_ON:{dependency}] without declaring the dependency")]
    UndeclaredPlaceholder {
        /// Action holding the placeholder.
        action_id: u32,
        /// Referenced id.
        dependency: u32,
    },

    /// The planner could not produce a plan.
    #[error("Planner failed: {message}")]
    Planner {
        /// Planner message.
        message: String,
    },
}

/// Top-level error type for crm-resolve.
#[derive(Debug, Error)]
pub enum CrmError {
    /// Input validation failed.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A candidate failed to resolve.
    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    /// Repository failure.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Illegal disambiguation transition.
    #[error("Disambiguation error: {0}")]
    Disambiguation(#[from] DisambiguationError),

    /// Invalid action plan.
    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    /// Malformed configuration JSON.
    #[error("Configuration could not be parsed: {0}")]
    Config(#[from] serde_json::Error),

    /// Invariant broken inside the crate.
    #[error("Internal error: {message}")]
    Internal {
        /// Description.
        message: String,
    },
}

impl CrmError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Resolution(ResolutionError::InvalidCandidate(_))
        )
    }

    /// Returns true if this is an internal error.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Repository(e) | Self::Resolution(ResolutionError::Repository(e)) => {
                e.is_transient()
            }
            _ => false,
        }
    }
}

/// Result type alias for crm-resolve operations.
pub type CrmResult<T> = Result<T, CrmError>;
