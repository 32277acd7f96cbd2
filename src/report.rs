//! Aggregated output of one resolution batch.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::action::Action;
use crate::entity::EntityKind;
use crate::resolve::MatchedEntity;

/// Identifier of one resolved batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BatchId(Uuid);

impl BatchId {
    /// Fresh random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why candidates were dropped from a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum WarningReason {
    /// Rejected by schema validation before dispatch.
    InvalidCandidate {
        /// Validation failure.
        message: String,
    },
    /// Failed during resolution; siblings were unaffected.
    ResolutionFailed {
        /// Error or panic message.
        message: String,
    },
    /// The repository could not be reached for the whole kind.
    RepositoryUnavailable {
        /// Repository error.
        message: String,
        /// Every candidate of the kind.
        dropped: Vec<String>,
    },
    /// The kind's task missed its deadline.
    TimedOut {
        /// Configured timeout.
        after_ms: u64,
        /// Every candidate of the kind.
        dropped: Vec<String>,
    },
    /// The kind's task died without replying.
    WorkerLost {
        /// Every candidate of the kind.
        dropped: Vec<String>,
    },
}

/// One recorded drop. Candidate-level warnings name the candidate;
/// kind-level warnings list every dropped candidate in the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionWarning {
    /// Kind of the dropped candidates.
    pub kind: EntityKind,
    /// Dropped candidate, for candidate-level warnings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate: Option<String>,
    /// Why it was dropped.
    #[serde(flatten)]
    pub reason: WarningReason,
}

impl ResolutionWarning {
    /// Warning about one candidate.
    #[must_use]
    pub fn candidate(kind: EntityKind, candidate: impl Into<String>, reason: WarningReason) -> Self {
        Self {
            kind,
            candidate: Some(candidate.into()),
            reason,
        }
    }

    /// Warning about a whole kind.
    #[must_use]
    pub const fn kind_level(kind: EntityKind, reason: WarningReason) -> Self {
        Self {
            kind,
            candidate: None,
            reason,
        }
    }

    /// Names of all candidates this warning accounts for.
    #[must_use]
    pub fn dropped(&self) -> Vec<&str> {
        match &self.reason {
            WarningReason::RepositoryUnavailable { dropped, .. }
            | WarningReason::TimedOut { dropped, .. }
            | WarningReason::WorkerLost { dropped } => dropped.iter().map(String::as_str).collect(),
            WarningReason::InvalidCandidate { .. } | WarningReason::ResolutionFailed { .. } => {
                self.candidate.as_deref().into_iter().collect()
            }
        }
    }
}

impl fmt::Display for ResolutionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.reason, &self.candidate) {
            (WarningReason::InvalidCandidate { message }, Some(name)) => {
                write!(f, "{} '{name}' rejected: {message}", self.kind)
            }
            (WarningReason::ResolutionFailed { message }, Some(name)) => {
                write!(f, "{} '{name}' failed to resolve: {message}", self.kind)
            }
            (WarningReason::InvalidCandidate { message } | WarningReason::ResolutionFailed { message }, None) => {
                write!(f, "{}: {message}", self.kind)
            }
            (WarningReason::RepositoryUnavailable { message, dropped }, _) => write!(
                f,
                "{} repository unavailable ({message}); dropped {}",
                self.kind,
                dropped.join(", ")
            ),
            (WarningReason::TimedOut { after_ms, dropped }, _) => write!(
                f,
                "{} resolution timed out after {after_ms}ms; dropped {}",
                self.kind,
                dropped.join(", ")
            ),
            (WarningReason::WorkerLost { dropped }, _) => write!(
                f,
                "{} resolver stopped unexpectedly; dropped {}",
                self.kind,
                dropped.join(", ")
            ),
        }
    }
}

/// All matched entities of one batch, partitioned by kind.
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionReport {
    /// Batch id.
    pub batch_id: BatchId,
    /// When resolution finished.
    pub resolved_at: DateTime<Utc>,
    /// Resolved companies in input order.
    pub companies: Vec<MatchedEntity>,
    /// Resolved contacts in input order.
    pub contacts: Vec<MatchedEntity>,
    /// Resolved opportunities in input order.
    pub opportunities: Vec<MatchedEntity>,
    /// True iff at least one entity has action `validate`.
    pub needs_validation: bool,
    /// Entities moved out of `validate` by disambiguation, as they stood
    /// after their transition. Accumulates across gate passes.
    pub validated: Vec<MatchedEntity>,
    /// True once a gate pass has left nothing pending.
    pub disambiguated: bool,
    /// Dropped candidates.
    pub warnings: Vec<ResolutionWarning>,
}

impl ResolutionReport {
    /// Report over resolved entities; computes `needs_validation`.
    #[must_use]
    pub fn new(
        companies: Vec<MatchedEntity>,
        contacts: Vec<MatchedEntity>,
        opportunities: Vec<MatchedEntity>,
        warnings: Vec<ResolutionWarning>,
    ) -> Self {
        let mut report = Self {
            batch_id: BatchId::new(),
            resolved_at: Utc::now(),
            companies,
            contacts,
            opportunities,
            needs_validation: false,
            validated: Vec::new(),
            disambiguated: false,
            warnings,
        };
        report.refresh_needs_validation();
        report
    }

    /// Recomputes `needs_validation` after entities changed.
    pub fn refresh_needs_validation(&mut self) {
        let pending = self.entities().any(MatchedEntity::needs_validation);
        self.needs_validation = pending;
    }

    /// Entities of one kind.
    #[must_use]
    pub fn of_kind(&self, kind: EntityKind) -> &[MatchedEntity] {
        match kind {
            EntityKind::Company => &self.companies,
            EntityKind::Contact => &self.contacts,
            EntityKind::Opportunity => &self.opportunities,
        }
    }

    /// Companies, then contacts, then opportunities.
    pub fn entities(&self) -> impl Iterator<Item = &MatchedEntity> {
        self.companies
            .iter()
            .chain(&self.contacts)
            .chain(&self.opportunities)
    }

    /// Mutable entities, in the same order as [`Self::entities`].
    pub fn entities_mut(&mut self) -> impl Iterator<Item = &mut MatchedEntity> {
        self.companies
            .iter_mut()
            .chain(&mut self.contacts)
            .chain(&mut self.opportunities)
    }

    /// Entities still awaiting confirmation.
    pub fn requiring_validation(&self) -> impl Iterator<Item = &MatchedEntity> {
        self.entities().filter(|e| e.needs_validation())
    }

    /// Number of entities with `action`.
    #[must_use]
    pub fn count_by_action(&self, action: Action) -> usize {
        self.entities().filter(|e| e.action() == action).count()
    }

    /// Number of resolved entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.companies.len() + self.contacts.len() + self.opportunities.len()
    }
}
