//! Batch resolution engine.
//!
//! The engine validates every candidate of an extraction batch, partitions
//! the survivors by kind, resolves each kind on its own task and merges the
//! results into a [`ResolutionReport`]. No error aborts a batch: every
//! dropped candidate is accounted for by a warning on the report.

mod runtime;

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::config::ResolutionConfig;
use crate::entity::{EntityKind, ExtractionResult};
use crate::error::ValidationError;
use crate::report::{ResolutionReport, ResolutionWarning, WarningReason};
use crate::resolve::{
    CompanyResolver, ContactResolver, MatchPolicy, OpportunityQuery, OpportunityResolver,
};
use crate::storage::EntityRepository;

use runtime::{spawn_kind, KindOutcome};

/// Resolves extraction batches against one repository.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use crm_resolve::{demo_repository, Action, CandidateCompany, ExtractionResult, ResolutionEngine};
///
/// let engine = ResolutionEngine::new(Arc::new(demo_repository()));
/// let batch = ExtractionResult {
///     companies: vec![CandidateCompany::new("Nextera")],
///     ..ExtractionResult::default()
/// };
/// let report = engine.resolve_batch(&batch);
/// assert_eq!(report.companies[0].action(), Action::UseExisting);
/// assert!(!report.needs_validation);
/// ```
#[derive(Clone)]
pub struct ResolutionEngine {
    repository: Arc<dyn EntityRepository>,
    config: ResolutionConfig,
}

impl std::fmt::Debug for ResolutionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ResolutionEngine {
    /// Engine with the default configuration.
    #[must_use]
    pub fn new(repository: Arc<dyn EntityRepository>) -> Self {
        Self {
            repository,
            config: ResolutionConfig::default(),
        }
    }

    /// Engine with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns the first problem found by [`ResolutionConfig::validate`].
    pub fn with_config(
        repository: Arc<dyn EntityRepository>,
        config: ResolutionConfig,
    ) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self { repository, config })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &ResolutionConfig {
        &self.config
    }

    /// Repository queried by every resolver.
    #[must_use]
    pub fn repository(&self) -> &Arc<dyn EntityRepository> {
        &self.repository
    }

    /// Resolves every candidate of `extraction`.
    ///
    /// Kinds run concurrently; within a kind the output follows input order.
    #[must_use]
    pub fn resolve_batch(&self, extraction: &ExtractionResult) -> ResolutionReport {
        let started = Instant::now();
        let mut warnings = Vec::new();

        let companies = admit(EntityKind::Company, &extraction.companies, &mut warnings, |c| {
            (c.name.as_str(), c.validate())
        });
        let contacts = admit(EntityKind::Contact, &extraction.participants, &mut warnings, |c| {
            (c.name.as_str(), c.validate())
        });
        let fallback_company = extraction.primary_company();
        let opportunities: Vec<OpportunityQuery> =
            admit(EntityKind::Opportunity, &extraction.opportunities, &mut warnings, |o| {
                (o.title.as_str(), o.validate())
            })
            .into_iter()
            .map(|o| OpportunityQuery::new(o, fallback_company))
            .collect();

        let policy = |kind| MatchPolicy::for_kind(&self.config, kind);
        let company_task = spawn_kind(
            CompanyResolver::new(policy(EntityKind::Company)),
            Arc::clone(&self.repository),
            companies,
        );
        let contact_task = spawn_kind(
            ContactResolver::new(policy(EntityKind::Contact)),
            Arc::clone(&self.repository),
            contacts,
        );
        let opportunity_task = spawn_kind(
            OpportunityResolver::new(policy(EntityKind::Opportunity)),
            Arc::clone(&self.repository),
            opportunities,
        );

        let timeout = self.config.kind_timeout();
        let deadline = timeout.map(|t| started + t);
        let mut collect = |outcome: KindOutcome| {
            warnings.extend(outcome.warnings);
            outcome.entities
        };
        let companies = collect(company_task.wait(deadline, timeout));
        let contacts = collect(contact_task.wait(deadline, timeout));
        let opportunities = collect(opportunity_task.wait(deadline, timeout));

        let report = ResolutionReport::new(companies, contacts, opportunities, warnings);
        info!(
            batch_id = %report.batch_id,
            candidates = extraction.candidate_count(),
            resolved = report.entity_count(),
            needs_validation = report.needs_validation,
            warnings = report.warnings.len(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "batch resolved"
        );
        report
    }
}

/// Keeps the candidates that pass validation; the rest become warnings.
fn admit<T: Clone>(
    kind: EntityKind,
    candidates: &[T],
    warnings: &mut Vec<ResolutionWarning>,
    check: impl Fn(&T) -> (&str, Result<(), ValidationError>),
) -> Vec<T> {
    let mut admitted = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        match check(candidate) {
            (_, Ok(())) => admitted.push(candidate.clone()),
            (name, Err(err)) => {
                warn!(kind = %kind, candidate = name, error = %err, "candidate rejected before dispatch");
                warnings.push(ResolutionWarning::candidate(
                    kind,
                    name,
                    WarningReason::InvalidCandidate {
                        message: err.to_string(),
                    },
                ));
            }
        }
    }
    admitted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::entity::{CandidateCompany, CandidateContact, CandidateOpportunity, OpportunityStage};
    use crate::storage::demo_repository;

    fn engine() -> ResolutionEngine {
        ResolutionEngine::new(Arc::new(demo_repository()))
    }

    #[test]
    fn empty_batch_gives_empty_report() {
        let report = engine().resolve_batch(&ExtractionResult::default());
        assert_eq!(report.entity_count(), 0);
        assert!(!report.needs_validation);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn invalid_candidates_never_reach_scoring() {
        let batch = ExtractionResult {
            companies: vec![CandidateCompany::new("Nextera"), CandidateCompany::new("")],
            participants: vec![CandidateContact {
                email: Some("not-an-email".to_string()),
                ..CandidateContact::new("Pierre Lefevre")
            }],
            ..ExtractionResult::default()
        };
        let report = engine().resolve_batch(&batch);
        assert_eq!(report.companies.len(), 1);
        assert!(report.contacts.is_empty());
        assert_eq!(report.warnings.len(), 2);
        assert!(report
            .warnings
            .iter()
            .all(|w| matches!(w.reason, WarningReason::InvalidCandidate { .. })));
    }

    #[test]
    fn opportunities_fall_back_to_batch_company() {
        let batch = ExtractionResult {
            companies: vec![CandidateCompany::new("Nextera")],
            opportunities: vec![
                CandidateOpportunity::new("CRM Implementation").with_stage(OpportunityStage::Proposal)
            ],
            ..ExtractionResult::default()
        };
        let report = engine().resolve_batch(&batch);
        let opp = &report.opportunities[0];
        assert_eq!(opp.entity_id().unwrap().as_str(), "opp_321");
        assert!((opp.confidence().value() - 0.8).abs() < 1e-4);
        assert_eq!(opp.action(), Action::Validate);
        assert!(report.needs_validation);
    }

    #[test]
    fn rejects_invalid_config() {
        let mut config = ResolutionConfig::default();
        config.thresholds.contact = 1.5;
        assert!(ResolutionEngine::with_config(Arc::new(demo_repository()), config).is_err());
    }
}
