use tracing::debug;

use crate::confidence::Confidence;
use crate::entity::{CandidateCompany, CompanyRecord, EntityKind};
use crate::error::ResolutionError;
use crate::resolve::{candidate_fields, rank, MatchPolicy, MatchedEntity, Resolver, ScoredCandidate};
use crate::storage::EntityRepository;
use crate::text::{normalize, similarity};

/// Name matching for companies.
///
/// An exact normalized match scores 1.0; anything else scores the edit
/// similarity of the normalized names.
#[derive(Debug, Clone, Copy)]
pub struct CompanyResolver {
    policy: MatchPolicy,
}

impl CompanyResolver {
    /// Resolver applying `policy`.
    #[must_use]
    pub const fn new(policy: MatchPolicy) -> Self {
        Self { policy }
    }

    fn score(query: &str, record: &CompanyRecord) -> Confidence {
        let name = normalize(&record.name);
        if name == query {
            Confidence::one()
        } else {
            Confidence::clamped(similarity(query, &name))
        }
    }
}

impl Resolver for CompanyResolver {
    type Candidate = CandidateCompany;
    const KIND: EntityKind = EntityKind::Company;

    fn candidate_name(candidate: &CandidateCompany) -> &str {
        &candidate.name
    }

    fn resolve(
        &self,
        repository: &dyn EntityRepository,
        candidate: &CandidateCompany,
    ) -> Result<MatchedEntity, ResolutionError> {
        candidate.validate()?;
        let query = normalize(&candidate.name);
        let records = repository.find_companies(&candidate.name)?;

        let scored = records
            .into_iter()
            .map(|record| {
                let confidence = Self::score(&query, &record);
                ScoredCandidate::new(record, confidence)
            })
            .collect();
        let ranked = rank(scored, self.policy.floor);

        debug!(
            candidate = %candidate.name,
            matches = ranked.len(),
            top = ranked.first().map(|s| s.confidence.value()),
            "company scored"
        );

        Ok(MatchedEntity::from_ranked(
            Self::KIND,
            candidate.name.clone(),
            candidate_fields(candidate),
            ranked,
            self.policy,
        ))
    }
}
