use tracing::debug;

use crate::confidence::Confidence;
use crate::entity::{CandidateContact, ContactRecord, EntityKind};
use crate::error::ResolutionError;
use crate::resolve::{candidate_fields, rank, MatchPolicy, MatchedEntity, Resolver, ScoredCandidate};
use crate::storage::EntityRepository;
use crate::text::{normalize, similarity, similarity_exceeds};

const EXACT_SCORE: f32 = 0.9;
const CONTAINMENT_SCORE: f32 = 0.6;
const SIMILARITY_WEIGHT: f32 = 0.7;
const COMPANY_BOOST: f32 = 0.2;
// Compared on the unrounded ratio; 0.803 counts as a company match.
const COMPANY_MATCH_FLOOR: f32 = 0.8;

/// Layered name matching for contacts, boosted by company context.
///
/// The role hint is forwarded to the repository but does not affect the
/// score.
#[derive(Debug, Clone, Copy)]
pub struct ContactResolver {
    policy: MatchPolicy,
}

impl ContactResolver {
    /// Resolver applying `policy`.
    #[must_use]
    pub const fn new(policy: MatchPolicy) -> Self {
        Self { policy }
    }

    fn name_score(query: &str, name: &str) -> Confidence {
        if name == query {
            return Confidence::clamped(EXACT_SCORE);
        }
        // An empty side would contain or be contained by anything.
        if !query.is_empty() && !name.is_empty() && (query.contains(name) || name.contains(query)) {
            return Confidence::clamped(CONTAINMENT_SCORE);
        }
        Confidence::clamped(similarity(query, name)).scale(SIMILARITY_WEIGHT)
    }

    fn score(query: &str, company_hint: Option<&str>, record: &ContactRecord) -> Confidence {
        let mut confidence = Self::name_score(query, &normalize(&record.name));
        if let (Some(hint), Some(company)) = (company_hint, record.company_name.as_deref()) {
            if similarity_exceeds(hint, &normalize(company), COMPANY_MATCH_FLOOR) {
                confidence = confidence.boost(COMPANY_BOOST);
            }
        }
        confidence
    }
}

impl Resolver for ContactResolver {
    type Candidate = CandidateContact;
    const KIND: EntityKind = EntityKind::Contact;

    fn candidate_name(candidate: &CandidateContact) -> &str {
        &candidate.name
    }

    fn resolve(
        &self,
        repository: &dyn EntityRepository,
        candidate: &CandidateContact,
    ) -> Result<MatchedEntity, ResolutionError> {
        candidate.validate()?;
        let query = normalize(&candidate.name);
        let company_hint = candidate
            .company_name
            .as_deref()
            .map(normalize)
            .filter(|hint| !hint.is_empty());

        let records = repository.find_contacts(
            &candidate.name,
            candidate.role.as_deref(),
            candidate.company_name.as_deref(),
        )?;

        let scored = records
            .into_iter()
            .map(|record| {
                let confidence = Self::score(&query, company_hint.as_deref(), &record);
                ScoredCandidate::new(record, confidence)
            })
            .collect();
        let ranked = rank(scored, self.policy.floor);

        debug!(
            candidate = %candidate.name,
            company_hint = ?candidate.company_name,
            matches = ranked.len(),
            top = ranked.first().map(|s| s.confidence.value()),
            "contact scored"
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
