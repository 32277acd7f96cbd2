use serde::Serialize;
use tracing::debug;

use crate::confidence::Confidence;
use crate::entity::{CandidateOpportunity, EntityKind, OpportunityRecord};
use crate::error::ResolutionError;
use crate::resolve::{candidate_fields, rank, MatchPolicy, MatchedEntity, Resolver, ScoredCandidate};
use crate::storage::EntityRepository;
use crate::text::{normalize, similarity_exceeds};

const KEYWORD_BOOST: f32 = 0.3;
const COMPANY_BOOST: f32 = 0.3;
const STAGE_BOOST: f32 = 0.2;
// Compared on the unrounded ratio; 0.803 counts as a company match.
const COMPANY_MATCH_FLOOR: f32 = 0.8;

/// An opportunity candidate with the context it is resolved in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpportunityQuery {
    /// The extracted opportunity.
    #[serde(flatten)]
    pub candidate: CandidateOpportunity,
    /// Company the deal belongs to: the candidate's own company if named,
    /// otherwise the batch's primary company.
    pub company_context: Option<String>,
    /// Free-text stage hint, defaulting to the candidate's stage label.
    pub stage_hint: Option<String>,
}

impl OpportunityQuery {
    /// Query for `candidate`, falling back to `fallback_company` for context.
    #[must_use]
    pub fn new(candidate: CandidateOpportunity, fallback_company: Option<&str>) -> Self {
        let company_context = candidate
            .company_name
            .clone()
            .or_else(|| fallback_company.map(str::to_string));
        let stage_hint = candidate.stage.map(|stage| stage.as_str().to_string());
        Self {
            candidate,
            company_context,
            stage_hint,
        }
    }

    /// Overrides the stage hint.
    #[must_use]
    pub fn with_stage_hint(mut self, hint: impl Into<String>) -> Self {
        self.stage_hint = Some(hint.into());
        self
    }
}

impl From<CandidateOpportunity> for OpportunityQuery {
    fn from(candidate: CandidateOpportunity) -> Self {
        Self::new(candidate, None)
    }
}

/// Normalized signals compared against every stored opportunity.
struct Signals {
    keywords: Vec<String>,
    company: Option<String>,
    stage_hint: Option<String>,
}

impl Signals {
    fn from_query(query: &OpportunityQuery) -> Self {
        let non_empty = |s: String| (!s.is_empty()).then_some(s);
        Self {
            keywords: query
                .candidate
                .keywords()
                .iter()
                .filter_map(|k| non_empty(normalize(k)))
                .collect(),
            company: query.company_context.as_deref().map(normalize).and_then(non_empty),
            stage_hint: query.stage_hint.as_deref().map(normalize).and_then(non_empty),
        }
    }

    /// Additive score; every keyword hit stacks and the sum is clamped.
    fn score(&self, record: &OpportunityRecord) -> Confidence {
        let title = normalize(&record.title);
        let mut confidence = Confidence::zero();

        for keyword in &self.keywords {
            if title.contains(keyword.as_str()) {
                confidence = confidence.boost(KEYWORD_BOOST);
            }
        }

        if let (Some(hint), Some(company)) = (&self.company, record.company_name.as_deref()) {
            if similarity_exceeds(hint, &normalize(company), COMPANY_MATCH_FLOOR) {
                confidence = confidence.boost(COMPANY_BOOST);
            }
        }

        if let Some(hint) = &self.stage_hint {
            if record.stage.is_hinted_by(hint) {
                confidence = confidence.boost(STAGE_BOOST);
            }
        }

        confidence
    }
}

/// Keyword, company and stage matching for opportunities.
#[derive(Debug, Clone, Copy)]
pub struct OpportunityResolver {
    policy: MatchPolicy,
}

impl OpportunityResolver {
    /// Resolver applying `policy`.
    #[must_use]
    pub const fn new(policy: MatchPolicy) -> Self {
        Self { policy }
    }
}

impl Resolver for OpportunityResolver {
    type Candidate = OpportunityQuery;
    const KIND: EntityKind = EntityKind::Opportunity;

    fn candidate_name(candidate: &OpportunityQuery) -> &str {
        &candidate.candidate.title
    }

    fn resolve(
        &self,
        repository: &dyn EntityRepository,
        query: &OpportunityQuery,
    ) -> Result<MatchedEntity, ResolutionError> {
        query.candidate.validate()?;
        let signals = Signals::from_query(query);

        let records = repository.find_opportunities(
            &query.candidate.keywords(),
            query.company_context.as_deref(),
            query.stage_hint.as_deref(),
        )?;

        let scored = records
            .into_iter()
            .map(|record| {
                let confidence = signals.score(&record);
                ScoredCandidate::new(record, confidence)
            })
            .collect();
        let ranked = rank(scored, self.policy.floor);

        debug!(
            candidate = %query.candidate.title,
            company = ?query.company_context,
            stage_hint = ?query.stage_hint,
            matches = ranked.len(),
            top = ranked.first().map(|s| s.confidence.value()),
            "opportunity scored"
        );

        Ok(MatchedEntity::from_ranked(
            Self::KIND,
            query.candidate.title.clone(),
            candidate_fields(query),
            ranked,
            self.policy,
        ))
    }
}
