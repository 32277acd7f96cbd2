//! Per-kind entity resolvers.
//!
//! Every resolver follows the same pipeline: fetch all records of its kind,
//! score each against the candidate, drop scores at or below the creation
//! floor, rank, and classify the top entry. Only the scoring differs.

mod company;
mod contact;
mod matched;
mod opportunity;
mod scored;

pub use company::CompanyResolver;
pub use contact::ContactResolver;
pub use matched::{MatchPolicy, MatchedEntity};
pub use opportunity::{OpportunityQuery, OpportunityResolver};
pub use scored::{rank, ScoredCandidate};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::ResolutionConfig;
use crate::entity::EntityKind;
use crate::error::ResolutionError;
use crate::storage::EntityRepository;

/// Resolves one kind of candidate against the repository.
pub trait Resolver: Send + Sync {
    /// Input accepted by this resolver.
    type Candidate: Send;

    /// Kind handled by this resolver.
    const KIND: EntityKind;

    /// How the candidate is named in warnings and logs.
    fn candidate_name(candidate: &Self::Candidate) -> &str;

    /// Scores `candidate` against every stored record of [`Self::KIND`].
    ///
    /// # Errors
    ///
    /// `InvalidCandidate` if the candidate fails validation, `Repository`
    /// if the lookup fails.
    fn resolve(
        &self,
        repository: &dyn EntityRepository,
        candidate: &Self::Candidate,
    ) -> Result<MatchedEntity, ResolutionError>;
}

impl MatchPolicy {
    /// Policy for `kind` taken from a resolution config.
    #[must_use]
    pub fn for_kind(config: &ResolutionConfig, kind: EntityKind) -> Self {
        Self {
            high_threshold: config.thresholds.high(kind),
            floor: config.thresholds.creation,
            max_alternatives: config.max_alternatives,
        }
    }
}

/// Candidate fields as a JSON object, for the details overlay.
fn candidate_fields<T: Serialize>(candidate: &T) -> Map<String, Value> {
    match serde_json::to_value(candidate) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}
