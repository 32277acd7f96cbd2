use serde::{Deserialize, Serialize};

use crate::confidence::Confidence;
use crate::entity::RepositoryRecord;

/// A stored record scored against one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    /// Scored record.
    #[serde(flatten)]
    pub record: RepositoryRecord,
    /// Its confidence.
    pub confidence: Confidence,
}

impl ScoredCandidate {
    /// Pairs a record with its score.
    #[must_use]
    pub fn new(record: impl Into<RepositoryRecord>, confidence: Confidence) -> Self {
        Self {
            record: record.into(),
            confidence,
        }
    }
}

/// Drops entries at or below `floor` and sorts the rest by descending
/// confidence. The sort is stable, so ties keep repository order.
#[must_use]
pub fn rank(mut scored: Vec<ScoredCandidate>, floor: f32) -> Vec<ScoredCandidate> {
    scored.retain(|s| s.confidence.value() > floor);
    scored.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::CompanyRecord;

    fn scored(id: &str, confidence: f32) -> ScoredCandidate {
        ScoredCandidate::new(
            CompanyRecord {
                id: id.into(),
                name: id.to_string(),
                domain: None,
                industry: None,
            },
            Confidence::new(confidence).unwrap(),
        )
    }

    #[test]
    fn filters_at_floor_and_sorts_descending() {
        let ranked = rank(
            vec![scored("a", 0.2), scored("b", 0.5), scored("c", 0.9), scored("d", 0.1)],
            0.2,
        );
        let ids: Vec<_> = ranked.iter().map(|s| s.record.id().as_str()).collect();
        assert_eq!(ids, vec!["c", "b"]);
    }

    #[test]
    fn ties_keep_input_order() {
        let ranked = rank(vec![scored("first", 0.8), scored("second", 0.8), scored("top", 1.0)], 0.2);
        let ids: Vec<_> = ranked.iter().map(|s| s.record.id().as_str()).collect();
        assert_eq!(ids, vec!["top", "first", "second"]);
    }

    #[test]
    fn serializes_flat_with_confidence() {
        let json = serde_json::to_value(scored("comp_1", 0.5)).unwrap();
        assert_eq!(json["kind"], "company");
        assert_eq!(json["id"], "comp_1");
        assert_eq!(json["confidence"], 0.5);
    }
}
