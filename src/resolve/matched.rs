//! Resolution result for one candidate.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::action::{classify_with_floor, Action};
use crate::confidence::Confidence;
use crate::entity::{EntityKind, RecordId};
use crate::error::DisambiguationError;
use crate::resolve::scored::ScoredCandidate;

/// Keys owned by the record; candidate fields never overwrite them.
const IDENTITY_KEYS: &[&str] = &["kind", "id", "name", "title"];

/// Record fields overlaid with the candidate's non-null, non-identity fields.
fn merge_details(record: &ScoredCandidate, candidate: &Map<String, Value>, mention: &str) -> Map<String, Value> {
    let mut out = match serde_json::to_value(&record.record) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    for (k, v) in candidate {
        if v.is_null() || IDENTITY_KEYS.contains(&k.as_str()) {
            continue;
        }
        out.insert(k.clone(), v.clone());
    }
    out.insert("mentioned_as".to_string(), Value::String(mention.to_string()));
    out
}

/// Classification settings shared by the resolvers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchPolicy {
    /// Minimum confidence for `use_existing`.
    pub high_threshold: f32,
    /// Candidates at or below this score are discarded.
    pub floor: f32,
    /// Cap on alternatives kept for `validate`.
    pub max_alternatives: usize,
}

/// The resolution result for one candidate entity.
///
/// Invariants, upheld by every constructor and transition:
/// - `entity_id` is set iff `action != Create`
/// - `alternatives` is non-empty only if `action == Validate`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedEntity {
    entity_type: EntityKind,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    entity_id: Option<RecordId>,
    confidence: Confidence,
    action: Action,
    alternatives: Vec<ScoredCandidate>,
    details: Map<String, Value>,
    /// How the candidate was written in the notes.
    mention: String,
    #[serde(skip)]
    candidate_fields: Map<String, Value>,
}

impl MatchedEntity {
    /// A candidate with no usable repository match.
    #[must_use]
    pub fn new_record(kind: EntityKind, mention: impl Into<String>, candidate_fields: Map<String, Value>) -> Self {
        let mention = mention.into();
        Self {
            entity_type: kind,
            name: mention.clone(),
            entity_id: None,
            confidence: Confidence::zero(),
            action: Action::Create,
            alternatives: Vec::new(),
            details: candidate_fields.clone(),
            mention,
            candidate_fields,
        }
    }

    /// Classifies the top of a ranked list.
    ///
    /// An empty list yields `Create` with zero confidence. Runner-ups are
    /// kept, up to `policy.max_alternatives`, only when the top match needs
    /// validation.
    #[must_use]
    pub fn from_ranked(
        kind: EntityKind,
        mention: impl Into<String>,
        candidate_fields: Map<String, Value>,
        mut ranked: Vec<ScoredCandidate>,
        policy: MatchPolicy,
    ) -> Self {
        let mention = mention.into();
        if ranked.is_empty() {
            return Self::new_record(kind, mention, candidate_fields);
        }

        let top = ranked.remove(0);
        let action = classify_with_floor(top.confidence, policy.high_threshold, policy.floor);
        if action == Action::Create {
            let mut entity = Self::new_record(kind, mention, candidate_fields);
            entity.confidence = top.confidence;
            return entity;
        }

        let alternatives = if action == Action::Validate {
            ranked.truncate(policy.max_alternatives);
            ranked
        } else {
            Vec::new()
        };

        Self {
            entity_type: kind,
            name: top.record.display_name().to_string(),
            entity_id: Some(top.record.id().clone()),
            confidence: top.confidence,
            action,
            alternatives,
            details: merge_details(&top, &candidate_fields, &mention),
            mention,
            candidate_fields,
        }
    }

    /// Kind of the entity.
    #[must_use]
    pub const fn entity_type(&self) -> EntityKind {
        self.entity_type
    }

    /// Record name, or the mention when creating.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Chosen record, absent on `create`.
    #[must_use]
    pub const fn entity_id(&self) -> Option<&RecordId> {
        self.entity_id.as_ref()
    }

    /// Confidence of the chosen record.
    #[must_use]
    pub const fn confidence(&self) -> Confidence {
        self.confidence
    }

    /// Current disposition.
    #[must_use]
    pub const fn action(&self) -> Action {
        self.action
    }

    /// Runner-up records, best first.
    #[must_use]
    pub fn alternatives(&self) -> &[ScoredCandidate] {
        &self.alternatives
    }

    /// Merged record and candidate fields.
    #[must_use]
    pub const fn details(&self) -> &Map<String, Value> {
        &self.details
    }

    /// Name as written in the notes.
    #[must_use]
    pub fn mention(&self) -> &str {
        &self.mention
    }

    /// True while the action is `validate`.
    #[must_use]
    pub fn needs_validation(&self) -> bool {
        self.action == Action::Validate
    }

    fn ensure_pending(&self) -> Result<(), DisambiguationError> {
        if self.action == Action::Validate {
            Ok(())
        } else {
            Err(DisambiguationError::NotPending {
                name: self.name.clone(),
                action: self.action,
            })
        }
    }

    /// `validate -> use_existing`, keeping the top match untouched.
    ///
    /// # Errors
    ///
    /// `NotPending` unless the action is `Validate`.
    pub fn confirm_top(&mut self) -> Result<(), DisambiguationError> {
        self.ensure_pending()?;
        self.action = Action::UseExisting;
        self.alternatives.clear();
        Ok(())
    }

    /// `validate -> use_existing`, switching to alternative `index`.
    ///
    /// # Errors
    ///
    /// `NotPending` unless the action is `Validate`;
    /// `AlternativeOutOfRange` for a bad index.
    pub fn select_alternative(&mut self, index: usize) -> Result<(), DisambiguationError> {
        self.ensure_pending()?;
        if index >= self.alternatives.len() {
            return Err(DisambiguationError::AlternativeOutOfRange {
                index,
                available: self.alternatives.len(),
            });
        }
        let chosen = self.alternatives.remove(index);
        self.name = chosen.record.display_name().to_string();
        self.entity_id = Some(chosen.record.id().clone());
        self.confidence = chosen.confidence;
        self.details = merge_details(&chosen, &self.candidate_fields, &self.mention);
        self.action = Action::UseExisting;
        self.alternatives.clear();
        Ok(())
    }

    /// `validate -> create`, discarding every suggested record.
    ///
    /// # Errors
    ///
    /// `NotPending` unless the action is `Validate`.
    pub fn create_new(&mut self) -> Result<(), DisambiguationError> {
        self.ensure_pending()?;
        self.action = Action::Create;
        self.entity_id = None;
        self.name = self.mention.clone();
        self.details = self.candidate_fields.clone();
        self.alternatives.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::ContactRecord;
    use serde_json::json;

    const POLICY: MatchPolicy = MatchPolicy {
        high_threshold: 0.85,
        floor: 0.2,
        max_alternatives: 3,
    };

    fn contact(id: &str, name: &str, confidence: f32) -> ScoredCandidate {
        ScoredCandidate::new(
            ContactRecord {
                id: id.into(),
                name: name.to_string(),
                email: Some(format!("{id}@nextera.com")),
                role: Some("IT Director".to_string()),
                company_id: None,
                company_name: Some("Nextera".to_string()),
            },
            Confidence::new(confidence).unwrap(),
        )
    }

    fn fields() -> Map<String, Value> {
        json!({"name": "Pierre", "role": "CTO", "email": null})
            .as_object()
            .cloned()
            .unwrap()
    }

    fn ranked(n: usize) -> Vec<ScoredCandidate> {
        (0..n)
            .map(|i| contact(&format!("c{i}"), &format!("Contact {i}"), 0.8 - 0.1 * i as f32))
            .collect()
    }

    #[test]
    fn empty_ranking_creates() {
        let m = MatchedEntity::from_ranked(EntityKind::Contact, "Pierre", fields(), Vec::new(), POLICY);
        assert_eq!(m.action(), Action::Create);
        assert_eq!(m.confidence(), Confidence::zero());
        assert!(m.entity_id().is_none());
        assert_eq!(m.name(), "Pierre");
        assert_eq!(m.details()["role"], "CTO");
    }

    #[test]
    fn validate_keeps_up_to_three_runner_ups() {
        let m = MatchedEntity::from_ranked(EntityKind::Contact, "Pierre", fields(), ranked(6), POLICY);
        assert_eq!(m.action(), Action::Validate);
        assert_eq!(m.entity_id().unwrap().as_str(), "c0");
        let alt_ids: Vec<_> = m.alternatives().iter().map(|a| a.record.id().as_str()).collect();
        assert_eq!(alt_ids, vec!["c1", "c2", "c3"]);
    }

    #[test]
    fn use_existing_has_no_alternatives() {
        let mut list = vec![contact("c0", "Pierre Lefevre", 0.9)];
        list.extend(ranked(2));
        let m = MatchedEntity::from_ranked(EntityKind::Contact, "Pierre Lefevre", fields(), list, POLICY);
        assert_eq!(m.action(), Action::UseExisting);
        assert!(m.alternatives().is_empty());
    }

    #[test]
    fn details_overlay_keeps_record_identity() {
        let m = MatchedEntity::from_ranked(EntityKind::Contact, "Pierre", fields(), ranked(1), POLICY);
        let details = m.details();
        assert_eq!(details["name"], "Contact 0");
        assert_eq!(details["role"], "CTO");
        assert_eq!(details["email"], "c0@nextera.com");
        assert_eq!(details["mentioned_as"], "Pierre");
    }

    #[test]
    fn bypassed_floor_classifies_create_without_id() {
        let policy = MatchPolicy { floor: 0.5, ..POLICY };
        let m = MatchedEntity::from_ranked(
            EntityKind::Contact,
            "Pierre",
            fields(),
            vec![contact("c0", "Pierre Lefevre", 0.3)],
            policy,
        );
        assert_eq!(m.action(), Action::Create);
        assert!(m.entity_id().is_none());
        assert!(m.alternatives().is_empty());
    }

    #[test]
    fn confirm_top_only_flips_action() {
        let mut m = MatchedEntity::from_ranked(EntityKind::Contact, "Pierre", fields(), ranked(3), POLICY);
        let (id, conf, name) = (m.entity_id().cloned(), m.confidence(), m.name().to_string());
        m.confirm_top().unwrap();
        assert_eq!(m.action(), Action::UseExisting);
        assert_eq!(m.entity_id().cloned(), id);
        assert_eq!(m.confidence(), conf);
        assert_eq!(m.name(), name);
        assert!(m.alternatives().is_empty());

        assert!(matches!(m.confirm_top(), Err(DisambiguationError::NotPending { .. })));
    }

    #[test]
    fn select_alternative_switches_record() {
        let mut m = MatchedEntity::from_ranked(EntityKind::Contact, "Pierre", fields(), ranked(3), POLICY);
        assert!(matches!(
            m.select_alternative(5),
            Err(DisambiguationError::AlternativeOutOfRange { index: 5, available: 2 })
        ));
        m.select_alternative(1).unwrap();
        assert_eq!(m.entity_id().unwrap().as_str(), "c2");
        assert_eq!(m.name(), "Contact 2");
        assert!((m.confidence().value() - 0.6).abs() < 1e-6);
        assert_eq!(m.details()["mentioned_as"], "Pierre");
        assert_eq!(m.action(), Action::UseExisting);
    }

    #[test]
    fn create_new_clears_id() {
        let mut m = MatchedEntity::from_ranked(EntityKind::Contact, "Pierre", fields(), ranked(2), POLICY);
        m.create_new().unwrap();
        assert_eq!(m.action(), Action::Create);
        assert!(m.entity_id().is_none());
        assert!(m.alternatives().is_empty());
        assert_eq!(m.name(), "Pierre");
    }

    #[test]
    fn serialization_omits_missing_id() {
        let m = MatchedEntity::new_record(EntityKind::Company, "Zylphor Dynamics", Map::new());
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["entity_type"], "company");
        assert_eq!(json["action"], "create");
        assert!(json.get("entity_id").is_none());
        assert!(json.get("candidate_fields").is_none());
    }
}
