//! Typed parameters of planned CRM actions.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::entity::{OpportunityStage, RecordId};

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\[DEPENDS_ON:(\d+)\]").expect("placeholder pattern is valid"))
}

/// Action ids referenced by `[DEPENDS_ON:n]` placeholders in `text`.
pub fn placeholders_in(text: &str) -> impl Iterator<Item = u32> + '_ {
    placeholder_regex()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1)?.as_str().parse().ok())
}

/// Replaces every placeholder with the id produced by its action.
/// Placeholders without an output are left as they are.
#[must_use]
pub fn substitute_placeholders(text: &str, outputs: &BTreeMap<u32, RecordId>) -> String {
    placeholder_regex()
        .replace_all(text, |caps: &regex::Captures<'_>| {
            caps.get(1)
                .and_then(|m| m.as_str().parse::<u32>().ok())
                .and_then(|n| outputs.get(&n))
                .map_or_else(|| caps[0].to_string(), |id| id.as_str().to_string())
        })
        .into_owned()
}

/// A record id, or a reference to the id an earlier action will produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IdRef {
    /// A stored record.
    Id(RecordId),
    /// Output of an earlier action.
    DependsOn(u32),
}

impl IdRef {
    /// Referenced action, if any.
    #[must_use]
    pub const fn dependency(&self) -> Option<u32> {
        match self {
            Self::DependsOn(n) => Some(*n),
            Self::Id(_) => None,
        }
    }
}

impl From<String> for IdRef {
    fn from(value: String) -> Self {
        let trimmed = value.trim();
        if let Some(n) = trimmed
            .strip_prefix("[DEPENDS_ON:")
            .and_then(|rest| rest.strip_suffix(']'))
            .and_then(|n| n.parse().ok())
        {
            return Self::DependsOn(n);
        }
        Self::Id(RecordId::new(value))
    }
}

impl From<IdRef> for String {
    fn from(value: IdRef) -> Self {
        value.to_string()
    }
}

impl From<RecordId> for IdRef {
    fn from(value: RecordId) -> Self {
        Self::Id(value)
    }
}

impl fmt::Display for IdRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::DependsOn(n) => write!(f, "[DEPENDS_ON:{n}]"),
        }
    }
}

/// Parameters of `create_company`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCompanyParams {
    /// Company name.
    pub name: String,
    /// Web domain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Industry label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
}

/// Parameters of `create_contact`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateContactParams {
    /// Full name.
    pub name: String,
    /// Employer.
    pub company_id: IdRef,
    /// Job title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Parameters of `create_opportunity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOpportunityParams {
    /// Deal title.
    pub title: String,
    /// Owning company.
    pub company_id: IdRef,
    /// Initial stage.
    pub stage: OpportunityStage,
    /// Deal amount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
}

/// Parameters of `log_meeting_interaction`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogMeetingParams {
    /// ISO date of the meeting.
    pub date: String,
    /// Attending contacts.
    #[serde(default)]
    pub participants: Vec<IdRef>,
    /// Company met.
    pub company_id: IdRef,
    /// Deal discussed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opportunity_id: Option<IdRef>,
    /// Meeting summary.
    #[serde(default)]
    pub notes: String,
}

/// Parameters of `update_opportunity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateOpportunityParams {
    /// Deal to update.
    pub opportunity_id: IdRef,
    /// New stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<OpportunityStage>,
    /// New amount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    /// Notes to append.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Parameters of `create_follow_up_task`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowUpTaskParams {
    /// Task title.
    pub title: String,
    /// Task description.
    pub description: String,
    /// Due date as written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// Contact to follow up with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<IdRef>,
    /// Related deal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opportunity_id: Option<IdRef>,
}

/// Parameters of one planned action, keyed by action type.
///
/// Unknown action types keep their parameters as a plain map.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionParams {
    /// Create a company.
    CreateCompany(CreateCompanyParams),
    /// Create a contact.
    CreateContact(CreateContactParams),
    /// Create an opportunity.
    CreateOpportunity(CreateOpportunityParams),
    /// Log the meeting.
    LogMeetingInteraction(LogMeetingParams),
    /// Update an opportunity.
    UpdateOpportunity(UpdateOpportunityParams),
    /// Create a follow-up task.
    CreateFollowUpTask(FollowUpTaskParams),
    /// Any other action type, kept as raw parameters.
    Other {
        /// Snake_case action type.
        action_type: String,
        /// Raw parameters.
        params: Map<String, Value>,
    },
}

impl ActionParams {
    /// Wire label of the action type.
    #[must_use]
    pub fn action_type(&self) -> &str {
        match self {
            Self::CreateCompany(_) => "create_company",
            Self::CreateContact(_) => "create_contact",
            Self::CreateOpportunity(_) => "create_opportunity",
            Self::LogMeetingInteraction(_) => "log_meeting_interaction",
            Self::UpdateOpportunity(_) => "update_opportunity",
            Self::CreateFollowUpTask(_) => "create_follow_up_task",
            Self::Other { action_type, .. } => action_type,
        }
    }

    /// Decodes `params` according to `action_type`.
    ///
    /// # Errors
    ///
    /// Fails when a known action type carries malformed parameters.
    pub fn from_parts(action_type: &str, params: Value) -> Result<Self, serde_json::Error> {
        Ok(match action_type {
            "create_company" => Self::CreateCompany(serde_json::from_value(params)?),
            "create_contact" => Self::CreateContact(serde_json::from_value(params)?),
            "create_opportunity" => Self::CreateOpportunity(serde_json::from_value(params)?),
            "log_meeting_interaction" => Self::LogMeetingInteraction(serde_json::from_value(params)?),
            "update_opportunity" => Self::UpdateOpportunity(serde_json::from_value(params)?),
            "create_follow_up_task" => Self::CreateFollowUpTask(serde_json::from_value(params)?),
            other => Self::Other {
                action_type: other.to_string(),
                params: match params {
                    Value::Object(map) => map,
                    Value::Null => Map::new(),
                    value => {
                        let mut map = Map::new();
                        map.insert("value".to_string(), value);
                        map
                    }
                },
            },
        })
    }

    /// Parameters as a JSON object.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let value = match self {
            Self::CreateCompany(p) => serde_json::to_value(p),
            Self::CreateContact(p) => serde_json::to_value(p),
            Self::CreateOpportunity(p) => serde_json::to_value(p),
            Self::LogMeetingInteraction(p) => serde_json::to_value(p),
            Self::UpdateOpportunity(p) => serde_json::to_value(p),
            Self::CreateFollowUpTask(p) => serde_json::to_value(p),
            Self::Other { params, .. } => return Value::Object(params.clone()),
        };
        value.unwrap_or_else(|_| Value::Object(Map::new()))
    }

    /// Every action id referenced by a placeholder, sorted and deduplicated.
    #[must_use]
    pub fn placeholders(&self) -> Vec<u32> {
        let mut found = Vec::new();
        collect_placeholders(&self.to_value(), &mut found);
        found.sort_unstable();
        found.dedup();
        found
    }

    /// Copy with every resolvable placeholder replaced by a produced id.
    ///
    /// # Errors
    ///
    /// Fails only if substitution turns a typed field into something its
    /// type no longer accepts.
    pub fn substitute(&self, outputs: &BTreeMap<u32, RecordId>) -> Result<Self, serde_json::Error> {
        let mut value = self.to_value();
        replace_placeholders(&mut value, outputs);
        Self::from_parts(self.action_type(), value)
    }
}

fn collect_placeholders(value: &Value, found: &mut Vec<u32>) {
    match value {
        Value::String(s) => found.extend(placeholders_in(s)),
        Value::Array(items) => items.iter().for_each(|v| collect_placeholders(v, found)),
        Value::Object(map) => map.values().for_each(|v| collect_placeholders(v, found)),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

fn replace_placeholders(value: &mut Value, outputs: &BTreeMap<u32, RecordId>) {
    match value {
        Value::String(s) => *s = substitute_placeholders(s, outputs),
        Value::Array(items) => items.iter_mut().for_each(|v| replace_placeholders(v, outputs)),
        Value::Object(map) => map.values_mut().for_each(|v| replace_placeholders(v, outputs)),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn id_ref_parses_placeholders() {
        assert_eq!(IdRef::from("[DEPENDS_ON:2]".to_string()), IdRef::DependsOn(2));
        assert_eq!(
            IdRef::from("comp_123".to_string()),
            IdRef::Id(RecordId::new("comp_123"))
        );
        assert_eq!(IdRef::DependsOn(7).to_string(), "[DEPENDS_ON:7]");
    }

    #[test]
    fn typed_params_from_parts() {
        let params = ActionParams::from_parts(
            "create_contact",
            json!({"name": "Ana Costa", "company_id": "[DEPENDS_ON:1]", "role": "CFO"}),
        )
        .unwrap();
        let ActionParams::CreateContact(contact) = &params else {
            panic!("expected create_contact, got {params:?}");
        };
        assert_eq!(contact.company_id.dependency(), Some(1));
        assert_eq!(params.placeholders(), vec![1]);
    }

    #[test]
    fn unknown_types_keep_a_map() {
        let params = ActionParams::from_parts(
            "send_email",
            json!({"to": "[DEPENDS_ON:3]", "body": "see [DEPENDS_ON:1] and [DEPENDS_ON:3]"}),
        )
        .unwrap();
        assert_eq!(params.action_type(), "send_email");
        assert_eq!(params.placeholders(), vec![1, 3]);
    }

    #[test]
    fn malformed_known_type_fails() {
        assert!(ActionParams::from_parts("create_opportunity", json!({"title": "X"})).is_err());
    }

    #[test]
    fn substitution_replaces_known_outputs() {
        let params = ActionParams::from_parts(
            "log_meeting_interaction",
            json!({
                "date": "2026-01-15",
                "participants": ["cont_456", "[DEPENDS_ON:2]"],
                "company_id": "[DEPENDS_ON:1]",
                "notes": "Kickoff"
            }),
        )
        .unwrap();
        let outputs = BTreeMap::from([(1, RecordId::new("comp_1000"))]);
        let bound = params.substitute(&outputs).unwrap();
        let ActionParams::LogMeetingInteraction(log) = bound else {
            panic!("expected log_meeting_interaction");
        };
        assert_eq!(log.company_id, IdRef::Id(RecordId::new("comp_1000")));
        assert_eq!(log.participants[1], IdRef::DependsOn(2));
    }
}
