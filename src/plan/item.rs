use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::plan::params::ActionParams;

/// Review state of a planned action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    /// Awaiting review.
    #[default]
    Pending,
    /// Approved for execution.
    Approved,
    /// Rejected by the reviewer.
    Rejected,
    /// Applied to the CRM.
    Executed,
}

/// One CRM operation proposed by a planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawActionItem", into = "RawActionItem")]
pub struct ActionItem {
    /// Unique id within the plan.
    pub action_id: u32,
    /// Tool that performs the action.
    pub tool_name: String,
    /// Typed parameters.
    pub params: ActionParams,
    /// Why the planner proposed it.
    pub rationale: String,
    /// Ids of actions that must run first.
    pub dependencies: Vec<u32>,
    /// Review state.
    pub status: ActionStatus,
}

impl ActionItem {
    /// Pending action whose tool is named after its type.
    #[must_use]
    pub fn new(action_id: u32, params: ActionParams, rationale: impl Into<String>) -> Self {
        Self {
            action_id,
            tool_name: params.action_type().to_string(),
            params,
            rationale: rationale.into(),
            dependencies: Vec::new(),
            status: ActionStatus::Pending,
        }
    }

    /// Adds a dependency.
    #[must_use]
    pub fn depends_on(mut self, action_id: u32) -> Self {
        if !self.dependencies.contains(&action_id) {
            self.dependencies.push(action_id);
        }
        self
    }

    /// Snake_case action type.
    #[must_use]
    pub fn action_type(&self) -> &str {
        self.params.action_type()
    }
}

impl fmt::Display for ActionItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.action_type().replace('_', " ").to_uppercase();
        write!(f, "[{}] {label} via {}", self.action_id, self.tool_name)?;
        if !self.dependencies.is_empty() {
            let deps: Vec<String> = self.dependencies.iter().map(u32::to_string).collect();
            write!(f, " (after {})", deps.join(", "))?;
        }
        Ok(())
    }
}

/// Wire form: `action_type` and `params` as separate fields.
#[derive(Serialize, Deserialize)]
struct RawActionItem {
    action_id: u32,
    action_type: String,
    tool_name: String,
    #[serde(default)]
    params: Value,
    #[serde(default)]
    rationale: String,
    #[serde(default)]
    dependencies: Vec<u32>,
    #[serde(default)]
    status: ActionStatus,
}

impl TryFrom<RawActionItem> for ActionItem {
    type Error = String;

    fn try_from(raw: RawActionItem) -> Result<Self, Self::Error> {
        let params = ActionParams::from_parts(&raw.action_type, raw.params)
            .map_err(|e| format!("action {}: invalid {} params: {e}", raw.action_id, raw.action_type))?;
        Ok(Self {
            action_id: raw.action_id,
            tool_name: raw.tool_name,
            params,
            rationale: raw.rationale,
            dependencies: raw.dependencies,
            status: raw.status,
        })
    }
}

impl From<ActionItem> for RawActionItem {
    fn from(item: ActionItem) -> Self {
        Self {
            action_id: item.action_id,
            action_type: item.params.action_type().to_string(),
            tool_name: item.tool_name,
            params: item.params.to_value(),
            rationale: item.rationale,
            dependencies: item.dependencies,
            status: item.status,
        }
    }
}
