//! Action plans consumed after resolution.
//!
//! A planner turns a resolution report into ordered CRM operations. Later
//! actions refer to ids produced by earlier ones through `[DEPENDS_ON:n]`
//! placeholders, which must be backed by a declared dependency.

mod item;
mod params;

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

pub use item::{ActionItem, ActionStatus};
pub use params::{
    placeholders_in, substitute_placeholders, ActionParams, CreateCompanyParams,
    CreateContactParams, CreateOpportunityParams, FollowUpTaskParams, IdRef, LogMeetingParams,
    UpdateOpportunityParams,
};

use crate::entity::ExtractionResult;
use crate::error::PlanError;
use crate::report::ResolutionReport;

/// An ordered set of proposed actions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionPlan {
    actions: Vec<ActionItem>,
}

impl ActionPlan {
    /// Plan over `actions` in proposal order.
    #[must_use]
    pub fn new(actions: Vec<ActionItem>) -> Self {
        Self { actions }
    }

    /// Actions in proposal order.
    #[must_use]
    pub fn actions(&self) -> &[ActionItem] {
        &self.actions
    }

    /// Action with this id.
    #[must_use]
    pub fn get(&self, action_id: u32) -> Option<&ActionItem> {
        self.actions.iter().find(|a| a.action_id == action_id)
    }

    /// Mutable action with this id.
    pub fn get_mut(&mut self, action_id: u32) -> Option<&mut ActionItem> {
        self.actions.iter_mut().find(|a| a.action_id == action_id)
    }

    /// Number of actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// True if the plan has no actions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Checks ids, dependencies and placeholders, then looks for cycles.
    ///
    /// # Errors
    ///
    /// Returns the first problem found, in plan order.
    pub fn validate(&self) -> Result<(), PlanError> {
        let mut ids = HashSet::with_capacity(self.actions.len());
        for action in &self.actions {
            if !ids.insert(action.action_id) {
                return Err(PlanError::DuplicateActionId {
                    action_id: action.action_id,
                });
            }
        }

        for action in &self.actions {
            for &dependency in &action.dependencies {
                if dependency == action.action_id {
                    return Err(PlanError::SelfDependency {
                        action_id: action.action_id,
                    });
                }
                if !ids.contains(&dependency) {
                    return Err(PlanError::UnknownDependency {
                        action_id: action.action_id,
                        dependency,
                    });
                }
            }
            for dependency in action.params.placeholders() {
                if !action.dependencies.contains(&dependency) {
                    return Err(PlanError::UndeclaredPlaceholder {
                        action_id: action.action_id,
                        dependency,
                    });
                }
            }
        }

        self.execution_order().map(|_| ())
    }

    /// Actions ordered so every dependency comes first.
    ///
    /// Among actions that are ready at the same time, plan order is kept.
    ///
    /// # Errors
    ///
    /// `DependencyCycle` listing the actions that can never run, or
    /// `UnknownDependency` for a dependency on a missing action.
    pub fn execution_order(&self) -> Result<Vec<&ActionItem>, PlanError> {
        let known: HashSet<u32> = self.actions.iter().map(|a| a.action_id).collect();
        let mut remaining: BTreeMap<usize, BTreeSet<u32>> = BTreeMap::new();
        for (position, action) in self.actions.iter().enumerate() {
            let mut waiting = BTreeSet::new();
            for &dependency in &action.dependencies {
                if !known.contains(&dependency) {
                    return Err(PlanError::UnknownDependency {
                        action_id: action.action_id,
                        dependency,
                    });
                }
                waiting.insert(dependency);
            }
            remaining.insert(position, waiting);
        }

        let mut order = Vec::with_capacity(self.actions.len());
        while !remaining.is_empty() {
            let ready = remaining
                .iter()
                .find(|(_, waiting)| waiting.is_empty())
                .map(|(&position, _)| position);
            let Some(position) = ready else {
                let mut action_ids: Vec<u32> =
                    remaining.keys().map(|&p| self.actions[p].action_id).collect();
                action_ids.sort_unstable();
                return Err(PlanError::DependencyCycle { action_ids });
            };

            remaining.remove(&position);
            let done = &self.actions[position];
            for waiting in remaining.values_mut() {
                waiting.remove(&done.action_id);
            }
            order.push(done);
        }
        Ok(order)
    }
}

/// Seam for the external planner (report to actions).
pub trait ActionPlanner: Send + Sync {
    /// Error reported by the planner.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Proposes actions for a resolved batch.
    fn plan(
        &self,
        extraction: &ExtractionResult,
        report: &ResolutionReport,
    ) -> Result<ActionPlan, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(id: u32, action_type: &str, params: serde_json::Value, deps: &[u32]) -> ActionItem {
        let mut item = ActionItem::new(id, ActionParams::from_parts(action_type, params).unwrap(), "");
        for &dep in deps {
            item = item.depends_on(dep);
        }
        item
    }

    fn sample_plan() -> ActionPlan {
        ActionPlan::new(vec![
            item(
                3,
                "log_meeting_interaction",
                json!({"date": "2026-01-15", "participants": ["[DEPENDS_ON:2]"], "company_id": "[DEPENDS_ON:1]"}),
                &[1, 2],
            ),
            item(1, "create_company", json!({"name": "Zylphor Dynamics"}), &[]),
            item(
                2,
                "create_contact",
                json!({"name": "Ana Costa", "company_id": "[DEPENDS_ON:1]"}),
                &[1],
            ),
        ])
    }

    #[test]
    fn execution_order_respects_dependencies() {
        let plan = sample_plan();
        plan.validate().unwrap();
        let order: Vec<u32> = plan.execution_order().unwrap().iter().map(|a| a.action_id).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn independent_actions_keep_plan_order() {
        let plan = ActionPlan::new(vec![
            item(2, "create_company", json!({"name": "B"}), &[]),
            item(1, "create_company", json!({"name": "A"}), &[]),
        ]);
        let order: Vec<u32> = plan.execution_order().unwrap().iter().map(|a| a.action_id).collect();
        assert_eq!(order, vec![2, 1]);
    }

    #[test]
    fn detects_duplicates_and_unknown_dependencies() {
        let plan = ActionPlan::new(vec![
            item(1, "create_company", json!({"name": "A"}), &[]),
            item(1, "create_company", json!({"name": "B"}), &[]),
        ]);
        assert_eq!(plan.validate(), Err(PlanError::DuplicateActionId { action_id: 1 }));

        let plan = ActionPlan::new(vec![item(1, "create_company", json!({"name": "A"}), &[9])]);
        assert_eq!(
            plan.validate(),
            Err(PlanError::UnknownDependency {
                action_id: 1,
                dependency: 9
            })
        );
    }

    #[test]
    fn detects_self_dependency_and_cycles() {
        let plan = ActionPlan::new(vec![item(1, "create_company", json!({"name": "A"}), &[1])]);
        assert_eq!(plan.validate(), Err(PlanError::SelfDependency { action_id: 1 }));

        let plan = ActionPlan::new(vec![
            item(1, "noop", json!({}), &[2]),
            item(2, "noop", json!({}), &[3]),
            item(3, "noop", json!({}), &[1]),
            item(4, "noop", json!({}), &[]),
        ]);
        assert_eq!(
            plan.validate(),
            Err(PlanError::DependencyCycle {
                action_ids: vec![1, 2, 3]
            })
        );
    }

    #[test]
    fn placeholders_need_declared_dependencies() {
        let plan = ActionPlan::new(vec![
            item(1, "create_company", json!({"name": "A"}), &[]),
            item(
                2,
                "create_contact",
                json!({"name": "Ana", "company_id": "[DEPENDS_ON:1]"}),
                &[],
            ),
        ]);
        assert_eq!(
            plan.validate(),
            Err(PlanError::UndeclaredPlaceholder {
                action_id: 2,
                dependency: 1
            })
        );
    }

    #[test]
    fn plan_serializes_as_list() {
        let plan = sample_plan();
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 3);
        let back: ActionPlan = serde_json::from_value(json).unwrap();
        assert_eq!(back, plan);
    }
}
