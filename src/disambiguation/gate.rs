use tracing::{debug, info, warn};

use crate::disambiguation::{AutoSelectTop, Decision, DisambiguationPolicy, DisambiguationPrompt};
use crate::error::DisambiguationError;
use crate::report::ResolutionReport;
use crate::resolve::MatchedEntity;

/// Tally of one gate pass.
#[derive(Debug, Default)]
pub struct GateOutcome {
    /// Prompts shown, as they stood before each decision.
    pub prompts: Vec<DisambiguationPrompt>,
    /// Entities confirmed on their top match.
    pub accepted: usize,
    /// Entities switched to an alternative.
    pub switched: usize,
    /// Entities turned into new records.
    pub created: usize,
    /// Entities left pending by the policy.
    pub deferred: usize,
    /// Decisions that could not be applied; those entities stay pending.
    pub rejected: Vec<DisambiguationError>,
}

impl GateOutcome {
    /// Entities moved out of `validate` by this pass.
    #[must_use]
    pub fn decided(&self) -> usize {
        self.accepted + self.switched + self.created
    }
}

/// Runs every pending entity of a report through a policy.
#[derive(Debug, Default, Clone)]
pub struct DisambiguationGate<P = AutoSelectTop> {
    policy: P,
}

impl<P: DisambiguationPolicy> DisambiguationGate<P> {
    /// Gate driven by `policy`.
    pub const fn new(policy: P) -> Self {
        Self { policy }
    }

    /// Applies the policy to every entity in `validate`.
    ///
    /// Deferred entities and rejected decisions leave the entity pending.
    /// Every transitioned entity is appended to `report.validated`, and
    /// `report.disambiguated` is set once nothing is pending.
    pub fn run(&self, report: &mut ResolutionReport) -> GateOutcome {
        let mut outcome = GateOutcome::default();
        let mut validated = Vec::new();

        for entity in report.entities_mut() {
            let Some(prompt) = DisambiguationPrompt::for_entity(entity) else {
                continue;
            };
            let decision = self.policy.decide(&prompt);
            debug!(kind = %prompt.kind, mention = %prompt.mention, ?decision, "disambiguation decision");

            match apply(entity, decision) {
                Ok(Decision::Defer) => outcome.deferred += 1,
                Ok(applied) => {
                    match applied {
                        Decision::AcceptTop => outcome.accepted += 1,
                        Decision::SelectAlternative(_) => outcome.switched += 1,
                        Decision::CreateNew | Decision::Defer => outcome.created += 1,
                    }
                    validated.push(entity.clone());
                }
                Err(err) => {
                    warn!(kind = %prompt.kind, mention = %prompt.mention, error = %err, "decision rejected");
                    outcome.rejected.push(err);
                }
            }
            outcome.prompts.push(prompt);
        }

        report.validated.extend(validated);
        report.refresh_needs_validation();
        report.disambiguated = !report.needs_validation;
        info!(
            batch_id = %report.batch_id,
            prompts = outcome.prompts.len(),
            decided = outcome.decided(),
            deferred = outcome.deferred,
            rejected = outcome.rejected.len(),
            "disambiguation pass finished"
        );
        outcome
    }
}

fn apply(entity: &mut MatchedEntity, decision: Decision) -> Result<Decision, DisambiguationError> {
    match decision {
        Decision::AcceptTop => entity.confirm_top()?,
        Decision::SelectAlternative(index) => entity.select_alternative(index)?,
        Decision::CreateNew => entity.create_new()?,
        Decision::Defer => {}
    }
    Ok(decision)
}
