use serde::{Deserialize, Serialize};

use crate::disambiguation::DisambiguationPrompt;

/// Answer to one prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "index", rename_all = "snake_case")]
pub enum Decision {
    /// Keep the top pick.
    AcceptTop,
    /// Switch to `alternatives[index]`.
    SelectAlternative(usize),
    /// None of the records is right.
    CreateNew,
    /// Leave the entity in `validate` for an external reviewer.
    Defer,
}

/// Decides prompts on behalf of a reviewer.
pub trait DisambiguationPolicy {
    /// Decision for one prompt.
    fn decide(&self, prompt: &DisambiguationPrompt) -> Decision;
}

/// Accepts every top pick.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoSelectTop;

impl DisambiguationPolicy for AutoSelectTop {
    fn decide(&self, _prompt: &DisambiguationPrompt) -> Decision {
        Decision::AcceptTop
    }
}

/// Defers everything, leaving decisions to an outside caller.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeferAll;

impl DisambiguationPolicy for DeferAll {
    fn decide(&self, _prompt: &DisambiguationPrompt) -> Decision {
        Decision::Defer
    }
}

/// Delegates each prompt to a closure.
pub struct CallbackPolicy<F> {
    callback: F,
}

impl<F> CallbackPolicy<F>
where
    F: Fn(&DisambiguationPrompt) -> Decision,
{
    pub const fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> DisambiguationPolicy for CallbackPolicy<F>
where
    F: Fn(&DisambiguationPrompt) -> Decision,
{
    fn decide(&self, prompt: &DisambiguationPrompt) -> Decision {
        (self.callback)(prompt)
    }
}

impl<F> std::fmt::Debug for CallbackPolicy<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackPolicy").finish_non_exhaustive()
    }
}
