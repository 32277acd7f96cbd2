//! Disambiguation of entities awaiting validation.
//!
//! A [`DisambiguationPrompt`] presents the top pick and its runner-ups; a
//! [`DisambiguationPolicy`] answers it; the [`DisambiguationGate`] applies
//! the answers to a report. The default policy accepts every top pick.

mod gate;
mod policy;
mod prompt;

pub use gate::{DisambiguationGate, GateOutcome};
pub use policy::{AutoSelectTop, CallbackPolicy, Decision, DeferAll, DisambiguationPolicy};
pub use prompt::{DisambiguationPrompt, OptionView};
