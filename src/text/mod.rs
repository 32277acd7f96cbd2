//! Text primitives for matching.
//!
//! Normalization produces comparable keys; similarity scores two keys.
//! Callers normalize before scoring: the scorer never normalizes itself.

mod normalize;
mod similarity;

pub use normalize::normalize;
pub use similarity::{similarity, similarity_exceeds};
