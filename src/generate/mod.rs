//! Generation: deterministic RNG, combination enumeration, and prompt
//! normalization.

pub mod generator;
pub mod normalizer;
pub mod rng;

pub use generator::{generate, ResolvedPrompt};
pub use rng::SplitMix64;
