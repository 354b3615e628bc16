//! Synthesis backend HTTP client and request payload construction.

pub mod client;
pub mod payload;

pub use client::{ApiClient, GenerationResult};
