//! Brochure pipeline: relevance filtering, composition, and orchestration.
//!
//! This crate wires the scrape and llm crates into the four-stage run:
//! - [`filter`] — ask the model which links belong in the brochure
//! - [`compose`] — gather the selected pages and build the final prompt
//! - [`pipeline`] — the sequential `generate` entry point

pub mod compose;
pub mod filter;
pub mod pipeline;

pub use pipeline::{GenerateConfig, GenerateResult, ProgressReporter, SilentProgress, generate};
