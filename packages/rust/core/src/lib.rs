//! Core pipeline orchestration and domain logic for ContactScout.
//!
//! This crate ties together input decoding, CSV handling, pacing, and the
//! email lookup into the end-to-end `enrich_csv` workflow.

pub mod decode;
pub mod pacing;
pub mod pipeline;
pub mod table;
