//! Detection logic for factlens.
//!
//! The model service is reached only through [`ModelCatalog`]; the
//! [`analyzer`] walks the catalog one model at a time, [`evidence`] and
//! [`temporal`] produce the override inputs, and [`ConsensusEngine`] turns
//! all of it into one verdict. [`Pipeline`] wires the stages together.

pub mod analyzer;
pub mod catalog;
pub mod consensus;
pub mod evidence;
pub mod pipeline;
pub mod temporal;

#[cfg(test)]
mod testing;

pub use analyzer::{FanOut, SkippedModel, fan_out};
pub use catalog::ModelCatalog;
pub use consensus::ConsensusEngine;
pub use evidence::{EvidenceGatherer, EvidenceTally, RatingKeywords};
pub use pipeline::Pipeline;
pub use temporal::{RuleError, TemporalDetector, TemporalRule, builtin_rules};
