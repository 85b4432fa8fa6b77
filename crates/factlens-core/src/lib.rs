//! Core types for factlens: the analysis data model, input detection,
//! consensus policy, configuration and the traits behind which the remote
//! service and fact-check providers sit.

pub mod config;
pub mod error;
pub mod input;
pub mod model;
pub mod policy;
pub mod remote;

pub use config::{ClientConfig, DEFAULT_API_URL, PipelineConfig, load_json};
pub use error::{AnalysisError, ConfigError, InputError};
pub use input::{AnalysisRequest, FileInput, MAX_FILE_BYTES, MAX_TEXT_CHARS, PREVIEW_CHARS};
pub use model::{
    ClaimStance, ConsensusResult, FactCheckClaim, InputKind, ModelDescriptor, ModelVote,
    Prediction, Rationale, RawAnalysis, TemporalOverride, Verdict, VoteTally,
};
pub use policy::{ConsensusPolicy, clamp_unit};
pub use remote::{CancelFlag, FactCheckProvider, ModelService};
