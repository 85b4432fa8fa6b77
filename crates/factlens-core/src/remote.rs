//! Seams to the remote collaborators: the model service and fact-check
//! providers.
//!
//! Implementations live in `factlens-client`; the analyzer and the evidence
//! gatherer only see these traits.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::error::AnalysisError;
use crate::input::AnalysisRequest;
use crate::model::{FactCheckClaim, ModelDescriptor, RawAnalysis};

/// The remote classification service.
///
/// The service analyzes with whichever model is currently active; switching
/// is a global side effect, so callers must never interleave
/// [`set_active_model`](Self::set_active_model) and
/// [`analyze`](Self::analyze) from concurrent tasks.
#[async_trait]
pub trait ModelService: Send + Sync {
    /// Current catalog. An empty catalog is not an error.
    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, AnalysisError>;

    async fn set_active_model(&self, model_id: &str) -> Result<(), AnalysisError>;

    /// Analyze with the active model; the response is returned unnormalised.
    async fn analyze(&self, request: &AnalysisRequest) -> Result<RawAnalysis, AnalysisError>;
}

/// An independent fact-checking source.
#[async_trait]
pub trait FactCheckProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Published claims matching the subject. No matches is an empty list;
    /// transport failures are [`AnalysisError::ProviderUnavailable`].
    async fn check(
        &self,
        text: &str,
        url: Option<&str>,
    ) -> Result<Vec<FactCheckClaim>, AnalysisError>;
}

/// Cancellation flag polled between sequential model calls.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Re-arm the flag for the next run.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
