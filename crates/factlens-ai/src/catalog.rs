//! Model catalog accessor.
//!
//! Remembers the last-listed catalog so that activation of a model the
//! service never advertised fails locally, without touching the remote
//! active-model pointer.

use factlens_core::{AnalysisError, ModelDescriptor, ModelService};
use tracing::{debug, info};

pub struct ModelCatalog<'a, S: ModelService + ?Sized> {
    service: &'a S,
    listed: Vec<ModelDescriptor>,
}

impl<'a, S: ModelService + ?Sized> ModelCatalog<'a, S> {
    pub fn new(service: &'a S) -> Self {
        Self {
            service,
            listed: Vec::new(),
        }
    }

    /// Fetch the catalog from the service and remember it.
    pub async fn list_models(&mut self) -> Result<&[ModelDescriptor], AnalysisError> {
        self.listed = self.service.list_models().await?;
        info!(count = self.listed.len(), "model catalog fetched");
        Ok(&self.listed)
    }

    /// Models from the last successful [`list_models`](Self::list_models).
    pub fn models(&self) -> &[ModelDescriptor] {
        &self.listed
    }

    pub fn contains(&self, model_id: &str) -> bool {
        self.listed.iter().any(|m| m.model_id == model_id)
    }

    /// Point the remote service at `model_id`.
    ///
    /// Changes the service's active model for every subsequent analyze call.
    pub async fn set_active_model(&self, model_id: &str) -> Result<(), AnalysisError> {
        if !self.contains(model_id) {
            return Err(AnalysisError::UnknownModel(model_id.to_string()));
        }
        debug!(model = %model_id, "switching active model");
        self.service.set_active_model(model_id).await
    }

    pub fn service(&self) -> &'a S {
        self.service
    }
}
