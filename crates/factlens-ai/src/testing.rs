//! Scripted collaborators for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use factlens_core::{
    AnalysisError, AnalysisRequest, CancelFlag, FactCheckClaim, FactCheckProvider, ModelDescriptor,
    ModelService, RawAnalysis,
};
use serde_json::{Value, json};

/// What a scripted model does when asked to analyze.
#[derive(Clone)]
pub enum Script {
    Answer(Value),
    FailSwitch,
    FailAnalyze,
    Hang,
}

pub fn answer(prediction: &str, confidence: f64) -> Script {
    Script::Answer(json!({ "prediction": prediction, "confidence": confidence }))
}

/// Model service whose analyze result depends on the active model, the
/// way the real service's shared pointer behaves.
pub struct MockService {
    catalog: Result<Vec<ModelDescriptor>, String>,
    scripts: HashMap<String, Script>,
    active: Mutex<Option<String>>,
    pub calls: Mutex<Vec<String>>,
    /// Fire this flag once the named model has answered.
    pub cancel_after: Option<(String, CancelFlag)>,
}

impl MockService {
    pub fn new(models: &[(&str, Script)]) -> Self {
        Self {
            catalog: Ok(models.iter().map(|(id, _)| ModelDescriptor::new(*id)).collect()),
            scripts: models
                .iter()
                .map(|(id, s)| (id.to_string(), s.clone()))
                .collect(),
            active: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            cancel_after: None,
        }
    }

    pub fn unreachable() -> Self {
        Self {
            catalog: Err("connection refused".into()),
            scripts: HashMap::new(),
            active: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            cancel_after: None,
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelService for MockService {
    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, AnalysisError> {
        self.calls.lock().unwrap().push("list".into());
        self.catalog
            .clone()
            .map_err(AnalysisError::RemoteUnavailable)
    }

    async fn set_active_model(&self, model_id: &str) -> Result<(), AnalysisError> {
        self.calls.lock().unwrap().push(format!("set:{model_id}"));
        if matches!(self.scripts.get(model_id), Some(Script::FailSwitch)) {
            return Err(AnalysisError::RemoteUnavailable("HTTP 500".into()));
        }
        *self.active.lock().unwrap() = Some(model_id.to_string());
        Ok(())
    }

    async fn analyze(&self, _request: &AnalysisRequest) -> Result<RawAnalysis, AnalysisError> {
        let active = self.active.lock().unwrap().clone().unwrap_or_default();
        self.calls.lock().unwrap().push(format!("analyze:{active}"));
        match self.scripts.get(&active) {
            Some(Script::Answer(body)) => {
                if let Some((model, flag)) = &self.cancel_after
                    && *model == active
                {
                    flag.cancel();
                }
                Ok(RawAnalysis::from_value(body.clone()))
            }
            Some(Script::Hang) => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(RawAnalysis::default())
            }
            _ => Err(AnalysisError::RemoteUnavailable("HTTP 502".into())),
        }
    }
}

/// Fact-check provider returning fixed claims, an error, or hanging.
pub struct MockProvider {
    pub name: String,
    pub outcome: Result<Vec<FactCheckClaim>, ()>,
    pub hang: bool,
}

impl MockProvider {
    pub fn with_claims(name: &str, claims: Vec<FactCheckClaim>) -> Self {
        Self {
            name: name.into(),
            outcome: Ok(claims),
            hang: false,
        }
    }

    pub fn failing(name: &str) -> Self {
        Self {
            name: name.into(),
            outcome: Err(()),
            hang: false,
        }
    }

    pub fn hanging(name: &str) -> Self {
        Self {
            name: name.into(),
            outcome: Ok(Vec::new()),
            hang: true,
        }
    }
}

#[async_trait]
impl FactCheckProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(
        &self,
        _text: &str,
        _url: Option<&str>,
    ) -> Result<Vec<FactCheckClaim>, AnalysisError> {
        if self.hang {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        self.outcome
            .clone()
            .map_err(|_| AnalysisError::ProviderUnavailable {
                provider: self.name.clone(),
                reason: "HTTP 503".into(),
            })
    }
}

pub fn claim(rating: &str) -> FactCheckClaim {
    FactCheckClaim {
        claim_text: "Claim under review".into(),
        claimant: None,
        textual_rating: rating.into(),
        publisher_name: Some("Fast Check CL".into()),
        source_provider: "google".into(),
    }
}
