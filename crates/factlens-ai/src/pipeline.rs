//! End-to-end detection run for one request.
//!
//! validate → list catalog → (fan-out ∥ evidence) → temporal → consensus.
//!
//! Evidence gathering talks to the fact-check providers, never to the model
//! service, so it runs alongside the fan-out without touching the shared
//! active-model pointer.

use std::time::Instant;

use chrono::{Local, NaiveDate};
use factlens_core::{
    AnalysisError, AnalysisRequest, CancelFlag, ConsensusResult, FactCheckProvider, ModelService,
    PipelineConfig,
};
use tracing::{info, warn};

use crate::analyzer::fan_out;
use crate::catalog::ModelCatalog;
use crate::consensus::ConsensusEngine;
use crate::evidence::EvidenceGatherer;
use crate::temporal::TemporalDetector;

pub struct Pipeline<S: ModelService> {
    service: S,
    evidence: EvidenceGatherer,
    temporal: TemporalDetector,
    engine: ConsensusEngine,
    config: PipelineConfig,
}

impl<S: ModelService> Pipeline<S> {
    /// Pipeline with built-in temporal rules, default policy and no
    /// fact-check providers.
    pub fn new(service: S, config: PipelineConfig) -> Self {
        Self {
            service,
            evidence: EvidenceGatherer::new(config.fact_check_timeout),
            temporal: TemporalDetector::default(),
            engine: ConsensusEngine::default(),
            config,
        }
    }

    pub fn with_provider(mut self, provider: impl FactCheckProvider + 'static) -> Self {
        self.evidence = self.evidence.with_provider(provider);
        self
    }

    pub fn with_temporal(mut self, detector: TemporalDetector) -> Self {
        self.temporal = detector;
        self
    }

    pub fn with_engine(mut self, engine: ConsensusEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn evidence(&self) -> &EvidenceGatherer {
        &self.evidence
    }

    /// Analyze `request`, judging recency against the local calendar date.
    pub async fn run(
        &self,
        request: &AnalysisRequest,
        cancel: &CancelFlag,
    ) -> Result<ConsensusResult, AnalysisError> {
        self.run_on(request, cancel, Local::now().date_naive()).await
    }

    /// Analyze `request` as if today were `today`.
    pub async fn run_on(
        &self,
        request: &AnalysisRequest,
        cancel: &CancelFlag,
        today: NaiveDate,
    ) -> Result<ConsensusResult, AnalysisError> {
        request.validate()?;
        let started = Instant::now();

        info!(kind = %request.kind(), source = %request.source_label(), "analysis started");

        let mut catalog = ModelCatalog::new(&self.service);
        if let Err(e) = catalog.list_models().await {
            warn!(error = %e, "model catalog unavailable");
            return Err(AnalysisError::NoModelsAvailable { attempted: 0 });
        }

        let subject = request.subject_text();
        let (evidence_text, evidence_url) = evidence_subject(request, subject.as_deref());

        let (fan, claims) = tokio::join!(
            fan_out(&catalog, request, self.config.model_timeout, cancel),
            self.evidence.gather(evidence_text, evidence_url),
        );
        let fan = fan?;

        if !fan.skipped.is_empty() {
            info!(
                voted = fan.votes.len(),
                skipped = fan.skipped.len(),
                "some models did not vote"
            );
        }

        let temporal = subject
            .as_deref()
            .and_then(|text| self.temporal.detect(text, today));

        Ok(self
            .engine
            .resolve(&fan.votes, claims, temporal, started.elapsed()))
    }
}

/// What the fact-check providers are asked about: the readable text when
/// there is one, otherwise the URL itself.
fn evidence_subject<'a>(
    request: &'a AnalysisRequest,
    subject: Option<&'a str>,
) -> (&'a str, Option<&'a str>) {
    let url = request.url();
    match (subject, url) {
        (Some(text), url) => (text, url),
        (None, Some(url)) => (url, Some(url)),
        (None, None) => ("", None),
    }
}
