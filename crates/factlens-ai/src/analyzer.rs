//! Per-model analyzer: runs one request through every catalog model.
//!
//! The remote service analyzes with a single, globally shared active model,
//! so the loop is strictly sequential: each switch is awaited before the
//! analyze call that depends on it, and no other analysis may run meanwhile.
//! A model that fails to switch, errors, or times out is skipped.

use std::future::Future;
use std::time::Duration;

use factlens_core::{AnalysisError, AnalysisRequest, CancelFlag, ModelService, ModelVote};
use tracing::{info, warn};

use crate::catalog::ModelCatalog;

/// A model left out of the fan-out, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedModel {
    pub model_id: String,
    pub reason: String,
}

/// Votes gathered by one fan-out, in catalog order.
#[derive(Debug, Clone, Default)]
pub struct FanOut {
    pub votes: Vec<ModelVote>,
    pub skipped: Vec<SkippedModel>,
    /// The cancel flag stopped the loop before the catalog was exhausted.
    pub cancelled: bool,
}

/// Run `request` through every model of `catalog`.
///
/// `timeout` bounds each switch and each analyze call separately. The cancel
/// flag is checked before every model; when it fires with no votes collected
/// the run fails with [`AnalysisError::UserCancelled`], otherwise the votes
/// gathered so far are returned.
pub async fn fan_out<S: ModelService + ?Sized>(
    catalog: &ModelCatalog<'_, S>,
    request: &AnalysisRequest,
    timeout: Duration,
    cancel: &CancelFlag,
) -> Result<FanOut, AnalysisError> {
    let models = catalog.models();
    let mut out = FanOut::default();

    info!(
        models = models.len(),
        kind = %request.kind(),
        "analyzing with every available model"
    );

    for model in models {
        if cancel.is_cancelled() {
            info!(collected = out.votes.len(), "fan-out cancelled");
            out.cancelled = true;
            break;
        }

        let current = model.model_id.as_str();

        if let Err(e) = within(timeout, catalog.set_active_model(current)).await {
            warn!(model = %current, error = %e, "cannot activate model, skipping");
            out.skipped.push(SkippedModel {
                model_id: current.to_string(),
                reason: e.to_string(),
            });
            continue;
        }

        match within(timeout, catalog.service().analyze(request)).await {
            Ok(raw) => {
                let vote = ModelVote::from_raw(current, raw);
                info!(
                    model = %current,
                    prediction = %vote.prediction,
                    confidence = vote.confidence,
                    "model voted"
                );
                out.votes.push(vote);
            }
            Err(e) => {
                warn!(model = %current, error = %e, "model analysis failed, skipping");
                out.skipped.push(SkippedModel {
                    model_id: current.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    if out.votes.is_empty() {
        if out.cancelled {
            return Err(AnalysisError::UserCancelled);
        }
        return Err(AnalysisError::NoModelsAvailable {
            attempted: models.len(),
        });
    }

    Ok(out)
}

/// Await `fut` for at most `limit`; expiry counts as the service being
/// unavailable.
async fn within<T>(
    limit: Duration,
    fut: impl Future<Output = Result<T, AnalysisError>>,
) -> Result<T, AnalysisError> {
    tokio::time::timeout(limit, fut).await.map_err(|_| {
        AnalysisError::RemoteUnavailable(format!("timed out after {:.1}s", limit.as_secs_f64()))
    })?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockService, Script, answer};
    use factlens_core::Prediction;

    const LIMIT: Duration = Duration::from_secs(5);

    async fn run(svc: &MockService, cancel: &CancelFlag) -> Result<FanOut, AnalysisError> {
        let mut catalog = ModelCatalog::new(svc);
        catalog.list_models().await?;
        let request = AnalysisRequest::Text("Texto de prueba".into());
        fan_out(&catalog, &request, LIMIT, cancel).await
    }

    #[tokio::test]
    async fn one_vote_per_model_in_catalog_order() {
        let svc = MockService::new(&[
            ("m1", answer("real", 0.9)),
            ("m2", answer("FAKE", 0.6)),
            ("m3", answer("unknown", 0.2)),
        ]);
        let out = run(&svc, &CancelFlag::new()).await.unwrap();

        let got: Vec<(&str, Prediction)> = out
            .votes
            .iter()
            .map(|v| (v.model_id.as_str(), v.prediction))
            .collect();
        assert_eq!(
            got,
            vec![
                ("m1", Prediction::Real),
                ("m2", Prediction::Fake),
                ("m3", Prediction::Uncertain),
            ]
        );
        assert!(out.skipped.is_empty());
    }

    #[tokio::test]
    async fn switch_always_precedes_its_analyze_call() {
        let svc = MockService::new(&[("m1", answer("real", 0.9)), ("m2", answer("fake", 0.6))]);
        run(&svc, &CancelFlag::new()).await.unwrap();

        assert_eq!(
            svc.calls(),
            vec!["list", "set:m1", "analyze:m1", "set:m2", "analyze:m2"]
        );
    }

    #[tokio::test]
    async fn failing_model_is_skipped() {
        let svc = MockService::new(&[
            ("m1", answer("real", 0.9)),
            ("m2", Script::FailAnalyze),
            ("m3", Script::FailSwitch),
            ("m4", answer("fake", 0.7)),
        ]);
        let out = run(&svc, &CancelFlag::new()).await.unwrap();

        assert_eq!(out.votes.len(), 2);
        let skipped: Vec<&str> = out.skipped.iter().map(|s| s.model_id.as_str()).collect();
        assert_eq!(skipped, vec!["m2", "m3"]);
        // A failed switch must not be followed by an analyze call.
        assert!(!svc.calls().contains(&"analyze:m3".to_string()));
    }

    #[tokio::test]
    async fn all_models_failing_is_fatal() {
        let svc = MockService::new(&[("m1", Script::FailAnalyze), ("m2", Script::FailSwitch)]);
        let err = run(&svc, &CancelFlag::new()).await.unwrap_err();
        assert!(matches!(err, AnalysisError::NoModelsAvailable { attempted: 2 }));
    }

    #[tokio::test]
    async fn hanging_model_times_out_and_is_skipped() {
        let svc = MockService::new(&[("slow", Script::Hang), ("m2", answer("real", 0.8))]);
        let mut catalog = ModelCatalog::new(&svc);
        catalog.list_models().await.unwrap();
        let request = AnalysisRequest::Text("Texto".into());

        let out = fan_out(&catalog, &request, Duration::from_millis(20), &CancelFlag::new())
            .await
            .unwrap();

        assert_eq!(out.votes.len(), 1);
        assert_eq!(out.skipped[0].model_id, "slow");
        assert!(out.skipped[0].reason.contains("timed out"));
    }

    #[tokio::test]
    async fn cancelled_before_first_model() {
        let svc = MockService::new(&[("m1", answer("real", 0.9))]);
        let cancel = CancelFlag::new();
        cancel.cancel();

        let err = run(&svc, &cancel).await.unwrap_err();
        assert!(matches!(err, AnalysisError::UserCancelled));
        assert_eq!(svc.calls(), vec!["list"]);
    }

    #[tokio::test]
    async fn cancelled_mid_run_keeps_gathered_votes() {
        let cancel = CancelFlag::new();
        let mut svc = MockService::new(&[
            ("m1", answer("real", 0.9)),
            ("m2", answer("fake", 0.6)),
        ]);
        svc.cancel_after = Some(("m1".into(), cancel.clone()));

        let out = run(&svc, &cancel).await.unwrap();
        assert!(out.cancelled);
        assert_eq!(out.votes.len(), 1);
        assert!(!svc.calls().contains(&"set:m2".to_string()));
    }
}
