//! Shared analysis types exchanged between the analyzer, the consensus
//! engine, the HTTP client and the session store.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::policy::clamp_unit;

/// Which payload an [`AnalysisRequest`](crate::AnalysisRequest) carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Url,
    Text,
    File,
}

impl InputKind {
    /// Dashboard order.
    pub const ALL: [InputKind; 3] = [InputKind::Url, InputKind::Text, InputKind::File];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::Text => "text",
            Self::File => "file",
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Model catalog ──

/// A classification model offered by the remote service.
///
/// Deserialises from the catalog wire shape
/// `{model_id, name, language, accuracy, speed}`. A missing `name` falls back
/// to `model_id`; labels may arrive as strings or numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireModel")]
pub struct ModelDescriptor {
    pub model_id: String,
    pub display_name: String,
    pub language: String,
    pub accuracy_label: String,
    pub speed_label: String,
}

impl ModelDescriptor {
    pub fn new(model_id: impl Into<String>) -> Self {
        let model_id = model_id.into();
        Self {
            display_name: model_id.clone(),
            model_id,
            language: String::new(),
            accuracy_label: String::new(),
            speed_label: String::new(),
        }
    }
}

#[derive(Deserialize)]
struct WireModel {
    #[serde(alias = "model_name")]
    model_id: String,
    #[serde(default, deserialize_with = "label")]
    name: String,
    #[serde(default, deserialize_with = "label")]
    display_name: String,
    #[serde(default, deserialize_with = "label")]
    language: String,
    #[serde(default, alias = "accuracy_label", deserialize_with = "label")]
    accuracy: String,
    #[serde(default, alias = "speed_label", deserialize_with = "label")]
    speed: String,
}

impl From<WireModel> for ModelDescriptor {
    fn from(w: WireModel) -> Self {
        let display_name = [w.name, w.display_name]
            .into_iter()
            .find(|s| !s.is_empty())
            .unwrap_or_else(|| w.model_id.clone());
        Self {
            model_id: w.model_id,
            display_name,
            language: w.language,
            accuracy_label: w.accuracy,
            speed_label: w.speed,
        }
    }
}

/// Accept a string, a number, a bool or null for a free-form label.
fn label<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

// ── Predictions ──

/// Per-model prediction after normalisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prediction {
    Real,
    Fake,
    Uncertain,
}

impl Prediction {
    /// Map a free-form remote label onto a prediction.
    ///
    /// Anything outside the known vocabulary (including `unknown` and the
    /// empty string) is `Uncertain`.
    pub fn parse(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "real" | "true" => Self::Real,
            "fake" | "false" => Self::Fake,
            _ => Self::Uncertain,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Real => "real",
            Self::Fake => "fake",
            Self::Uncertain => "uncertain",
        }
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final binary verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Real,
    Fake,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Real => "real",
            Self::Fake => "fake",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Remote analysis responses ──

/// One analyze response as returned by the remote service, before
/// normalisation.
///
/// Built from the raw JSON body. Only the fields the core relies on are
/// lifted out; the full payload is kept for auditing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawAnalysis {
    pub prediction: Option<String>,
    pub confidence: Option<f64>,
    pub score: Option<f64>,
    pub analysis_time: Option<f64>,
    pub analysis_time_ms: Option<f64>,
    pub content_length: Option<u64>,
    pub payload: Value,
}

impl RawAnalysis {
    /// Lift the known fields out of a response body.
    ///
    /// The prediction is looked up under `prediction`, `classification` and
    /// `label` (first non-empty wins) and stringified whatever its JSON type.
    pub fn from_value(payload: Value) -> Self {
        let prediction = ["prediction", "classification", "label"]
            .iter()
            .filter_map(|key| payload.get(*key))
            .find_map(|v| match v {
                Value::Null => None,
                Value::String(s) if s.trim().is_empty() => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            });

        let number = |key: &str| payload.get(key).and_then(Value::as_f64);

        Self {
            prediction,
            confidence: number("confidence"),
            score: number("score"),
            analysis_time: number("analysis_time").or_else(|| number("processing_time")),
            analysis_time_ms: number("analysis_time_ms"),
            content_length: payload.get("content_length").and_then(Value::as_u64),
            payload,
        }
    }
}

/// Outcome of running one request through one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelVote {
    pub model_id: String,
    pub prediction: Prediction,
    /// In `[0, 1]`.
    pub confidence: f64,
    /// In `[0, 1]`; 0 when the model reported no score.
    pub score: f64,
    pub analysis_seconds: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
}

impl ModelVote {
    /// Vote without a raw payload.
    pub fn new(model_id: impl Into<String>, prediction: Prediction, confidence: f64) -> Self {
        Self {
            model_id: model_id.into(),
            prediction,
            confidence: clamp_unit(confidence),
            score: 0.0,
            analysis_seconds: 0.0,
            raw: None,
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = clamp_unit(score);
        self
    }

    /// Normalise a raw response into a vote.
    ///
    /// Missing confidence and score become 0. Missing or unrecognised
    /// predictions become [`Prediction::Uncertain`].
    pub fn from_raw(model_id: impl Into<String>, raw: RawAnalysis) -> Self {
        let prediction = raw
            .prediction
            .as_deref()
            .map(Prediction::parse)
            .unwrap_or(Prediction::Uncertain);
        let confidence = clamp_unit(raw.confidence.unwrap_or(0.0));
        let score = clamp_unit(raw.score.unwrap_or(0.0));
        let analysis_seconds = raw
            .analysis_time_ms
            .map(|ms| ms / 1000.0)
            .or(raw.analysis_time)
            .filter(|s| s.is_finite() && *s >= 0.0)
            .unwrap_or(0.0);

        Self {
            model_id: model_id.into(),
            prediction,
            confidence,
            score,
            analysis_seconds,
            raw: Some(raw.payload),
        }
    }
}

// ── Fact-check evidence ──

/// One externally published fact-check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactCheckClaim {
    pub claim_text: String,
    pub claimant: Option<String>,
    /// Free-form, e.g. "False", "Verdadero", "Engañoso".
    pub textual_rating: String,
    pub publisher_name: Option<String>,
    /// Which provider returned the claim.
    pub source_provider: String,
}

/// How a fact-check rating bears on the subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClaimStance {
    SupportsFalse,
    SupportsTrue,
    Neutral,
}

impl ClaimStance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SupportsFalse => "supports-false",
            Self::SupportsTrue => "supports-true",
            Self::Neutral => "neutral",
        }
    }
}

// ── Consensus output ──

/// Which rule produced the final verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rationale {
    TemporalInconsistency,
    FactCheckFalse,
    ModelMajority,
    PrecautionUncertain,
}

impl Rationale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TemporalInconsistency => "temporal-inconsistency",
            Self::FactCheckFalse => "fact-check-false",
            Self::ModelMajority => "model-majority",
            Self::PrecautionUncertain => "precaution-uncertain",
        }
    }

    /// One-line explanation for display.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::TemporalInconsistency => {
                "text places a known, dated event in the recent past"
            }
            Self::FactCheckFalse => "published fact-checks rate the claim as false",
            Self::ModelMajority => "majority of classification models",
            Self::PrecautionUncertain => {
                "most models were uncertain; ambiguity is treated as fake"
            }
        }
    }
}

impl fmt::Display for Rationale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vote counts across all models that answered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub real: usize,
    pub fake: usize,
    pub uncertain: usize,
}

impl VoteTally {
    pub fn count(votes: &[ModelVote]) -> Self {
        votes.iter().fold(Self::default(), |mut t, v| {
            match v.prediction {
                Prediction::Real => t.real += 1,
                Prediction::Fake => t.fake += 1,
                Prediction::Uncertain => t.uncertain += 1,
            }
            t
        })
    }

    pub fn total(&self) -> usize {
        self.real + self.fake + self.uncertain
    }
}

/// Verdict forced by the temporal detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalOverride {
    pub prediction: Verdict,
    pub confidence_floor: f64,
    pub rationale: Rationale,
    /// Id of the rule that fired.
    pub rule_id: String,
    /// The dated fact the text contradicts.
    pub fact: String,
}

/// The final, user-facing answer for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusResult {
    pub prediction: Verdict,
    pub confidence: f64,
    pub rationale: Rationale,
    pub votes: VoteTally,
    pub consensus_strength: f64,
    /// Mean model score after evidence adjustments, in `[0, 1]`.
    pub score: f64,
    pub average_confidence: f64,
    pub evidence: Vec<FactCheckClaim>,
    pub individual: Vec<ModelVote>,
    pub temporal: Option<TemporalOverride>,
    pub elapsed_seconds: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn descriptor_from_catalog_entry() {
        let m: ModelDescriptor = serde_json::from_value(json!({
            "model_id": "GonzaloA/fake-news-detection-spanish",
            "name": "Spanish BERT",
            "language": "es",
            "accuracy": 0.93,
            "speed": "fast"
        }))
        .unwrap();
        assert_eq!(m.model_id, "GonzaloA/fake-news-detection-spanish");
        assert_eq!(m.display_name, "Spanish BERT");
        assert_eq!(m.accuracy_label, "0.93");
        assert_eq!(m.speed_label, "fast");
    }

    #[test]
    fn descriptor_name_falls_back_to_id() {
        let m: ModelDescriptor =
            serde_json::from_value(json!({ "model_id": "m1", "language": null })).unwrap();
        assert_eq!(m.display_name, "m1");
        assert_eq!(m.language, "");
    }

    #[test]
    fn prediction_vocabulary() {
        assert_eq!(Prediction::parse("REAL"), Prediction::Real);
        assert_eq!(Prediction::parse(" Fake "), Prediction::Fake);
        assert_eq!(Prediction::parse("false"), Prediction::Fake);
        assert_eq!(Prediction::parse("unknown"), Prediction::Uncertain);
        assert_eq!(Prediction::parse("satire"), Prediction::Uncertain);
        assert_eq!(Prediction::parse(""), Prediction::Uncertain);
    }

    #[test]
    fn raw_analysis_reads_alternate_label_keys() {
        let raw = RawAnalysis::from_value(json!({ "label": "FAKE", "score": 0.7 }));
        assert_eq!(raw.prediction.as_deref(), Some("FAKE"));
        assert_eq!(raw.confidence, None);
        assert_eq!(raw.score, Some(0.7));
    }

    #[test]
    fn vote_defaults_for_sparse_response() {
        let vote = ModelVote::from_raw("m1", RawAnalysis::from_value(json!({})));
        assert_eq!(vote.prediction, Prediction::Uncertain);
        assert_eq!(vote.confidence, 0.0);
        assert_eq!(vote.score, 0.0);
        assert_eq!(vote.analysis_seconds, 0.0);
    }

    #[test]
    fn vote_missing_confidence_is_zero_even_with_score() {
        let vote = ModelVote::from_raw(
            "m1",
            RawAnalysis::from_value(json!({ "prediction": "real", "score": 0.64 })),
        );
        assert_eq!(vote.prediction, Prediction::Real);
        assert_eq!(vote.confidence, 0.0);
        assert!((vote.score - 0.64).abs() < 1e-9);
    }

    #[test]
    fn vote_prefers_millisecond_timing_and_clamps() {
        let vote = ModelVote::from_raw(
            "m1",
            RawAnalysis::from_value(json!({
                "prediction": "fake",
                "confidence": 1.7,
                "analysis_time": 9.0,
                "analysis_time_ms": 250
            })),
        );
        assert_eq!(vote.confidence, 1.0);
        assert!((vote.analysis_seconds - 0.25).abs() < 1e-9);
    }

    #[test]
    fn numeric_prediction_is_uncertain() {
        let vote = ModelVote::from_raw(
            "m1",
            RawAnalysis::from_value(json!({ "prediction": 0.87, "confidence": 0.87 })),
        );
        assert_eq!(vote.prediction, Prediction::Uncertain);
    }

    #[test]
    fn tally_counts_each_bucket() {
        let votes = vec![
            ModelVote::new("a", Prediction::Real, 0.9),
            ModelVote::new("b", Prediction::Uncertain, 0.1),
            ModelVote::new("c", Prediction::Fake, 0.6),
            ModelVote::new("d", Prediction::Uncertain, 0.2),
        ];
        let t = VoteTally::count(&votes);
        assert_eq!((t.real, t.fake, t.uncertain, t.total()), (1, 1, 2, 4));
    }

    #[test]
    fn rationale_serialises_kebab_case() {
        let s = serde_json::to_string(&Rationale::PrecautionUncertain).unwrap();
        assert_eq!(s, "\"precaution-uncertain\"");
        assert_eq!(Rationale::FactCheckFalse.as_str(), "fact-check-false");
    }
}
