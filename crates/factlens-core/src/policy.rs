//! Named policy constants for verdict reconciliation.

use serde::{Deserialize, Serialize};

/// Tunable numbers used by the consensus engine.
///
/// Every field has a documented default; a JSON file may override any
/// subset of them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusPolicy {
    /// Minimum confidence when published fact-checks rate the claim false.
    /// Default 0.85.
    pub fact_check_floor: f64,
    /// Confidence reported when uncertain votes dominate. Default 0.4.
    pub precaution_confidence: f64,
    /// Added to the mean score when fact-checks rate the claim true.
    /// Default 0.20.
    pub true_claim_boost: f64,
    /// Tied votes resolve to real only above this score. Default 0.5.
    pub tie_break_threshold: f64,
    /// Subtracted from the reported score on a temporal override.
    /// Default 0.5.
    pub temporal_score_penalty: f64,
    /// Subtracted from the reported score on a fact-check-false override.
    /// Default 0.4.
    pub false_claim_score_penalty: f64,
}

impl Default for ConsensusPolicy {
    fn default() -> Self {
        Self {
            fact_check_floor: 0.85,
            precaution_confidence: 0.4,
            true_claim_boost: 0.20,
            tie_break_threshold: 0.5,
            temporal_score_penalty: 0.5,
            false_claim_score_penalty: 0.4,
        }
    }
}

/// Clamp to `[0, 1]`, mapping NaN and infinities to 0.
pub fn clamp_unit(x: f64) -> f64 {
    if x.is_finite() { x.clamp(0.0, 1.0) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_override_keeps_defaults() {
        let p: ConsensusPolicy =
            serde_json::from_str(r#"{ "precaution_confidence": 0.3 }"#).unwrap();
        assert_eq!(p.precaution_confidence, 0.3);
        assert_eq!(p.fact_check_floor, 0.85);
        assert_eq!(p.tie_break_threshold, 0.5);
    }

    #[test]
    fn clamp_handles_non_finite() {
        assert_eq!(clamp_unit(f64::NAN), 0.0);
        assert_eq!(clamp_unit(f64::INFINITY), 0.0);
        assert_eq!(clamp_unit(-0.2), 0.0);
        assert_eq!(clamp_unit(1.2), 1.0);
        assert_eq!(clamp_unit(0.42), 0.42);
    }
}
