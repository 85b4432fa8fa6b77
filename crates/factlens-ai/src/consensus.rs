//! Verdict reconciliation across models, fact-checks and heuristics.
//!
//! Rules are applied in strict precedence; the first that matches decides:
//!
//! 1. **Temporal override**: the text contradicts a dated fact → fake,
//!    confidence raised to the rule's floor.
//! 2. **Fact-check override**: debunking claims at least as numerous as
//!    confirming ones → fake, confidence raised to the policy floor.
//!    Confirming claims that outnumber debunks only nudge the score upward
//!    and fall through.
//! 3. **Majority vote** over real/fake votes; a tie goes to the adjusted
//!    mean score (`> threshold` → real, otherwise fake).
//! 4. **Precaution**: uncertain votes outnumbering both real and fake force
//!    fake at a fixed, low confidence, whatever the majority said.
//!
//! When no override fires, confidence is mean model confidence × consensus
//! strength. All values are clamped to `[0, 1]`.

use std::time::Duration;

use factlens_core::{
    ConsensusPolicy, ConsensusResult, FactCheckClaim, ModelVote, Rationale, TemporalOverride,
    Verdict, VoteTally, clamp_unit,
};
use tracing::info;

use crate::evidence::{EvidenceTally, RatingKeywords};

pub struct ConsensusEngine {
    policy: ConsensusPolicy,
    keywords: RatingKeywords,
}

impl Default for ConsensusEngine {
    fn default() -> Self {
        Self::new(ConsensusPolicy::default(), RatingKeywords::default())
    }
}

impl ConsensusEngine {
    pub fn new(policy: ConsensusPolicy, keywords: RatingKeywords) -> Self {
        Self { policy, keywords }
    }

    pub fn policy(&self) -> &ConsensusPolicy {
        &self.policy
    }

    pub fn keywords(&self) -> &RatingKeywords {
        &self.keywords
    }

    /// Resolve one verdict.
    ///
    /// `votes` should be non-empty (the analyzer guarantees it); an empty
    /// slice yields fake at zero confidence rather than dividing by zero.
    pub fn resolve(
        &self,
        votes: &[ModelVote],
        evidence: Vec<FactCheckClaim>,
        temporal: Option<TemporalOverride>,
        elapsed: Duration,
    ) -> ConsensusResult {
        let p = &self.policy;
        let tally = VoteTally::count(votes);
        let average_confidence = mean(votes.iter().map(|v| v.confidence));
        let base_score = mean(votes.iter().map(|v| v.score));
        let consensus_strength = consensus_strength(&tally);
        let computed = clamp_unit(average_confidence * consensus_strength);
        let claims = EvidenceTally::count(&evidence, &self.keywords);

        let (prediction, confidence, rationale, score) = if let Some(ov) = &temporal {
            (
                ov.prediction,
                clamp_unit(computed.max(ov.confidence_floor)),
                Rationale::TemporalInconsistency,
                clamp_unit(base_score - p.temporal_score_penalty),
            )
        } else if claims.refutes() {
            (
                Verdict::Fake,
                clamp_unit(computed.max(p.fact_check_floor)),
                Rationale::FactCheckFalse,
                clamp_unit(base_score - p.false_claim_score_penalty),
            )
        } else {
            let score = if claims.confirms() {
                clamp_unit(base_score + p.true_claim_boost)
            } else {
                clamp_unit(base_score)
            };
            let majority = majority(&tally, score, p.tie_break_threshold);

            if tally.uncertain > tally.real && tally.uncertain > tally.fake {
                (
                    Verdict::Fake,
                    clamp_unit(p.precaution_confidence),
                    Rationale::PrecautionUncertain,
                    score,
                )
            } else {
                (majority, computed, Rationale::ModelMajority, score)
            }
        };

        info!(
            prediction = %prediction,
            confidence,
            rationale = %rationale,
            real = tally.real,
            fake = tally.fake,
            uncertain = tally.uncertain,
            claims = evidence.len(),
            "consensus reached"
        );

        ConsensusResult {
            prediction,
            confidence,
            rationale,
            votes: tally,
            consensus_strength,
            score,
            average_confidence,
            evidence,
            individual: votes.to_vec(),
            temporal,
            elapsed_seconds: elapsed.as_secs_f64(),
        }
    }
}

// ── Helpers ──

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 { 0.0 } else { sum / n as f64 }
}

/// Share of all votes held by the larger of the real and fake camps.
fn consensus_strength(tally: &VoteTally) -> f64 {
    let total = tally.total();
    if total == 0 {
        return 0.0;
    }
    tally.real.max(tally.fake) as f64 / total as f64
}

fn majority(tally: &VoteTally, score: f64, threshold: f64) -> Verdict {
    use std::cmp::Ordering;
    match tally.fake.cmp(&tally.real) {
        Ordering::Greater => Verdict::Fake,
        Ordering::Less => Verdict::Real,
        Ordering::Equal if score > threshold => Verdict::Real,
        Ordering::Equal => Verdict::Fake,
    }
}
