//! Fact-check evidence: provider fan-in and rating classification.
//!
//! Ratings are free text in several languages ("False", "Engañoso",
//! "Verdadero"), so each claim is classified by keyword lookup against a
//! [`RatingKeywords`] table. A false-indicator match always wins over a
//! true-indicator match ("incorrect" contains "correct", "no es cierto"
//! contains "cierto").

use std::time::Duration;

use factlens_core::{ClaimStance, FactCheckClaim, FactCheckProvider};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Keywords marking a rating as debunking the claim.
pub const FALSE_INDICATORS: &[&str] = &[
    "false",
    "fake",
    "misleading",
    "incorrect",
    "engañoso",
    "falso",
    "mentira",
    "no es cierto",
];

/// Keywords marking a rating as confirming the claim.
pub const TRUE_INDICATORS: &[&str] = &["true", "correct", "verdad", "cierto", "verificado"];

/// Two keyword lists used to classify fact-check ratings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingKeywords {
    pub false_indicators: Vec<String>,
    pub true_indicators: Vec<String>,
}

impl Default for RatingKeywords {
    fn default() -> Self {
        Self {
            false_indicators: FALSE_INDICATORS.iter().map(|s| s.to_string()).collect(),
            true_indicators: TRUE_INDICATORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl RatingKeywords {
    /// Classify one claim from its rating and claim text.
    pub fn classify(&self, claim: &FactCheckClaim) -> ClaimStance {
        self.classify_text(&claim.textual_rating, &claim.claim_text)
    }

    pub fn classify_text(&self, rating: &str, claim_text: &str) -> ClaimStance {
        let haystack = format!("{rating}\n{claim_text}").to_lowercase();
        let hit = |keywords: &[String]| {
            keywords
                .iter()
                .any(|k| !k.is_empty() && haystack.contains(&k.to_lowercase()))
        };

        if hit(&self.false_indicators) {
            ClaimStance::SupportsFalse
        } else if hit(&self.true_indicators) {
            ClaimStance::SupportsTrue
        } else {
            ClaimStance::Neutral
        }
    }
}

/// Stance counts over a set of claims.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvidenceTally {
    pub false_count: usize,
    pub true_count: usize,
    pub neutral_count: usize,
}

impl EvidenceTally {
    pub fn count(claims: &[FactCheckClaim], keywords: &RatingKeywords) -> Self {
        claims.iter().fold(Self::default(), |mut t, c| {
            match keywords.classify(c) {
                ClaimStance::SupportsFalse => t.false_count += 1,
                ClaimStance::SupportsTrue => t.true_count += 1,
                ClaimStance::Neutral => t.neutral_count += 1,
            }
            t
        })
    }

    /// Debunking evidence is at least as strong as confirming evidence.
    pub fn refutes(&self) -> bool {
        self.false_count > 0 && self.false_count >= self.true_count
    }

    /// Confirming evidence strictly outweighs debunking evidence.
    pub fn confirms(&self) -> bool {
        self.true_count > 0 && self.true_count > self.false_count
    }
}

/// Queries every configured fact-check provider for one subject.
///
/// Providers run concurrently, each under its own deadline. A provider that
/// fails or times out contributes no claims; gathering itself never fails.
pub struct EvidenceGatherer {
    providers: Vec<Box<dyn FactCheckProvider>>,
    timeout: Duration,
}

impl EvidenceGatherer {
    pub fn new(timeout: Duration) -> Self {
        Self {
            providers: Vec::new(),
            timeout,
        }
    }

    pub fn with_provider(mut self, provider: impl FactCheckProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Claims from all providers, in provider order.
    pub async fn gather(&self, text: &str, url: Option<&str>) -> Vec<FactCheckClaim> {
        if self.providers.is_empty() || text.trim().is_empty() {
            return Vec::new();
        }

        let lookups = self.providers.iter().map(|provider| async move {
            let name = provider.name();
            match tokio::time::timeout(self.timeout, provider.check(text, url)).await {
                Ok(Ok(claims)) => {
                    info!(provider = %name, claims = claims.len(), "fact-check lookup complete");
                    claims
                }
                Ok(Err(e)) => {
                    warn!(provider = %name, error = %e, "fact-check provider failed, no evidence");
                    Vec::new()
                }
                Err(_) => {
                    warn!(
                        provider = %name,
                        timeout_secs = self.timeout.as_secs_f64(),
                        "fact-check provider timed out, no evidence"
                    );
                    Vec::new()
                }
            }
        });

        join_all(lookups).await.into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockProvider, claim};

    #[test]
    fn false_keywords_in_several_languages() {
        let kw = RatingKeywords::default();
        for rating in ["False", "FAKE news", "Misleading", "Engañoso", "Falso", "Es mentira"] {
            assert_eq!(kw.classify(&claim(rating)), ClaimStance::SupportsFalse, "{rating}");
        }
    }

    #[test]
    fn true_keywords() {
        let kw = RatingKeywords::default();
        for rating in ["True", "Correct", "Verdadero", "Cierto", "Verificado"] {
            assert_eq!(kw.classify(&claim(rating)), ClaimStance::SupportsTrue, "{rating}");
        }
    }

    #[test]
    fn false_match_takes_precedence() {
        let kw = RatingKeywords::default();
        assert_eq!(kw.classify_text("Incorrect", ""), ClaimStance::SupportsFalse);
        assert_eq!(kw.classify_text("No es cierto", ""), ClaimStance::SupportsFalse);
        assert_eq!(kw.classify_text("Half true, half false", ""), ClaimStance::SupportsFalse);
    }

    #[test]
    fn claim_text_is_searched_too() {
        let kw = RatingKeywords::default();
        assert_eq!(
            kw.classify_text("Sin contexto", "Video falso de un bombardeo"),
            ClaimStance::SupportsFalse
        );
    }

    #[test]
    fn unknown_rating_is_neutral() {
        let kw = RatingKeywords::default();
        assert_eq!(kw.classify(&claim("Sin evidencia")), ClaimStance::Neutral);
        assert_eq!(kw.classify(&claim("")), ClaimStance::Neutral);
    }

    #[test]
    fn custom_table_from_json() {
        let kw: RatingKeywords = serde_json::from_str(
            r#"{ "false_indicators": ["Faux"], "true_indicators": ["vrai"] }"#,
        )
        .unwrap();
        assert_eq!(kw.classify_text("faux", ""), ClaimStance::SupportsFalse);
        assert_eq!(kw.classify_text("Vrai", ""), ClaimStance::SupportsTrue);
        assert_eq!(kw.classify_text("False", ""), ClaimStance::Neutral);
    }

    #[test]
    fn tally_and_precedence_predicates() {
        let kw = RatingKeywords::default();
        let claims = vec![claim("False"), claim("True"), claim("Sin evidencia")];
        let t = EvidenceTally::count(&claims, &kw);
        assert_eq!((t.false_count, t.true_count, t.neutral_count), (1, 1, 1));
        assert!(t.refutes(), "a tie goes to the debunk");
        assert!(!t.confirms());

        let t = EvidenceTally::count(&[claim("True"), claim("Correct")], &kw);
        assert!(t.confirms());
        assert!(!t.refutes());
    }

    #[tokio::test]
    async fn gathers_from_every_provider() {
        let gatherer = EvidenceGatherer::new(Duration::from_secs(5))
            .with_provider(MockProvider::with_claims("google", vec![claim("False")]))
            .with_provider(MockProvider::with_claims("multi", vec![claim("Engañoso"), claim("True")]));

        let claims = gatherer.gather("Piñera murió ayer", None).await;
        assert_eq!(claims.len(), 3);
        assert_eq!(claims[0].textual_rating, "False");
        assert_eq!(gatherer.provider_names(), vec!["google", "multi"]);
    }

    #[tokio::test]
    async fn provider_failure_means_no_evidence() {
        let gatherer = EvidenceGatherer::new(Duration::from_secs(5))
            .with_provider(MockProvider::failing("google"))
            .with_provider(MockProvider::with_claims("multi", vec![claim("True")]));

        let claims = gatherer.gather("texto", None).await;
        assert_eq!(claims.len(), 1);
    }

    #[tokio::test]
    async fn provider_timeout_means_no_evidence() {
        let gatherer = EvidenceGatherer::new(Duration::from_millis(20))
            .with_provider(MockProvider::hanging("google"));

        assert!(gatherer.gather("texto", None).await.is_empty());
    }

    #[tokio::test]
    async fn blank_subject_skips_lookup() {
        let gatherer = EvidenceGatherer::new(Duration::from_secs(5))
            .with_provider(MockProvider::with_claims("google", vec![claim("False")]));
        assert!(gatherer.gather("  ", None).await.is_empty());
    }
}
