//! Temporal inconsistency heuristics.
//!
//! Flags text that places a well-known, dated event in the recent past:
//! "Piñera murió ayer" when Piñera died on 2024-02-06. Rules are plain data
//! ([`TemporalRule`]) so new facts can be loaded from JSON; each rule
//! compiles to three word-boundary, case-insensitive matchers.

use chrono::NaiveDate;
use factlens_core::{Rationale, TemporalOverride, Verdict};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Spanish and English markers of "this just happened".
pub const RECENCY_TERMS: &[&str] = &[
    "ayer",
    "hoy",
    "esta mañana",
    "esta tarde",
    "esta semana",
    "hace poco",
    "hace unas horas",
    "recién",
    "ahora mismo",
    "yesterday",
    "today",
    "this morning",
    "this week",
    "just now",
];

fn default_window() -> i64 {
    7
}

fn default_floor() -> f64 {
    0.85
}

/// A dated real-world fact and the wording that contradicts it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalRule {
    pub id: String,
    /// Who or what the fact is about (any term matches).
    pub subject_terms: Vec<String>,
    /// What happened (any term matches).
    pub event_terms: Vec<String>,
    /// Recency markers (any term matches).
    pub recency_terms: Vec<String>,
    /// Human-readable statement of the fact.
    pub fact: String,
    pub fact_date: NaiveDate,
    /// Days after `fact_date` during which recency wording is still plausible.
    #[serde(default = "default_window")]
    pub recency_window_days: i64,
    #[serde(default = "default_floor")]
    pub confidence_floor: f64,
}

/// Rule table shipped with the binary.
pub fn builtin_rules() -> Vec<TemporalRule> {
    vec![TemporalRule {
        id: "pinera-death".into(),
        subject_terms: vec!["piñera".into(), "pinera".into()],
        event_terms: ["murió", "murio", "falleció", "fallecio", "muerte", "muere", "died", "dies", "death"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        recency_terms: RECENCY_TERMS.iter().map(|s| s.to_string()).collect(),
        fact: "Sebastián Piñera died on 6 February 2024".into(),
        fact_date: NaiveDate::from_ymd_opt(2024, 2, 6).expect("valid calendar date"),
        recency_window_days: default_window(),
        confidence_floor: default_floor(),
    }]
}

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("rule {id}: {field} must list at least one term")]
    EmptyTerms { id: String, field: &'static str },

    #[error("rule {id}: {source}")]
    Pattern { id: String, source: regex::Error },
}

struct CompiledRule {
    rule: TemporalRule,
    subject: Regex,
    event: Regex,
    recency: Regex,
}

impl CompiledRule {
    fn compile(rule: TemporalRule) -> Result<Self, RuleError> {
        let subject = term_matcher(&rule.id, "subject_terms", &rule.subject_terms)?;
        let event = term_matcher(&rule.id, "event_terms", &rule.event_terms)?;
        let recency = term_matcher(&rule.id, "recency_terms", &rule.recency_terms)?;
        Ok(Self {
            rule,
            subject,
            event,
            recency,
        })
    }

    fn fires(&self, text: &str, today: NaiveDate) -> bool {
        let stale = (today - self.rule.fact_date).num_days() > self.rule.recency_window_days;
        stale
            && self.subject.is_match(text)
            && self.event.is_match(text)
            && self.recency.is_match(text)
    }
}

/// `(?i)\b(?:t1|t2|...)\b` over escaped terms.
fn term_matcher(id: &str, field: &'static str, terms: &[String]) -> Result<Regex, RuleError> {
    let alternatives: Vec<String> = terms
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(regex::escape)
        .collect();
    if alternatives.is_empty() {
        return Err(RuleError::EmptyTerms {
            id: id.to_string(),
            field,
        });
    }
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives.join("|"))).map_err(|source| {
        RuleError::Pattern {
            id: id.to_string(),
            source,
        }
    })
}

/// Evaluates a rule table against text. Pure: the reference date is an
/// argument, not the clock.
pub struct TemporalDetector {
    rules: Vec<CompiledRule>,
}

impl TemporalDetector {
    pub fn new(rules: Vec<TemporalRule>) -> Result<Self, RuleError> {
        let rules = rules
            .into_iter()
            .map(CompiledRule::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// A detector with no rules never fires.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// First rule (in table order) that the text violates on `today`.
    pub fn detect(&self, text: &str, today: NaiveDate) -> Option<TemporalOverride> {
        let hit = self.rules.iter().find(|r| r.fires(text, today))?;
        info!(rule = %hit.rule.id, fact = %hit.rule.fact, "temporal inconsistency detected");
        Some(TemporalOverride {
            prediction: Verdict::Fake,
            confidence_floor: hit.rule.confidence_floor,
            rationale: Rationale::TemporalInconsistency,
            rule_id: hit.rule.id.clone(),
            fact: hit.rule.fact.clone(),
        })
    }
}

impl Default for TemporalDetector {
    fn default() -> Self {
        Self::new(builtin_rules()).expect("built-in temporal rules compile")
    }
}
