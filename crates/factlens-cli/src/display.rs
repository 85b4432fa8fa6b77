//! Terminal rendering for verdicts, catalogs and dashboards.
//!
//! Each renderer is a borrowed view implementing `Display`; callers decide
//! where it goes. Nothing here makes a decision about the content it renders.

use std::fmt;

use factlens_ai::RatingKeywords;
use factlens_client::{ConnectivityReport, HealthReport, VerificationLayers};
use factlens_core::{
    AnalysisRequest, ConsensusResult, FactCheckClaim, ModelDescriptor, Verdict,
};
use factlens_store::{SessionMetricsEntry, SessionStats};

const MAX_CLAIMS: usize = 10;
const BAR_WIDTH: usize = 20;

/// Qualitative band for a confidence in `[0, 1]`.
pub fn confidence_level(confidence: f64) -> &'static str {
    match confidence {
        c if c >= 0.9 => "very high",
        c if c >= 0.7 => "high",
        c if c >= 0.5 => "medium",
        c if c >= 0.3 => "low",
        _ => "very low",
    }
}

fn verdict_label(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Real => "REAL",
        Verdict::Fake => "FAKE",
    }
}

fn pct(x: f64) -> String {
    format!("{:.0}%", x * 100.0)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{head}...")
    }
}

// ── Verdict ──

/// One analysis as a vertical card.
pub struct VerdictCard<'a> {
    request: &'a AnalysisRequest,
    result: &'a ConsensusResult,
}

pub fn verdict_card<'a>(request: &'a AnalysisRequest, result: &'a ConsensusResult) -> VerdictCard<'a> {
    VerdictCard { request, result }
}

impl fmt::Display for VerdictCard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.result;
        writeln!(
            f,
            "=== {} === {} confidence ({})",
            verdict_label(result.prediction),
            pct(result.confidence),
            confidence_level(result.confidence)
        )?;
        writeln!(f, "{}", truncate(&self.request.preview(), 80))?;
        writeln!(f)?;

        writeln!(f, "Reason")?;
        writeln!(
            f,
            "  {:<22} {}",
            result.rationale.as_str(),
            result.rationale.describe()
        )?;
        if let Some(t) = &result.temporal {
            writeln!(f, "  {:<22} {}", "known fact", t.fact)?;
        }
        writeln!(f)?;

        let v = &result.votes;
        writeln!(f, "Models")?;
        writeln!(
            f,
            "  {:<22} {} real / {} fake / {} uncertain",
            "votes", v.real, v.fake, v.uncertain
        )?;
        writeln!(f, "  {:<22} {}", "consensus strength", pct(result.consensus_strength))?;
        writeln!(f, "  {:<22} {}", "average confidence", pct(result.average_confidence))?;
        writeln!(f, "  {:<22} {:.2}", "adjusted score", result.score)?;
        for vote in &result.individual {
            writeln!(
                f,
                "    {:<40} {:<9} {:>4}  {:.2}s",
                truncate(&vote.model_id, 40),
                vote.prediction.as_str(),
                pct(vote.confidence),
                vote.analysis_seconds
            )?;
        }
        writeln!(f)?;

        if !result.evidence.is_empty() {
            writeln!(f, "Fact-checks ({})", result.evidence.len())?;
            write!(f, "{}", claim_lines(&result.evidence, None))?;
            writeln!(f)?;
        }

        writeln!(f, "Analyzed in {:.1}s", result.elapsed_seconds)
    }
}

/// One line per claim, with the stance when keywords are given.
pub struct ClaimLines<'a> {
    claims: &'a [FactCheckClaim],
    keywords: Option<&'a RatingKeywords>,
}

pub fn claim_lines<'a>(
    claims: &'a [FactCheckClaim],
    keywords: Option<&'a RatingKeywords>,
) -> ClaimLines<'a> {
    ClaimLines { claims, keywords }
}

impl fmt::Display for ClaimLines<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for claim in self.claims.iter().take(MAX_CLAIMS) {
            let publisher = claim.publisher_name.as_deref().unwrap_or(&claim.source_provider);
            let rating = if claim.textual_rating.is_empty() {
                "(no rating)"
            } else {
                claim.textual_rating.as_str()
            };
            write!(f, "  {:<16} {:<24}", truncate(rating, 16), truncate(publisher, 24))?;
            if let Some(kw) = self.keywords {
                write!(f, " [{}]", kw.classify(claim).as_str())?;
            }
            writeln!(f)?;
            if !claim.claim_text.is_empty() {
                writeln!(f, "    {}", truncate(&claim.claim_text, 72))?;
            }
        }
        if self.claims.len() > MAX_CLAIMS {
            writeln!(f, "  ... and {} more", self.claims.len() - MAX_CLAIMS)?;
        }
        Ok(())
    }
}

// ── Catalog ──

pub struct ModelsTable<'a> {
    models: &'a [ModelDescriptor],
    current: Option<&'a str>,
}

pub fn models_table<'a>(models: &'a [ModelDescriptor], current: Option<&'a str>) -> ModelsTable<'a> {
    ModelsTable { models, current }
}

impl fmt::Display for ModelsTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  {:<44} {:<6} {:<10} SPEED", "MODEL", "LANG", "ACCURACY")?;
        for m in self.models {
            let marker = if self.current == Some(m.model_id.as_str()) { "*" } else { " " };
            writeln!(
                f,
                "{marker} {:<44} {:<6} {:<10} {}",
                truncate(&m.model_id, 44),
                m.language,
                m.accuracy_label,
                m.speed_label
            )?;
            if m.display_name != m.model_id {
                writeln!(f, "    {}", m.display_name)?;
            }
        }
        writeln!(f, "{} models", self.models.len())
    }
}

// ── Dashboard ──

fn bar(count: usize, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    "#".repeat((count * BAR_WIDTH).div_ceil(max))
}

pub struct Dashboard<'a> {
    stats: &'a SessionStats,
    recent: &'a [&'a SessionMetricsEntry],
}

pub fn dashboard<'a>(stats: &'a SessionStats, recent: &'a [&'a SessionMetricsEntry]) -> Dashboard<'a> {
    Dashboard { stats, recent }
}

impl fmt::Display for Dashboard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.stats;
        writeln!(f, "=== Session ===")?;
        writeln!(
            f,
            "  {} analyses: {} fake, {} real ({:.1}% fake)",
            stats.total, stats.fake, stats.real, stats.fake_pct
        )?;
        let kinds: Vec<String> = stats
            .by_kind
            .iter()
            .map(|k| format!("{} {}", k.kind, k.count))
            .collect();
        writeln!(f, "  by input: {}", kinds.join(", "))?;
        writeln!(f)?;

        writeln!(f, "Last 7 days")?;
        let max = stats.days.iter().map(|d| d.total).max().unwrap_or(0);
        for d in &stats.days {
            writeln!(
                f,
                "  {}  {:>3}  {:<width$}  {} fake / {} real",
                d.day.format("%a %d %b"),
                d.total,
                bar(d.total, max),
                d.fake,
                d.real,
                width = BAR_WIDTH
            )?;
        }

        if !self.recent.is_empty() {
            writeln!(f)?;
            writeln!(f, "Recent")?;
            for e in self.recent {
                writeln!(
                    f,
                    "  #{:<4} {}  {:<4} {:>3}  {:<5} {}",
                    e.id,
                    e.created_at.format("%H:%M"),
                    verdict_label(e.result),
                    e.score,
                    e.input_kind.as_str(),
                    truncate(&e.source_label, 48)
                )?;
            }
        }
        Ok(())
    }
}

// ── Health ──

pub fn health_row(name: &str, report: Result<&HealthReport, String>) -> String {
    match report {
        Ok(r) if r.is_healthy() => format!("  {:<16} OK    {}\n", name, r.status),
        Ok(r) => format!("  {:<16} DOWN  {}\n", name, r.status),
        Err(e) => format!("  {:<16} FAIL  {}\n", name, e),
    }
}

pub struct Layers<'a>(&'a VerificationLayers);

pub fn verification_layers(layers: &VerificationLayers) -> Layers<'_> {
    Layers(layers)
}

impl fmt::Display for Layers<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layers = self.0;
        writeln!(
            f,
            "  {:<16} {}/{} components ({:.0}%) {}",
            "verification",
            layers.active_components,
            layers.total_components,
            layers.availability_percentage,
            layers.status
        )?;
        for (name, up) in &layers.components {
            writeln!(f, "    {:<24} {}", name, if *up { "up" } else { "down" })?;
        }
        Ok(())
    }
}

pub struct Connectivity<'a>(&'a ConnectivityReport);

pub fn connectivity(report: &ConnectivityReport) -> Connectivity<'_> {
    Connectivity(report)
}

impl fmt::Display for Connectivity<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        writeln!(f, "Connectivity at {}", report.checked_at.to_rfc3339())?;
        for p in &report.probes {
            match &p.error {
                None => writeln!(f, "  {:<10} OK    {} ms", p.name, p.latency_ms)?,
                Some(e) => writeln!(f, "  {:<10} FAIL  {} ms  {}", p.name, p.latency_ms, e)?,
            }
        }
        Ok(())
    }
}
