//! Response shapes of the detection API.
//!
//! Everything here is plain serde and compiles without the `http` feature,
//! so the parsing rules can be tested offline.

use std::collections::BTreeMap;

use factlens_core::{FactCheckClaim, ModelDescriptor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// `status` values that mean a component is up.
const HEALTHY_STATUSES: &[&str] = &["ok", "healthy", "up", "true", "connected", "loaded"];

/// Body of any `/health/*` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    #[serde(default, deserialize_with = "loose_string")]
    pub status: String,
    /// Everything else the endpoint reported.
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        let status = self.status.trim().to_ascii_lowercase();
        HEALTHY_STATUSES.contains(&status.as_str())
    }
}

/// Body of `/health/verification-layers`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationLayers {
    #[serde(default, deserialize_with = "loose_string")]
    pub status: String,
    #[serde(default)]
    pub active_components: u32,
    #[serde(default)]
    pub total_components: u32,
    #[serde(default)]
    pub availability_percentage: f64,
    #[serde(default)]
    pub components: BTreeMap<String, bool>,
}

/// Body of `GET /models/`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelList {
    #[serde(default)]
    pub available_models: Vec<ModelDescriptor>,
}

/// Body of `GET /models/current`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentModel {
    #[serde(default, deserialize_with = "loose_string")]
    pub current_model: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginToken {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Strings, numbers and booleans all read as a string; null reads as empty.
fn loose_string<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

// ── Fact-check claims ──

#[derive(Deserialize)]
struct WireClaim {
    #[serde(default)]
    text: String,
    #[serde(default)]
    claimant: Option<String>,
    #[serde(default, rename = "claimReview")]
    claim_review: Vec<WireReview>,
}

#[derive(Deserialize)]
struct WireReview {
    #[serde(default, rename = "textualRating")]
    textual_rating: String,
    #[serde(default)]
    publisher: Option<WirePublisher>,
}

#[derive(Deserialize)]
struct WirePublisher {
    #[serde(default)]
    name: Option<String>,
}

impl WireClaim {
    /// The first review supplies rating and publisher.
    fn into_claim(self, provider: &str) -> FactCheckClaim {
        let review = self.claim_review.into_iter().next();
        let (textual_rating, publisher_name) = match review {
            Some(r) => (r.textual_rating, r.publisher.and_then(|p| p.name)),
            None => (String::new(), None),
        };
        FactCheckClaim {
            claim_text: self.text,
            claimant: self.claimant.filter(|c| !c.trim().is_empty()),
            textual_rating,
            publisher_name,
            source_provider: provider.to_string(),
        }
    }
}

/// Claims from a fact-check response body.
///
/// Reads the top-level `claims` array. Aggregated responses that nest
/// per-source results under `results` (an object keyed by source, or an
/// array) contribute their `claims` too, tagged `provider/source`.
pub fn claims_from_body(body: &Value, provider: &str) -> Result<Vec<FactCheckClaim>, serde_json::Error> {
    let mut out = claims_array(body.get("claims"), provider)?;

    match body.get("results") {
        Some(Value::Object(sources)) => {
            for (source, result) in sources {
                let tag = format!("{provider}/{source}");
                out.extend(claims_array(result.get("claims"), &tag)?);
            }
        }
        Some(Value::Array(results)) => {
            for result in results {
                out.extend(claims_array(result.get("claims"), provider)?);
            }
        }
        _ => {}
    }

    Ok(out)
}

fn claims_array(value: Option<&Value>, provider: &str) -> Result<Vec<FactCheckClaim>, serde_json::Error> {
    let Some(array) = value.filter(|v| v.is_array()) else {
        return Ok(Vec::new());
    };
    let wire: Vec<WireClaim> = serde_json::from_value(array.clone())?;
    Ok(wire.into_iter().map(|c| c.into_claim(provider)).collect())
}

// ── Errors ──

/// Human-readable message for a non-2xx response.
///
/// JSON bodies yield their `detail`, `message`, `error` or `errors` field
/// (first present, non-empty); other bodies are used verbatim. An empty
/// result falls back to `HTTP <status>`.
pub fn error_message(status: u16, body: &str) -> String {
    let message = match serde_json::from_str::<Value>(body) {
        Ok(json) => ["detail", "message", "error", "errors"]
            .iter()
            .filter_map(|key| json.get(*key))
            .find_map(|v| match v {
                Value::Null => None,
                Value::String(s) if s.trim().is_empty() => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            })
            .unwrap_or_default(),
        Err(_) => body.trim().to_string(),
    };

    if message.is_empty() {
        format!("HTTP {status}")
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn health_statuses() {
        for status in ["ok", "Healthy", "UP", "connected", "loaded"] {
            let h: HealthReport = serde_json::from_value(json!({ "status": status })).unwrap();
            assert!(h.is_healthy(), "{status}");
        }
        let h: HealthReport = serde_json::from_value(json!({ "status": true })).unwrap();
        assert!(h.is_healthy());

        let h: HealthReport =
            serde_json::from_value(json!({ "status": "degraded", "database": "down" })).unwrap();
        assert!(!h.is_healthy());
        assert_eq!(h.details["database"], "down");

        let h: HealthReport = serde_json::from_value(json!({})).unwrap();
        assert!(!h.is_healthy());
    }

    #[test]
    fn verification_layers_body() {
        let v: VerificationLayers = serde_json::from_value(json!({
            "status": "degraded",
            "active_components": 4,
            "total_components": 6,
            "availability_percentage": 66.7,
            "components": { "ner_service": true, "news_api": false }
        }))
        .unwrap();
        assert_eq!(v.active_components, 4);
        assert_eq!(v.components.get("news_api"), Some(&false));
    }

    #[test]
    fn model_list_body() {
        let list: ModelList = serde_json::from_value(json!({
            "available_models": [
                { "model_id": "mrm8488/bert-tiny-finetuned-fake-news", "name": "BERT tiny", "language": "en" },
                { "model_id": "GonzaloA/fake-news-detection-spanish" }
            ],
            "current_model": "GonzaloA/fake-news-detection-spanish"
        }))
        .unwrap();
        assert_eq!(list.available_models.len(), 2);
        assert_eq!(list.available_models[1].display_name, "GonzaloA/fake-news-detection-spanish");
    }

    #[test]
    fn login_token_defaults_type() {
        let t: LoginToken = serde_json::from_value(json!({ "access_token": "abc" })).unwrap();
        assert_eq!(t.token_type, "bearer");
    }

    #[test]
    fn google_claims() {
        let body = json!({
            "claims": [
                {
                    "text": "Piñera murió ayer",
                    "claimant": "Redes sociales",
                    "claimReview": [
                        { "textualRating": "Falso", "publisher": { "name": "Fast Check CL" } },
                        { "textualRating": "Engañoso", "publisher": { "name": "Otro" } }
                    ]
                },
                { "text": "Sin revisión" }
            ]
        });
        let claims = claims_from_body(&body, "google").unwrap();
        assert_eq!(claims.len(), 2);
        assert_eq!(claims[0].textual_rating, "Falso");
        assert_eq!(claims[0].publisher_name.as_deref(), Some("Fast Check CL"));
        assert_eq!(claims[0].claimant.as_deref(), Some("Redes sociales"));
        assert_eq!(claims[1].textual_rating, "");
        assert_eq!(claims[1].source_provider, "google");
    }

    #[test]
    fn aggregated_claims_are_tagged_by_source() {
        let body = json!({
            "results": {
                "google": { "claims": [ { "text": "a", "claimReview": [ { "textualRating": "False" } ] } ] },
                "claimbuster": { "score": 0.4 }
            }
        });
        let claims = claims_from_body(&body, "multi").unwrap();
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].source_provider, "multi/google");
    }

    #[test]
    fn no_claims_is_empty() {
        assert!(claims_from_body(&json!({ "message": "nothing" }), "google").unwrap().is_empty());
        assert!(claims_from_body(&json!({ "claims": null }), "google").unwrap().is_empty());
    }

    #[test]
    fn error_message_extraction() {
        assert_eq!(error_message(422, r#"{"detail":"text too long"}"#), "text too long");
        assert_eq!(error_message(400, r#"{"detail":null,"message":"bad"}"#), "bad");
        assert_eq!(
            error_message(422, r#"{"detail":[{"loc":["body","text"]}]}"#),
            r#"[{"loc":["body","text"]}]"#
        );
        assert_eq!(error_message(502, "Bad Gateway"), "Bad Gateway");
        assert_eq!(error_message(500, ""), "HTTP 500");
        assert_eq!(error_message(500, "{}"), "HTTP 500");
    }
}
