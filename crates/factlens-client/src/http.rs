//! HTTP client for the fake-news detection API.

use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use factlens_core::{
    AnalysisError, AnalysisRequest, ClientConfig, FactCheckClaim, FactCheckProvider,
    ModelDescriptor, ModelService, RawAnalysis,
};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, info};

use crate::wire::{
    CurrentModel, HealthReport, LoginToken, ModelList, VerificationLayers, claims_from_body,
    error_message,
};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ClientError> for AnalysisError {
    fn from(e: ClientError) -> Self {
        AnalysisError::RemoteUnavailable(e.to_string())
    }
}

/// One probe of the connectivity self-test.
#[derive(Debug, Clone, Serialize)]
pub struct Probe {
    pub name: &'static str,
    pub ok: bool,
    pub latency_ms: u64,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectivityReport {
    pub checked_at: DateTime<Utc>,
    pub probes: Vec<Probe>,
}

impl ConnectivityReport {
    pub fn all_ok(&self) -> bool {
        self.probes.iter().all(|p| p.ok)
    }
}

/// Client for the detection API's REST endpoints.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a client from connection settings.
    ///
    /// A trailing slash on `base_url` is dropped.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone().filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder.header(reqwest::header::ACCEPT, "application/json");
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let resp = self.authed(builder).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(server_error(status, &body));
        }
        debug!(status = status.as_u16(), bytes = body.len(), "response received");
        Ok(serde_json::from_str(&body)?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.url(path);
        debug!(url = %url, "GET");
        self.send(self.client.get(&url)).await
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ClientError> {
        let url = self.url(path);
        debug!(url = %url, "POST");
        self.send(self.client.post(&url).json(body)).await
    }

    // ── Health ──

    pub async fn health(&self) -> Result<HealthReport, ClientError> {
        self.get("/health/").await
    }

    pub async fn database_health(&self) -> Result<HealthReport, ClientError> {
        self.get("/health/database").await
    }

    pub async fn ai_model_health(&self) -> Result<HealthReport, ClientError> {
        self.get("/health/ai-model").await
    }

    pub async fn web_extractor_health(&self) -> Result<HealthReport, ClientError> {
        self.get("/health/web-extractor").await
    }

    pub async fn verification_layers(&self) -> Result<VerificationLayers, ClientError> {
        self.get("/health/verification-layers").await
    }

    pub async fn api_info(&self) -> Result<Value, ClientError> {
        self.get("/").await
    }

    // ── Models ──

    pub async fn available_models(&self) -> Result<Vec<ModelDescriptor>, ClientError> {
        let list: ModelList = self.get("/models/").await?;
        info!(count = list.available_models.len(), "fetched model catalog");
        Ok(list.available_models)
    }

    pub async fn current_model(&self) -> Result<CurrentModel, ClientError> {
        self.get("/models/current").await
    }

    /// Switch the service's active model. Affects every client of the
    /// service, not just this one.
    pub async fn change_model(&self, model_id: &str) -> Result<Value, ClientError> {
        info!(model = %model_id, "changing active model");
        self.post_json("/models/change", &json!({ "model_name": model_id }))
            .await
    }

    // ── Analysis ──

    /// Classify one request with the active model.
    pub async fn analyze_request(&self, request: &AnalysisRequest) -> Result<Value, ClientError> {
        let form = match request {
            AnalysisRequest::Text(text) => Form::new().text("text", text.trim().to_string()),
            AnalysisRequest::Url(url) => Form::new().text("url", url.trim().to_string()),
            AnalysisRequest::File(file) => {
                let part = Part::bytes(file.content.clone())
                    .file_name(file.name.clone())
                    .mime_str(file.mime_type())?;
                Form::new().part("file", part)
            }
        };
        let url = self.url("/analyze/");
        debug!(url = %url, kind = %request.kind(), "POST multipart");
        self.send(self.client.post(&url).multipart(form)).await
    }

    // ── Fact-checking ──

    pub async fn fact_check_google(&self, text: &str) -> Result<Value, ClientError> {
        self.post_json("/fact-check/google", &json!({ "text": text }))
            .await
    }

    pub async fn fact_check_multi(&self, text: &str, url: Option<&str>) -> Result<Value, ClientError> {
        let mut payload = json!({ "text": text });
        if let Some(url) = url {
            payload["url"] = Value::String(url.to_string());
        }
        self.post_json("/fact-check/multi-check", &payload).await
    }

    pub async fn fact_check_status(&self) -> Result<Value, ClientError> {
        self.get("/fact-check/status").await
    }

    // ── Metrics ──

    pub async fn metrics_summary(&self) -> Result<Value, ClientError> {
        self.get("/metrics/summary").await
    }

    pub async fn metrics_timeseries(&self, days: Option<u32>) -> Result<Value, ClientError> {
        match days {
            Some(days) => self.get(&format!("/metrics/timeseries?days={days}")).await,
            None => self.get("/metrics/timeseries").await,
        }
    }

    // ── Auth ──

    pub async fn register(&self, email: &str, password: &str) -> Result<Value, ClientError> {
        info!(email = %email, "registering user");
        self.post_json(
            "/auth/register",
            &json!({ "email": email, "password": password }),
        )
        .await
    }

    /// Exchange credentials for an access token. The token is returned,
    /// not stored.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginToken, ClientError> {
        info!(email = %email, "logging in");
        let url = self.url("/auth/login");
        let form = [("username", email), ("password", password)];
        self.send(self.client.post(&url).form(&form)).await
    }

    // ── Diagnostics ──

    /// Probe info, health and metrics in turn, timing each.
    pub async fn test_connectivity(&self) -> ConnectivityReport {
        let mut probes = Vec::with_capacity(3);
        probes.push(probe("info", self.api_info()).await);
        probes.push(probe("health", self.health()).await);
        probes.push(probe("metrics", self.metrics_summary()).await);
        ConnectivityReport {
            checked_at: Utc::now(),
            probes,
        }
    }
}

async fn probe<T>(
    name: &'static str,
    call: impl std::future::Future<Output = Result<T, ClientError>>,
) -> Probe {
    let started = Instant::now();
    let outcome = call.await;
    let latency_ms = started.elapsed().as_millis() as u64;
    match outcome {
        Ok(_) => Probe {
            name,
            ok: true,
            latency_ms,
            error: None,
        },
        Err(e) => Probe {
            name,
            ok: false,
            latency_ms,
            error: Some(e.to_string()),
        },
    }
}

fn server_error(status: StatusCode, body: &str) -> ClientError {
    ClientError::Server {
        status: status.as_u16(),
        message: error_message(status.as_u16(), body),
    }
}

#[async_trait]
impl ModelService for ApiClient {
    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, AnalysisError> {
        Ok(self.available_models().await?)
    }

    async fn set_active_model(&self, model_id: &str) -> Result<(), AnalysisError> {
        self.change_model(model_id).await?;
        Ok(())
    }

    async fn analyze(&self, request: &AnalysisRequest) -> Result<RawAnalysis, AnalysisError> {
        let body = self.analyze_request(request).await?;
        Ok(RawAnalysis::from_value(body))
    }
}

// ── Fact-check providers ──

/// `POST /fact-check/google`: Google Fact Check Tools, proxied.
#[derive(Clone)]
pub struct GoogleFactCheck {
    client: ApiClient,
}

impl GoogleFactCheck {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FactCheckProvider for GoogleFactCheck {
    fn name(&self) -> &str {
        "google"
    }

    async fn check(
        &self,
        text: &str,
        _url: Option<&str>,
    ) -> Result<Vec<FactCheckClaim>, AnalysisError> {
        let body = self
            .client
            .fact_check_google(text)
            .await
            .map_err(|e| unavailable(self.name(), e))?;
        claims_from_body(&body, self.name()).map_err(|e| unavailable(self.name(), e.into()))
    }
}

/// `POST /fact-check/multi-check`: every fact-checker the service knows.
#[derive(Clone)]
pub struct MultiFactCheck {
    client: ApiClient,
}

impl MultiFactCheck {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FactCheckProvider for MultiFactCheck {
    fn name(&self) -> &str {
        "multi"
    }

    async fn check(
        &self,
        text: &str,
        url: Option<&str>,
    ) -> Result<Vec<FactCheckClaim>, AnalysisError> {
        let body = self
            .client
            .fact_check_multi(text, url)
            .await
            .map_err(|e| unavailable(self.name(), e))?;
        claims_from_body(&body, self.name()).map_err(|e| unavailable(self.name(), e.into()))
    }
}

fn unavailable(provider: &str, e: ClientError) -> AnalysisError {
    AnalysisError::ProviderUnavailable {
        provider: provider.to_string(),
        reason: e.to_string(),
    }
}
