//! Runtime configuration shared by the client, the pipeline and the CLI.

use std::path::Path;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::ConfigError;

/// Public deployment of the detection API.
pub const DEFAULT_API_URL: &str = "https://fakenewsignacio.vercel.app";

/// Connection settings for the remote detection service.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL without trailing slash.
    pub base_url: String,
    /// Whole-request timeout applied by the HTTP client.
    pub timeout: Duration,
    /// Bearer token sent on authenticated endpoints.
    pub token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(30),
            token: None,
        }
    }
}

/// Per-call deadlines for one detection run.
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    /// Deadline for each model switch and each analyze call.
    pub model_timeout: Duration,
    /// Deadline for each fact-check provider.
    pub fact_check_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_timeout: Duration::from_secs(30),
            fact_check_timeout: Duration::from_secs(15),
        }
    }
}

/// Load a JSON document (policy, rule table, keyword table) from disk.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })
}
