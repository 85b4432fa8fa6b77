use thiserror::Error;

/// Failures of a detection run, as surfaced to callers.
///
/// Only [`NoModelsAvailable`](Self::NoModelsAvailable),
/// [`UserCancelled`](Self::UserCancelled) and
/// [`InvalidInput`](Self::InvalidInput) end an analysis; the rest are
/// absorbed by the analyzer and the evidence gatherer.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("remote service unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("model not in the current catalog: {0}")]
    UnknownModel(String),

    #[error("no model could analyze the content ({attempted} attempted)")]
    NoModelsAvailable { attempted: usize },

    #[error("fact-check provider {provider} unavailable: {reason}")]
    ProviderUnavailable { provider: String, reason: String },

    #[error("analysis cancelled")]
    UserCancelled,

    #[error(transparent)]
    InvalidInput(#[from] InputError),
}

/// Input rejected before any remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("nothing to analyze")]
    Empty,

    #[error("text is too long ({len} characters, maximum {max})")]
    TextTooLong { len: usize, max: usize },

    #[error("file is too large ({size} bytes, maximum {max})")]
    FileTooLarge { size: u64, max: u64 },

    #[error("file is empty: {0}")]
    EmptyFile(String),

    #[error("not a valid http(s) URL: {0}")]
    InvalidUrl(String),
}

/// Failure loading a policy, rule or keyword table.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: std::path::PathBuf,
        source: serde_json::Error,
    },
}
