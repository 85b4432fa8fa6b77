//! Analysis requests: input-kind detection and pre-flight validation.
//!
//! A request carries exactly one payload (text, URL or file). The kind is the
//! enum variant itself, so it is fixed for the lifetime of the request.
//!
//! # Detection
//!
//! 1. A file, when supplied, always wins.
//! 2. Single-line input shaped like a URL (scheme optional) is a URL.
//! 3. Any other non-empty input is text.

use std::borrow::Cow;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::InputError;
use crate::model::InputKind;

/// Longest text accepted by the remote analyzer, in characters.
pub const MAX_TEXT_CHARS: usize = 10_000;

/// Largest file accepted by the remote analyzer.
pub const MAX_FILE_BYTES: u64 = 5 * 1024 * 1024;

/// Characters kept for dashboard previews.
pub const PREVIEW_CHARS: usize = 120;

static URL_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)^(https?://)?([\w.-]+)\.[a-z]{2,}(/[\w\-._~:?#@!$&'()*+,;=/]*)?$").ok()
});

/// Extensions whose content is read locally as text for evidence gathering.
const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "csv", "html", "htm"];

/// A file submitted for analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInput {
    pub name: String,
    pub size: u64,
    pub content: Vec<u8>,
}

impl FileInput {
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size: content.len() as u64,
            content,
        }
    }

    /// Read a file from disk, keeping only its file name.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, content))
    }

    fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
    }

    /// MIME type guessed from the extension, for multipart uploads.
    pub fn mime_type(&self) -> &'static str {
        match self.extension().as_deref() {
            Some("txt") => "text/plain",
            Some("md") => "text/markdown",
            Some("csv") => "text/csv",
            Some("html" | "htm") => "text/html",
            Some("pdf") => "application/pdf",
            _ => "application/octet-stream",
        }
    }

    /// Content as UTF-8 text, when the file is a text-like document.
    pub fn as_text(&self) -> Option<&str> {
        let ext = self.extension()?;
        if !TEXT_EXTENSIONS.contains(&ext.as_str()) {
            return None;
        }
        std::str::from_utf8(&self.content).ok()
    }
}

/// The unit of work submitted for classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisRequest {
    Text(String),
    Url(String),
    File(FileInput),
}

impl AnalysisRequest {
    /// Detect the request kind from raw user input and an optional file.
    ///
    /// A URL without a scheme is given `https://`.
    pub fn detect(raw: &str, file: Option<FileInput>) -> Result<Self, InputError> {
        if let Some(file) = file {
            return Ok(Self::File(file));
        }

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InputError::Empty);
        }

        if looks_like_url(trimmed) {
            let url = if has_scheme(trimmed) {
                trimmed.to_string()
            } else {
                format!("https://{trimmed}")
            };
            return Ok(Self::Url(url));
        }

        Ok(Self::Text(trimmed.to_string()))
    }

    pub fn kind(&self) -> InputKind {
        match self {
            Self::Text(_) => InputKind::Text,
            Self::Url(_) => InputKind::Url,
            Self::File(_) => InputKind::File,
        }
    }

    /// Check the payload against the remote service's limits.
    pub fn validate(&self) -> Result<(), InputError> {
        match self {
            Self::Text(text) => {
                if text.trim().is_empty() {
                    return Err(InputError::Empty);
                }
                let len = text.chars().count();
                if len > MAX_TEXT_CHARS {
                    return Err(InputError::TextTooLong {
                        len,
                        max: MAX_TEXT_CHARS,
                    });
                }
            }
            Self::Url(url) => {
                if !has_scheme(url) || !looks_like_url(url) {
                    return Err(InputError::InvalidUrl(url.clone()));
                }
            }
            Self::File(file) => {
                if file.content.is_empty() {
                    return Err(InputError::EmptyFile(file.name.clone()));
                }
                if file.size > MAX_FILE_BYTES {
                    return Err(InputError::FileTooLarge {
                        size: file.size,
                        max: MAX_FILE_BYTES,
                    });
                }
            }
        }
        Ok(())
    }

    /// Text that heuristics and fact-checkers can read locally, if any.
    pub fn subject_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Text(text) => Some(Cow::Borrowed(text.as_str())),
            Self::Url(_) => None,
            Self::File(file) => file.as_text().map(Cow::Borrowed),
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Url(url) => Some(url),
            _ => None,
        }
    }

    /// Dashboard label: file name, URL, or `"Text"`.
    pub fn source_label(&self) -> String {
        match self {
            Self::Text(_) => "Text".to_string(),
            Self::Url(url) => url.clone(),
            Self::File(file) => file.name.clone(),
        }
    }

    /// First [`PREVIEW_CHARS`] characters of the submitted value.
    pub fn preview(&self) -> String {
        let full = match self {
            Self::Text(text) => text.as_str(),
            Self::Url(url) => url.as_str(),
            Self::File(file) => file.name.as_str(),
        };
        full.chars().take(PREVIEW_CHARS).collect()
    }
}

fn has_scheme(s: &str) -> bool {
    let lower = s.get(..8).unwrap_or(s).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn looks_like_url(s: &str) -> bool {
    if s.contains(['\r', '\n']) {
        return false;
    }
    URL_PATTERN.as_ref().is_some_and(|re| re.is_match(s))
}
