//! Error types for the document regeneration pipeline.
//!
//! Provider failures are classified into [`FailureKind`] so the retry layer can
//! decide what to do with them. Everything that can go wrong while generating a
//! single section ends up as a value inside a `GenerationResult`; only
//! request-level problems (unknown template, unreadable document, bad config)
//! surface as [`PipelineError`].

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Retry classification of a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Timeouts, connection drops, rate limiting, 5xx, malformed or empty bodies.
    Transient,
    /// Authentication and request rejections. Never retried.
    Fatal,
}

impl FailureKind {
    pub fn is_retryable(self) -> bool {
        matches!(self, FailureKind::Transient)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Transient => write!(f, "transient"),
            FailureKind::Fatal => write!(f, "fatal"),
        }
    }
}

/// Errors reported by a text-generation provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Server error (status {status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Request rejected (status {status}): {message}")]
    InvalidRequest { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

impl ProviderError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ProviderError::Timeout(_)
            | ProviderError::Connection(_)
            | ProviderError::ServerError { .. }
            | ProviderError::RateLimited(_)
            | ProviderError::MalformedResponse(_) => FailureKind::Transient,
            ProviderError::AuthFailed(_)
            | ProviderError::InvalidRequest { .. }
            | ProviderError::NotConfigured(_) => FailureKind::Fatal,
        }
    }

    /// Map a non-success HTTP status to the matching error variant.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let message = body.into();
        match status {
            401 | 403 => ProviderError::AuthFailed(message),
            429 => ProviderError::RateLimited(message),
            500..=599 => ProviderError::ServerError { status, message },
            _ => ProviderError::InvalidRequest { status, message },
        }
    }
}

/// Errors reading an embedded asset out of a source document.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssetError {
    #[error("No asset at unit {0}")]
    Missing(usize),

    #[error("Asset payload at unit {index} could not be read: {reason}")]
    Unreadable { index: usize, reason: String },
}

/// Request-level errors. Per-section generation failures never appear here.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Invalid template '{template_id}': {}", .errors.join("; "))]
    InvalidTemplate {
        template_id: String,
        errors: Vec<String>,
    },

    #[error("Source document unreadable: {0}")]
    DocumentUnreadable(String),

    #[error("Unknown tone: {0}")]
    UnknownTone(String),

    #[error("Unknown segmentation mode: {0}")]
    UnknownSegmentMode(String),

    #[error("Unknown extraction preset: {0}")]
    UnknownExtractionPreset(String),

    #[error("Unknown output format: {0}")]
    UnknownOutputFormat(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for PipelineError {
    fn from(err: config::ConfigError) -> Self {
        PipelineError::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Serialization(err.to_string())
    }
}
