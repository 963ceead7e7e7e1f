//! Structured error types shared across CAP crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`CapError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (periods, sizes, locations).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

/// Canonical error type for the planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum CapError {
    /// The input resource could not be fetched or parsed.
    #[error("resource fetch error: {0}")]
    ResourceFetch(ErrorInfo),
    /// The series is too short (or degenerate) for the requested fit.
    #[error("insufficient data: {0}")]
    InsufficientData(ErrorInfo),
    /// The threshold solver exhausted its budget.
    #[error("no convergence: {0}")]
    NoConvergence(ErrorInfo),
    /// Invalid or unreadable configuration.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Figure output failures.
    #[error("render error: {0}")]
    Render(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl CapError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            CapError::ResourceFetch(info)
            | CapError::InsufficientData(info)
            | CapError::NoConvergence(info)
            | CapError::Config(info)
            | CapError::Render(info)
            | CapError::Serde(info) => info,
        }
    }

    /// Shorthand for a [`CapError::ResourceFetch`] with the given code.
    pub fn fetch(code: &str, message: impl Into<String>) -> Self {
        CapError::ResourceFetch(ErrorInfo::new(code, message))
    }

    /// Shorthand for a [`CapError::Config`] with the given code.
    pub fn config(code: &str, message: impl Into<String>) -> Self {
        CapError::Config(ErrorInfo::new(code, message))
    }
}
