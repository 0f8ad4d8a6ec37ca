//! Structured error types shared across mhmc crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`SamplerError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (indices, sizes, etc.).
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
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
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

/// Canonical error type for the sampler workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum SamplerError {
    /// Invalid sampler construction parameters.
    #[error("configuration error: {0}")]
    Configuration(ErrorInfo),
    /// A transition rule was asked for a proposal it does not implement.
    #[error("rule not implemented: {0}")]
    RuleNotImplemented(ErrorInfo),
    /// The scoring function failed or returned malformed output.
    #[error("scoring function error: {0}")]
    ScoringFunction(ErrorInfo),
    /// A concrete rule rejected its own preconditions during initialisation.
    #[error("rule construction error: {0}")]
    RuleConstruction(ErrorInfo),
    /// Site graph structural errors.
    #[error("graph error: {0}")]
    Graph(ErrorInfo),
    /// Sparse operator errors.
    #[error("operator error: {0}")]
    Operator(ErrorInfo),
    /// Serialization and config loading errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl SamplerError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            SamplerError::Configuration(info)
            | SamplerError::RuleNotImplemented(info)
            | SamplerError::ScoringFunction(info)
            | SamplerError::RuleConstruction(info)
            | SamplerError::Graph(info)
            | SamplerError::Operator(info)
            | SamplerError::Serde(info) => info,
        }
    }

    /// Whether a session that observed this error may keep sampling.
    ///
    /// Only scoring failures leave the session usable; every other family
    /// indicates a programming or configuration mistake.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SamplerError::ScoringFunction(_))
    }
}
