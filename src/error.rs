//! Error types for orm-bootstrap.
//!
//! This module defines all error types using `thiserror`. Every variant is
//! terminal: resolution and factory construction happen once at startup and
//! the host is expected to fail fast rather than run with a partially
//! configured database layer.

use thiserror::Error;

/// Opaque error surfaced by an external collaborator (artifact fetcher or
/// session-factory builder).
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unsupported database backend: '{name}'")]
    UnsupportedBackend { name: String },

    #[error("Required setting '{field}' is missing or empty")]
    MissingRequiredSetting { field: &'static str },

    #[error("Failed to provision runtime dependencies: {source}")]
    DependencyLoad { source: BoxedError },

    #[error("Session factory construction failed: {source}")]
    FactoryBuild { source: BoxedError },
}

impl ConfigError {
    /// Create an unsupported-backend error.
    pub fn unsupported_backend(name: impl Into<String>) -> Self {
        Self::UnsupportedBackend { name: name.into() }
    }

    /// Create a missing-required-setting error for the given settings key.
    pub fn missing_setting(field: &'static str) -> Self {
        Self::MissingRequiredSetting { field }
    }

    /// Wrap an artifact-provisioning failure.
    pub fn dependency_load(source: impl Into<BoxedError>) -> Self {
        Self::DependencyLoad {
            source: source.into(),
        }
    }

    /// Wrap an opaque session-factory construction failure.
    pub fn factory_build(source: impl Into<BoxedError>) -> Self {
        Self::FactoryBuild {
            source: source.into(),
        }
    }

    /// The settings key a `MissingRequiredSetting` names, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        match self {
            Self::MissingRequiredSetting { field } => Some(field),
            _ => None,
        }
    }
}

/// Result type alias for configuration resolution.
pub type ConfigResult<T> = Result<T, ConfigError>;
