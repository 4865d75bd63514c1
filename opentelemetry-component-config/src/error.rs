//! Errors raised while loading, validating or converting component arguments.
use thiserror::Error;

/// Errors that can occur while building a component configuration.
///
/// None of these are transient: they are surfaced to the user as
/// configuration validation failures and prevent the affected component from
/// starting.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    /// None of the mutually exclusive sources was configured.
    #[error("one of content, file or remote must be configured")]
    NoSourceConfigured,

    /// More than one of the mutually exclusive sources was configured.
    #[error("only one of content, file or remote can be configured")]
    AmbiguousSourceConfigured,

    /// The connection string is not a valid URL, or lacks a required segment.
    ///
    /// The offending string is deliberately not part of the message as it
    /// usually carries credentials.
    #[error("malformed connection string: {0}")]
    MalformedConnectionString(String),

    /// Invalid configuration.
    #[error("{name}: {reason}")]
    InvalidConfig {
        /// The configuration name.
        name: String,
        /// The reason the configuration is invalid.
        reason: String,
    },

    /// No component is registered under the given name.
    #[error("unknown component: {0}")]
    UnknownComponent(String),

    /// The configuration document could not be deserialized.
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// The configuration document could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub(crate) fn invalid_config(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidConfig {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
