//! # Component registry module
//!
//! Every component exposes an arguments type which is deserialized from the
//! agent configuration, validated, and converted into the configuration type
//! of the library that actually runs the component.

use serde::de::DeserializeOwned;
use serde_yaml::Value;

use crate::error::ConfigError;
use crate::exporter::postgres::{self, PostgresExporterConfig, PostgresExporterFactory};
use crate::extension::jaeger_remote_sampling::{
    self, JaegerRemoteSamplingFactory, SamplingExtensionConfig,
};

/// Trait implemented by the arguments of every component.
pub trait ComponentArguments: DeserializeOwned + Default {
    /// Configuration handed to the library running the component.
    type Config;

    /// Checks constraints serde cannot express, such as mutually exclusive fields.
    fn validate(&self) -> Result<(), ConfigError>;

    /// Converts the arguments into the library configuration.
    fn convert(&self) -> Result<Self::Config, ConfigError>;

    /// Deserializes the arguments from a YAML value. A missing (null) value
    /// yields the default arguments.
    fn from_value(value: &Value) -> Result<Self, ConfigError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_value(value.clone())?)
    }
}

/// Factory trait implemented by the different components
pub trait ComponentBuilder {
    type Arguments: ComponentArguments;

    /// Deserializes, validates and converts the component arguments.
    fn build(
        &self,
        arguments: &Value,
    ) -> Result<<Self::Arguments as ComponentArguments>::Config, ConfigError> {
        let arguments = Self::Arguments::from_value(arguments)?;
        arguments.validate()?;
        arguments.convert()
    }
}

/// Factory enum to create the different components
pub enum ComponentFactory {
    JaegerRemoteSampling(JaegerRemoteSamplingFactory),
    PostgresExporter(PostgresExporterFactory),
}

impl ComponentFactory {
    /// Creates a factory for `otelcol.extension.jaeger_remote_sampling`
    pub fn jaeger_remote_sampling() -> Self {
        ComponentFactory::JaegerRemoteSampling(JaegerRemoteSamplingFactory::new())
    }

    /// Creates a factory for `prometheus.exporter.postgres`
    pub fn postgres_exporter() -> Self {
        ComponentFactory::PostgresExporter(PostgresExporterFactory::new())
    }

    // Get factory by registered component name
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        match name {
            jaeger_remote_sampling::NAME => Ok(Self::jaeger_remote_sampling()),
            postgres::NAME => Ok(Self::postgres_exporter()),
            _ => Err(ConfigError::UnknownComponent(name.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ComponentFactory::JaegerRemoteSampling(_) => jaeger_remote_sampling::NAME,
            ComponentFactory::PostgresExporter(_) => postgres::NAME,
        }
    }

    pub fn build(&self, arguments: &Value) -> Result<ComponentConfig, ConfigError> {
        match self {
            ComponentFactory::JaegerRemoteSampling(factory) => factory
                .build(arguments)
                .map(ComponentConfig::JaegerRemoteSampling),
            ComponentFactory::PostgresExporter(factory) => factory
                .build(arguments)
                .map(ComponentConfig::PostgresExporter),
        }
    }
}

/// Converted configuration of a single component.
#[derive(Clone, Debug, PartialEq)]
pub enum ComponentConfig {
    JaegerRemoteSampling(SamplingExtensionConfig),
    PostgresExporter(PostgresExporterConfig),
}

impl ComponentConfig {
    pub fn as_jaeger_remote_sampling(&self) -> Option<&SamplingExtensionConfig> {
        match self {
            ComponentConfig::JaegerRemoteSampling(config) => Some(config),
            _ => None,
        }
    }

    pub fn as_postgres_exporter(&self) -> Option<&PostgresExporterConfig> {
        match self {
            ComponentConfig::PostgresExporter(config) => Some(config),
            _ => None,
        }
    }
}
