//! # Telemetry agent component configuration
//!
//! This crate turns the arguments of telemetry agent components, written in
//! YAML, into the validated configuration of the libraries running them:
//!
//! * `otelcol.extension.jaeger_remote_sampling`, which serves sampling
//!   strategies read from exactly one of inline content, a file or a remote
//!   endpoint.
//! * `prometheus.exporter.postgres`, which scrapes PostgreSQL servers given
//!   by their connection strings.

pub mod agent_config;
pub mod component;
pub mod dsn;
pub mod error;
pub mod exporter;
pub mod extension;
pub mod otelcol;
pub mod secret;
pub mod source;

use std::collections::BTreeMap;
use std::path::Path;

use opentelemetry::{otel_debug, otel_warn};

use crate::{
    agent_config::AgentConfig,
    component::{ComponentConfig, ComponentFactory},
    error::ConfigError,
};

pub struct Configurator {}

impl Configurator {
    pub fn new() -> Self {
        Self {}
    }

    pub fn configure_components_from_yaml(
        &self,
        agent_config_str: &str,
    ) -> Result<ConfiguredComponents, ConfigError> {
        let config = AgentConfig::from_yaml(agent_config_str)?;
        self.configure_components(config)
    }

    pub fn configure_components_from_yaml_file(
        &self,
        file_path: impl AsRef<Path>,
    ) -> Result<ConfiguredComponents, ConfigError> {
        let config = AgentConfig::from_yaml_file(file_path)?;
        self.configure_components(config)
    }

    /// Builds every component of the configuration. Stops at the first
    /// component whose arguments are invalid.
    pub fn configure_components(
        &self,
        agent_config: AgentConfig,
    ) -> Result<ConfiguredComponents, ConfigError> {
        let mut configured_components = ConfiguredComponents::new();

        for entry in agent_config.components {
            let key = entry.key();
            if configured_components.contains(&key) {
                return Err(ConfigError::InvalidConfig {
                    name: key,
                    reason: "component is defined more than once".into(),
                });
            }

            let factory = ComponentFactory::from_name(&entry.component)?;
            let component = factory.build(&entry.arguments).map_err(|err| {
                otel_warn!(
                    name: "Configurator.ComponentInvalid",
                    component = key.as_str(),
                    error = err.to_string()
                );
                err
            })?;
            otel_debug!(name: "Configurator.ComponentBuilt", component = key.as_str());

            configured_components = configured_components.with_component(key, component);
        }

        Ok(configured_components)
    }
}

impl Default for Configurator {
    fn default() -> Self {
        Self::new()
    }
}

/// Holds the converted configuration of every component, keyed by
/// `component.label`
#[derive(Debug, Default)]
pub struct ConfiguredComponents {
    components: BTreeMap<String, ComponentConfig>,
}

impl ConfiguredComponents {
    pub fn new() -> Self {
        ConfiguredComponents {
            components: BTreeMap::new(),
        }
    }

    pub fn with_component(mut self, key: impl Into<String>, component: ComponentConfig) -> Self {
        self.components.insert(key.into(), component);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ComponentConfig> {
        self.components.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.components.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ComponentConfig)> {
        self.components
            .iter()
            .map(|(key, component)| (key.as_str(), component))
    }
}
