//! # Agent Configuration module
//!
//! This module defines the document listing the components an agent runs,
//! together with their raw arguments.

use std::path::Path;

use serde::Deserialize;
use serde_yaml::Value;

use crate::error::ConfigError;

/// Configuration for the agent components
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    #[serde(default)]
    pub components: Vec<ComponentEntry>,
}

/// A single component instance
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentEntry {
    /// Registered component name, such as `prometheus.exporter.postgres`
    pub component: String,

    /// Distinguishes several instances of the same component
    #[serde(default)]
    pub label: Option<String>,

    /// Component arguments, interpreted by the component factory
    #[serde(default)]
    pub arguments: Value,
}

impl ComponentEntry {
    /// Unique key of the instance: `component.label`, or just the component
    /// name when unlabelled.
    pub fn key(&self) -> String {
        match &self.label {
            Some(label) => format!("{}.{}", self.component, label),
            None => self.component.clone(),
        }
    }
}

impl AgentConfig {
    pub fn new() -> Self {
        AgentConfig {
            components: Vec::new(),
        }
    }

    /// Creates an AgentConfig from a YAML string
    pub fn from_yaml(yaml_str: &str) -> Result<Self, ConfigError> {
        let config: AgentConfig = serde_yaml::from_str(yaml_str)?;
        Ok(config)
    }

    /// Creates an AgentConfig from a YAML file
    pub fn from_yaml_file(file_path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml_str = std::fs::read_to_string(file_path)?;
        Self::from_yaml(&yaml_str)
    }
}
