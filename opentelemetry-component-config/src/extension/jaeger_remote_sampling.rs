//! # Jaeger remote sampling extension module.
//!
//! `otelcol.extension.jaeger_remote_sampling` serves a Jaeger sampling
//! strategy document over gRPC and/or HTTP. The document comes from exactly
//! one source: inline content, a local file, or a remote sampling endpoint.

use std::path::PathBuf;
use std::time::Duration;

use opentelemetry::{otel_debug, otel_warn};
use serde::{Deserialize, Deserializer};

use crate::component::{ComponentArguments, ComponentBuilder};
use crate::error::ConfigError;
use crate::otelcol::{
    deserialize_duration, GrpcClientArguments, GrpcClientSettings, GrpcServerArguments,
    GrpcServerSettings, HttpServerArguments, HttpServerSettings,
};
use crate::source::{self, SourceSelection};

/// Registered component name.
pub const NAME: &str = "otelcol.extension.jaeger_remote_sampling";

/// Default listen address of the gRPC server.
pub const DEFAULT_GRPC_ENDPOINT: &str = "0.0.0.0:14250";
/// Default transport of the gRPC server.
pub const DEFAULT_GRPC_TRANSPORT: &str = "tcp";
/// Default listen address of the HTTP server.
pub const DEFAULT_HTTP_ENDPOINT: &str = "0.0.0.0:5778";

/// Factory for the Jaeger remote sampling extension
pub struct JaegerRemoteSamplingFactory {}

impl JaegerRemoteSamplingFactory {
    pub fn new() -> Self {
        JaegerRemoteSamplingFactory {}
    }
}

impl Default for JaegerRemoteSamplingFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentBuilder for JaegerRemoteSamplingFactory {
    type Arguments = Arguments;
}

/// Arguments of the Jaeger remote sampling extension.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Arguments {
    #[serde(default, deserialize_with = "deserialize_grpc_server")]
    pub grpc: Option<GrpcServerArguments>,

    #[serde(default, deserialize_with = "deserialize_http_server")]
    pub http: Option<HttpServerArguments>,

    #[serde(default)]
    pub source: ArgumentsSource,
}

/// Where the sampling document is read from. Exactly one of `content`,
/// `file` and `remote` must be set.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArgumentsSource {
    pub content: String,
    pub remote: Option<GrpcClientArguments>,
    pub file: String,
    #[serde(deserialize_with = "deserialize_duration")]
    pub reload_interval: Duration,
}

impl ArgumentsSource {
    /// Resolves the configured source.
    pub fn selection(&self) -> Result<SourceSelection, ConfigError> {
        source::select(&self.content, &self.file, self.remote.as_ref())
    }
}

/// gRPC server block with the extension defaults applied.
pub fn default_grpc_server() -> GrpcServerArguments {
    GrpcServerArguments {
        endpoint: DEFAULT_GRPC_ENDPOINT.to_string(),
        transport: DEFAULT_GRPC_TRANSPORT.to_string(),
        ..Default::default()
    }
}

/// HTTP server block with the extension defaults applied.
pub fn default_http_server() -> HttpServerArguments {
    HttpServerArguments {
        endpoint: DEFAULT_HTTP_ENDPOINT.to_string(),
        ..Default::default()
    }
}

fn deserialize_grpc_server<'de, D>(deserializer: D) -> Result<Option<GrpcServerArguments>, D::Error>
where
    D: Deserializer<'de>,
{
    let grpc = Option::<GrpcServerArguments>::deserialize(deserializer)?;
    Ok(grpc.map(|mut grpc| {
        let defaults = default_grpc_server();
        if grpc.endpoint.is_empty() {
            grpc.endpoint = defaults.endpoint;
        }
        if grpc.transport.is_empty() {
            grpc.transport = defaults.transport;
        }
        grpc
    }))
}

fn deserialize_http_server<'de, D>(deserializer: D) -> Result<Option<HttpServerArguments>, D::Error>
where
    D: Deserializer<'de>,
{
    let http = Option::<HttpServerArguments>::deserialize(deserializer)?;
    Ok(http.map(|mut http| {
        if http.endpoint.is_empty() {
            http.endpoint = default_http_server().endpoint;
        }
        http
    }))
}

/// Configuration of the sampling extension, as consumed by the collector.
#[derive(Clone, Debug, PartialEq)]
pub struct SamplingExtensionConfig {
    pub http_server_settings: Option<HttpServerSettings>,
    pub grpc_server_settings: Option<GrpcServerSettings>,
    pub source: Source,
}

/// Source of the sampling document. Exactly one of `remote`, `file` and
/// `contents` is set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Source {
    pub remote: Option<GrpcClientSettings>,
    pub file: Option<PathBuf>,
    pub reload_interval: Duration,
    pub contents: Option<String>,
}

impl ComponentArguments for Arguments {
    type Config = SamplingExtensionConfig;

    fn validate(&self) -> Result<(), ConfigError> {
        if self.grpc.is_none() && self.http.is_none() {
            return Err(ConfigError::invalid_config(
                NAME,
                "http or grpc must be configured to serve the sampling document",
            ));
        }
        self.source.selection().map(|_| ())
    }

    fn convert(&self) -> Result<SamplingExtensionConfig, ConfigError> {
        let selection = self.source.selection()?;
        otel_debug!(
            name: "JaegerRemoteSampling.SourceSelected",
            source = selection.kind()
        );

        let mut source = Source {
            reload_interval: self.source.reload_interval,
            ..Default::default()
        };
        match selection {
            SourceSelection::Inline(contents) => {
                if !self.source.reload_interval.is_zero() {
                    otel_warn!(
                        name: "JaegerRemoteSampling.ReloadIntervalIgnored",
                        reason = "inline content is never reloaded"
                    );
                }
                source.contents = Some(contents);
            }
            SourceSelection::File(path) => source.file = Some(path),
            SourceSelection::Remote(remote) => source.remote = Some(remote.convert()?),
        }

        Ok(SamplingExtensionConfig {
            http_server_settings: self.http.as_ref().map(|http| http.convert()).transpose()?,
            grpc_server_settings: self.grpc.as_ref().map(|grpc| grpc.convert()).transpose()?,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::otelcol::{Compression, Transport, DEFAULT_BALANCER_NAME};

    #[test]
    fn test_deserialize_server_defaults() {
        let yaml = r#"
            grpc: {}
            http: {}
            source:
              file: /etc/sampling.json
        "#;
        let args: Arguments = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(args.grpc, Some(default_grpc_server()));
        assert_eq!(args.http, Some(default_http_server()));
    }

    #[test]
    fn test_deserialize_overrides_defaults() {
        let yaml = r#"
            grpc:
              endpoint: 127.0.0.1:4444
            source:
              file: /etc/sampling.json
        "#;
        let args: Arguments = serde_yaml::from_str(yaml).unwrap();
        let grpc = args.grpc.unwrap();
        assert_eq!(grpc.endpoint, "127.0.0.1:4444");
        assert_eq!(grpc.transport, DEFAULT_GRPC_TRANSPORT);
        assert!(args.http.is_none());
    }

    #[test]
    fn test_deserialize_remote_defaults() {
        let yaml = r#"
            http: {}
            source:
              remote:
                endpoint: jaeger-collector:14250
              reload_interval: 30s
        "#;
        let args: Arguments = serde_yaml::from_str(yaml).unwrap();
        let remote = args.source.remote.as_ref().unwrap();
        assert_eq!(remote.compression, Compression::Gzip);
        assert_eq!(remote.write_buffer_size, 512 * 1024);
        assert_eq!(remote.balancer_name, DEFAULT_BALANCER_NAME);
        assert_eq!(args.source.reload_interval, Duration::from_secs(30));
    }

    #[test]
    fn test_deserialize_extra_fields_in() {
        let yaml = r#"
            http: {}
            source:
              file: /etc/sampling.json
              unknown: field
        "#;
        let result = serde_yaml::from_str::<Arguments>(yaml);
        if let Err(e) = result {
            assert!(e.to_string().contains("unknown field"));
        } else {
            panic!("Expected error for unknown field");
        }
    }

    #[test]
    fn test_validate_requires_a_server() {
        let args = Arguments {
            source: ArgumentsSource {
                file: "/etc/sampling.json".into(),
                ..Default::default()
            },
            ..Default::default()
        };
        let err = args.validate().unwrap_err();
        assert!(err.to_string().contains("http or grpc must be configured"));
    }

    #[test]
    fn test_validate_requires_a_source() {
        let args = Arguments {
            http: Some(default_http_server()),
            ..Default::default()
        };
        assert!(matches!(
            args.validate(),
            Err(ConfigError::NoSourceConfigured)
        ));
    }

    #[test]
    fn test_validate_rejects_ambiguous_source() {
        let args = Arguments {
            grpc: Some(default_grpc_server()),
            source: ArgumentsSource {
                content: "{}".into(),
                file: "/etc/sampling.json".into(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            args.validate(),
            Err(ConfigError::AmbiguousSourceConfigured)
        ));
    }

    #[test]
    fn test_convert_inline_content() {
        let args = Arguments {
            grpc: Some(default_grpc_server()),
            http: Some(default_http_server()),
            source: ArgumentsSource {
                content: "{\"default_strategy\": {\"type\": \"probabilistic\", \"param\": 0.5}}"
                    .into(),
                ..Default::default()
            },
        };
        args.validate().unwrap();
        let config = args.convert().unwrap();

        let grpc = config.grpc_server_settings.unwrap();
        assert_eq!(grpc.endpoint, DEFAULT_GRPC_ENDPOINT);
        assert_eq!(grpc.transport, Transport::Tcp);
        assert_eq!(
            config.http_server_settings.unwrap().endpoint,
            DEFAULT_HTTP_ENDPOINT
        );
        assert!(config.source.contents.unwrap().contains("probabilistic"));
        assert!(config.source.file.is_none());
        assert!(config.source.remote.is_none());
    }

    #[test]
    fn test_convert_remote() {
        let args = Arguments {
            http: Some(default_http_server()),
            source: ArgumentsSource {
                remote: Some(GrpcClientArguments {
                    endpoint: "jaeger-collector:14250".into(),
                    ..Default::default()
                }),
                reload_interval: Duration::from_secs(10),
                ..Default::default()
            },
            ..Default::default()
        };
        let config = args.convert().unwrap();
        assert!(config.grpc_server_settings.is_none());
        let remote = config.source.remote.unwrap();
        assert_eq!(remote.endpoint, "jaeger-collector:14250");
        assert_eq!(remote.write_buffer_size, 512 * 1024);
        assert_eq!(config.source.reload_interval, Duration::from_secs(10));
        assert!(config.source.contents.is_none());
    }

    #[test]
    fn test_convert_remote_without_endpoint_fails() {
        let args = Arguments {
            http: Some(default_http_server()),
            source: ArgumentsSource {
                remote: Some(GrpcClientArguments::default()),
                ..Default::default()
            },
            ..Default::default()
        };
        args.validate().unwrap();
        assert!(matches!(
            args.convert(),
            Err(ConfigError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_factory_builds_from_yaml() {
        let arguments = serde_yaml::from_str(
            r#"
            http: {}
            source:
              file: /etc/sampling.json
              reload_interval: 1m
            "#,
        )
        .unwrap();
        let config = JaegerRemoteSamplingFactory::default()
            .build(&arguments)
            .unwrap();
        assert_eq!(
            config.source.file,
            Some(PathBuf::from("/etc/sampling.json"))
        );
        assert_eq!(config.source.reload_interval, Duration::from_secs(60));
    }
}
