//! # Collector argument blocks
//!
//! Server and client blocks shared by `otelcol.*` components, together with
//! the settings types they convert into.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;

/// Default gRPC client-side load balancer.
pub const DEFAULT_BALANCER_NAME: &str = "round_robin";

/// Deserializes a duration written in humantime syntax, such as `30s` or `1m 30s`.
pub fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim())
        .map_err(|err| serde::de::Error::custom(format!("Invalid duration {}: {}", s, err)))
}

/// Compression applied to outgoing client requests.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    #[default]
    Gzip,
    Zlib,
    Deflate,
    Snappy,
    Zstd,
    None,
}

impl Display for Compression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Compression::Gzip => "gzip",
            Compression::Zlib => "zlib",
            Compression::Deflate => "deflate",
            Compression::Snappy => "snappy",
            Compression::Zstd => "zstd",
            Compression::None => "none",
        };
        f.write_str(name)
    }
}

impl FromStr for Compression {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gzip" => Ok(Compression::Gzip),
            "zlib" => Ok(Compression::Zlib),
            "deflate" => Ok(Compression::Deflate),
            "snappy" => Ok(Compression::Snappy),
            "zstd" => Ok(Compression::Zstd),
            "none" | "" => Ok(Compression::None),
            _ => Err(ConfigError::invalid_config(
                "compression",
                format!("unsupported compression algorithm '{}'", s),
            )),
        }
    }
}

/// Network transport a server listens on.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Transport {
    Tcp,
    Tcp4,
    Tcp6,
    Unix,
}

impl FromStr for Transport {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tcp" | "" => Ok(Transport::Tcp),
            "tcp4" => Ok(Transport::Tcp4),
            "tcp6" => Ok(Transport::Tcp6),
            "unix" => Ok(Transport::Unix),
            _ => Err(ConfigError::invalid_config(
                "transport",
                format!("unsupported transport '{}'", s),
            )),
        }
    }
}

/// Configures a gRPC server.
///
/// Components embedding this block supply their own defaults.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GrpcServerArguments {
    pub endpoint: String,
    pub transport: String,
    pub max_recv_msg_size: Option<u64>,
    pub include_metadata: bool,
}

/// Settings of a gRPC server, as consumed by the collector.
#[derive(Clone, Debug, PartialEq)]
pub struct GrpcServerSettings {
    pub endpoint: String,
    pub transport: Transport,
    pub max_recv_msg_size: Option<u64>,
    pub include_metadata: bool,
}

impl GrpcServerArguments {
    pub fn convert(&self) -> Result<GrpcServerSettings, ConfigError> {
        if self.endpoint.is_empty() {
            return Err(ConfigError::invalid_config(
                "grpc",
                "endpoint must not be empty",
            ));
        }
        Ok(GrpcServerSettings {
            endpoint: self.endpoint.clone(),
            transport: self.transport.parse()?,
            max_recv_msg_size: self.max_recv_msg_size,
            include_metadata: self.include_metadata,
        })
    }
}

/// Configures an HTTP server.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpServerArguments {
    pub endpoint: String,
    pub max_request_body_size: Option<u64>,
    pub include_metadata: bool,
}

/// Settings of an HTTP server, as consumed by the collector.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpServerSettings {
    pub endpoint: String,
    pub max_request_body_size: Option<u64>,
    pub include_metadata: bool,
}

impl HttpServerArguments {
    pub fn convert(&self) -> Result<HttpServerSettings, ConfigError> {
        if self.endpoint.is_empty() {
            return Err(ConfigError::invalid_config(
                "http",
                "endpoint must not be empty",
            ));
        }
        Ok(HttpServerSettings {
            endpoint: self.endpoint.clone(),
            max_request_body_size: self.max_request_body_size,
            include_metadata: self.include_metadata,
        })
    }
}

/// Keepalive settings of a gRPC client.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeepaliveClientArguments {
    #[serde(deserialize_with = "deserialize_duration")]
    pub ping_wait: Duration,
    #[serde(deserialize_with = "deserialize_duration")]
    pub ping_response_timeout: Duration,
    pub ping_without_stream: bool,
}

impl Default for KeepaliveClientArguments {
    fn default() -> Self {
        KeepaliveClientArguments {
            ping_wait: Duration::from_secs(30),
            ping_response_timeout: Duration::from_secs(10),
            ping_without_stream: false,
        }
    }
}

/// Configures a gRPC client talking to a remote endpoint.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GrpcClientArguments {
    pub endpoint: String,
    pub compression: Compression,
    pub insecure: bool,
    pub headers: BTreeMap<String, String>,
    pub write_buffer_size: u64,
    pub balancer_name: String,
    pub authority: Option<String>,
    pub keepalive: Option<KeepaliveClientArguments>,
}

impl Default for GrpcClientArguments {
    fn default() -> Self {
        GrpcClientArguments {
            endpoint: String::new(),
            compression: Compression::Gzip,
            insecure: false,
            headers: BTreeMap::new(),
            write_buffer_size: 512 * 1024,
            balancer_name: DEFAULT_BALANCER_NAME.to_string(),
            authority: None,
            keepalive: None,
        }
    }
}

/// Settings of a gRPC client, as consumed by the collector.
#[derive(Clone, Debug, PartialEq)]
pub struct GrpcClientSettings {
    pub endpoint: String,
    pub compression: Compression,
    pub insecure: bool,
    pub headers: BTreeMap<String, String>,
    pub write_buffer_size: usize,
    pub balancer_name: String,
    pub authority: Option<String>,
    pub keepalive: Option<KeepaliveClientArguments>,
}

impl GrpcClientArguments {
    pub fn convert(&self) -> Result<GrpcClientSettings, ConfigError> {
        if self.endpoint.is_empty() {
            return Err(ConfigError::invalid_config(
                "remote",
                "endpoint must not be empty",
            ));
        }
        let write_buffer_size = usize::try_from(self.write_buffer_size).map_err(|_| {
            ConfigError::invalid_config("remote", "write_buffer_size does not fit in memory")
        })?;
        Ok(GrpcClientSettings {
            endpoint: self.endpoint.clone(),
            compression: self.compression,
            insecure: self.insecure,
            headers: self.headers.clone(),
            write_buffer_size,
            balancer_name: self.balancer_name.clone(),
            authority: self.authority.clone(),
            keepalive: self.keepalive.clone(),
        })
    }
}
