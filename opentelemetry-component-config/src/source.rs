//! # Source selection module
//!
//! Resolves a block of mutually exclusive document sources (inline content,
//! a local file or a remote endpoint) into the single source in use.

use std::path::PathBuf;

use crate::error::ConfigError;
use crate::otelcol::GrpcClientArguments;

/// The one configured origin of a document.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceSelection {
    /// Document provided inline in the configuration.
    Inline(String),
    /// Document read from a local file.
    File(PathBuf),
    /// Document fetched from a remote gRPC endpoint.
    Remote(GrpcClientArguments),
}

impl SourceSelection {
    /// Name of the configuration field the selection came from.
    pub fn kind(&self) -> &'static str {
        match self {
            SourceSelection::Inline(_) => "content",
            SourceSelection::File(_) => "file",
            SourceSelection::Remote(_) => "remote",
        }
    }
}

/// Picks the single source which is set.
///
/// Content and file count as set when non-empty, the remote block when
/// present. Fails with [`ConfigError::NoSourceConfigured`] if none is set and
/// with [`ConfigError::AmbiguousSourceConfigured`] if more than one is.
pub fn select(
    content: &str,
    file: &str,
    remote: Option<&GrpcClientArguments>,
) -> Result<SourceSelection, ConfigError> {
    let mut selected = None;
    let mut sources_set = 0;

    if !content.is_empty() {
        sources_set += 1;
        selected = Some(SourceSelection::Inline(content.to_string()));
    }
    if !file.is_empty() {
        sources_set += 1;
        selected = Some(SourceSelection::File(PathBuf::from(file)));
    }
    if let Some(remote) = remote {
        sources_set += 1;
        selected = Some(SourceSelection::Remote(remote.clone()));
    }

    match (sources_set, selected) {
        (1, Some(selection)) => Ok(selection),
        (0, _) => Err(ConfigError::NoSourceConfigured),
        _ => Err(ConfigError::AmbiguousSourceConfigured),
    }
}
