//! # Extensions module.
//!
//! Extensions add capabilities to the collector which are not part of a
//! telemetry pipeline, such as serving sampling strategies to SDKs.

pub mod jaeger_remote_sampling;
