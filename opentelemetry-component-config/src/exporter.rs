//! # Exporters module.
//!
//! Prometheus exporters expose metrics about a third-party system for the
//! agent to scrape.

pub mod postgres;
