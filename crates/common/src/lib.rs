//! Shared configuration, error types, and observability primitives for grist
//! crates.
//!
//! Architecture role:
//! - defines the runtime configuration property bag passed across layers
//! - provides common [`GristError`] / [`Result`] contracts
//! - hosts record-pipeline metrics counters
//!
//! Key modules:
//! - [`config`]
//! - [`error`]
//! - [`metrics`]

pub mod config;
pub mod error;
pub mod metrics;

pub use config::RuntimeConfig;
pub use error::{GristError, Result};
pub use metrics::MetricsRegistry;
