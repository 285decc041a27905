//! MLflow Tracking Client - a gated Rust client for MLflow experiment tracking.
//!
//! This library is a thin convenience layer over the MLflow tracking REST
//! API. A shared [`TrackingSwitch`] gates every call: while tracking is
//! active, operations are forwarded to the server; while inactive, they are
//! suppressed entirely and surface only an info-level log line.
//!
//! # Architecture
//!
//! - **models**: Data structures for experiments and runs
//! - **error**: Custom error types for precise error handling
//! - **config**: Configuration management from environment variables
//! - **client**: HTTP client for the MLflow REST API
//! - **gate**: The tracking switch and its guard combinator
//! - **tracker**: Gated session operations (start run, end run, log artifacts)
//! - **metrics**: Counters for HTTP traffic and tracking activity

pub mod client;
pub mod config;
pub mod error;
pub mod gate;
pub mod metrics;
pub mod models;
pub mod tracker;

pub use client::{AsyncMlflowClient, AsyncMlflowClientImpl, MlflowClient};
pub use config::Config;
pub use error::{ConfigError, MlflowApiError};
pub use gate::TrackingSwitch;
pub use metrics::{HttpTimer, Metrics, MetricsSummary};
pub use models::{Experiment, Run, RunInfo, RunStatus, RunTag};
pub use tracker::{ActiveRun, Tracker};
