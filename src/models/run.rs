//! Run models for the MLflow runs API.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Lifecycle status of a run, as reported by the tracking server.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    /// Run has been initiated and is in progress
    #[default]
    Running,

    /// Run is scheduled but has not started
    Scheduled,

    /// Run completed successfully
    Finished,

    /// Run failed
    Failed,

    /// Run was terminated by the user
    Killed,
}

impl RunStatus {
    /// Whether this status marks the end of a run's lifecycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Finished | RunStatus::Failed | RunStatus::Killed)
    }
}

/// A key/value tag attached to a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RunTag {
    pub key: String,
    pub value: String,
}

/// Metadata about a single run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct RunInfo {
    /// Unique identifier for the run
    pub run_id: String,

    /// Human-readable run name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_name: Option<String>,

    /// Experiment this run belongs to
    pub experiment_id: String,

    /// Current run status
    pub status: RunStatus,

    /// Run start time in milliseconds since the Unix epoch
    pub start_time: i64,

    /// Run end time in milliseconds since the Unix epoch, once ended
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,

    /// Root URI for the run's artifacts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_uri: Option<String>,

    /// Lifecycle stage ("active" or "deleted")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifecycle_stage: Option<String>,
}

/// Data logged against a run. Only tags are populated by this client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct RunData {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<RunTag>,
}

/// A run as returned by the tracking server: metadata plus logged data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Run {
    pub info: RunInfo,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<RunData>,
}

/// Request payload for creating a new run.
#[derive(Debug, Clone, Serialize)]
pub struct CreateRunRequest {
    /// Experiment to create the run under
    pub experiment_id: String,

    /// Optional human-readable run name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_name: Option<String>,

    /// Run start time in milliseconds since the Unix epoch
    pub start_time: i64,

    /// Tags to attach at creation time
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<RunTag>,
}

impl CreateRunRequest {
    /// Build a creation request stamped with the current time.
    pub fn new(
        experiment_id: &str,
        run_name: Option<&str>,
        tags: &HashMap<String, String>,
    ) -> Self {
        let mut tags: Vec<RunTag> = tags
            .iter()
            .map(|(key, value)| RunTag {
                key: key.clone(),
                value: value.clone(),
            })
            .collect();
        // Stable payload order regardless of map iteration
        tags.sort_by(|a, b| a.key.cmp(&b.key));

        Self {
            experiment_id: experiment_id.to_string(),
            run_name: run_name.map(str::to_string),
            start_time: Utc::now().timestamp_millis(),
            tags,
        }
    }
}

/// Request payload for updating an existing run.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateRunRequest {
    /// Run to update
    pub run_id: String,

    /// New run status
    pub status: RunStatus,

    /// End time in milliseconds since the Unix epoch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
}
