//! Experiment model representing a named grouping of runs.

use serde::{Deserialize, Serialize};

/// An experiment registered with the MLflow tracking server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Experiment {
    /// Unique identifier for the experiment
    pub experiment_id: String,

    /// Human-readable experiment name
    pub name: String,

    /// Base location where run artifacts are stored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_location: Option<String>,

    /// Lifecycle stage ("active" or "deleted")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifecycle_stage: Option<String>,
}

impl Experiment {
    /// Whether the experiment is still in the active lifecycle stage.
    ///
    /// Experiments with no stage reported are treated as active.
    pub fn is_active(&self) -> bool {
        self.lifecycle_stage
            .as_deref()
            .map(|stage| stage == "active")
            .unwrap_or(true)
    }
}

/// Request payload for creating a new experiment.
#[derive(Debug, Clone, Serialize)]
pub struct CreateExperimentRequest {
    /// Experiment name, unique on the tracking server
    pub name: String,
}
