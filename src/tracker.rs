//! Gated tracking session: start a run, end a run, upload artifacts.
//!
//! The [`Tracker`] owns an [`MlflowClient`], a [`TrackingSwitch`], and the
//! currently active run. Every operation goes through the switch's guard, so
//! flipping tracking off turns the whole session into a logged no-op without
//! any call-site checks.

use crate::client::MlflowClient;
use crate::config::Config;
use crate::error::{MlflowApiError, MlflowApiResult};
use crate::gate::TrackingSwitch;
use crate::models::RunStatus;
use chrono::Utc;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Handle to the run currently being tracked.
///
/// Returned by [`Tracker::start_tracking`]; `None` in its place means
/// tracking was inactive and no run exists.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveRun {
    /// Unique identifier of the run
    pub run_id: String,

    /// Human-readable run name, when one was assigned
    pub run_name: Option<String>,

    /// Experiment the run was created under
    pub experiment_id: String,

    /// Root URI for the run's artifacts
    pub artifact_uri: Option<String>,
}

/// Tracking session facade over the MLflow client.
pub struct Tracker {
    /// Client issuing the actual REST calls
    client: MlflowClient,

    /// Switch consulted before every tracking call
    switch: TrackingSwitch,

    /// Experiment that runs are created under
    experiment_name: String,

    /// The run currently being tracked, if any
    active_run: Mutex<Option<ActiveRun>>,
}

impl Tracker {
    /// Create a tracker from configuration.
    pub fn new(config: &Config) -> Self {
        Self::with_client(
            MlflowClient::new(config),
            TrackingSwitch::new(config.tracking_active),
            config.experiment_name.clone(),
        )
    }

    /// Assemble a tracker from parts.
    ///
    /// The switch may be a clone shared with the surrounding application, so
    /// tracking can be toggled from outside the tracker.
    pub fn with_client(
        client: MlflowClient,
        switch: TrackingSwitch,
        experiment_name: String,
    ) -> Self {
        Self {
            client,
            switch,
            experiment_name,
            active_run: Mutex::new(None),
        }
    }

    /// The switch gating this tracker's calls.
    pub fn switch(&self) -> &TrackingSwitch {
        &self.switch
    }

    /// Whether tracking calls are currently forwarded.
    pub fn is_active(&self) -> bool {
        self.switch.is_active()
    }

    /// The client used for REST calls (exposes metrics).
    pub fn client(&self) -> &MlflowClient {
        &self.client
    }

    /// Handle to the run currently being tracked, if any.
    pub fn active_run(&self) -> Option<ActiveRun> {
        self.lock_active_run().clone()
    }

    fn lock_active_run(&self) -> MutexGuard<'_, Option<ActiveRun>> {
        self.active_run
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn note_skip<T>(&self, result: &MlflowApiResult<Option<T>>) {
        if matches!(result, Ok(None)) {
            self.client.metrics().record_skipped_inactive();
        }
    }

    /// Start a tracked run under the configured experiment.
    ///
    /// Resolves the experiment by name (creating it on first use), creates a
    /// run with the optional name and tags, and remembers it as the active
    /// run. Returns `Ok(None)` without touching the server when tracking is
    /// inactive.
    pub fn start_tracking(
        &self,
        run_name: Option<&str>,
        tags: &HashMap<String, String>,
    ) -> MlflowApiResult<Option<ActiveRun>> {
        let result = self.switch.guard("run start", || {
            let experiment = self.client.get_or_create_experiment(&self.experiment_name)?;
            let run = self
                .client
                .create_run(&experiment.experiment_id, run_name, tags)?;

            let active = ActiveRun {
                run_id: run.info.run_id.clone(),
                run_name: run.info.run_name.clone(),
                experiment_id: run.info.experiment_id.clone(),
                artifact_uri: run.info.artifact_uri.clone(),
            };
            *self.lock_active_run() = Some(active.clone());
            Ok(active)
        });
        self.note_skip(&result);
        result
    }

    /// End the active run, marking it finished with the current time.
    ///
    /// A quiet no-op when no run is active. Returns `Ok(None)` without
    /// touching the server when tracking is inactive.
    pub fn end_tracking(&self) -> MlflowApiResult<Option<()>> {
        let result = self.switch.guard("run end", || {
            // Clone rather than take: the run stays active if the update fails
            let Some(run) = self.lock_active_run().clone() else {
                tracing::debug!("No active run to end");
                return Ok(());
            };

            self.client.update_run(
                &run.run_id,
                RunStatus::Finished,
                Some(Utc::now().timestamp_millis()),
            )?;
            *self.lock_active_run() = None;
            tracing::info!("Run {} finished", run.run_id);
            Ok(())
        });
        self.note_skip(&result);
        result
    }

    /// Upload every file under `local_dir` as artifacts of the active run.
    ///
    /// Files land under `artifact_path` within the run's artifact root when
    /// one is given. Requires an active run. Returns the number of files
    /// uploaded, or `Ok(None)` without touching the server or the local
    /// directory when tracking is inactive.
    pub fn log_artifacts(
        &self,
        local_dir: impl AsRef<Path>,
        artifact_path: Option<&str>,
    ) -> MlflowApiResult<Option<usize>> {
        let local_dir = local_dir.as_ref();
        let result = self.switch.guard("artifact upload", || {
            let Some(run) = self.lock_active_run().clone() else {
                return Err(MlflowApiError::InvalidRequest(
                    "no active run to log artifacts to".to_string(),
                ));
            };

            tracing::info!("Logging artifacts from {}", local_dir.display());
            self.client
                .log_artifacts(&run.experiment_id, &run.run_id, local_dir, artifact_path)
        });
        self.note_skip(&result);
        result
    }
}
