//! HTTP client for the MLflow tracking REST API.
//!
//! This module provides a synchronous HTTP client that can be used from async
//! contexts via `tokio::task::spawn_blocking`. The client handles
//! authentication, error mapping, and artifact uploads for the tracking
//! server's `api/2.0/mlflow` surface.

mod async_wrapper;
pub use async_wrapper::{AsyncMlflowClient, AsyncMlflowClientImpl};

use crate::config::Config;
use crate::error::{MlflowApiError, MlflowApiResult};
use crate::metrics::{HttpTimer, Metrics};
use crate::models::{
    CreateExperimentRequest, CreateRunRequest, Experiment, Run, RunInfo, RunStatus,
    UpdateRunRequest,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Response wrapper for the experiments/get-by-name endpoint.
#[derive(Debug, Deserialize)]
pub struct GetExperimentResponse {
    /// The resolved experiment
    pub experiment: Experiment,
}

/// Response wrapper for the experiments/create endpoint.
#[derive(Debug, Deserialize)]
pub struct CreateExperimentResponse {
    /// Identifier assigned to the new experiment
    pub experiment_id: String,
}

/// Response wrapper for the runs/create endpoint.
#[derive(Debug, Deserialize)]
pub struct CreateRunResponse {
    /// The newly created run
    pub run: Run,
}

/// Response wrapper for the runs/update endpoint.
#[derive(Debug, Deserialize)]
pub struct UpdateRunResponse {
    /// Updated metadata for the run
    #[serde(default)]
    pub run_info: RunInfo,
}

/// HTTP client for the MLflow tracking REST API.
///
/// This client uses `ureq` for synchronous HTTP requests and can be called
/// from async contexts using `tokio::task::spawn_blocking`.
#[derive(Clone)]
pub struct MlflowClient {
    /// Base URL of the tracking server
    base_url: String,

    /// Optional bearer token for authentication
    token: Option<String>,

    /// HTTP client agent
    agent: Arc<ureq::Agent>,

    /// Metrics collector
    metrics: Metrics,
}

impl MlflowClient {
    /// Create a new MlflowClient from configuration.
    pub fn new(config: &Config) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.request_timeout))
            .build();

        Self {
            base_url: config.tracking_uri.clone(),
            token: config.tracking_token.clone(),
            agent: Arc::new(agent),
            metrics: Metrics::new(),
        }
    }

    /// Create an MlflowClient with a custom base URL (useful for testing).
    #[doc(hidden)]
    pub fn with_base_url(base_url: String, token: Option<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(10))
            .build();

        Self {
            base_url,
            token,
            agent: Arc::new(agent),
            metrics: Metrics::new(),
        }
    }

    /// Get a reference to the metrics collector.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Build a full URL from a path.
    fn build_url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    /// Attach the bearer token, if one is configured.
    fn with_auth(&self, request: ureq::Request) -> ureq::Request {
        match &self.token {
            Some(token) => request.set("Authorization", &format!("Bearer {}", token)),
            None => request,
        }
    }

    /// Execute a GET request with authentication.
    fn get(&self, path: &str) -> Result<ureq::Response, MlflowApiError> {
        let timer = HttpTimer::new(self.metrics.clone());
        let url = self.build_url(path);

        let result = self
            .with_auth(self.agent.get(&url))
            .set("Content-Type", "application/json")
            .call()
            .map_err(|e| self.map_error(e));

        match &result {
            Ok(_) => timer.complete(),
            Err(e) => {
                tracing::error!("GET {} - Error: {:?}", url, e);
                timer.complete_with_error();
            }
        }

        result
    }

    /// Execute a POST request with authentication and JSON body.
    fn post(&self, path: &str, body: &serde_json::Value) -> Result<ureq::Response, MlflowApiError> {
        let timer = HttpTimer::new(self.metrics.clone());
        let url = self.build_url(path);

        tracing::debug!("POST {}", url);
        tracing::debug!(
            "Request body: {}",
            serde_json::to_string_pretty(body).unwrap_or_else(|_| "<invalid json>".to_string())
        );

        let result = self
            .with_auth(self.agent.post(&url))
            .set("Content-Type", "application/json")
            .send_json(body)
            .map_err(|e| self.map_error(e));

        match &result {
            Ok(response) => {
                tracing::debug!("POST {} - Success (status: {})", url, response.status());
                timer.complete();
            }
            Err(e) => {
                tracing::error!("POST {} - Error: {:?}", url, e);
                timer.complete_with_error();
            }
        }

        result
    }

    /// Execute a PUT request uploading raw bytes.
    fn put_bytes(&self, path: &str, data: &[u8]) -> Result<ureq::Response, MlflowApiError> {
        let timer = HttpTimer::new(self.metrics.clone());
        let url = self.build_url(path);

        let result = self
            .with_auth(self.agent.put(&url))
            .set("Content-Type", "application/octet-stream")
            .send_bytes(data)
            .map_err(|e| self.map_error(e));

        match &result {
            Ok(_) => timer.complete(),
            Err(e) => {
                tracing::error!("PUT {} - Error: {:?}", url, e);
                timer.complete_with_error();
            }
        }

        result
    }

    /// Map a ureq error to an MlflowApiError.
    fn map_error(&self, error: ureq::Error) -> MlflowApiError {
        match error {
            ureq::Error::Status(code, response) => {
                let message = response
                    .into_string()
                    .unwrap_or_else(|_| "Unknown error".to_string());

                match code {
                    401 => MlflowApiError::Unauthorized,
                    404 => MlflowApiError::NotFound(message),
                    429 => MlflowApiError::RateLimitExceeded,
                    _ => MlflowApiError::ApiError {
                        status: code,
                        message,
                    },
                }
            }
            ureq::Error::Transport(transport) => {
                if transport.kind() == ureq::ErrorKind::ConnectionFailed {
                    MlflowApiError::HttpError("Connection failed".to_string())
                } else if transport.kind() == ureq::ErrorKind::Io {
                    MlflowApiError::Timeout
                } else {
                    MlflowApiError::HttpError(transport.to_string())
                }
            }
        }
    }

    // ========================= Experiment Operations =========================

    /// Look up an experiment by name.
    pub fn get_experiment_by_name(&self, name: &str) -> MlflowApiResult<Experiment> {
        let path = format!(
            "/api/2.0/mlflow/experiments/get-by-name?experiment_name={}",
            urlencoding::encode(name)
        );
        let response = self.get(&path)?;
        let body = response
            .into_string()
            .map_err(|e| MlflowApiError::HttpError(e.to_string()))?;

        let wrapper: GetExperimentResponse =
            serde_json::from_str(&body).map_err(MlflowApiError::JsonError)?;
        Ok(wrapper.experiment)
    }

    /// Create a new experiment and return its identifier.
    pub fn create_experiment(&self, name: &str) -> MlflowApiResult<String> {
        let request = CreateExperimentRequest {
            name: name.to_string(),
        };
        let body = serde_json::to_value(&request).map_err(MlflowApiError::JsonError)?;

        let response = self.post("/api/2.0/mlflow/experiments/create", &body)?;
        let response_body = response
            .into_string()
            .map_err(|e| MlflowApiError::HttpError(e.to_string()))?;

        let wrapper: CreateExperimentResponse =
            serde_json::from_str(&response_body).map_err(MlflowApiError::JsonError)?;

        tracing::info!("Experiment '{}' created with id: {}", name, wrapper.experiment_id);
        Ok(wrapper.experiment_id)
    }

    /// Resolve an experiment by name, creating it when it does not exist yet.
    pub fn get_or_create_experiment(&self, name: &str) -> MlflowApiResult<Experiment> {
        match self.get_experiment_by_name(name) {
            Ok(experiment) => Ok(experiment),
            Err(MlflowApiError::NotFound(_)) => {
                tracing::info!("Experiment '{}' not found, creating it", name);
                let experiment_id = self.create_experiment(name)?;
                Ok(Experiment {
                    experiment_id,
                    name: name.to_string(),
                    ..Default::default()
                })
            }
            Err(e) => Err(e),
        }
    }

    // ========================= Run Operations =========================

    /// Create a new run under an experiment.
    pub fn create_run(
        &self,
        experiment_id: &str,
        run_name: Option<&str>,
        tags: &HashMap<String, String>,
    ) -> MlflowApiResult<Run> {
        let request = CreateRunRequest::new(experiment_id, run_name, tags);
        let body = serde_json::to_value(&request).map_err(MlflowApiError::JsonError)?;

        let response = self.post("/api/2.0/mlflow/runs/create", &body)?;
        let response_body = response
            .into_string()
            .map_err(|e| MlflowApiError::HttpError(e.to_string()))?;

        let wrapper: CreateRunResponse =
            serde_json::from_str(&response_body).map_err(MlflowApiError::JsonError)?;

        self.metrics.record_run_started();
        tracing::info!("Run created with id: {}", wrapper.run.info.run_id);
        Ok(wrapper.run)
    }

    /// Update a run's status, optionally stamping its end time.
    pub fn update_run(
        &self,
        run_id: &str,
        status: RunStatus,
        end_time: Option<i64>,
    ) -> MlflowApiResult<RunInfo> {
        let request = UpdateRunRequest {
            run_id: run_id.to_string(),
            status,
            end_time,
        };
        let body = serde_json::to_value(&request).map_err(MlflowApiError::JsonError)?;

        let response = self.post("/api/2.0/mlflow/runs/update", &body)?;
        let response_body = response
            .into_string()
            .map_err(|e| MlflowApiError::HttpError(e.to_string()))?;

        let wrapper: UpdateRunResponse =
            serde_json::from_str(&response_body).map_err(MlflowApiError::JsonError)?;

        if status.is_terminal() {
            self.metrics.record_run_ended();
        }
        Ok(wrapper.run_info)
    }

    // ========================= Artifact Operations =========================

    /// Upload a single artifact file to a run.
    pub fn upload_artifact(
        &self,
        experiment_id: &str,
        run_id: &str,
        artifact_rel_path: &str,
        data: &[u8],
    ) -> MlflowApiResult<()> {
        let path = format!(
            "/api/2.0/mlflow-artifacts/artifacts/{}/{}/artifacts/{}",
            experiment_id, run_id, artifact_rel_path
        );
        tracing::debug!("Uploading artifact {} ({} bytes)", artifact_rel_path, data.len());
        self.put_bytes(&path, data)?;
        Ok(())
    }

    /// Upload every file under `local_dir` to a run, preserving the directory
    /// layout. Files land under `artifact_path` within the run's artifact
    /// root when one is given. Returns the number of files uploaded.
    pub fn log_artifacts(
        &self,
        experiment_id: &str,
        run_id: &str,
        local_dir: &Path,
        artifact_path: Option<&str>,
    ) -> MlflowApiResult<usize> {
        let mut files = Vec::new();
        collect_files(local_dir, &mut files)?;
        // Stable upload order regardless of directory iteration
        files.sort();

        for file in &files {
            let rel = file.strip_prefix(local_dir).map_err(|_| {
                MlflowApiError::Other(format!(
                    "File {} is outside the artifact root",
                    file.display()
                ))
            })?;
            let remote = remote_artifact_path(artifact_path, rel);
            let data = fs::read(file)?;
            self.upload_artifact(experiment_id, run_id, &remote, &data)?;
        }

        self.metrics.record_artifacts_uploaded(files.len());
        Ok(files.len())
    }
}

/// Recursively collect every file under `dir`.
fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_files(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}

/// Build the URL-safe artifact path for a local file relative to its root.
fn remote_artifact_path(artifact_path: Option<&str>, rel: &Path) -> String {
    let mut segments: Vec<String> = Vec::new();

    if let Some(prefix) = artifact_path {
        segments.extend(
            prefix
                .split('/')
                .filter(|s| !s.is_empty())
                .map(|s| urlencoding::encode(s).into_owned()),
        );
    }

    segments.extend(
        rel.components()
            .map(|c| urlencoding::encode(&c.as_os_str().to_string_lossy()).into_owned()),
    );

    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url() {
        let client =
            MlflowClient::with_base_url("http://localhost:5000".to_string(), None);

        assert_eq!(
            client.build_url("/api/2.0/mlflow/runs/create"),
            "http://localhost:5000/api/2.0/mlflow/runs/create"
        );

        assert_eq!(
            client.build_url("api/2.0/mlflow/runs/create"),
            "http://localhost:5000/api/2.0/mlflow/runs/create"
        );

        let client_with_slash =
            MlflowClient::with_base_url("http://localhost:5000/".to_string(), None);

        assert_eq!(
            client_with_slash.build_url("/api/2.0/mlflow/runs/create"),
            "http://localhost:5000/api/2.0/mlflow/runs/create"
        );
    }

    #[test]
    fn test_client_creation() {
        let config = Config {
            tracking_uri: "http://localhost:5000".to_string(),
            experiment_name: "Default".to_string(),
            tracking_token: Some("secret-token".to_string()),
            tracking_active: true,
            request_timeout: 10,
        };

        let client = MlflowClient::new(&config);
        assert_eq!(client.base_url, "http://localhost:5000");
        assert_eq!(client.token, Some("secret-token".to_string()));
    }

    #[test]
    fn test_remote_artifact_path() {
        let rel = Path::new("plots").join("loss.png");
        assert_eq!(remote_artifact_path(None, &rel), "plots/loss.png");
        assert_eq!(
            remote_artifact_path(Some("outputs"), &rel),
            "outputs/plots/loss.png"
        );
    }

    #[test]
    fn test_remote_artifact_path_encodes_segments() {
        let rel = Path::new("confusion matrix.png");
        assert_eq!(
            remote_artifact_path(None, rel),
            "confusion%20matrix.png"
        );
    }
}
