//! Async wrapper around the synchronous MlflowClient.
//!
//! This module provides an async interface to the synchronous MlflowClient by
//! using `tokio::task::spawn_blocking` to run HTTP operations on a dedicated
//! thread pool, preventing blocking of the async runtime.

use crate::client::MlflowClient;
use crate::error::{MlflowApiError, MlflowApiResult};
use crate::models::{Experiment, Run, RunInfo, RunStatus};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Async wrapper trait for tracking client operations.
///
/// This trait provides async versions of the MlflowClient methods,
/// internally using `tokio::task::spawn_blocking` to avoid
/// blocking the async runtime with synchronous HTTP calls.
#[async_trait]
pub trait AsyncMlflowClient: Send + Sync {
    async fn get_experiment_by_name(&self, name: &str) -> MlflowApiResult<Experiment>;
    async fn get_or_create_experiment(&self, name: &str) -> MlflowApiResult<Experiment>;

    async fn create_run(
        &self,
        experiment_id: &str,
        run_name: Option<&str>,
        tags: &HashMap<String, String>,
    ) -> MlflowApiResult<Run>;
    async fn update_run(
        &self,
        run_id: &str,
        status: RunStatus,
        end_time: Option<i64>,
    ) -> MlflowApiResult<RunInfo>;

    async fn log_artifacts(
        &self,
        experiment_id: &str,
        run_id: &str,
        local_dir: &Path,
        artifact_path: Option<&str>,
    ) -> MlflowApiResult<usize>;
}

/// Async wrapper around the synchronous MlflowClient.
///
/// Uses `tokio::task::spawn_blocking` to run synchronous HTTP
/// operations on a dedicated thread pool, preventing blocking
/// the async runtime.
#[derive(Clone)]
pub struct AsyncMlflowClientImpl {
    client: Arc<MlflowClient>,
}

impl AsyncMlflowClientImpl {
    pub fn new(client: MlflowClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

#[async_trait]
impl AsyncMlflowClient for AsyncMlflowClientImpl {
    async fn get_experiment_by_name(&self, name: &str) -> MlflowApiResult<Experiment> {
        let client = self.client.clone();
        let name = name.to_string();

        tokio::task::spawn_blocking(move || client.get_experiment_by_name(&name))
            .await
            .map_err(|e| MlflowApiError::HttpError(format!("Task join error: {}", e)))?
    }

    async fn get_or_create_experiment(&self, name: &str) -> MlflowApiResult<Experiment> {
        let client = self.client.clone();
        let name = name.to_string();

        tokio::task::spawn_blocking(move || client.get_or_create_experiment(&name))
            .await
            .map_err(|e| MlflowApiError::HttpError(format!("Task join error: {}", e)))?
    }

    async fn create_run(
        &self,
        experiment_id: &str,
        run_name: Option<&str>,
        tags: &HashMap<String, String>,
    ) -> MlflowApiResult<Run> {
        let client = self.client.clone();
        let experiment_id = experiment_id.to_string();
        let run_name = run_name.map(str::to_string);
        let tags = tags.clone();

        tokio::task::spawn_blocking(move || {
            client.create_run(&experiment_id, run_name.as_deref(), &tags)
        })
        .await
        .map_err(|e| MlflowApiError::HttpError(format!("Task join error: {}", e)))?
    }

    async fn update_run(
        &self,
        run_id: &str,
        status: RunStatus,
        end_time: Option<i64>,
    ) -> MlflowApiResult<RunInfo> {
        let client = self.client.clone();
        let run_id = run_id.to_string();

        tokio::task::spawn_blocking(move || client.update_run(&run_id, status, end_time))
            .await
            .map_err(|e| MlflowApiError::HttpError(format!("Task join error: {}", e)))?
    }

    async fn log_artifacts(
        &self,
        experiment_id: &str,
        run_id: &str,
        local_dir: &Path,
        artifact_path: Option<&str>,
    ) -> MlflowApiResult<usize> {
        let client = self.client.clone();
        let experiment_id = experiment_id.to_string();
        let run_id = run_id.to_string();
        let local_dir: PathBuf = local_dir.to_path_buf();
        let artifact_path = artifact_path.map(str::to_string);

        tokio::task::spawn_blocking(move || {
            client.log_artifacts(
                &experiment_id,
                &run_id,
                &local_dir,
                artifact_path.as_deref(),
            )
        })
        .await
        .map_err(|e| MlflowApiError::HttpError(format!("Task join error: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;

    #[tokio::test]
    async fn test_async_client_creation() {
        let config = Config {
            tracking_uri: "http://localhost:5000".to_string(),
            experiment_name: "Default".to_string(),
            tracking_token: None,
            tracking_active: true,
            request_timeout: 10,
        };
        let client = MlflowClient::new(&config);
        let async_client = AsyncMlflowClientImpl::new(client);

        // Should be able to clone
        let _cloned = async_client.clone();
    }
}
