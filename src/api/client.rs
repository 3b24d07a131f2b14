use crate::api::{
    artifact::*, error::*, experiment::*, id::*, model::*, run::*, search::*, tag::*, trace::*,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ViewType {
    #[serde(rename = "ACTIVE_ONLY")]
    Active,
    #[serde(rename = "DELETED_ONLY")]
    Deleted,
    #[serde(rename = "ALL")]
    All,
}

impl Default for ViewType {
    fn default() -> Self {
        ViewType::Active
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleStage {
    Active,
    Deleted,
}

/// Typed access to the MLflow tracking API.
///
/// Methods take `&mut self`; a client is used by one caller at a time.
#[rustfmt::skip]
pub trait Client {
    fn create_experiment(&mut self, name: &str, artifact_location: Option<&str>, tags: &[ExperimentTag]) -> Result<ExperimentId, CreateError>;
    fn search_experiments(&mut self, filter: Option<&str>, view_type: ViewType, max_results: i32, order_by: &[&str], page_token: Option<&str>) -> Result<ExperimentSearch, StorageError>;
    fn get_experiment(&mut self, id: &ExperimentId) -> Result<Experiment, GetError>;
    fn get_experiment_by_name(&mut self, name: &str) -> Result<Experiment, GetError>;
    fn delete_experiment(&mut self, id: &ExperimentId) -> Result<(), DeleteError>;
    fn restore_experiment(&mut self, id: &ExperimentId) -> Result<(), UpdateError>;
    fn update_experiment(&mut self, id: &ExperimentId, new_name: &str) -> Result<(), UpdateError>;
    fn set_experiment_tag(&mut self, id: &ExperimentId, key: &str, value: &str) -> Result<(), UpdateError>;

    fn create_run(&mut self, experiment: &ExperimentId, start_time: i64, run_name: Option<&str>, tags: &[RunTag]) -> Result<Run, StorageError>;
    fn delete_run(&mut self, id: &RunId) -> Result<(), DeleteError>;
    fn restore_run(&mut self, id: &RunId) -> Result<(), UpdateError>;
    fn get_run(&mut self, id: &RunId) -> Result<Run, GetError>;
    fn update_run(&mut self, id: &RunId, status: RunStatus, end_time: i64) -> Result<RunInfo, UpdateError>;
    fn search_runs(&mut self, experiment_ids: &[&ExperimentId], filter: &str, run_view_type: ViewType, max_results: i32, order_by: &[&str], page_token: Option<&str>) -> Result<Search, StorageError>;
    fn get_metric_history(&mut self, run: &RunId, metric: &str) -> Result<Vec<Metric>, GetError>;

    fn log_param(&mut self, run: &RunId, key: &str, value: &str) -> Result<(), StorageError>;
    fn log_metric(&mut self, run: &RunId, key: &str, value: f64, timestamp: i64, step: i64) -> Result<(), StorageError>;
    fn log_batch(&mut self, run: &RunId, metrics: &[Metric], params: &[Param], tags: &[RunTag]) -> Result<(), BatchError>;
    fn set_tag(&mut self, run: &RunId, key: &str, value: &str) -> Result<(), StorageError>;
    fn delete_tag(&mut self, run: &RunId, key: &str) -> Result<(), StorageError>;

    fn create_registered_model(&mut self, name: &str, description: Option<&str>, tags: &[RegisteredModelTag]) -> Result<RegisteredModel, CreateError>;
    fn get_registered_model(&mut self, name: &str) -> Result<RegisteredModel, GetError>;
    fn delete_registered_model(&mut self, name: &str) -> Result<(), DeleteError>;
    fn set_registered_model_tag(&mut self, name: &str, key: &str, value: &str) -> Result<(), UpdateError>;
    fn create_model_version(&mut self, name: &str, source: &str, run: Option<&RunId>, tags: &[ModelVersionTag]) -> Result<ModelVersion, StorageError>;
    fn get_model_version(&mut self, name: &str, version: &str) -> Result<ModelVersion, GetError>;
    fn transition_model_version_stage(&mut self, name: &str, version: &str, stage: ModelStage, archive_existing_versions: bool) -> Result<ModelVersion, UpdateError>;

    fn list_artifacts(&mut self, run: &RunId, path: Option<&str>) -> Result<ArtifactList, GetError>;

    fn start_trace(&mut self, experiment: &ExperimentId, timestamp_ms: i64, tags: &[TraceTag]) -> Result<TraceInfo, StorageError>;
    fn end_trace(&mut self, id: &TraceId, timestamp_ms: i64, state: TraceState) -> Result<TraceInfo, UpdateError>;
    fn get_trace_info(&mut self, id: &TraceId) -> Result<TraceInfo, GetError>;
    fn set_trace_tag(&mut self, id: &TraceId, key: &str, value: &str) -> Result<(), UpdateError>;
}
