use crate::{
    api::{
        artifact::ArtifactList,
        client::{Client, ViewType},
        error::{BatchError, CreateError, DeleteError, GetError, StorageError, UpdateError},
        experiment::Experiment,
        id::{ExperimentId, RunId, TraceId},
        limits,
        model::{ModelStage, ModelVersion, RegisteredModel},
        run::{Metric, Param, Run, RunInfo, RunStatus},
        search::{ExperimentSearch, Search},
        tag::{ExperimentTag, ModelVersionTag, RegisteredModelTag, RunTag, TraceTag},
        trace::{TraceInfo, TraceState},
    },
    backend::transport::{ErrorCode, HttpTransport, Method, Transport, TransportError},
    config::ClientConfig,
};
use anyhow::Context;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::borrow::Cow;

/// [`Client`] for a MLflow Tracking Server, speaking REST over a [`Transport`].
pub struct RestClient<T = HttpTransport> {
    transport: T,
    user_id: Option<String>,
}

impl RestClient<HttpTransport> {
    /// The `api_url` should be something like `http://127.0.0.1:5000/api`.
    pub fn new(api_url: impl Into<String>) -> Self {
        RestClient::with_transport(HttpTransport::new(api_url))
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        RestClient {
            transport: HttpTransport::from_config(config),
            user_id: config.user_id.clone(),
        }
    }
}

impl<T: Transport> RestClient<T> {
    pub fn with_transport(transport: T) -> Self {
        RestClient { transport, user_id: None }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    fn execute<Ep, Hand, Err>(&mut self, request: Ep, error_handler: Hand) -> Result<Ep::Value, Err>
    where
        Ep: Endpoint,
        Hand: FnOnce(TransportError) -> Err,
        Err: From<anyhow::Error>,
    {
        let path = request.path();
        let payload = serde_json::to_value(&request).context("serializing request failed")?;
        tracing::debug!(method = %Ep::METHOD, path = %path, "calling tracking server");
        match self.transport.execute(Ep::METHOD, &path, &payload) {
            Ok(json) => {
                let response: Ep::Response = serde_json::from_value(json.clone())
                    .with_context(|| format!("deserializing response failed:\n{}", json))?;
                Ok(Ep::extract(response))
            }
            Err(error) => {
                tracing::warn!(method = %Ep::METHOD, path = %path, %error, "tracking server request failed");
                Err(error_handler(error))
            }
        }
    }
}

fn is_code(error: &TransportError, expected: ErrorCode) -> bool {
    error.code() == Some(&expected)
}

fn get_error(resource: &str) -> impl FnOnce(TransportError) -> GetError + '_ {
    move |error| {
        if is_code(&error, ErrorCode::ResourceDoesNotExist) {
            GetError::DoesNotExist(resource.to_string())
        } else {
            GetError::Storage(error.into())
        }
    }
}

fn create_error(resource: &str) -> impl FnOnce(TransportError) -> CreateError + '_ {
    move |error| {
        if is_code(&error, ErrorCode::ResourceAlreadyExists) {
            CreateError::AlreadyExists(resource.to_string())
        } else {
            CreateError::Storage(error.into())
        }
    }
}

fn check_batch(metrics: &[Metric], params: &[Param], tags: &[RunTag]) -> Result<(), BatchError> {
    let count = |len: usize| u32::try_from(len).unwrap_or(u32::MAX);
    if metrics.len() > limits::BATCH_METRICS {
        return Err(BatchError::ToManyMetrics(count(metrics.len())));
    }
    if params.len() > limits::BATCH_PARAMS {
        return Err(BatchError::ToManyParams(count(params.len())));
    }
    if tags.len() > limits::BATCH_TAGS {
        return Err(BatchError::ToManyTags(count(tags.len())));
    }
    let total = metrics.len() + params.len() + tags.len();
    if total > limits::BATCH_ITEMS {
        return Err(BatchError::ToManyItems(count(total)));
    }
    Ok(())
}

impl<T: Transport> Client for RestClient<T> {
    fn create_experiment(&mut self, name: &str, artifact_location: Option<&str>, tags: &[ExperimentTag]) -> Result<ExperimentId, CreateError> {
        let request = CreateExperiment {
            name,
            artifact_location,
            tags,
        };
        self.execute(request, create_error(name))
    }

    fn search_experiments(&mut self, filter: Option<&str>, view_type: ViewType, max_results: i32, order_by: &[&str], page_token: Option<&str>) -> Result<ExperimentSearch, StorageError> {
        let request = SearchExperiments { filter, view_type, max_results, order_by, page_token };
        self.execute(request, StorageError::from)
    }

    fn get_experiment(&mut self, id: &ExperimentId) -> Result<Experiment, GetError> {
        let request = GetExperiment { experiment_id: id };
        self.execute(request, get_error(id.as_ref()))
    }

    fn get_experiment_by_name(&mut self, name: &str) -> Result<Experiment, GetError> {
        let request = GetExperimentByName { experiment_name: name };
        self.execute(request, get_error(name))
    }

    fn delete_experiment(&mut self, id: &ExperimentId) -> Result<(), DeleteError> {
        let request = DeleteExperiment { experiment_id: id };
        self.execute(request, get_error(id.as_ref()))
    }

    fn restore_experiment(&mut self, id: &ExperimentId) -> Result<(), UpdateError> {
        let request = RestoreExperiment { experiment_id: id };
        self.execute(request, get_error(id.as_ref()))
    }

    fn update_experiment(&mut self, id: &ExperimentId, new_name: &str) -> Result<(), UpdateError> {
        let request = UpdateExperiment { experiment_id: id, new_name };
        self.execute(request, get_error(id.as_ref()))
    }

    fn set_experiment_tag(&mut self, id: &ExperimentId, key: &str, value: &str) -> Result<(), UpdateError> {
        let request = SetExperimentTag { experiment_id: id, key, value };
        self.execute(request, get_error(id.as_ref()))
    }

    fn create_run(&mut self, experiment_id: &ExperimentId, start_time: i64, run_name: Option<&str>, tags: &[RunTag]) -> Result<Run, StorageError> {
        let user_id = self.user_id.clone();
        let request = CreateRun { experiment_id, user_id: user_id.as_deref(), run_name, start_time, tags };
        self.execute(request, StorageError::from)
    }

    fn delete_run(&mut self, id: &RunId) -> Result<(), DeleteError> {
        let request = DeleteRun { run_id: id };
        self.execute(request, get_error(id.as_ref()))
    }

    fn restore_run(&mut self, id: &RunId) -> Result<(), UpdateError> {
        let request = RestoreRun { run_id: id };
        self.execute(request, get_error(id.as_ref()))
    }

    fn get_run(&mut self, id: &RunId) -> Result<Run, GetError> {
        let request = GetRun { run_id: id };
        self.execute(request, get_error(id.as_ref()))
    }

    fn update_run(&mut self, id: &RunId, status: RunStatus, end_time: i64) -> Result<RunInfo, UpdateError> {
        let request = UpdateRun { run_id: id, status, end_time };
        self.execute(request, get_error(id.as_ref()))
    }

    fn search_runs(&mut self, experiment_ids: &[&ExperimentId], filter: &str, run_view_type: ViewType, max_results: i32, order_by: &[&str], page_token: Option<&str>) -> Result<Search, StorageError> {
        let request = SearchRuns { experiment_ids, filter, run_view_type, max_results, order_by, page_token };
        self.execute(request, StorageError::from)
    }

    fn get_metric_history(&mut self, run_id: &RunId, metric_key: &str) -> Result<Vec<Metric>, GetError> {
        let request = GetMetricHistory { run_id, metric_key };
        self.execute(request, get_error(run_id.as_ref()))
    }

    fn log_param(&mut self, run_id: &RunId, key: &str, value: &str) -> Result<(), StorageError> {
        let request = LogParam { run_id, key, value };
        self.execute(request, StorageError::from)
    }

    fn log_metric(&mut self, run_id: &RunId, key: &str, value: f64, timestamp: i64, step: i64) -> Result<(), StorageError> {
        let request = LogMetric { run_id, key, value, timestamp, step };
        self.execute(request, StorageError::from)
    }

    fn log_batch(&mut self, run_id: &RunId, metrics: &[Metric], params: &[Param], tags: &[RunTag]) -> Result<(), BatchError> {
        check_batch(metrics, params, tags)?;
        let request = LogBatch { run_id, metrics, params, tags };
        self.execute(request, |error| BatchError::Storage(error.into()))
    }

    fn set_tag(&mut self, run_id: &RunId, key: &str, value: &str) -> Result<(), StorageError> {
        let request = SetTag { run_id, key, value };
        self.execute(request, StorageError::from)
    }

    fn delete_tag(&mut self, run_id: &RunId, key: &str) -> Result<(), StorageError> {
        let request = DeleteTag { run_id, key };
        self.execute(request, StorageError::from)
    }

    fn create_registered_model(&mut self, name: &str, description: Option<&str>, tags: &[RegisteredModelTag]) -> Result<RegisteredModel, CreateError> {
        let request = CreateRegisteredModel { name, description, tags };
        self.execute(request, create_error(name))
    }

    fn get_registered_model(&mut self, name: &str) -> Result<RegisteredModel, GetError> {
        let request = GetRegisteredModel { name };
        self.execute(request, get_error(name))
    }

    fn delete_registered_model(&mut self, name: &str) -> Result<(), DeleteError> {
        let request = DeleteRegisteredModel { name };
        self.execute(request, get_error(name))
    }

    fn set_registered_model_tag(&mut self, name: &str, key: &str, value: &str) -> Result<(), UpdateError> {
        let request = SetRegisteredModelTag { name, key, value };
        self.execute(request, get_error(name))
    }

    fn create_model_version(&mut self, name: &str, source: &str, run_id: Option<&RunId>, tags: &[ModelVersionTag]) -> Result<ModelVersion, StorageError> {
        let request = CreateModelVersion { name, source, run_id, tags };
        self.execute(request, StorageError::from)
    }

    fn get_model_version(&mut self, name: &str, version: &str) -> Result<ModelVersion, GetError> {
        let request = GetModelVersion { name, version };
        let resource = format!("{} version {}", name, version);
        self.execute(request, get_error(&resource))
    }

    fn transition_model_version_stage(&mut self, name: &str, version: &str, stage: ModelStage, archive_existing_versions: bool) -> Result<ModelVersion, UpdateError> {
        let request = TransitionModelVersionStage { name, version, stage: stage.as_str(), archive_existing_versions };
        let resource = format!("{} version {}", name, version);
        self.execute(request, get_error(&resource))
    }

    fn list_artifacts(&mut self, run_id: &RunId, path: Option<&str>) -> Result<ArtifactList, GetError> {
        let request = ListArtifacts { run_id, path };
        self.execute(request, get_error(run_id.as_ref()))
    }

    fn start_trace(&mut self, experiment_id: &ExperimentId, timestamp_ms: i64, tags: &[TraceTag]) -> Result<TraceInfo, StorageError> {
        let request = StartTrace { experiment_id, timestamp_ms, tags };
        self.execute(request, StorageError::from)
    }

    fn end_trace(&mut self, request_id: &TraceId, timestamp_ms: i64, status: TraceState) -> Result<TraceInfo, UpdateError> {
        let request = EndTrace { request_id, timestamp_ms, status };
        self.execute(request, get_error(request_id.as_ref()))
    }

    fn get_trace_info(&mut self, request_id: &TraceId) -> Result<TraceInfo, GetError> {
        let request = GetTraceInfo { request_id };
        self.execute(request, get_error(request_id.as_ref()))
    }

    fn set_trace_tag(&mut self, request_id: &TraceId, key: &str, value: &str) -> Result<(), UpdateError> {
        let request = SetTraceTag { request_id, key, value };
        self.execute(request, get_error(request_id.as_ref()))
    }
}

trait Endpoint: Serialize {
    const PATH: &'static str;
    const METHOD: Method;

    type Response: DeserializeOwned;
    type Value;

    fn path(&self) -> Cow<'static, str> {
        Cow::Borrowed(Self::PATH)
    }

    fn extract(response: Self::Response) -> Self::Value;
}
trait VoidEndpoint: Serialize {
    const PATH: &'static str;
    const METHOD: Method;

    fn path(&self) -> Cow<'static, str> {
        Cow::Borrowed(<Self as VoidEndpoint>::PATH)
    }
}
impl<E> Endpoint for E
where
    E: VoidEndpoint,
{
    const PATH: &'static str = <E as VoidEndpoint>::PATH;
    const METHOD: Method = <E as VoidEndpoint>::METHOD;

    type Response = VoidResponse;
    type Value = ();

    fn path(&self) -> Cow<'static, str> {
        VoidEndpoint::path(self)
    }

    fn extract(_response: Self::Response) -> Self::Value {}
}

#[derive(Deserialize)]
struct VoidResponse {}

// EXPERIMENTS

#[derive(Debug, Clone, Copy, Serialize)]
struct CreateExperiment<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_location: Option<&'a str>,
    pub tags: &'a [ExperimentTag],
}
#[derive(Deserialize)]
struct CreateExperimentResponse {
    experiment_id: ExperimentId,
}
impl Endpoint for CreateExperiment<'_> {
    const PATH: &'static str = "2.0/mlflow/experiments/create";
    const METHOD: Method = Method::Post;
    type Response = CreateExperimentResponse;
    type Value = ExperimentId;

    fn extract(response: Self::Response) -> Self::Value {
        response.experiment_id
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
struct SearchExperiments<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<&'a str>,
    pub view_type: ViewType,
    pub max_results: i32,
    pub order_by: &'a [&'a str],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<&'a str>,
}
impl Endpoint for SearchExperiments<'_> {
    const PATH: &'static str = "2.0/mlflow/experiments/search";
    const METHOD: Method = Method::Post;
    type Response = ExperimentSearch;
    type Value = ExperimentSearch;

    fn extract(response: Self::Response) -> Self::Value {
        response
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
struct GetExperiment<'a> {
    pub experiment_id: &'a ExperimentId,
}
#[derive(Deserialize)]
struct GetExperimentResponse {
    experiment: Experiment,
}
impl Endpoint for GetExperiment<'_> {
    const PATH: &'static str = "2.0/mlflow/experiments/get";
    const METHOD: Method = Method::Get;
    type Value = Experiment;
    type Response = GetExperimentResponse;

    fn extract(response: Self::Response) -> Self::Value {
        response.experiment
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
struct GetExperimentByName<'a> {
    pub experiment_name: &'a str,
}
impl Endpoint for GetExperimentByName<'_> {
    const PATH: &'static str = "2.0/mlflow/experiments/get-by-name";
    const METHOD: Method = Method::Get;
    type Value = Experiment;
    type Response = GetExperimentResponse;

    fn extract(response: Self::Response) -> Self::Value {
        response.experiment
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
struct DeleteExperiment<'a> {
    pub experiment_id: &'a ExperimentId,
}
impl VoidEndpoint for DeleteExperiment<'_> {
    const PATH: &'static str = "2.0/mlflow/experiments/delete";
    const METHOD: Method = Method::Post;
}

#[derive(Debug, Clone, Copy, Serialize)]
struct RestoreExperiment<'a> {
    pub experiment_id: &'a ExperimentId,
}
impl VoidEndpoint for RestoreExperiment<'_> {
    const PATH: &'static str = "2.0/mlflow/experiments/restore";
    const METHOD: Method = Method::Post;
}

#[derive(Debug, Clone, Copy, Serialize)]
struct UpdateExperiment<'a> {
    pub experiment_id: &'a ExperimentId,
    pub new_name: &'a str,
}
impl VoidEndpoint for UpdateExperiment<'_> {
    const PATH: &'static str = "2.0/mlflow/experiments/update";
    const METHOD: Method = Method::Post;
}

#[derive(Debug, Clone, Copy, Serialize)]
struct SetExperimentTag<'a> {
    pub experiment_id: &'a ExperimentId,
    pub key: &'a str,
    pub value: &'a str,
}
impl VoidEndpoint for SetExperimentTag<'_> {
    const PATH: &'static str = "2.0/mlflow/experiments/set-experiment-tag";
    const METHOD: Method = Method::Post;
}

// RUNS

#[derive(Debug, Clone, Copy, Serialize)]
struct CreateRun<'a> {
    pub experiment_id: &'a ExperimentId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_name: Option<&'a str>,
    pub start_time: i64,
    pub tags: &'a [RunTag],
}
#[derive(Deserialize)]
struct RunResponse {
    run: Run,
}
impl Endpoint for CreateRun<'_> {
    const PATH: &'static str = "2.0/mlflow/runs/create";
    const METHOD: Method = Method::Post;
    type Response = RunResponse;
    type Value = Run;

    fn extract(response: Self::Response) -> Self::Value {
        response.run
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
struct DeleteRun<'a> {
    pub run_id: &'a RunId,
}
impl VoidEndpoint for DeleteRun<'_> {
    const PATH: &'static str = "2.0/mlflow/runs/delete";
    const METHOD: Method = Method::Post;
}

#[derive(Debug, Clone, Copy, Serialize)]
struct RestoreRun<'a> {
    pub run_id: &'a RunId,
}
impl VoidEndpoint for RestoreRun<'_> {
    const PATH: &'static str = "2.0/mlflow/runs/restore";
    const METHOD: Method = Method::Post;
}

#[derive(Debug, Clone, Copy, Serialize)]
struct GetRun<'a> {
    pub run_id: &'a RunId,
}
impl Endpoint for GetRun<'_> {
    const PATH: &'static str = "2.0/mlflow/runs/get";
    const METHOD: Method = Method::Get;
    type Response = RunResponse;
    type Value = Run;

    fn extract(response: Self::Response) -> Self::Value {
        response.run
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
struct UpdateRun<'a> {
    pub run_id: &'a RunId,
    pub status: RunStatus,
    pub end_time: i64,
}
#[derive(Deserialize)]
struct UpdateRunResponse {
    run_info: RunInfo,
}
impl Endpoint for UpdateRun<'_> {
    const PATH: &'static str = "2.0/mlflow/runs/update";
    const METHOD: Method = Method::Post;
    type Response = UpdateRunResponse;
    type Value = RunInfo;

    fn extract(response: Self::Response) -> Self::Value {
        response.run_info
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
struct SearchRuns<'a> {
    pub experiment_ids: &'a [&'a ExperimentId],
    pub filter: &'a str,
    pub run_view_type: ViewType,
    pub max_results: i32,
    pub order_by: &'a [&'a str],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<&'a str>,
}
impl Endpoint for SearchRuns<'_> {
    const PATH: &'static str = "2.0/mlflow/runs/search";
    const METHOD: Method = Method::Post;
    type Response = Search;
    type Value = Search;

    fn extract(response: Self::Response) -> Self::Value {
        response
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
struct GetMetricHistory<'a> {
    pub run_id: &'a RunId,
    pub metric_key: &'a str,
}
#[derive(Deserialize)]
struct GetMetricHistoryResponse {
    #[serde(default)]
    metrics: Vec<Metric>,
}
impl Endpoint for GetMetricHistory<'_> {
    const PATH: &'static str = "2.0/mlflow/metrics/get-history";
    const METHOD: Method = Method::Get;
    type Response = GetMetricHistoryResponse;
    type Value = Vec<Metric>;

    fn extract(response: Self::Response) -> Self::Value {
        response.metrics
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
struct LogParam<'a> {
    pub run_id: &'a RunId,
    pub key: &'a str,
    pub value: &'a str,
}
impl VoidEndpoint for LogParam<'_> {
    const PATH: &'static str = "2.0/mlflow/runs/log-parameter";
    const METHOD: Method = Method::Post;
}

#[derive(Debug, Clone, Copy, Serialize)]
struct LogMetric<'a> {
    pub run_id: &'a RunId,
    pub key: &'a str,
    pub value: f64,
    pub timestamp: i64,
    pub step: i64,
}
impl VoidEndpoint for LogMetric<'_> {
    const PATH: &'static str = "2.0/mlflow/runs/log-metric";
    const METHOD: Method = Method::Post;
}

#[derive(Debug, Clone, Copy, Serialize)]
struct LogBatch<'a> {
    pub run_id: &'a RunId,
    pub metrics: &'a [Metric],
    pub params: &'a [Param],
    pub tags: &'a [RunTag],
}
impl VoidEndpoint for LogBatch<'_> {
    const PATH: &'static str = "2.0/mlflow/runs/log-batch";
    const METHOD: Method = Method::Post;
}

#[derive(Debug, Clone, Copy, Serialize)]
struct SetTag<'a> {
    pub run_id: &'a RunId,
    pub key: &'a str,
    pub value: &'a str,
}
impl VoidEndpoint for SetTag<'_> {
    const PATH: &'static str = "2.0/mlflow/runs/set-tag";
    const METHOD: Method = Method::Post;
}

#[derive(Debug, Clone, Copy, Serialize)]
struct DeleteTag<'a> {
    pub run_id: &'a RunId,
    pub key: &'a str,
}
impl VoidEndpoint for DeleteTag<'_> {
    const PATH: &'static str = "2.0/mlflow/runs/delete-tag";
    const METHOD: Method = Method::Post;
}

// MODEL REGISTRY

#[derive(Debug, Clone, Copy, Serialize)]
struct CreateRegisteredModel<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    pub tags: &'a [RegisteredModelTag],
}
#[derive(Deserialize)]
struct RegisteredModelResponse {
    registered_model: RegisteredModel,
}
impl Endpoint for CreateRegisteredModel<'_> {
    const PATH: &'static str = "2.0/mlflow/registered-models/create";
    const METHOD: Method = Method::Post;
    type Response = RegisteredModelResponse;
    type Value = RegisteredModel;

    fn extract(response: Self::Response) -> Self::Value {
        response.registered_model
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
struct GetRegisteredModel<'a> {
    pub name: &'a str,
}
impl Endpoint for GetRegisteredModel<'_> {
    const PATH: &'static str = "2.0/mlflow/registered-models/get";
    const METHOD: Method = Method::Get;
    type Response = RegisteredModelResponse;
    type Value = RegisteredModel;

    fn extract(response: Self::Response) -> Self::Value {
        response.registered_model
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
struct DeleteRegisteredModel<'a> {
    pub name: &'a str,
}
impl VoidEndpoint for DeleteRegisteredModel<'_> {
    const PATH: &'static str = "2.0/mlflow/registered-models/delete";
    const METHOD: Method = Method::Delete;
}

#[derive(Debug, Clone, Copy, Serialize)]
struct SetRegisteredModelTag<'a> {
    pub name: &'a str,
    pub key: &'a str,
    pub value: &'a str,
}
impl VoidEndpoint for SetRegisteredModelTag<'_> {
    const PATH: &'static str = "2.0/mlflow/registered-models/set-tag";
    const METHOD: Method = Method::Post;
}

#[derive(Debug, Clone, Copy, Serialize)]
struct CreateModelVersion<'a> {
    pub name: &'a str,
    pub source: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<&'a RunId>,
    pub tags: &'a [ModelVersionTag],
}
#[derive(Deserialize)]
struct ModelVersionResponse {
    model_version: ModelVersion,
}
impl Endpoint for CreateModelVersion<'_> {
    const PATH: &'static str = "2.0/mlflow/model-versions/create";
    const METHOD: Method = Method::Post;
    type Response = ModelVersionResponse;
    type Value = ModelVersion;

    fn extract(response: Self::Response) -> Self::Value {
        response.model_version
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
struct GetModelVersion<'a> {
    pub name: &'a str,
    pub version: &'a str,
}
impl Endpoint for GetModelVersion<'_> {
    const PATH: &'static str = "2.0/mlflow/model-versions/get";
    const METHOD: Method = Method::Get;
    type Response = ModelVersionResponse;
    type Value = ModelVersion;

    fn extract(response: Self::Response) -> Self::Value {
        response.model_version
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
struct TransitionModelVersionStage<'a> {
    pub name: &'a str,
    pub version: &'a str,
    pub stage: &'a str,
    pub archive_existing_versions: bool,
}
impl Endpoint for TransitionModelVersionStage<'_> {
    const PATH: &'static str = "2.0/mlflow/model-versions/transition-stage";
    const METHOD: Method = Method::Post;
    type Response = ModelVersionResponse;
    type Value = ModelVersion;

    fn extract(response: Self::Response) -> Self::Value {
        response.model_version
    }
}

// ARTIFACTS

#[derive(Debug, Clone, Copy, Serialize)]
struct ListArtifacts<'a> {
    pub run_id: &'a RunId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<&'a str>,
}
impl Endpoint for ListArtifacts<'_> {
    const PATH: &'static str = "2.0/mlflow/artifacts/list";
    const METHOD: Method = Method::Get;
    type Response = ArtifactList;
    type Value = ArtifactList;

    fn extract(response: Self::Response) -> Self::Value {
        response
    }
}

// TRACES

#[derive(Debug, Clone, Copy, Serialize)]
struct StartTrace<'a> {
    pub experiment_id: &'a ExperimentId,
    pub timestamp_ms: i64,
    pub tags: &'a [TraceTag],
}
#[derive(Deserialize)]
struct TraceInfoResponse {
    trace_info: TraceInfo,
}
impl Endpoint for StartTrace<'_> {
    const PATH: &'static str = "2.0/mlflow/traces";
    const METHOD: Method = Method::Post;
    type Response = TraceInfoResponse;
    type Value = TraceInfo;

    fn extract(response: Self::Response) -> Self::Value {
        response.trace_info
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
struct EndTrace<'a> {
    pub request_id: &'a TraceId,
    pub timestamp_ms: i64,
    pub status: TraceState,
}
impl Endpoint for EndTrace<'_> {
    const PATH: &'static str = "2.0/mlflow/traces";
    const METHOD: Method = Method::Patch;
    type Response = TraceInfoResponse;
    type Value = TraceInfo;

    fn path(&self) -> Cow<'static, str> {
        Cow::Owned(format!("{}/{}", Self::PATH, self.request_id))
    }

    fn extract(response: Self::Response) -> Self::Value {
        response.trace_info
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
struct GetTraceInfo<'a> {
    #[serde(skip)]
    pub request_id: &'a TraceId,
}
impl Endpoint for GetTraceInfo<'_> {
    const PATH: &'static str = "2.0/mlflow/traces";
    const METHOD: Method = Method::Get;
    type Response = TraceInfoResponse;
    type Value = TraceInfo;

    fn path(&self) -> Cow<'static, str> {
        Cow::Owned(format!("{}/{}/info", Self::PATH, self.request_id))
    }

    fn extract(response: Self::Response) -> Self::Value {
        response.trace_info
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
struct SetTraceTag<'a> {
    #[serde(skip)]
    pub request_id: &'a TraceId,
    pub key: &'a str,
    pub value: &'a str,
}
impl VoidEndpoint for SetTraceTag<'_> {
    const PATH: &'static str = "2.0/mlflow/traces";
    const METHOD: Method = Method::Patch;

    fn path(&self) -> Cow<'static, str> {
        Cow::Owned(format!("{}/{}/tags", <Self as VoidEndpoint>::PATH, self.request_id))
    }
}
