use std::sync::Arc;

use crate::{
    api::{
        error::BuildError,
        limits,
        run::{Metric, Param, Run},
        tag::RunTag,
    },
    collection::{MetricCollection, ParameterCollection, TagCollection},
    tracking::clock::{Clock, SystemClock},
    Client, ExperimentId,
};

/// Configures a MLflow Run and creates it on the server.
///
/// Tags are sent with the creation request. Params and metrics are logged
/// afterwards with a single batch request by [`start`](Self::start).
pub struct RunBuilder<'c, C: Client + ?Sized> {
    client: &'c mut C,
    experiment_id: ExperimentId,
    name: Option<String>,
    start_time: Option<i64>,
    tags: TagCollection<RunTag>,
    params: ParameterCollection,
    metrics: MetricCollection,
    clock: Arc<dyn Clock>,
}

impl<'c, C: Client + ?Sized> RunBuilder<'c, C> {
    pub fn new(client: &'c mut C, experiment_id: ExperimentId) -> Self {
        RunBuilder {
            client,
            experiment_id,
            name: None,
            start_time: None,
            tags: TagCollection::new(),
            params: ParameterCollection::new(),
            metrics: MetricCollection::new(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the clock used for default timestamps.
    ///
    /// Only affects metrics added after this call.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Start time in milliseconds, defaults to the time of creation.
    pub fn with_start_time(mut self, start_time: i64) -> Self {
        self.start_time = Some(start_time);
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.add(RunTag::new(key, value));
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.add(Param::new(key, value));
        self
    }

    /// Adds a metric at step 0, timestamped now rather than when the run is started.
    pub fn with_metric(self, key: impl Into<String>, value: f64) -> Self {
        let timestamp = self.clock.now_millis();
        self.with_metric_at(key, value, 0, timestamp)
    }

    pub fn with_metric_at(mut self, key: impl Into<String>, value: f64, step: i64, timestamp: i64) -> Self {
        self.metrics.add(Metric::new(key, value, timestamp, step));
        self
    }

    /// Creates the run without logging the collected params and metrics.
    pub fn create(self) -> Result<Run, BuildError> {
        let start_time = self.start_time.unwrap_or_else(|| self.clock.now_millis());
        tracing::debug!(experiment = %self.experiment_id, "creating run");
        let run = self.client.create_run(
            &self.experiment_id,
            start_time,
            self.name.as_deref(),
            self.tags.as_slice(),
        )?;
        Ok(run)
    }

    /// Creates the run, logs the collected params and metrics and fetches the result.
    pub fn start(self) -> Result<Run, BuildError> {
        let start_time = self.start_time.unwrap_or_else(|| self.clock.now_millis());
        tracing::debug!(experiment = %self.experiment_id, "starting run");
        let run = self.client.create_run(
            &self.experiment_id,
            start_time,
            self.name.as_deref(),
            self.tags.as_slice(),
        )?;
        if self.params.is_empty() && self.metrics.is_empty() {
            return Ok(run);
        }
        let id = run.info.run_id;
        for (metrics, params) in batches(self.metrics.as_slice(), self.params.as_slice()) {
            tracing::trace!(run = %id, metrics = metrics.len(), params = params.len(), "logging batch");
            self.client.log_batch(&id, metrics, params, &[])?;
        }
        Ok(self.client.get_run(&id)?)
    }
}

/// Splits metrics and params into batches the tracking server accepts.
fn batches<'a>(mut metrics: &'a [Metric], mut params: &'a [Param]) -> Vec<(&'a [Metric], &'a [Param])> {
    let mut batches = Vec::new();
    while !metrics.is_empty() || !params.is_empty() {
        let param_count = params.len().min(limits::BATCH_PARAMS);
        let metric_count = metrics
            .len()
            .min(limits::BATCH_METRICS)
            .min(limits::BATCH_ITEMS - param_count);
        let (param_batch, rest) = params.split_at(param_count);
        params = rest;
        let (metric_batch, rest) = metrics.split_at(metric_count);
        metrics = rest;
        batches.push((metric_batch, param_batch));
    }
    batches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::run::RunStatus,
        backend::{
            testing::{run_json, RecordingTransport},
            RestClient,
        },
        tracking::{clock::ManualClock, ExperimentBuilder},
    };
    use serde_json::json;

    const CREATE: &str = "2.0/mlflow/runs/create";
    const BATCH: &str = "2.0/mlflow/runs/log-batch";
    const GET: &str = "2.0/mlflow/runs/get";

    fn created() -> serde_json::Value {
        json!({ "run": { "info": run_json("r1", "1") } })
    }

    #[test]
    fn start_logs_params_and_metrics_in_one_batch() {
        let transport = RecordingTransport::new().respond(created()).respond_to(GET, created());
        let mut client = RestClient::with_transport(transport);
        RunBuilder::new(&mut client, ExperimentId::from("1"))
            .with_param("lr", "0.01")
            .with_param("epochs", "10")
            .with_metric("loss", 0.3)
            .with_metric("loss", 0.2)
            .with_metric_at("accuracy", 0.9, 1, 1_000)
            .start()
            .unwrap();

        let transport = client.transport();
        assert_eq!(transport.count(CREATE), 1);
        assert_eq!(transport.count(BATCH), 1);
        assert_eq!(transport.paths(), vec![CREATE, BATCH, GET]);
        let batch = &transport.calls[1].payload;
        assert_eq!(batch["params"].as_array().unwrap().len(), 2);
        assert_eq!(batch["metrics"].as_array().unwrap().len(), 3);
        assert_eq!(batch["tags"], json!([]));
    }

    #[test]
    fn start_without_data_skips_the_batch() {
        let transport = RecordingTransport::new().respond(created());
        let mut client = RestClient::with_transport(transport);
        let run = RunBuilder::new(&mut client, ExperimentId::from("1"))
            .with_tag("team", "vision")
            .start()
            .unwrap();
        assert_eq!(run.info.run_id.as_ref(), "r1");
        assert_eq!(client.transport().count(BATCH), 0);
        assert_eq!(client.transport().paths(), vec![CREATE]);
    }

    #[test]
    fn create_sends_tags_but_ignores_params() {
        let transport = RecordingTransport::new().respond(created());
        let mut client = RestClient::with_transport(transport);
        let run = RunBuilder::new(&mut client, ExperimentId::from("1"))
            .with_name("baseline")
            .with_tag("team", "vision")
            .with_param("lr", "0.1")
            .with_start_time(42)
            .create()
            .unwrap();
        assert_eq!(run.info.status, RunStatus::Running);

        let calls = &client.transport().calls;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].payload["run_name"], "baseline");
        assert_eq!(calls[0].payload["start_time"], 42);
        assert_eq!(calls[0].payload["tags"], json!([{ "key": "team", "value": "vision" }]));
    }

    #[test]
    fn metric_timestamps_are_taken_when_added() {
        let clock = Arc::new(ManualClock::new(5_000_000));
        let transport = RecordingTransport::new().respond(created()).respond_to(GET, created());
        let mut client = RestClient::with_transport(transport);
        let builder = RunBuilder::new(&mut client, ExperimentId::from("1"))
            .with_clock(clock.clone())
            .with_metric("loss", 1.0);
        clock.advance(3_000_000);
        builder.with_metric("loss", 0.5).start().unwrap();

        let metrics = &client.transport().calls[1].payload["metrics"];
        assert_eq!(metrics[0]["timestamp"], 5);
        assert_eq!(metrics[1]["timestamp"], 8);
        assert_eq!(metrics[0]["step"], 0);
        assert_eq!(client.transport().calls[0].payload["start_time"], 8);
    }

    #[test]
    fn large_runs_are_split_into_several_batches() {
        let transport = RecordingTransport::new().respond(created()).respond_to(GET, created());
        let mut client = RestClient::with_transport(transport);
        let mut builder = RunBuilder::new(&mut client, ExperimentId::from("1"));
        for step in 0..1500 {
            builder = builder.with_metric_at("loss", 1.0, step, step);
        }
        for i in 0..150 {
            builder = builder.with_param(format!("p{}", i), "x");
        }
        let run = builder.start().unwrap();
        assert_eq!(run.info.run_id.as_ref(), "r1");
        assert_eq!(client.transport().count(BATCH), 2);
        assert_eq!(client.transport().paths(), vec![CREATE, BATCH, BATCH, GET]);
    }

    #[test]
    fn start_returns_the_fetched_run() {
        let fetched = json!({
            "run": {
                "info": run_json("r1", "1"),
                "data": { "params": [{ "key": "lr", "value": "0.01" }] }
            }
        });
        let transport = RecordingTransport::new().respond(created()).respond_to(GET, fetched);
        let mut client = RestClient::with_transport(transport);
        let run = RunBuilder::new(&mut client, ExperimentId::from("1"))
            .with_param("lr", "0.01")
            .start()
            .unwrap();
        assert_eq!(run.data.params.get("lr").unwrap().value, "0.01");
        assert_eq!(client.transport().count(CREATE), 1);
        assert_eq!(client.transport().count(BATCH), 1);
        assert_eq!(client.transport().count(GET), 1);
    }

    #[test]
    fn batches_respect_the_server_limits() {
        let metrics: Vec<_> = (0..2100).map(|i| Metric::new("m", 0.0, i, i)).collect();
        let params: Vec<_> = (0..250).map(|i| Param::new(format!("p{}", i), "v")).collect();
        let batches = batches(&metrics, &params);
        for (metrics, params) in &batches {
            assert!(metrics.len() <= limits::BATCH_METRICS);
            assert!(params.len() <= limits::BATCH_PARAMS);
            assert!(metrics.len() + params.len() <= limits::BATCH_ITEMS);
        }
        assert_eq!(batches.iter().map(|(m, _)| m.len()).sum::<usize>(), 2100);
        assert_eq!(batches.iter().map(|(_, p)| p.len()).sum::<usize>(), 250);
    }

    #[test]
    fn create_experiment_and_start_run() {
        let logged = json!({
            "run": {
                "info": run_json("r1", "7"),
                "data": {
                    "params": [{ "key": "lr", "value": "0.01" }],
                    "metrics": [{ "key": "accuracy", "value": 0.95, "timestamp": "1000", "step": "1" }]
                }
            }
        });
        let transport = RecordingTransport::new()
            .respond(json!({ "experiment_id": "7" }))
            .respond(created())
            .respond(json!({}))
            .respond(logged);
        let mut client = RestClient::with_transport(transport);

        let experiment = ExperimentBuilder::new(&mut client, "exp-A").create().unwrap();
        let run = RunBuilder::new(&mut client, experiment)
            .with_param("lr", "0.01")
            .with_metric_at("accuracy", 0.95, 1, 1_000)
            .start()
            .unwrap();

        assert_eq!(run.data.params.get("lr").unwrap().value, "0.01");
        let accuracy = run.data.metrics.get_by_key("accuracy");
        assert_eq!(accuracy.first().unwrap().value, 0.95);
        assert_eq!(accuracy.first().unwrap().step, 1);
        assert_eq!(client.transport().calls[0].payload["name"], "exp-A");
    }
}
