use serde::{Serialize, Deserialize};
use serde_json::Value;
use std::convert::TryFrom;

use crate::{
    api::{error::ValidationError, int64, opt_int64, tag::{key_value_from_json, KeyValue, RunTag}},
    collection::{MetricCollection, ParameterCollection, TagCollection},
    ExperimentId, RunId,
};

/// One point of a metric's time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub key: String,
    pub value: f64,
    /// Milliseconds since the unix epoch.
    #[serde(with = "int64")]
    pub timestamp: i64,
    #[serde(default, with = "int64")]
    pub step: i64,
}

impl Metric {
    pub fn new(key: impl Into<String>, value: f64, timestamp: i64, step: i64) -> Self {
        Metric {
            key: key.into(),
            value,
            timestamp,
            step,
        }
    }
}

fn int_field(json: &Value, field: &'static str) -> Result<Option<i64>, ValidationError> {
    match json.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => number.as_i64().map(Some).ok_or_else(|| ValidationError::InvalidField {
            field,
            reason: format!("{} is not an integer", number),
        }),
        Some(Value::String(s)) => s.parse().map(Some).map_err(|_| ValidationError::InvalidField {
            field,
            reason: format!("{:?} is not an integer", s),
        }),
        Some(other) => Err(ValidationError::InvalidField {
            field,
            reason: format!("expected an integer, found {}", other),
        }),
    }
}

impl TryFrom<&Value> for Metric {
    type Error = ValidationError;

    fn try_from(json: &Value) -> Result<Self, Self::Error> {
        let key = match json.get("key") {
            Some(Value::String(key)) if !key.is_empty() => key.clone(),
            Some(_) => {
                return Err(ValidationError::InvalidField {
                    field: "key",
                    reason: "expected a non-empty string".to_string(),
                })
            }
            None => return Err(ValidationError::MissingField("key")),
        };
        let value = match json.get("value") {
            Some(Value::Number(number)) => number.as_f64().ok_or_else(|| ValidationError::InvalidField {
                field: "value",
                reason: format!("{} is not representable as f64", number),
            })?,
            Some(other) => {
                return Err(ValidationError::InvalidField {
                    field: "value",
                    reason: format!("expected a number, found {}", other),
                })
            }
            None => return Err(ValidationError::MissingField("value")),
        };
        let timestamp = int_field(json, "timestamp")?.ok_or(ValidationError::MissingField("timestamp"))?;
        let step = int_field(json, "step")?.unwrap_or(0);
        Ok(Metric { key, value, timestamp, step })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

impl Param {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Param {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl KeyValue for Param {
    fn key(&self) -> &str {
        &self.key
    }

    fn value(&self) -> &str {
        &self.value
    }
}

impl TryFrom<&Value> for Param {
    type Error = ValidationError;

    fn try_from(json: &Value) -> Result<Self, Self::Error> {
        let (key, value) = key_value_from_json(json)?;
        Ok(Param { key, value })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub info: RunInfo,
    #[serde(default)]
    pub data: RunData,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunData {
    #[serde(default)]
    pub metrics: MetricCollection,
    #[serde(default)]
    pub params: ParameterCollection,
    #[serde(default)]
    pub tags: TagCollection<RunTag>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunInfo {
    pub run_id: RunId,
    pub experiment_id: ExperimentId,
    #[serde(default)]
    pub run_name: String,
    #[serde(default)]
    pub user_id: String,
    pub status: RunStatus,
    #[serde(with = "int64")]
    pub start_time: i64,
    #[serde(default, with = "opt_int64")]
    pub end_time: Option<i64>,
    #[serde(default)]
    pub artifact_uri: String,
    #[serde(default)]
    pub lifecycle_stage: String,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunStatus {
    Running,
    Scheduled,
    Finished,
    Failed,
    Killed,
}

impl RunStatus {
    /// Whether the run has ended. Terminal states are never left again.
    pub fn is_terminal(self) -> bool {
        matches!(self, RunStatus::Finished | RunStatus::Failed | RunStatus::Killed)
    }

    pub fn can_transition_to(self, next: RunStatus) -> bool {
        !self.is_terminal() && next.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_run_with_string_timestamps() {
        let response = r#"
        {
            "info": {
                "run_id": "abc",
                "run_uuid": "abc",
                "experiment_id": "1",
                "run_name": "bright-owl",
                "user_id": "leo",
                "status": "RUNNING",
                "start_time": "1600000000000",
                "artifact_uri": "./mlruns/1/abc/artifacts",
                "lifecycle_stage": "active"
            },
            "data": {
                "metrics": [
                    {"key": "loss", "value": 0.5, "timestamp": "1600000000001", "step": "2"}
                ],
                "params": [{"key": "lr", "value": "0.01"}],
                "tags": [{"key": "mlflow.user", "value": "leo"}]
            }
        }
        "#;
        let run = serde_json::from_str::<Run>(response).unwrap();
        assert_eq!(run.info.run_id.as_ref(), "abc");
        assert_eq!(run.info.start_time, 1_600_000_000_000);
        assert_eq!(run.info.end_time, None);
        assert_eq!(run.data.metrics.first().unwrap().step, 2);
        assert_eq!(run.data.params.get("lr").unwrap().value, "0.01");
        assert!(run.data.tags.has("mlflow.user"));
    }

    #[test]
    fn parse_run_without_data() {
        let response = r#"
        {
            "info": {
                "run_id": "abc",
                "experiment_id": "1",
                "status": "FINISHED",
                "start_time": 1,
                "end_time": "2"
            }
        }
        "#;
        let run = serde_json::from_str::<Run>(response).unwrap();
        assert_eq!(run.info.status, RunStatus::Finished);
        assert_eq!(run.info.end_time, Some(2));
        assert!(run.data.metrics.is_empty());
        assert!(run.data.params.is_empty());
    }

    #[test]
    fn terminal_states_are_one_way() {
        assert!(RunStatus::Running.can_transition_to(RunStatus::Finished));
        assert!(RunStatus::Scheduled.can_transition_to(RunStatus::Killed));
        assert!(!RunStatus::Running.can_transition_to(RunStatus::Scheduled));
        assert!(!RunStatus::Finished.can_transition_to(RunStatus::Failed));
        assert!(!RunStatus::Failed.can_transition_to(RunStatus::Running));
    }

    #[test]
    fn metric_from_json_defaults_step() {
        let metric = Metric::try_from(&json!({"key": "acc", "value": 0.9, "timestamp": 10})).unwrap();
        assert_eq!(metric, Metric::new("acc", 0.9, 10, 0));
    }

    #[test]
    fn metric_from_json_names_the_bad_field() {
        let error = Metric::try_from(&json!({"key": "acc", "value": 0.9})).unwrap_err();
        assert_eq!(error, ValidationError::MissingField("timestamp"));

        let error = Metric::try_from(&json!({"key": "acc", "value": "high", "timestamp": 1})).unwrap_err();
        assert!(matches!(error, ValidationError::InvalidField { field: "value", .. }));
    }

    #[test]
    fn param_from_json_requires_key() {
        assert_eq!(
            Param::try_from(&json!({"value": "0.01"})).unwrap_err(),
            ValidationError::MissingField("key")
        );
        assert_eq!(Param::try_from(&json!({"key": "lr", "value": "0.01"})).unwrap(), Param::new("lr", "0.01"));
    }
}
