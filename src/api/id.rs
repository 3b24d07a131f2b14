use serde::{Serialize, Deserialize};
use std::fmt::{self, Display};

// EXPERIMENTS

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExperimentId(String);

impl AsRef<str> for ExperimentId {
    fn as_ref(&self) -> &str {
        self.0.as_ref()
    }
}

impl From<String> for ExperimentId {
    fn from(id: String) -> Self {
        ExperimentId(id)
    }
}

impl From<&str> for ExperimentId {
    fn from(id: &str) -> Self {
        ExperimentId(id.to_owned())
    }
}

impl Display for ExperimentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// RUNS

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl AsRef<str> for RunId {
    fn as_ref(&self) -> &str {
        self.0.as_ref()
    }
}

impl From<String> for RunId {
    fn from(id: String) -> Self {
        RunId(id)
    }
}

impl From<&str> for RunId {
    fn from(id: &str) -> Self {
        RunId(id.to_owned())
    }
}

impl Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// TRACES

/// Identifier of a trace, called `request_id` by the tracking server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceId(String);

impl TraceId {
    /// A fresh random id in the `tr-<32 hex digits>` format used by MLflow.
    pub fn generate() -> Self {
        TraceId(format!("tr-{}", uuid::Uuid::new_v4().simple()))
    }
}

impl AsRef<str> for TraceId {
    fn as_ref(&self) -> &str {
        self.0.as_ref()
    }
}

impl From<String> for TraceId {
    fn from(id: String) -> Self {
        TraceId(id)
    }
}

impl From<&str> for TraceId {
    fn from(id: &str) -> Self {
        TraceId(id.to_owned())
    }
}

impl Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
