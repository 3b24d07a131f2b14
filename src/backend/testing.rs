use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};

use crate::backend::{Method, Transport, TransportError};

#[derive(Debug, Clone)]
pub struct Call {
    pub method: Method,
    pub path: String,
    pub payload: Value,
}

/// Replays scripted responses in order and records every call it receives.
///
/// Paths registered with [`respond_to`](Self::respond_to) always get their
/// canned response. Other calls take the next scripted response, and once the
/// script is exhausted they answer with an empty object.
#[derive(Default)]
pub struct RecordingTransport {
    responses: VecDeque<Result<Value, TransportError>>,
    routes: HashMap<String, Value>,
    pub calls: Vec<Call>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        RecordingTransport::default()
    }

    pub fn respond(mut self, response: Value) -> Self {
        self.responses.push_back(Ok(response));
        self
    }

    pub fn respond_to(mut self, path: &str, response: Value) -> Self {
        self.routes.insert(path.to_string(), response);
        self
    }

    pub fn fail(mut self, error: TransportError) -> Self {
        self.responses.push_back(Err(error));
        self
    }

    pub fn count(&self, path: &str) -> usize {
        self.calls.iter().filter(|call| call.path == path).count()
    }

    pub fn paths(&self) -> Vec<&str> {
        self.calls.iter().map(|call| call.path.as_str()).collect()
    }
}

impl Transport for RecordingTransport {
    fn execute(&mut self, method: Method, path: &str, payload: &Value) -> Result<Value, TransportError> {
        self.calls.push(Call {
            method,
            path: path.to_string(),
            payload: payload.clone(),
        });
        if let Some(response) = self.routes.get(path) {
            return Ok(response.clone());
        }
        self.responses.pop_front().unwrap_or_else(|| Ok(json!({})))
    }
}

pub fn run_json(run_id: &str, experiment_id: &str) -> Value {
    json!({
        "run_id": run_id,
        "experiment_id": experiment_id,
        "status": "RUNNING",
        "start_time": "1600000000000",
        "lifecycle_stage": "active"
    })
}

pub fn not_found() -> TransportError {
    TransportError::from_response(
        404,
        r#"{"error_code": "RESOURCE_DOES_NOT_EXIST", "message": "not found"}"#.to_string(),
    )
}

pub fn already_exists() -> TransportError {
    TransportError::from_response(
        400,
        r#"{"error_code": "RESOURCE_ALREADY_EXISTS", "message": "already exists"}"#.to_string(),
    )
}
