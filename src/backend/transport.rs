use serde::Deserialize;
use serde_json::Value;
use std::{fmt::{self, Display}, time::Duration};

use crate::config::ClientConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("{status} {code}: {message}")]
    Known { status: u16, code: ErrorCode, message: String, body: String },
    #[error("Unknown {status} error:\n{body}")]
    Unknown { status: u16, body: String },
    #[error("request could not be sent: {0}")]
    Network(String),
    #[error("invalid response: {0}")]
    Decode(String),
}

impl TransportError {
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Known { status, .. } | TransportError::Unknown { status, .. } => Some(*status),
            TransportError::Network(_) | TransportError::Decode(_) => None,
        }
    }

    pub fn code(&self) -> Option<&ErrorCode> {
        match self {
            TransportError::Known { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Builds the error for a non-2xx response from its status and raw body.
    pub fn from_response(status: u16, body: String) -> Self {
        match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(response) => TransportError::Known {
                status,
                code: response.error_code,
                message: response.message,
                body,
            },
            Err(_) => TransportError::Unknown { status, body },
        }
    }
}

#[derive(Deserialize)]
struct ErrorResponse {
    error_code: ErrorCode,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ErrorCode {
    ResourceAlreadyExists,
    ResourceDoesNotExist,
    InvalidParameterValue,
    Unknown(String),
}
impl From<String> for ErrorCode {
    fn from(value: String) -> Self {
        match value.as_str() {
            "RESOURCE_ALREADY_EXISTS" => ErrorCode::ResourceAlreadyExists,
            "RESOURCE_DOES_NOT_EXIST" => ErrorCode::ResourceDoesNotExist,
            "INVALID_PARAMETER_VALUE" => ErrorCode::InvalidParameterValue,
            _ => ErrorCode::Unknown(value),
        }
    }
}
impl Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A blocking channel to the tracking server.
///
/// `path` is relative to the REST root, e.g. `2.0/mlflow/runs/get`. GET
/// payloads are sent as query parameters, all others as a JSON body.
pub trait Transport {
    fn execute(&mut self, method: Method, path: &str, payload: &Value) -> Result<Value, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn execute(&mut self, method: Method, path: &str, payload: &Value) -> Result<Value, TransportError> {
        (**self).execute(method, path, payload)
    }
}

/// [`Transport`] over HTTP.
pub struct HttpTransport {
    api_url: String,
    timeout: Option<Duration>,
}

impl HttpTransport {
    /// The `api_url` should be something like `http://127.0.0.1:5000/api`.
    pub fn new(api_url: impl Into<String>) -> Self {
        HttpTransport {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            timeout: None,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        HttpTransport {
            api_url: config.api_url(),
            timeout: config.timeout(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn url(&self, method: Method, path: &str, payload: &Value) -> Result<String, TransportError> {
        let mut url = format!("{}/{}", self.api_url, path);
        if method == Method::Get && payload.as_object().map_or(false, |object| !object.is_empty()) {
            let query = serde_qs::to_string(payload)
                .map_err(|error| TransportError::Decode(format!("encoding query failed: {}", error)))?;
            url.push('?');
            url.push_str(&query);
        }
        Ok(url)
    }
}

impl Transport for HttpTransport {
    fn execute(&mut self, method: Method, path: &str, payload: &Value) -> Result<Value, TransportError> {
        let url = self.url(method, path, payload)?;
        let mut request = ureq::request(method.as_str(), &url);
        if let Some(timeout) = self.timeout {
            let millis = timeout.as_millis() as u64;
            request.timeout_connect(millis);
            request.timeout_read(millis);
        }
        let http_response = match method {
            Method::Get => request.call(),
            _ => request.send_json(payload.clone()),
        };
        if let Some(error) = http_response.synthetic_error() {
            return Err(TransportError::Network(error.to_string()));
        }
        if http_response.error() {
            let status = http_response.status();
            let body = http_response
                .into_string()
                .unwrap_or_else(|_| "Could not turn error body into String.".to_string());
            return Err(TransportError::from_response(status, body));
        }
        let body = http_response
            .into_string()
            .map_err(|error| TransportError::Decode(format!("failed to turn response into string: {}", error)))?;
        if body.trim().is_empty() {
            return Ok(Value::Object(Default::default()));
        }
        serde_json::from_str(&body).map_err(|error| TransportError::Decode(format!("{}:\n{}", error, body)))
    }
}
