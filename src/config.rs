//! Client configuration.
//!
//! Loaded from defaults overridden by `MLFLOW_*` environment variables:
//! `MLFLOW_TRACKING_URI`, `MLFLOW_TIMEOUT_SECS` and `MLFLOW_USER_ID`.

use figment::{
    providers::{Env, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::api::error::ValidationError;

pub const DEFAULT_TRACKING_URI: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server root without the `/api` suffix.
    pub tracking_uri: String,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Reported as the owner of created runs.
    #[serde(default)]
    pub user_id: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            tracking_uri: DEFAULT_TRACKING_URI.to_string(),
            timeout_secs: None,
            user_id: None,
        }
    }
}

impl ClientConfig {
    pub fn new(tracking_uri: impl Into<String>) -> Self {
        ClientConfig {
            tracking_uri: tracking_uri.into(),
            ..ClientConfig::default()
        }
    }

    /// Load the configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable has the wrong type or the tracking URI is empty.
    pub fn load() -> Result<Self, ValidationError> {
        Self::from_figment(Figment::from(Serialized::defaults(ClientConfig::default())).merge(Env::prefixed("MLFLOW_")))
    }

    fn from_figment(figment: Figment) -> Result<Self, ValidationError> {
        let config: ClientConfig = figment.extract().map_err(|error| ValidationError::InvalidField {
            field: "config",
            reason: error.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.tracking_uri.trim().is_empty() {
            return Err(ValidationError::InvalidField {
                field: "tracking_uri",
                reason: "must not be empty".to_string(),
            });
        }
        if self.timeout_secs == Some(0) {
            return Err(ValidationError::InvalidField {
                field: "timeout_secs",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    pub fn api_url(&self) -> String {
        format!("{}/api", self.tracking_uri.trim_end_matches('/'))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
