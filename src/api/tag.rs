use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::convert::TryFrom;

use crate::api::error::ValidationError;

/// Keys with this prefix are reserved for tags set by MLflow itself.
pub const SYSTEM_TAG_PREFIX: &str = "mlflow.";

/// A string entry that is unique by key within its owner.
pub trait KeyValue {
    fn key(&self) -> &str;
    fn value(&self) -> &str;
}

/// A tag attached to an experiment, run, model or trace.
pub trait Tag: KeyValue {
    fn is_system(&self) -> bool {
        self.key().starts_with(SYSTEM_TAG_PREFIX)
    }
}

/// Reads a `{"key": .., "value": ..}` object. A missing value counts as empty,
/// the way the tracking server omits empty strings.
pub(crate) fn key_value_from_json(json: &Value) -> Result<(String, String), ValidationError> {
    let object = json.as_object().ok_or_else(|| ValidationError::InvalidField {
        field: "key",
        reason: "expected an object".to_string(),
    })?;
    let key = match object.get("key") {
        Some(Value::String(key)) if !key.is_empty() => key.clone(),
        Some(Value::String(_)) => {
            return Err(ValidationError::InvalidField {
                field: "key",
                reason: "must not be empty".to_string(),
            })
        }
        Some(other) => {
            return Err(ValidationError::InvalidField {
                field: "key",
                reason: format!("expected a string, found {}", other),
            })
        }
        None => return Err(ValidationError::MissingField("key")),
    };
    let value = match object.get("value") {
        Some(Value::String(value)) => value.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    Ok((key, value))
}

macro_rules! tag_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $name {
            pub key: String,
            #[serde(default)]
            pub value: String,
        }

        impl $name {
            pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
                $name { key: key.into(), value: value.into() }
            }
        }

        impl KeyValue for $name {
            fn key(&self) -> &str {
                &self.key
            }

            fn value(&self) -> &str {
                &self.value
            }
        }

        impl Tag for $name {}

        impl TryFrom<&Value> for $name {
            type Error = ValidationError;

            fn try_from(json: &Value) -> Result<Self, Self::Error> {
                let (key, value) = key_value_from_json(json)?;
                Ok($name { key, value })
            }
        }
    };
}

tag_type!(ExperimentTag);
tag_type!(RunTag);
tag_type!(
    /// Tag of a registered model.
    RegisteredModelTag
);
tag_type!(ModelVersionTag);
tag_type!(TraceTag);
