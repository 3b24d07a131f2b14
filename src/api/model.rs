use serde::{Deserialize, Serialize};

use crate::{
    api::{opt_int64, tag::{ModelVersionTag, RegisteredModelTag}},
    collection::TagCollection,
    RunId,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredModel {
    pub name: String,
    #[serde(default, with = "opt_int64")]
    pub creation_timestamp: Option<i64>,
    #[serde(default, with = "opt_int64")]
    pub last_updated_timestamp: Option<i64>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub latest_versions: Vec<ModelVersion>,
    #[serde(default)]
    pub tags: TagCollection<RegisteredModelTag>,
}

impl RegisteredModel {
    /// The latest version in the given stage, if the server reported one.
    pub fn latest_in_stage(&self, stage: ModelStage) -> Option<&ModelVersion> {
        self.latest_versions
            .iter()
            .filter(|version| version.current_stage == stage)
            .max_by_key(|version| version.number().unwrap_or(0))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelVersion {
    pub name: String,
    /// Sequential per model name, rendered as a string by the server.
    pub version: String,
    #[serde(default, with = "opt_int64")]
    pub creation_timestamp: Option<i64>,
    #[serde(default, with = "opt_int64")]
    pub last_updated_timestamp: Option<i64>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub current_stage: ModelStage,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub run_id: Option<RunId>,
    #[serde(default)]
    pub status: Option<ModelVersionStatus>,
    #[serde(default)]
    pub tags: TagCollection<ModelVersionTag>,
}

impl ModelVersion {
    pub fn number(&self) -> Option<u64> {
        self.version.parse().ok()
    }
}

/// Deployment stage of a model version. Any stage may follow any other.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelStage {
    None,
    Staging,
    Production,
    Archived,
}

impl Default for ModelStage {
    fn default() -> Self {
        ModelStage::None
    }
}

impl ModelStage {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelStage::None => "None",
            ModelStage::Staging => "Staging",
            ModelStage::Production => "Production",
            ModelStage::Archived => "Archived",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModelVersionStatus {
    PendingRegistration,
    FailedRegistration,
    Ready,
}
