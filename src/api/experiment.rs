use serde::{Serialize, Deserialize};

use crate::{
    api::{opt_int64, tag::ExperimentTag},
    collection::TagCollection,
    ExperimentId,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experiment {
    pub experiment_id: ExperimentId,
    pub name: String,
    #[serde(default)]
    pub artifact_location: String,
    #[serde(default)]
    pub lifecycle_stage: String,
    #[serde(default, with = "opt_int64")]
    pub last_update_time: Option<i64>,
    #[serde(default, with = "opt_int64")]
    pub creation_time: Option<i64>,
    #[serde(default)]
    pub tags: TagCollection<ExperimentTag>,
}
