use serde::{Deserialize, Serialize};

use crate::api::opt_int64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub path: String,
    #[serde(default)]
    pub is_dir: bool,
    #[serde(default, with = "opt_int64")]
    pub file_size: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtifactList {
    #[serde(default)]
    pub root_uri: String,
    #[serde(default)]
    pub files: Vec<FileInfo>,
}

impl ArtifactList {
    pub fn directories(&self) -> impl Iterator<Item = &FileInfo> {
        self.files.iter().filter(|file| file.is_dir)
    }

    pub fn total_size(&self) -> i64 {
        self.files.iter().filter_map(|file| file.file_size).sum()
    }
}
