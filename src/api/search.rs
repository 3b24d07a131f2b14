use crate::api::{experiment::Experiment, run::Run};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageToken(String);
impl AsRef<str> for PageToken {
    fn as_ref(&self) -> &str {
        self.0.as_ref()
    }
}
impl From<String> for PageToken {
    fn from(id: String) -> Self {
        PageToken(id)
    }
}
impl From<&str> for PageToken {
    fn from(id: &str) -> Self {
        PageToken(id.to_owned())
    }
}

#[derive(Debug, Deserialize)]
pub struct Search {
    #[serde(default)]
    pub runs: Vec<Run>,
    #[serde(default)]
    pub next_page_token: Option<PageToken>,
}

#[derive(Debug, Deserialize)]
pub struct ExperimentSearch {
    #[serde(default)]
    pub experiments: Vec<Experiment>,
    #[serde(default)]
    pub next_page_token: Option<PageToken>,
}

impl Search {
    pub fn has_more(&self) -> bool {
        self.next_page_token.as_ref().map_or(false, |token| !token.as_ref().is_empty())
    }
}

impl ExperimentSearch {
    pub fn has_more(&self) -> bool {
        self.next_page_token.as_ref().map_or(false, |token| !token.as_ref().is_empty())
    }
}
