//! Finalized traces and their spans.
//!
//! A [`Trace`] is produced by [`TraceBuilder::build`](crate::tracking::TraceBuilder::build)
//! and never changes afterwards.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

use crate::{
    api::{int64, opt_int64, tag::TraceTag},
    collection::TagCollection,
    ExperimentId, TraceId,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SpanStatus {
    Unset,
    Ok,
    Error,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TraceState {
    #[serde(alias = "TRACE_STATUS_UNSPECIFIED")]
    InProgress,
    Ok,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanEvent {
    pub name: String,
    #[serde(with = "int64")]
    pub time_ns: i64,
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub trace_id: TraceId,
    pub span_id: String,
    pub name: String,
    #[serde(with = "int64")]
    pub start_time_ns: i64,
    #[serde(default, with = "opt_int64")]
    pub end_time_ns: Option<i64>,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub status: SpanStatus,
    pub span_type: String,
    #[serde(default)]
    pub inputs: Option<Value>,
    #[serde(default)]
    pub outputs: Option<Value>,
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
    #[serde(default)]
    pub events: Vec<SpanEvent>,
}

impl Span {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn duration_ns(&self) -> Option<i64> {
        self.end_time_ns.map(|end| end - self.start_time_ns)
    }
}

/// Summary of a trace, named the way the tracking server names it on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceInfo {
    #[serde(rename = "request_id")]
    pub trace_id: TraceId,
    pub experiment_id: ExperimentId,
    #[serde(rename = "timestamp_ms", with = "int64")]
    pub request_time_ms: i64,
    #[serde(rename = "status")]
    pub state: TraceState,
    #[serde(rename = "execution_time_ms", default, with = "int64")]
    pub duration_ms: i64,
    #[serde(default)]
    pub tags: TagCollection<TraceTag>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraceData {
    #[serde(default)]
    pub spans: Vec<Span>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trace {
    pub info: TraceInfo,
    #[serde(default)]
    pub data: TraceData,
}

impl Trace {
    pub fn trace_id(&self) -> &TraceId {
        &self.info.trace_id
    }

    pub fn spans(&self) -> &[Span] {
        &self.data.spans
    }

    pub fn span(&self, span_id: &str) -> Option<&Span> {
        self.data.spans.iter().find(|span| span.span_id == span_id)
    }

    /// Spans without a parent. More than one root is allowed.
    pub fn root_spans(&self) -> impl Iterator<Item = &Span> {
        self.data.spans.iter().filter(|span| span.is_root())
    }

    pub fn children<'a>(&'a self, span_id: &'a str) -> impl Iterator<Item = &'a Span> + 'a {
        self.data
            .spans
            .iter()
            .filter(move |span| span.parent_id.as_deref() == Some(span_id))
    }

    /// Spans whose parent is not part of this trace, e.g. a remote caller.
    pub fn orphans(&self) -> impl Iterator<Item = &Span> {
        let known: HashSet<&str> = self.data.spans.iter().map(|span| span.span_id.as_str()).collect();
        self.data.spans.iter().filter(move |span| match &span.parent_id {
            Some(parent) => !known.contains(parent.as_str()),
            None => false,
        })
    }

    pub fn has_errors(&self) -> bool {
        self.data.spans.iter().any(|span| span.status == SpanStatus::Error)
    }
}
