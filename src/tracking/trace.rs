use serde_json::{Map, Value};
use std::{
    cell::RefCell,
    collections::BTreeMap,
    error::Error,
    sync::Arc,
};

use crate::{
    api::{
        error::BuildError,
        tag::TraceTag,
        trace::{Span, SpanEvent, SpanStatus, Trace, TraceData, TraceInfo, TraceState},
    },
    collection::TagCollection,
    tracking::clock::{Clock, SystemClock},
    Client, ExperimentId, TraceId,
};

/// Span types understood by the MLflow UI. Any other string is accepted as well.
pub mod span_type {
    pub const UNKNOWN: &str = "UNKNOWN";
    pub const LLM: &str = "LLM";
    pub const CHAIN: &str = "CHAIN";
    pub const AGENT: &str = "AGENT";
    pub const TOOL: &str = "TOOL";
    pub const RETRIEVER: &str = "RETRIEVER";
    pub const EMBEDDING: &str = "EMBEDDING";
}

/// Collects the spans of one trace.
///
/// Spans are started with [`start_span`](Self::start_span) and become part of
/// the trace once they are [ended](SpanBuilder::end). Several spans may be
/// open at the same time, which is how nesting is expressed:
///
/// ```
/// # use mlflow::tracking::trace::{TraceBuilder, span_type};
/// let trace = TraceBuilder::new("0".into());
/// let root = trace.start_span("answer", span_type::CHAIN);
/// trace
///     .start_span("lookup", span_type::RETRIEVER)
///     .with_parent(root.span_id())
///     .end();
/// root.end();
/// let trace = trace.build();
/// assert_eq!(trace.spans().len(), 2);
/// ```
pub struct TraceBuilder {
    trace_id: TraceId,
    experiment_id: ExperimentId,
    clock: Arc<dyn Clock>,
    start_time_ns: i64,
    tags: TagCollection<TraceTag>,
    spans: RefCell<Vec<Span>>,
    root_span_id: RefCell<Option<String>>,
}

impl TraceBuilder {
    pub fn new(experiment_id: ExperimentId) -> Self {
        TraceBuilder::with_clock(experiment_id, Arc::new(SystemClock))
    }

    pub fn with_clock(experiment_id: ExperimentId, clock: Arc<dyn Clock>) -> Self {
        let trace_id = TraceId::generate();
        tracing::trace!(trace = %trace_id, "starting trace");
        TraceBuilder {
            trace_id,
            experiment_id,
            start_time_ns: clock.now_nanos(),
            clock,
            tags: TagCollection::new(),
            spans: RefCell::new(Vec::new()),
            root_span_id: RefCell::new(None),
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.add(TraceTag::new(key, value));
        self
    }

    pub fn trace_id(&self) -> &TraceId {
        &self.trace_id
    }

    pub fn start_span(&self, name: impl Into<String>, span_type: impl Into<String>) -> SpanBuilder<'_> {
        SpanBuilder {
            trace: self,
            span: Span {
                trace_id: self.trace_id.clone(),
                span_id: new_span_id(),
                name: name.into(),
                start_time_ns: self.clock.now_nanos(),
                end_time_ns: None,
                parent_id: None,
                status: SpanStatus::Unset,
                span_type: span_type.into(),
                inputs: None,
                outputs: None,
                attributes: BTreeMap::new(),
                events: Vec::new(),
            },
            failed: false,
        }
    }

    /// Id of the root span that ended most recently.
    pub fn root_span_id(&self) -> Option<String> {
        self.root_span_id.borrow().clone()
    }

    /// A copy of the spans ended so far.
    pub fn spans(&self) -> Vec<Span> {
        self.spans.borrow().clone()
    }

    /// Finishes the trace. Spans that were never ended are not included.
    pub fn build(self) -> Trace {
        let end_time_ns = self.clock.now_nanos().max(self.start_time_ns);
        let spans = self.spans.into_inner();
        let state = if spans.iter().any(|span| span.status == SpanStatus::Error) {
            TraceState::Error
        } else {
            TraceState::Ok
        };
        tracing::trace!(trace = %self.trace_id, spans = spans.len(), ?state, "trace finished");
        Trace {
            info: TraceInfo {
                trace_id: self.trace_id,
                experiment_id: self.experiment_id,
                request_time_ms: self.start_time_ns / 1_000_000,
                state,
                duration_ms: (end_time_ns - self.start_time_ns) / 1_000_000,
                tags: self.tags,
            },
            data: TraceData { spans },
        }
    }

    fn attach(&self, span: Span) {
        if span.is_root() {
            *self.root_span_id.borrow_mut() = Some(span.span_id.clone());
        }
        self.spans.borrow_mut().push(span);
    }
}

/// An open span. It is added to its trace by [`end`](Self::end).
#[must_use = "a span is only recorded once it is ended"]
pub struct SpanBuilder<'t> {
    trace: &'t TraceBuilder,
    span: Span,
    failed: bool,
}

impl<'t> SpanBuilder<'t> {
    pub fn span_id(&self) -> &str {
        &self.span.span_id
    }

    pub fn trace_id(&self) -> &TraceId {
        &self.span.trace_id
    }

    /// The parent does not have to be part of this trace.
    pub fn with_parent(mut self, span_id: impl Into<String>) -> Self {
        self.span.parent_id = Some(span_id.into());
        self
    }

    pub fn with_inputs(mut self, inputs: Value) -> Self {
        self.span.inputs = Some(inputs);
        self
    }

    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        insert(&mut self.span.inputs, key.into(), value.into());
        self
    }

    pub fn with_outputs(mut self, outputs: Value) -> Self {
        self.span.outputs = Some(outputs);
        self
    }

    pub fn with_output(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        insert(&mut self.span.outputs, key.into(), value.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.span.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_event(mut self, name: impl Into<String>, attributes: BTreeMap<String, Value>) -> Self {
        self.span.events.push(SpanEvent {
            name: name.into(),
            time_ns: self.trace.clock.now_nanos(),
            attributes,
        });
        self
    }

    /// Marks the span as failed and records the error as an `exception` event.
    ///
    /// `exception.type` is the name of `E`. For a `&dyn Error` that is the trait
    /// object itself, so use [`with_error_as`](Self::with_error_as) to name the
    /// concrete type.
    pub fn with_error<E: Error + ?Sized>(self, error: &E) -> Self {
        self.with_error_as(std::any::type_name::<E>(), error)
    }

    /// Like [`with_error`](Self::with_error) with an explicit `exception.type`.
    pub fn with_error_as<E: Error + ?Sized>(mut self, exception_type: impl Into<String>, error: &E) -> Self {
        let mut causes = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            causes.push(Value::from(cause.to_string()));
            source = cause.source();
        }
        let mut attributes = BTreeMap::new();
        attributes.insert("exception.type".to_string(), Value::from(exception_type.into()));
        attributes.insert("exception.message".to_string(), Value::from(error.to_string()));
        attributes.insert("exception.causes".to_string(), Value::Array(causes));
        self.failed = true;
        self.with_event("exception", attributes)
    }

    /// Ends the span as `ERROR` if [`with_error`](Self::with_error) was called, `OK` otherwise.
    pub fn end(self) -> &'t TraceBuilder {
        self.finish(None)
    }

    pub fn end_with_status(self, status: SpanStatus) -> &'t TraceBuilder {
        self.finish(Some(status))
    }

    fn finish(self, status: Option<SpanStatus>) -> &'t TraceBuilder {
        let SpanBuilder { trace, mut span, failed } = self;
        span.end_time_ns = Some(trace.clock.now_nanos().max(span.start_time_ns));
        span.status = match status {
            Some(status) => status,
            None if failed => SpanStatus::Error,
            None => SpanStatus::Ok,
        };
        tracing::trace!(trace = %span.trace_id, span = %span.span_id, name = %span.name, status = ?span.status, "span ended");
        trace.attach(span);
        trace
    }
}

fn new_span_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(16);
    id
}

fn insert(slot: &mut Option<Value>, key: String, value: Value) {
    match slot {
        Some(Value::Object(map)) => {
            map.insert(key, value);
        }
        _ => {
            let mut map = Map::new();
            map.insert(key, value);
            *slot = Some(Value::Object(map));
        }
    }
}

/// Records a finished trace on the tracking server.
///
/// Only the trace info is sent: start time, duration, state and tags. The
/// spans stay local, the REST API has no endpoint for uploading them.
/// The server assigns its own request id, the returned info carries it.
pub fn log_trace<C: Client + ?Sized>(client: &mut C, trace: &Trace) -> Result<TraceInfo, BuildError> {
    let info = &trace.info;
    let started = client.start_trace(&info.experiment_id, info.request_time_ms, info.tags.as_slice())?;
    let ended = client.end_trace(
        &started.trace_id,
        info.request_time_ms + info.duration_ms,
        info.state,
    )?;
    tracing::debug!(trace = %ended.trace_id, state = ?ended.state, "trace logged");
    Ok(ended)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backend::{testing::RecordingTransport, RestClient},
        tracking::clock::ManualClock,
    };
    use serde_json::json;
    use std::{collections::HashSet, fmt};

    #[derive(Debug)]
    struct Failure {
        message: &'static str,
        source: Option<Box<Failure>>,
    }

    impl fmt::Display for Failure {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.message)
        }
    }

    impl Error for Failure {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            self.source.as_deref().map(|source| source as &(dyn Error + 'static))
        }
    }

    fn builder() -> (Arc<ManualClock>, TraceBuilder) {
        let clock = Arc::new(ManualClock::new(1_000_000_000));
        let trace = TraceBuilder::with_clock(ExperimentId::from("0"), clock.clone());
        (clock, trace)
    }

    #[test]
    fn spans_share_the_trace_id_and_parents_resolve() {
        let (_, trace) = builder();
        let root = trace.start_span("root", span_type::CHAIN);
        let root_id = root.span_id().to_string();
        trace.start_span("child", span_type::TOOL).with_parent(root_id.clone()).end();
        trace.start_span("remote", span_type::TOOL).with_parent("abcdef0123456789").end();
        root.end();
        assert_eq!(trace.root_span_id(), Some(root_id.clone()));

        let trace = trace.build();
        let known: HashSet<&str> = trace.spans().iter().map(|span| span.span_id.as_str()).collect();
        for span in trace.spans() {
            assert_eq!(&span.trace_id, trace.trace_id());
            assert_eq!(span.span_id.len(), 16);
        }
        assert_eq!(trace.children(&root_id).count(), 1);
        let orphans: Vec<_> = trace.orphans().collect();
        assert_eq!(orphans.len(), 1);
        assert!(!known.contains(orphans[0].parent_id.as_deref().unwrap()));
    }

    #[test]
    fn an_error_span_fails_the_trace() {
        let (_, trace) = builder();
        trace.start_span("ok", span_type::UNKNOWN).end();
        let failure = Failure { message: "boom", source: None };
        trace.start_span("bad", span_type::UNKNOWN).with_error(&failure).end();
        let trace = trace.build();
        assert_eq!(trace.info.state, TraceState::Error);
        assert!(trace.has_errors());
    }

    #[test]
    fn empty_and_successful_traces_are_ok() {
        let (_, empty) = builder();
        assert_eq!(empty.build().info.state, TraceState::Ok);

        let (_, trace) = builder();
        trace.start_span("a", span_type::LLM).end();
        trace.start_span("b", span_type::LLM).end_with_status(SpanStatus::Ok);
        assert_eq!(trace.build().info.state, TraceState::Ok);
    }

    #[test]
    fn explicit_status_wins_over_errors() {
        let (_, trace) = builder();
        let failure = Failure { message: "retried", source: None };
        trace
            .start_span("flaky", span_type::TOOL)
            .with_error(&failure)
            .end_with_status(SpanStatus::Ok);
        assert_eq!(trace.spans()[0].status, SpanStatus::Ok);
        assert_eq!(trace.build().info.state, TraceState::Ok);
    }

    #[test]
    fn ending_freezes_timing() {
        let (clock, trace) = builder();
        let span = trace.start_span("work", span_type::CHAIN);
        clock.advance(3_000_000);
        span.end();
        clock.advance(5_000_000);
        let ended = trace.spans()[0].clone();
        assert_eq!(ended.start_time_ns, 1_000_000_000);
        assert_eq!(ended.end_time_ns, Some(1_003_000_000));
        assert_eq!(ended.duration_ns(), Some(3_000_000));

        let trace = trace.build();
        assert_eq!(trace.spans()[0], ended);
        assert_eq!(trace.info.request_time_ms, 1_000);
        assert_eq!(trace.info.duration_ms, 8);
    }

    #[test]
    fn end_time_never_precedes_start_time() {
        let (clock, trace) = builder();
        let span = trace.start_span("skewed", span_type::UNKNOWN);
        clock.set(0);
        span.end();
        let spans = trace.spans();
        let span = &spans[0];
        assert!(span.end_time_ns.unwrap() >= span.start_time_ns);
    }

    #[test]
    fn errors_are_recorded_with_their_causes() {
        let (_, trace) = builder();
        let failure = Failure {
            message: "request failed",
            source: Some(Box::new(Failure { message: "connection reset", source: None })),
        };
        trace.start_span("call", span_type::TOOL).with_error(&failure).end();
        let spans = trace.spans();
        let event = &spans[0].events[0];
        assert_eq!(spans[0].status, SpanStatus::Error);
        assert_eq!(event.name, "exception");
        assert_eq!(event.attributes["exception.message"], json!("request failed"));
        assert_eq!(event.attributes["exception.causes"], json!(["connection reset"]));
        assert!(event.attributes["exception.type"].as_str().unwrap().ends_with("Failure"));
    }

    #[test]
    fn boxed_errors_can_be_named() {
        let (_, trace) = builder();
        let boxed: Box<dyn Error> = Box::new(Failure { message: "timeout", source: None });
        trace.start_span("anonymous", span_type::TOOL).with_error(boxed.as_ref()).end();
        trace
            .start_span("named", span_type::TOOL)
            .with_error_as("TimeoutError", boxed.as_ref())
            .end();
        let spans = trace.spans();
        let anonymous = &spans[0].events[0].attributes;
        let named = &spans[1].events[0].attributes;
        assert!(anonymous["exception.type"].as_str().unwrap().contains("dyn"));
        assert_eq!(named["exception.type"], json!("TimeoutError"));
        assert_eq!(named["exception.message"], json!("timeout"));
        assert_eq!(spans[1].status, SpanStatus::Error);
    }

    #[test]
    fn inputs_and_outputs_accumulate() {
        let (_, trace) = builder();
        trace
            .start_span("llm", span_type::LLM)
            .with_input("prompt", "hi")
            .with_input("temperature", 0.2)
            .with_input("prompt", "hello")
            .with_output("text", "world")
            .with_attribute("model", "small")
            .end();
        let spans = trace.spans();
        let span = &spans[0];
        assert_eq!(span.inputs, Some(json!({ "prompt": "hello", "temperature": 0.2 })));
        assert_eq!(span.outputs, Some(json!({ "text": "world" })));
        assert_eq!(span.attributes["model"], json!("small"));
    }

    #[test]
    fn spans_can_be_ended_while_a_snapshot_is_held() {
        let (_, trace) = builder();
        let root = trace.start_span("root", span_type::CHAIN);
        trace.start_span("first", span_type::TOOL).end();
        let seen = trace.spans();
        root.end();
        assert_eq!(seen.len(), 1);
        assert_eq!(trace.spans().len(), 2);
    }

    #[test]
    fn multiple_roots_are_allowed() {
        let (_, trace) = builder();
        trace.start_span("first", span_type::CHAIN).end();
        trace.start_span("second", span_type::CHAIN).end();
        let second = trace.spans()[1].span_id.clone();
        assert_eq!(trace.root_span_id(), Some(second));
        assert_eq!(trace.build().root_spans().count(), 2);
    }

    #[test]
    fn unfinished_spans_are_dropped() {
        let (_, trace) = builder();
        drop(trace.start_span("abandoned", span_type::UNKNOWN));
        assert!(trace.build().spans().is_empty());
    }

    #[test]
    fn logging_a_trace_starts_and_ends_it() {
        let (clock, builder) = builder();
        let builder = builder.with_tag("env", "test");
        builder.start_span("root", span_type::CHAIN).end();
        clock.advance(250_000_000);
        let trace = builder.build();

        let info = json!({
            "trace_info": {
                "request_id": "tr-server",
                "experiment_id": "0",
                "timestamp_ms": "1000",
                "status": "IN_PROGRESS"
            }
        });
        let mut ended = info.clone();
        ended["trace_info"]["status"] = json!("OK");
        let transport = RecordingTransport::new().respond(info).respond(ended);
        let mut client = RestClient::with_transport(transport);

        let logged = log_trace(&mut client, &trace).unwrap();
        assert_eq!(logged.trace_id.as_ref(), "tr-server");
        assert_eq!(logged.state, TraceState::Ok);

        let calls = &client.transport().calls;
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|call| call.payload.get("spans").is_none()));
        assert_eq!(calls[0].payload["tags"][0]["key"], "env");
        assert_eq!(calls[1].path, "2.0/mlflow/traces/tr-server");
        assert_eq!(calls[1].payload["timestamp_ms"], 1_250);
        assert_eq!(calls[1].payload["status"], "OK");
    }
}
