//! Fluent builders that create runs, experiments, models and traces.

pub mod clock;
pub mod experiment;
pub mod model;
pub mod run;
pub mod trace;

pub use clock::{Clock, ManualClock, SystemClock};
pub use experiment::ExperimentBuilder;
pub use model::ModelBuilder;
pub use run::RunBuilder;
pub use trace::{log_trace, SpanBuilder, TraceBuilder};
