//! Client for the [MLflow](https://mlflow.org) tracking server.
//!
//! [`RestClient`] implements the [`Client`] trait over HTTP. The builders in
//! [`tracking`] create runs, experiments, registered models and traces with
//! as few requests as possible, and the types in [`collection`] query the
//! params, metrics and tags a run carries.

pub mod api;
pub mod backend;
pub mod collection;
pub mod config;
pub mod tracking;

pub use api::client::Client;
pub use api::error::BuildError;
pub use api::id::{ExperimentId, RunId, TraceId};
pub use backend::RestClient;
pub use config::ClientConfig;

/// Utility function to create a MLflow timestamp.
pub fn timestamp() -> i64 {
    use tracking::clock::{Clock, SystemClock};
    SystemClock.now_millis()
}
