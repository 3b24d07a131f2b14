//! Queryable in-memory collections over the values logged for a run.
//!
//! All query methods are pure: they never fail and return new collections,
//! leaving the receiver untouched. Only `add`/`remove` mutate.

mod keyed;
mod metric;

pub use keyed::{KeyedCollection, ParameterCollection, TagCollection};
pub use metric::{MetricCollection, MinMax};
