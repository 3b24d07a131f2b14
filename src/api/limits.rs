//! Request size limits enforced by the tracking server.

/// Maximum number of metrics, params and tags in one `log-batch` request.
pub const BATCH_ITEMS: usize = 1000;
pub const BATCH_METRICS: usize = 1000;
pub const BATCH_PARAMS: usize = 100;
pub const BATCH_TAGS: usize = 100;
