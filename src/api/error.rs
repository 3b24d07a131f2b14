use thiserror::Error;

/// Opaque failure of the storage backend.
///
/// For the REST backend this wraps a [`TransportError`](crate::backend::TransportError),
/// which can be recovered with [`anyhow::Error::downcast_ref`].
pub type StorageError = anyhow::Error;

#[derive(Error, Debug)]
pub enum CreateError {
    #[error("the resource {0} already exists")]
    AlreadyExists(String),
    #[error("an error ocurred in the storage backend: {0:?}")]
    Storage(#[from] StorageError),
}

#[derive(Error, Debug)]
pub enum GetError {
    #[error("the resource {0} does not exist")]
    DoesNotExist(String),
    #[error("an error ocurred in the storage backend: {0:?}")]
    Storage(#[from] StorageError),
}

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("only up to 1000 items can be logged at once, found {0}")]
    ToManyItems(u32),
    #[error("only up to 1000 metrics can be logged at once, found {0}")]
    ToManyMetrics(u32),
    #[error("only up to 100 params can be logged at once, found {0}")]
    ToManyParams(u32),
    #[error("only up to 100 tags can be logged at once, found {0}")]
    ToManyTags(u32),
    #[error("an error ocurred in the storage backend: {0:?}")]
    Storage(#[from] StorageError),
}

pub type DeleteError = GetError;
pub type UpdateError = GetError;

/// A value could not be constructed from the data it was given.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("field `{field}` is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Failure of a builder's finalizing call.
///
/// The underlying error is kept as is, so callers can still match on
/// e.g. [`CreateError::AlreadyExists`].
#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("creating the resource failed: {0}")]
    Create(#[from] CreateError),
    #[error("fetching the resource failed: {0}")]
    Get(#[from] GetError),
    #[error("logging the batch failed: {0}")]
    Batch(#[from] BatchError),
    #[error("an error ocurred in the storage backend: {0:?}")]
    Storage(#[from] StorageError),
}
