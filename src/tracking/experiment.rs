use crate::{
    api::{
        error::{BuildError, ValidationError},
        tag::ExperimentTag,
    },
    collection::TagCollection,
    Client, ExperimentId,
};

/// Configures a MLflow Experiment and creates it with a single request.
pub struct ExperimentBuilder<'c, C: Client + ?Sized> {
    client: &'c mut C,
    name: String,
    artifact_location: Option<String>,
    tags: TagCollection<ExperimentTag>,
}

impl<'c, C: Client + ?Sized> ExperimentBuilder<'c, C> {
    pub fn new(client: &'c mut C, name: impl Into<String>) -> Self {
        ExperimentBuilder {
            client,
            name: name.into(),
            artifact_location: None,
            tags: TagCollection::new(),
        }
    }

    pub fn with_artifact_location(mut self, location: impl Into<String>) -> Self {
        self.artifact_location = Some(location.into());
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.add(ExperimentTag::new(key, value));
        self
    }

    /// Fails with [`CreateError::AlreadyExists`](crate::api::error::CreateError::AlreadyExists)
    /// inside [`BuildError::Create`] if the name is taken.
    pub fn create(self) -> Result<ExperimentId, BuildError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name").into());
        }
        tracing::debug!(name = %self.name, "creating experiment");
        let id = self.client.create_experiment(
            &self.name,
            self.artifact_location.as_deref(),
            self.tags.as_slice(),
        )?;
        Ok(id)
    }
}
