use crate::{
    api::{
        error::{BuildError, ValidationError},
        model::RegisteredModel,
        tag::RegisteredModelTag,
    },
    collection::TagCollection,
    Client,
};

/// Configures a registered model and creates it with a single request.
pub struct ModelBuilder<'c, C: Client + ?Sized> {
    client: &'c mut C,
    name: String,
    description: Option<String>,
    tags: TagCollection<RegisteredModelTag>,
}

impl<'c, C: Client + ?Sized> ModelBuilder<'c, C> {
    pub fn new(client: &'c mut C, name: impl Into<String>) -> Self {
        ModelBuilder {
            client,
            name: name.into(),
            description: None,
            tags: TagCollection::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.add(RegisteredModelTag::new(key, value));
        self
    }

    pub fn create(self) -> Result<RegisteredModel, BuildError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name").into());
        }
        tracing::debug!(name = %self.name, "registering model");
        let model = self.client.create_registered_model(
            &self.name,
            self.description.as_deref(),
            self.tags.as_slice(),
        )?;
        Ok(model)
    }
}
