use crate::{error::ErrorClass, model::entity::EntityType};
use std::{collections::BTreeMap, sync::Arc};
use thiserror::Error as ThisError;

///
/// RegistryError
///

#[derive(Debug, ThisError)]
pub enum RegistryError {
    #[error("discriminator '{0}' is already registered")]
    DuplicateDiscriminator(String),

    #[error("no entity type is registered for discriminator '{0}'")]
    UnknownDiscriminator(String),

    #[error("raw item has no discriminator attribute '{attribute}'")]
    MissingDiscriminator { attribute: String },

    #[error("entity type '{0}' is not registered")]
    UnknownEntityType(String),

    #[error(
        "{entity} stores its discriminator under '{found}', but the table reads '{expected}'"
    )]
    DiscriminatorName {
        entity: String,
        expected: String,
        found: String,
    },

    #[error("entity type '{0}' is not registered on a live database")]
    Detached(String),
}

impl RegistryError {
    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::DuplicateDiscriminator(_)
            | Self::DiscriminatorName { .. }
            | Self::Detached(_) => ErrorClass::Configuration,
            Self::UnknownDiscriminator(_)
            | Self::MissingDiscriminator { .. }
            | Self::UnknownEntityType(_) => ErrorClass::Lookup,
        }
    }
}

///
/// Registry
///
/// Discriminator → entity type. Filled while the database is built and
/// read-only afterwards. The discriminator of a type is its name.
///

#[derive(Debug, Default)]
pub struct Registry {
    types: BTreeMap<String, Arc<EntityType>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, ty: Arc<EntityType>) -> Result<(), RegistryError> {
        let key = ty.name().to_string();
        if self.types.contains_key(&key) {
            return Err(RegistryError::DuplicateDiscriminator(key));
        }
        self.types.insert(key, ty);

        Ok(())
    }

    /// Entity type tagged with `discriminator`.
    pub fn resolve(&self, discriminator: &str) -> Result<Arc<EntityType>, RegistryError> {
        self.types
            .get(discriminator)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownDiscriminator(discriminator.to_string()))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<EntityType>> {
        self.types.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<EntityType>> {
        self.types.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
