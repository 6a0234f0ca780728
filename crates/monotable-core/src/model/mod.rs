//! Runtime schema model.
//!
//! Types in `model` describe *what an entity type is*: its attributes, key
//! roles, derivation rules, indexes, and relation declarations. They are built
//! once through `EntityType::builder`, validated there, and shared read-only
//! afterwards. Instances and the raw-item pipeline live in `entity` and `db`.

pub mod attribute;
pub mod derive;
pub mod entity;
pub mod index;
pub mod relation;

#[cfg(test)]
mod tests;

use crate::error::ErrorClass;
use thiserror::Error as ThisError;

///
/// SchemaError
///
/// Declaration-time failures, plus the two runtime conditions that are
/// defined by the schema (unknown attribute, missing key).
///

#[derive(Debug, ThisError)]
pub enum SchemaError {
    #[error("entity name must not be empty")]
    EmptyEntityName,

    #[error("{entity} declares attribute '{attribute}' more than once")]
    DuplicateAttribute { entity: String, attribute: String },

    #[error("{entity} declares no hash key")]
    MissingHashKey { entity: String },

    #[error("{entity} declares more than one hash key: {first}, {second}")]
    MultipleHashKeys {
        entity: String,
        first: String,
        second: String,
    },

    #[error("{entity} declares more than one range key: {first}, {second}")]
    MultipleRangeKeys {
        entity: String,
        first: String,
        second: String,
    },

    #[error("{entity} has more than one discriminator attribute: {first}, {second}")]
    MultipleDiscriminators {
        entity: String,
        first: String,
        second: String,
    },

    #[error("{entity}.{attribute}: a discriminator cannot be a key attribute")]
    DiscriminatorKey { entity: String, attribute: String },

    #[error("{entity}.{attribute}: only_default requires a derivation source")]
    OnlyDefaultWithoutSource { entity: String, attribute: String },

    #[error("{entity}.{attribute}: derivation names unknown attribute '{field}'")]
    UnknownDeriveField {
        entity: String,
        attribute: String,
        field: String,
    },

    #[error("{entity}.{attribute}: an attribute cannot derive from itself")]
    SelfDerivation { entity: String, attribute: String },

    #[error("{entity}.{attribute}: the hash key cannot derive from the hash key")]
    HashKeyFromHashKey { entity: String, attribute: String },

    #[error("{entity}.{attribute}: {kind} attributes cannot be keys")]
    InvalidKeyType {
        entity: String,
        attribute: String,
        kind: &'static str,
    },

    #[error("{entity}.{attribute}: a foreign key cannot be a key attribute")]
    RelationKey { entity: String, attribute: String },

    #[error("{entity}.{attribute}: a foreign key cannot be derived")]
    DerivedRelation { entity: String, attribute: String },

    #[error("{entity}: index '{index}' names unknown attribute '{attribute}'")]
    UnknownIndexAttribute {
        entity: String,
        index: String,
        attribute: String,
    },

    #[error("{entity} declares {what} '{name}' more than once")]
    DuplicateDeclaration {
        entity: String,
        what: &'static str,
        name: String,
    },

    #[error("{entity} has no attribute '{attribute}'")]
    UnknownAttribute { entity: String, attribute: String },

    #[error("{entity}.{attribute}: key attribute has no value")]
    MissingKey { entity: String, attribute: String },
}

impl SchemaError {
    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::UnknownAttribute { .. } | Self::MissingKey { .. } => ErrorClass::Type,
            _ => ErrorClass::Configuration,
        }
    }
}
