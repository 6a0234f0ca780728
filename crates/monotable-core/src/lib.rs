//! Core runtime for Monotable: attribute codecs, key derivation, the entity
//! registry, forward/reverse relations, and the raw-item pipeline that maps
//! many entity types onto one composite-key table.
#![warn(unreachable_pub)]

pub mod codec;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod item;
pub mod model;
pub mod relation;
pub mod store;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// CONSTANTS
///

/// Stored attribute name the registry reads the discriminator from when the
/// table configuration does not override it.
pub const DEFAULT_DISCRIMINATOR_ATTRIBUTE: &str = "type";

/// Related-entity attribute a foreign key points at unless declared otherwise.
pub const DEFAULT_FOREIGN_ATTRIBUTE: &str = "uuid";

// re-exports
pub use error::Error;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No stores, codecs, or pipeline helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        config::TableConfig,
        db::{Db, QueryOptions},
        entity::Entity,
        item::{AttributeValue, RawItem},
        model::{
            attribute::Attribute,
            entity::EntityType,
            relation::{ForeignKey, ReverseRelation},
        },
        relation::{ForwardRef, ReverseManager},
        store::{RangePredicate, Store},
        value::Value,
    };
}
