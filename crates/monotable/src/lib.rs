//! ## Crate layout
//! - `core`: attribute codecs, entity types, the registry, relations, and the
//!   raw-item pipeline over a composite-key store.
//!
//! The `prelude` module is what application code imports to declare entity
//! types, bind them to a table, and work with instances.

pub use monotable_core as core;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use core::{
    DEFAULT_DISCRIMINATOR_ATTRIBUTE, DEFAULT_FOREIGN_ATTRIBUTE, Error,
    error::{ErrorClass, ErrorOrigin},
};

///
/// Prelude
/// domain vocabulary plus the in-memory store for tests and prototypes
///

pub mod prelude {
    pub use crate::core::{
        Error,
        codec::{AttributeKind, EnumModel, MapModel},
        error::ErrorClass,
        model::index::IndexModel,
        prelude::*,
        store::MemoryStore,
    };
}
