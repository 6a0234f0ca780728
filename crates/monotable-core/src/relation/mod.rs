//! Module: relation
//! Responsibility: runtime relation traversal.
//! Does not own: relation declarations (see `model::relation`) or storage.
//!
//! Invariants:
//! - A forward reference fetches its target at most once.
//! - Reverse queries only infer predicates for prefixed or static range keys.

mod forward;
mod reverse;


use crate::error::ErrorClass;
use thiserror::Error as ThisError;

// re-exports
pub use forward::{ForwardRef, Resolver};
pub use reverse::ReverseManager;

///
/// RelationError
///

#[derive(Debug, ThisError)]
pub enum RelationError {
    #[error(
        "cannot infer a range key predicate for {target}: {reason}; supply a predicate explicitly"
    )]
    PredicateNotInferred { target: String, reason: String },

    #[error("cannot assign {found} to {entity}.{attribute}: expected a {expected} instance or its key")]
    InvalidAssignment {
        entity: String,
        attribute: String,
        expected: String,
        found: String,
    },

    #[error("{entity}.{attribute} holds a relation; read it with forward() or related()")]
    RelationAttribute { entity: String, attribute: String },

    #[error("{entity}.{attribute} is not a forward relation")]
    NotForwardRelation { entity: String, attribute: String },

    #[error("{entity} declares no reverse relation '{name}'")]
    NotReverseRelation { entity: String, name: String },

    #[error("{entity} has no finder '{method}'")]
    MissingFinder { entity: String, method: String },

    #[error("{entity} declares no index '{index}'")]
    UnknownIndex { entity: String, index: String },

    #[error("related {entity} has no value for '{attribute}'")]
    MissingForeignValue { entity: String, attribute: String },
}

impl RelationError {
    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::PredicateNotInferred { .. }
            | Self::MissingFinder { .. }
            | Self::UnknownIndex { .. } => ErrorClass::Configuration,
            Self::InvalidAssignment { .. }
            | Self::RelationAttribute { .. }
            | Self::NotForwardRelation { .. }
            | Self::NotReverseRelation { .. }
            | Self::MissingForeignValue { .. } => ErrorClass::Type,
        }
    }
}
