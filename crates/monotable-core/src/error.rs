use crate::{
    codec::CodecError, config::ConfigError, db::RegistryError, model::SchemaError,
    relation::RelationError, store::StoreError,
};
use std::fmt;
use thiserror::Error as ThisError;

///
/// Error
///
/// Structured runtime error with a stable classification.
/// `detail` carries the module-level error so callers can match on named
/// conditions without parsing `message`.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct Error {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Optional structured error detail.
    /// The variant (if present) must correspond to `origin`.
    pub detail: Option<ErrorDetail>,
}

impl Error {
    /// Construct an error without structured detail.
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            detail: None,
        }
    }

    /// Construct the "no such item" lookup failure for one entity type.
    pub fn not_found(entity: impl Into<String>, key: impl Into<String>) -> Self {
        let entity = entity.into();
        let key = key.into();

        Self {
            class: ErrorClass::NotFound,
            origin: ErrorOrigin::Store,
            message: format!("{entity} does not exist: {key}"),
            detail: Some(ErrorDetail::NotFound { entity, key }),
        }
    }

    /// Construct an unsupported-operation marker.
    pub fn unsupported(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unsupported, origin, message)
    }

    /// Construct a type error raised while serializing one attribute.
    pub(crate) fn serialize_type(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Type, ErrorOrigin::Serialize, message)
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.detail, Some(ErrorDetail::NotFound { .. }))
    }

    #[must_use]
    pub const fn is_unknown_discriminator(&self) -> bool {
        matches!(
            self.detail,
            Some(ErrorDetail::Registry(RegistryError::UnknownDiscriminator(_)))
        )
    }

    #[must_use]
    pub const fn is_predicate_not_inferred(&self) -> bool {
        matches!(
            self.detail,
            Some(ErrorDetail::Relation(
                RelationError::PredicateNotInferred { .. }
            ))
        )
    }

    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self.class, ErrorClass::Unsupported)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }

    // Prefix the message with the attribute being processed, keeping the detail.
    #[must_use]
    pub(crate) fn in_attribute(mut self, entity: &str, attribute: &str) -> Self {
        self.message = format!("{entity}.{attribute}: {}", self.message);
        self
    }
}

///
/// ErrorDetail
///

#[derive(Debug)]
pub enum ErrorDetail {
    Codec(CodecError),
    Config(ConfigError),
    NotFound { entity: String, key: String },
    Registry(RegistryError),
    Relation(RelationError),
    Schema(SchemaError),
    Store(StoreError),
}

macro_rules! impl_from_module_error {
    ($err:ty, $variant:ident, $origin:expr) => {
        impl From<$err> for Error {
            fn from(err: $err) -> Self {
                Self {
                    class: err.class(),
                    origin: $origin,
                    message: err.to_string(),
                    detail: Some(ErrorDetail::$variant(err)),
                }
            }
        }
    };
}

impl_from_module_error!(CodecError, Codec, ErrorOrigin::Codec);
impl_from_module_error!(ConfigError, Config, ErrorOrigin::Config);
impl_from_module_error!(RegistryError, Registry, ErrorOrigin::Registry);
impl_from_module_error!(RelationError, Relation, ErrorOrigin::Relation);
impl_from_module_error!(SchemaError, Schema, ErrorOrigin::Schema);
impl_from_module_error!(StoreError, Store, ErrorOrigin::Store);

///
/// ErrorClass
/// Error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Configuration,
    Type,
    Encoding,
    NotFound,
    Lookup,
    Unsupported,
    Store,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Configuration => "configuration",
            Self::Type => "type",
            Self::Encoding => "encoding",
            Self::NotFound => "not_found",
            Self::Lookup => "lookup",
            Self::Unsupported => "unsupported",
            Self::Store => "store",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Component that raised the error.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Codec,
    Config,
    Registry,
    Relation,
    Schema,
    Serialize,
    Store,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Codec => "codec",
            Self::Config => "config",
            Self::Registry => "registry",
            Self::Relation => "relation",
            Self::Schema => "schema",
            Self::Serialize => "serialize",
            Self::Store => "store",
        };
        write!(f, "{label}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_distinct_from_lookup_failures() {
        let err = Error::not_found("Thread", "forum-1 / THREAD#a");

        assert!(err.is_not_found());
        assert!(!err.is_unknown_discriminator());
        assert_eq!(err.class, ErrorClass::NotFound);
        assert_eq!(
            err.display_with_class(),
            "store:not_found: Thread does not exist: forum-1 / THREAD#a"
        );
    }

    #[test]
    fn module_errors_keep_their_detail() {
        let err: Error = RegistryError::UnknownDiscriminator("Ghost".to_string()).into();

        assert_eq!(err.class, ErrorClass::Lookup);
        assert_eq!(err.origin, ErrorOrigin::Registry);
        assert!(err.is_unknown_discriminator());
        assert!(
            err.message.contains("Ghost"),
            "message should name the discriminator"
        );
    }

    #[test]
    fn attribute_context_prefixes_message() {
        let err = Error::serialize_type("cannot be null").in_attribute("Post", "title");

        assert_eq!(err.message, "Post.title: cannot be null");
        assert_eq!(err.class, ErrorClass::Type);
    }
}
