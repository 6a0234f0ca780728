//! Key-derivation strategies.
//!
//! A derived attribute's effective value is computed at encode time (and at
//! creation time) instead of being trusted from the instance. Evaluation order:
//! 1. `only_default` with a value already present: keep it.
//! 2. `HashKey`: the hash key's serialized text, re-read through this
//!    attribute's own codec.
//! 3. `Function`: whatever the function returns.
//! 4. `Field`: the sibling's serialized text, re-read through this
//!    attribute's own codec.

use crate::{
    Error, codec,
    entity::Entity,
    model::{attribute::Attribute, entity::EntityType},
    value::Value,
};
use std::{fmt, sync::Arc};

///
/// DeriveFn
///

pub type DeriveFn = Arc<dyn Fn(&DeriveContext<'_>) -> Result<Value, Error> + Send + Sync>;

///
/// DeriveSource
///

#[derive(Clone)]
pub enum DeriveSource {
    /// Name of a sibling attribute.
    Field(String),
    HashKey,
    Function(DeriveFn),
}

impl fmt::Debug for DeriveSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => f.debug_tuple("Field").field(name).finish(),
            Self::HashKey => f.write_str("HashKey"),
            Self::Function(_) => f.write_str("Function(..)"),
        }
    }
}

///
/// DeriveContext
///
/// Inputs handed to a derivation function. `entity` is `None` when a range
/// key is completed for a key-only lookup, where no instance exists.
///

pub struct DeriveContext<'a> {
    pub hash_key: &'a Value,
    pub current: &'a Value,
    pub entity: Option<&'a Entity>,
    pub attribute: &'a Attribute,
}

// Serialize `value` through `source`, then read the text back through `target`.
fn rekey(
    source: &codec::AttributeKind,
    value: &Value,
    target: &Attribute,
) -> Result<Value, Error> {
    match codec::key_text(source, value)? {
        Some(text) => Ok(codec::value_from_text(target.kind(), &text)?),
        None => Ok(Value::Null),
    }
}

/// Effective value of `attr`, or `current` when the attribute is not derived.
pub(crate) fn effective_value(
    ty: &EntityType,
    attr: &Attribute,
    hash_key: &Value,
    current: &Value,
    entity: Option<&Entity>,
) -> Result<Value, Error> {
    let Some(source) = attr.derivation() else {
        return Ok(current.clone());
    };
    if attr.is_only_default() && !current.is_null() {
        return Ok(current.clone());
    }

    let derived = match source {
        DeriveSource::HashKey => rekey(ty.hash_attribute().kind(), hash_key, attr),
        DeriveSource::Function(f) => f(&DeriveContext {
            hash_key,
            current,
            entity,
            attribute: attr,
        }),
        DeriveSource::Field(field) => match entity {
            Some(entity) => match entity.key_text_of(field)? {
                Some(text) => codec::value_from_text(attr.kind(), &text).map_err(Error::from),
                None => Ok(Value::Null),
            },
            None => Ok(Value::Null),
        },
    };

    derived.map_err(|err| err.in_attribute(ty.name(), attr.name()))
}
