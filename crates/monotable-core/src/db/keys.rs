use crate::{
    Error, codec,
    entity::Entity,
    error::{ErrorClass, ErrorOrigin},
    item::{AttributeValue, PrimaryKey},
    model::{
        SchemaError,
        attribute::KeyShape,
        derive::{DeriveSource, effective_value},
        entity::EntityType,
    },
    value::Value,
};
use log::trace;

/// Stored range key for an instance (or a key-only lookup when `entity` is
/// `None`) whose range key is unset. `None` when it cannot be computed.
pub(crate) fn complete_range_key(
    ty: &EntityType,
    hash_key: &Value,
    entity: Option<&Entity>,
) -> Result<Option<AttributeValue>, Error> {
    let Some(attr) = ty.range_attribute() else {
        return Ok(None);
    };

    let completed = match attr.derivation() {
        None => match attr.key_shape() {
            KeyShape::Static(literal) => Some(AttributeValue::S(literal.to_string())),
            KeyShape::Prefixed(prefix) => Some(AttributeValue::S(prefix.to_string())),
            KeyShape::Other => None,
        },
        Some(_) if attr.is_only_default() && entity.is_none() => None,
        Some(DeriveSource::Field(_)) if entity.is_none() => None,
        Some(_) => {
            let value = effective_value(ty, attr, hash_key, &Value::Null, entity)?;
            let encoded = codec::encode(attr.kind(), &value)
                .map_err(|err| Error::from(err).in_attribute(ty.name(), attr.name()))?;

            (!encoded.is_null()).then_some(encoded)
        }
    };

    if let Some(range) = &completed {
        trace!("completed {}.{} as '{range}'", ty.name(), attr.name());
    }

    Ok(completed)
}

/// Primary key addressing one item of `ty`, completing the range key when
/// the caller leaves it out.
pub(crate) fn lookup_key(
    ty: &EntityType,
    hash_key: &Value,
    range_key: Option<&Value>,
) -> Result<PrimaryKey, Error> {
    let hash_attr = ty.hash_attribute();
    let hash = codec::encode(hash_attr.kind(), hash_key)
        .map_err(|err| Error::from(err).in_attribute(ty.name(), hash_attr.name()))?;
    if hash.is_null() {
        return Err(missing_key(ty, hash_attr.name()));
    }

    let Some(range_attr) = ty.range_attribute() else {
        if range_key.is_some_and(|v| !v.is_null()) {
            return Err(Error::new(
                ErrorClass::Type,
                ErrorOrigin::Schema,
                format!("{} declares no range key", ty.name()),
            ));
        }
        return Ok(PrimaryKey::new(hash, None));
    };

    let supplied = match range_key {
        Some(value) => codec::encode(range_attr.kind(), value)
            .map_err(|err| Error::from(err).in_attribute(ty.name(), range_attr.name()))?,
        None => AttributeValue::Null,
    };
    let range = if supplied.is_null() {
        complete_range_key(ty, hash_key, None)?
            .ok_or_else(|| missing_key(ty, range_attr.name()))?
    } else {
        supplied
    };

    Ok(PrimaryKey::new(hash, Some(range)))
}

pub(crate) fn missing_key(ty: &EntityType, attribute: &str) -> Error {
    SchemaError::MissingKey {
        entity: ty.name().to_string(),
        attribute: attribute.to_string(),
    }
    .into()
}
