use crate::{
    Error, codec,
    db::keys::{complete_range_key, missing_key},
    entity::Entity,
    item::{AttributeValue, RawItem},
    model::{
        attribute::{Attribute, KeyRole},
        derive::effective_value,
        entity::EntityType,
        relation::ForeignKey,
    },
    relation::RelationError,
    value::Value,
};
use std::collections::BTreeMap;

static NULL_VALUE: Value = Value::Null;

/// Serialize an instance into the raw item the store holds.
///
/// Derived attributes are recomputed rather than read back, a missing range
/// key is completed when its strategy allows, and null plain attributes are
/// left out of the bucket.
pub(crate) fn encode_entity(entity: &Entity) -> Result<RawItem, Error> {
    let ty = entity.entity_type();
    let hash_value = effective_value(
        ty,
        ty.hash_attribute(),
        entity.hash_key(),
        entity.hash_key(),
        Some(entity),
    )?;

    let mut hash = AttributeValue::Null;
    let mut range = AttributeValue::Null;
    let mut attributes = BTreeMap::new();

    for (idx, attr) in ty.attributes().iter().enumerate() {
        let encoded = match attr.relation() {
            Some(fk) => encode_relation(ty, attr, fk, entity, idx)?,
            None => {
                let value = if idx == ty.hash_index() {
                    hash_value.clone()
                } else {
                    let current = entity.slot_value(idx).unwrap_or(&NULL_VALUE);
                    effective_value(ty, attr, &hash_value, current, Some(entity))?
                };

                codec::encode(attr.kind(), &value)
                    .map_err(|err| Error::from(err).in_attribute(ty.name(), attr.name()))?
            }
        };

        match attr.role() {
            KeyRole::Hash => hash = encoded,
            KeyRole::Range => range = encoded,
            KeyRole::Plain if encoded.is_null() => {
                if !attr.is_nullable() {
                    return Err(Error::serialize_type("cannot be null")
                        .in_attribute(ty.name(), attr.name()));
                }
            }
            KeyRole::Plain => {
                attributes.insert(attr.stored_name().to_string(), encoded);
            }
        }
    }

    if hash.is_null() {
        return Err(missing_key(ty, ty.hash_attribute().name()));
    }

    let range_key = match ty.range_attribute() {
        Some(range_attr) => {
            if range.is_null() {
                range = complete_range_key(ty, &hash_value, Some(entity))?
                    .ok_or_else(|| missing_key(ty, range_attr.name()))?;
            }
            Some(range)
        }
        None => None,
    };

    Ok(RawItem {
        hash_key: hash,
        range_key,
        attributes,
    })
}

// Resolved references re-derive the key from the related entity so the
// stored value tracks the in-memory relation.
fn encode_relation(
    ty: &EntityType,
    attr: &Attribute,
    fk: &ForeignKey,
    entity: &Entity,
    idx: usize,
) -> Result<AttributeValue, Error> {
    let Some(fref) = entity.slot_ref(idx) else {
        return Ok(AttributeValue::Null);
    };

    let foreign = match fref.cached() {
        Some(related) => related.key_text_of(fk.target_attribute())?.ok_or_else(|| {
            RelationError::MissingForeignValue {
                entity: related.entity_type().name().to_string(),
                attribute: fk.target_attribute().to_string(),
            }
        })?,
        None => fref.foreign_value().to_string(),
    };

    let raw = attr
        .kind()
        .wire_type()
        .from_text(foreign)
        .ok_or(codec::CodecError::NotKeyText(attr.kind().label()))
        .map_err(|err| Error::from(err).in_attribute(ty.name(), attr.name()))?;
    codec::decode(attr.kind(), &raw)
        .map_err(|err| Error::from(err).in_attribute(ty.name(), attr.name()))?;

    Ok(raw)
}
