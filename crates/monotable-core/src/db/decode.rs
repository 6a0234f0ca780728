use crate::{
    Error, codec,
    entity::{Entity, Slot},
    item::{AttributeValue, RawItem},
    model::{attribute::KeyRole, entity::EntityType},
    relation::{ForwardRef, Resolver},
    value::Value,
};
use std::sync::Arc;

/// Rebuild an instance of `ty` from a stored item.
///
/// Defaults are never applied here; an attribute missing from the bucket
/// reads back as null. Foreign keys come back unresolved.
pub(crate) fn decode_entity(ty: &Arc<EntityType>, raw: &RawItem) -> Result<Entity, Error> {
    let mut slots = Vec::with_capacity(ty.attributes().len());

    for (idx, attr) in ty.attributes().iter().enumerate() {
        let stored = match attr.role() {
            KeyRole::Hash => Some(&raw.hash_key),
            KeyRole::Range => raw.range_key.as_ref(),
            KeyRole::Plain => raw.attribute(attr.stored_name()),
        }
        .filter(|value| !value.is_null());

        let slot = match (stored, attr.relation()) {
            (None, _) => Slot::Value(Value::Null),
            (Some(value), Some(fk)) => {
                let foreign = value
                    .key_text()
                    .ok_or(codec::CodecError::NotKeyText(value.type_label()))
                    .map_err(|err| Error::from(err).in_attribute(ty.name(), attr.name()))?;

                Slot::Relation(ForwardRef::unresolved(
                    foreign,
                    fk.target_name(),
                    Resolver::for_relation(ty, idx),
                ))
            }
            (Some(value), None) => Slot::Value(decode_value(ty, idx, value)?),
        };
        slots.push(slot);
    }

    Ok(Entity::from_slots(Arc::clone(ty), slots))
}

fn decode_value(ty: &EntityType, idx: usize, raw: &AttributeValue) -> Result<Value, Error> {
    let attr = &ty.attributes()[idx];

    codec::decode(attr.kind(), raw)
        .map_err(|err| Error::from(err).in_attribute(ty.name(), attr.name()))
}
