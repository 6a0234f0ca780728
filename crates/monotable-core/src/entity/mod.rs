//! Module: entity
//! Responsibility: in-memory entity instances and their attribute slots.
//! Does not own: encoding to raw items (see `db::encode`) or storage.
//!
//! Invariants:
//! - Every slot holds a value in its attribute's domain, or null.
//! - Foreign-key slots hold a `ForwardRef`, never a bare value.

#[cfg(test)]
mod tests;

use crate::{
    Error, codec,
    db::encode,
    item::RawItem,
    model::{derive::effective_value, entity::EntityType},
    relation::{ForwardRef, RelationError, ReverseManager, Resolver},
    value::Value,
};
use std::sync::Arc;

static NULL_VALUE: Value = Value::Null;

///
/// Slot
///

#[derive(Clone, Debug)]
pub(crate) enum Slot {
    Value(Value),
    Relation(ForwardRef),
}

///
/// Entity
///
/// One instance of a registered entity type. Slots follow the type's
/// attribute order.
///

#[derive(Clone, Debug)]
pub struct Entity {
    ty: Arc<EntityType>,
    slots: Vec<Slot>,
}

impl Entity {
    /// Brand-new instance holding each attribute's initial value.
    ///
    /// Derived attributes are not computed here; `create` does that once the
    /// caller's values are in place.
    pub fn new(ty: &Arc<EntityType>) -> Result<Self, Error> {
        let mut slots = Vec::with_capacity(ty.attributes().len());

        for (idx, attr) in ty.attributes().iter().enumerate() {
            let value = attr.initial_value();
            let slot = match attr.relation() {
                Some(fk) if !value.is_null() => {
                    let foreign = codec::key_text(attr.kind(), &value)
                        .map_err(|err| Error::from(err).in_attribute(ty.name(), attr.name()))?;
                    match foreign {
                        Some(foreign) => Slot::Relation(ForwardRef::unresolved(
                            foreign,
                            fk.target_name(),
                            Resolver::for_relation(ty, idx),
                        )),
                        None => Slot::Value(Value::Null),
                    }
                }
                _ => Slot::Value(value),
            };
            slots.push(slot);
        }

        Ok(Self {
            ty: Arc::clone(ty),
            slots,
        })
    }

    /// Brand-new instance with `values` assigned and derived attributes
    /// computed.
    pub fn create<I, K, V>(ty: &Arc<EntityType>, values: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut entity = Self::new(ty)?;
        for (name, value) in values {
            entity.set(name.as_ref(), value)?;
        }
        entity.refresh_derived()?;

        Ok(entity)
    }

    pub(crate) const fn from_slots(ty: Arc<EntityType>, slots: Vec<Slot>) -> Self {
        Self { ty, slots }
    }

    #[must_use]
    pub const fn entity_type(&self) -> &Arc<EntityType> {
        &self.ty
    }

    //
    // values
    //

    /// Current value of a plain attribute.
    pub fn get(&self, name: &str) -> Result<&Value, Error> {
        let (idx, attr) = self.ty.require_attribute(name)?;
        match &self.slots[idx] {
            Slot::Value(value) if attr.relation().is_none() => Ok(value),
            _ => Err(RelationError::RelationAttribute {
                entity: self.ty.name().to_string(),
                attribute: name.to_string(),
            }
            .into()),
        }
    }

    /// Assign an attribute. Foreign keys accept their scalar key and start
    /// over as unresolved; null clears any attribute.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), Error> {
        let value = value.into();
        let ty = Arc::clone(&self.ty);
        let (idx, attr) = ty.require_attribute(name)?;

        if let Some(fk) = attr.relation() {
            if value.is_null() {
                self.slots[idx] = Slot::Value(Value::Null);
                return Ok(());
            }

            let invalid = || RelationError::InvalidAssignment {
                entity: ty.name().to_string(),
                attribute: name.to_string(),
                expected: fk.target_name().to_string(),
                found: value.kind_label().to_string(),
            };
            if !value.is_scalar() {
                return Err(invalid().into());
            }
            let Ok(Some(foreign)) = codec::key_text(attr.kind(), &value) else {
                return Err(invalid().into());
            };

            self.slots[idx] = Slot::Relation(ForwardRef::unresolved(
                foreign,
                fk.target_name(),
                Resolver::for_relation(&ty, idx),
            ));
            return Ok(());
        }

        codec::check(attr.kind(), &value)
            .map_err(|err| Error::from(err).in_attribute(ty.name(), name))?;
        self.slots[idx] = Slot::Value(value);

        Ok(())
    }

    /// Reset an attribute to null.
    pub fn clear(&mut self, name: &str) -> Result<(), Error> {
        let (idx, _) = self.ty.require_attribute(name)?;
        self.slots[idx] = Slot::Value(Value::Null);

        Ok(())
    }

    /// Hash key value, or null while unset.
    #[must_use]
    pub fn hash_key(&self) -> &Value {
        self.slot_value(self.ty.hash_index()).unwrap_or(&NULL_VALUE)
    }

    #[must_use]
    pub fn range_key(&self) -> Option<&Value> {
        self.ty
            .range_index()
            .map(|idx| self.slot_value(idx).unwrap_or(&NULL_VALUE))
    }

    /// Typed value of any attribute. A foreign key yields its stored key
    /// decoded through the attribute's codec.
    pub fn scalar(&self, name: &str) -> Result<Value, Error> {
        let (idx, attr) = self.ty.require_attribute(name)?;
        match &self.slots[idx] {
            Slot::Value(value) => Ok(value.clone()),
            Slot::Relation(fref) => codec::decode_text(attr.kind(), fref.foreign_value())
                .map_err(|err| Error::from(err).in_attribute(self.ty.name(), name)),
        }
    }

    /// Serialized text of an attribute, as keys and foreign keys store it.
    pub(crate) fn key_text_of(&self, name: &str) -> Result<Option<String>, Error> {
        let (idx, attr) = self.ty.require_attribute(name)?;
        match &self.slots[idx] {
            Slot::Relation(fref) => Ok(Some(fref.foreign_value().to_string())),
            Slot::Value(value) => codec::key_text(attr.kind(), value)
                .map_err(|err| Error::from(err).in_attribute(self.ty.name(), name)),
        }
    }

    //
    // relations
    //

    /// Forward reference held by a foreign-key attribute.
    pub fn forward(&self, name: &str) -> Result<Option<&ForwardRef>, Error> {
        let (idx, attr) = self.ty.require_attribute(name)?;
        if attr.relation().is_none() {
            return Err(RelationError::NotForwardRelation {
                entity: self.ty.name().to_string(),
                attribute: name.to_string(),
            }
            .into());
        }

        Ok(self.slot_ref(idx))
    }

    /// Related entity, fetched on first access and cached afterwards.
    pub fn related(&self, name: &str) -> Result<Option<&Self>, Error> {
        match self.forward(name)? {
            Some(fref) => fref.get().map(Some),
            None => Ok(None),
        }
    }

    /// Point a foreign key at an entity the caller already holds.
    pub fn set_related(&mut self, name: &str, related: Self) -> Result<(), Error> {
        let ty = Arc::clone(&self.ty);
        let (idx, attr) = ty.require_attribute(name)?;
        let Some(fk) = attr.relation() else {
            return Err(RelationError::NotForwardRelation {
                entity: ty.name().to_string(),
                attribute: name.to_string(),
            }
            .into());
        };

        let related_name = related.ty.name();
        if related_name != fk.target_name() {
            return Err(RelationError::InvalidAssignment {
                entity: ty.name().to_string(),
                attribute: name.to_string(),
                expected: fk.target_name().to_string(),
                found: related_name.to_string(),
            }
            .into());
        }

        let foreign = related.key_text_of(fk.target_attribute())?.ok_or_else(|| {
            RelationError::MissingForeignValue {
                entity: related_name.to_string(),
                attribute: fk.target_attribute().to_string(),
            }
        })?;

        self.slots[idx] = Slot::Relation(ForwardRef::resolved(
            foreign,
            related,
            Resolver::for_relation(&ty, idx),
        ));

        Ok(())
    }

    /// Install an existing reference of the same relation.
    pub fn set_ref(&mut self, name: &str, fref: ForwardRef) -> Result<(), Error> {
        let (idx, attr) = self.ty.require_attribute(name)?;
        let Some(fk) = attr.relation() else {
            return Err(RelationError::NotForwardRelation {
                entity: self.ty.name().to_string(),
                attribute: name.to_string(),
            }
            .into());
        };
        if fref.target_name() != fk.target_name() {
            return Err(RelationError::InvalidAssignment {
                entity: self.ty.name().to_string(),
                attribute: name.to_string(),
                expected: fk.target_name().to_string(),
                found: fref.target_name().to_string(),
            }
            .into());
        }
        self.slots[idx] = Slot::Relation(fref);

        Ok(())
    }

    /// Manager for the named reverse relation, bound to this instance.
    pub fn reverse(&self, name: &str) -> Result<ReverseManager, Error> {
        let relation =
            self.ty
                .reverse_relation(name)
                .ok_or_else(|| RelationError::NotReverseRelation {
                    entity: self.ty.name().to_string(),
                    name: name.to_string(),
                })?;
        let db = self.ty.db()?;

        ReverseManager::for_relation(&db, self, relation)
    }

    //
    // derivation and persistence
    //

    /// Recompute derived attributes, hash key first.
    pub fn refresh_derived(&mut self) -> Result<(), Error> {
        let ty = Arc::clone(&self.ty);
        let hash_index = ty.hash_index();

        let order = std::iter::once(hash_index)
            .chain((0..ty.attributes().len()).filter(|idx| *idx != hash_index));

        for idx in order {
            let attr = &ty.attributes()[idx];
            if attr.derivation().is_none() {
                continue;
            }

            let current = self.slot_value(idx).unwrap_or(&NULL_VALUE);
            let value = effective_value(&ty, attr, self.hash_key(), current, Some(self))?;
            codec::check(attr.kind(), &value)
                .map_err(|err| Error::from(err).in_attribute(ty.name(), attr.name()))?;

            self.slots[idx] = Slot::Value(value);
        }

        Ok(())
    }

    /// Raw item this instance serializes to.
    pub fn encode(&self) -> Result<RawItem, Error> {
        encode::encode_entity(self)
    }

    /// Encode and write through the owning database.
    pub fn save(&self) -> Result<(), Error> {
        self.ty.db()?.save(self)
    }

    //
    // slots
    //

    pub(crate) fn slot_value(&self, idx: usize) -> Option<&Value> {
        match self.slots.get(idx)? {
            Slot::Value(value) => Some(value),
            Slot::Relation(_) => None,
        }
    }

    pub(crate) fn slot_ref(&self, idx: usize) -> Option<&ForwardRef> {
        match self.slots.get(idx)? {
            Slot::Relation(fref) => Some(fref),
            Slot::Value(_) => None,
        }
    }
}
