use crate::{
    Error,
    db::{Db, Query, QueryOptions},
    entity::Entity,
    error::ErrorOrigin,
    item::AttributeValue,
    model::{attribute::KeyShape, entity::EntityType, relation::ReverseRelation},
    relation::RelationError,
    store::RangePredicate,
    value::Value,
};
use std::sync::Arc;

///
/// ReverseManager
///
/// Child collection of one owner: every item of `related` stored under the
/// owner's hash key, or under the owner's index value when bound to an index.
///

#[derive(Clone, Debug)]
pub struct ReverseManager {
    db: Db,
    related: Arc<EntityType>,
    index: Option<String>,
    hash_key: Value,
}

impl ReverseManager {
    #[must_use]
    pub const fn new(db: Db, related: Arc<EntityType>, hash_key: Value) -> Self {
        Self {
            db,
            related,
            index: None,
            hash_key,
        }
    }

    /// Route queries through `index` on the related type.
    pub fn with_index(mut self, index: impl Into<String>) -> Result<Self, Error> {
        let index = index.into();
        if self.related.index(&index).is_none() {
            return Err(RelationError::UnknownIndex {
                entity: self.related.name().to_string(),
                index,
            }
            .into());
        }
        self.index = Some(index);

        Ok(self)
    }

    /// Manager for the reverse relation `relation` declared on `owner`'s type.
    pub(crate) fn for_relation(
        db: &Db,
        owner: &Entity,
        relation: &ReverseRelation,
    ) -> Result<Self, Error> {
        let related = relation.target().resolve(db)?;

        let Some(index) = relation.index_name() else {
            return Ok(Self::new(db.clone(), related, owner.hash_key().clone()));
        };

        let owner_ty = owner.entity_type();
        let owner_index = owner_ty
            .index(index)
            .ok_or_else(|| RelationError::UnknownIndex {
                entity: owner_ty.name().to_string(),
                index: index.to_string(),
            })?;
        let hash_key = owner.scalar(&owner_index.hash_key)?;

        Self::new(db.clone(), related, hash_key).with_index(index)
    }

    #[must_use]
    pub const fn related(&self) -> &Arc<EntityType> {
        &self.related
    }

    #[must_use]
    pub const fn hash_key(&self) -> &Value {
        &self.hash_key
    }

    #[must_use]
    pub fn index(&self) -> Option<&str> {
        self.index.as_deref()
    }

    /// Point lookup of one child; not-found surfaces unchanged.
    pub fn get(&self, range_key: Option<Value>) -> Result<Entity, Error> {
        if let Some(index) = &self.index {
            return Err(Error::unsupported(
                ErrorOrigin::Relation,
                format!("point lookups are not available through index '{index}'"),
            ));
        }

        self.db.get(&self.related, self.hash_key.clone(), range_key)
    }

    /// Lazy sequence of children. Without `predicate`, one is inferred from
    /// the related range key's shape.
    pub fn query(
        &self,
        predicate: Option<RangePredicate>,
        options: QueryOptions,
    ) -> Result<Query, Error> {
        let predicate = match predicate {
            Some(predicate) => predicate,
            None => self.infer_predicate()?,
        };

        self.db
            .query(&self.related, self.hash_key.clone(), Some(predicate), self.routed(options))
    }

    pub fn count(&self, predicate: Option<RangePredicate>) -> Result<u64, Error> {
        let predicate = match predicate {
            Some(predicate) => predicate,
            None => self.infer_predicate()?,
        };

        self.db.count(
            &self.related,
            self.hash_key.clone(),
            Some(predicate),
            self.routed(QueryOptions::default()),
        )
    }

    /// Predicate selecting only the related type's items in the partition.
    ///
    /// Fails when the related range key is missing or computed, since the
    /// partition also holds the owner and its siblings.
    pub fn infer_predicate(&self) -> Result<RangePredicate, Error> {
        let range_attribute = match &self.index {
            Some(index) => self
                .related
                .index(index)
                .and_then(|ix| ix.range_key.as_deref())
                .and_then(|name| self.related.attribute(name)),
            None => self.related.range_attribute(),
        };
        let Some(attr) = range_attribute else {
            return Err(RelationError::PredicateNotInferred {
                target: self.related.name().to_string(),
                reason: "it has no range key".to_string(),
            }
            .into());
        };

        match attr.key_shape() {
            KeyShape::Prefixed(prefix) => Ok(RangePredicate::begins_with(prefix)),
            KeyShape::Static(literal) => Ok(RangePredicate::Eq(AttributeValue::S(
                literal.to_string(),
            ))),
            KeyShape::Other => Err(RelationError::PredicateNotInferred {
                target: self.related.name().to_string(),
                reason: format!(
                    "range key '{}' is neither prefixed nor static",
                    attr.name()
                ),
            }
            .into()),
        }
    }

    fn routed(&self, options: QueryOptions) -> QueryOptions {
        match &self.index {
            Some(index) => options.with_index(index.clone()),
            None => options,
        }
    }
}
