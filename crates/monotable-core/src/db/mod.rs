//! Module: db
//! Responsibility: the database handle that ties the entity registry, the
//! raw-item pipeline, and the store capability together.
//! Does not own: attribute codecs, schema validation, or storage itself.
//!
//! Invariants:
//! - The registry is fixed once `DbBuilder::build` returns.
//! - Every registered type is bound back to the database it was built into.

pub(crate) mod decode;
pub(crate) mod encode;
pub(crate) mod keys;
mod query;
mod registry;


use crate::{
    Error, codec,
    config::TableConfig,
    entity::Entity,
    item::{AttributeValue, PrimaryKey, RawItem},
    model::{
        attribute::{Attribute, KeyRole},
        entity::EntityType,
    },
    relation::RelationError,
    store::{IndexField, IndexRequest, QueryRequest, RangePredicate, Store},
    value::Value,
};
use log::debug;
use std::{fmt, sync::Arc};

// re-exports
pub use query::{Query, QueryOptions};
pub use registry::{Registry, RegistryError};

///
/// DbInner
///

pub(crate) struct DbInner {
    config: TableConfig,
    registry: Registry,
    store: Arc<dyn Store>,
}

///
/// Db
///
/// Cheap, cloneable handle to one table: its configuration, the registered
/// entity types, and the store collaborator.
///

#[derive(Clone)]
pub struct Db {
    inner: Arc<DbInner>,
}

impl Db {
    /// Start declaring the entity types that share one table.
    pub fn builder(config: TableConfig) -> Result<DbBuilder, Error> {
        config.validate()?;

        Ok(DbBuilder {
            config,
            registry: Registry::new(),
        })
    }

    pub(crate) const fn from_inner(inner: Arc<DbInner>) -> Self {
        Self { inner }
    }

    #[must_use]
    pub fn config(&self) -> &TableConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.inner.store
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    pub fn entity_type(&self, name: &str) -> Result<Arc<EntityType>, Error> {
        self.inner
            .registry
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownEntityType(name.to_string()).into())
    }

    pub fn entity_types(&self) -> impl Iterator<Item = &Arc<EntityType>> {
        self.inner.registry.iter()
    }

    //
    // pipeline
    //

    /// Decode a raw item into the entity type its discriminator names.
    pub fn decode(&self, raw: &RawItem) -> Result<Entity, Error> {
        let attribute = &self.inner.config.discriminator_attribute;
        let discriminator = raw
            .attribute(attribute)
            .and_then(AttributeValue::as_s)
            .ok_or_else(|| RegistryError::MissingDiscriminator {
                attribute: attribute.clone(),
            })?;
        let ty = self.inner.registry.resolve(discriminator)?;

        decode::decode_entity(&ty, raw)
    }

    //
    // reads
    //

    /// Point lookup; a missing item is a not-found error.
    pub fn get(
        &self,
        ty: &Arc<EntityType>,
        hash_key: impl Into<Value>,
        range_key: Option<Value>,
    ) -> Result<Entity, Error> {
        let hash_key = hash_key.into();
        let key = keys::lookup_key(ty, &hash_key, range_key.as_ref())?;

        self.try_get_key(ty, &key)?
            .ok_or_else(|| Error::not_found(ty.name(), key.to_string()))
    }

    /// Point lookup; a missing item is `Ok(None)`.
    pub fn try_get(
        &self,
        ty: &Arc<EntityType>,
        hash_key: impl Into<Value>,
        range_key: Option<Value>,
    ) -> Result<Option<Entity>, Error> {
        let hash_key = hash_key.into();
        let key = keys::lookup_key(ty, &hash_key, range_key.as_ref())?;

        self.try_get_key(ty, &key)
    }

    fn try_get_key(
        &self,
        ty: &Arc<EntityType>,
        key: &PrimaryKey,
    ) -> Result<Option<Entity>, Error> {
        let Some(raw) = self.inner.store.get_item(key)? else {
            return Ok(None);
        };
        let entity = self.decode(&raw)?;

        // the key may be shared with another type in the same partition
        if entity.entity_type().name() != ty.name() {
            return Ok(None);
        }

        Ok(Some(entity))
    }

    /// Lazy query over one partition of `ty`'s table (or of an index).
    pub fn query(
        &self,
        ty: &Arc<EntityType>,
        hash_key: impl Into<Value>,
        predicate: Option<RangePredicate>,
        options: QueryOptions,
    ) -> Result<Query, Error> {
        let limit = options.limit;
        let request = self.query_request(ty, &hash_key.into(), predicate, options)?;

        Ok(Query::new(self.clone(), request, limit))
    }

    pub fn count(
        &self,
        ty: &Arc<EntityType>,
        hash_key: impl Into<Value>,
        predicate: Option<RangePredicate>,
        options: QueryOptions,
    ) -> Result<u64, Error> {
        let request = self.query_request(ty, &hash_key.into(), predicate, options)?;

        Ok(self.inner.store.count(&request)?)
    }

    /// Run the finder `method` on `ty` for a stored foreign value.
    ///
    /// Registered finders win; otherwise `get_by_<hash key>` is a point
    /// lookup by hash key alone.
    pub fn find(&self, ty: &Arc<EntityType>, method: &str, foreign: &str) -> Result<Entity, Error> {
        if let Some(finder) = ty.finder(method) {
            return finder(self, foreign);
        }

        if method == ty.default_finder_name() {
            let hash_attr = ty.hash_attribute();
            let hash_key = codec::decode_text(hash_attr.kind(), foreign)
                .map_err(|err| Error::from(err).in_attribute(ty.name(), hash_attr.name()))?;

            return self.get(ty, hash_key, None);
        }

        Err(RelationError::MissingFinder {
            entity: ty.name().to_string(),
            method: method.to_string(),
        }
        .into())
    }

    //
    // writes
    //

    /// Encode and store an instance, replacing any item under the same key.
    pub fn save(&self, entity: &Entity) -> Result<(), Error> {
        let ty = entity.entity_type();
        let registered = self.entity_type(ty.name())?;
        if !Arc::ptr_eq(&registered, ty) {
            return Err(RegistryError::Detached(ty.name().to_string()).into());
        }

        let raw = entity.encode()?;
        debug!("saving {} at {}", ty.name(), raw.primary_key());
        self.inner.store.put_item(raw)?;

        Ok(())
    }

    fn query_request(
        &self,
        ty: &EntityType,
        hash_key: &Value,
        predicate: Option<RangePredicate>,
        options: QueryOptions,
    ) -> Result<QueryRequest, Error> {
        let (hash_attr, index) = match &options.index {
            Some(name) => {
                let index = ty.index(name).ok_or_else(|| RelationError::UnknownIndex {
                    entity: ty.name().to_string(),
                    index: name.clone(),
                })?;
                let (_, hash_attr) = ty.require_attribute(&index.hash_key)?;
                let range = match &index.range_key {
                    Some(range) => Some(index_field(ty.require_attribute(range)?.1)),
                    None => None,
                };

                let request = IndexRequest {
                    name: index.name.clone(),
                    hash: index_field(hash_attr),
                    range,
                };
                (hash_attr, Some(request))
            }
            None => (ty.hash_attribute(), None),
        };

        let hash = codec::encode(hash_attr.kind(), hash_key)
            .map_err(|err| Error::from(err).in_attribute(ty.name(), hash_attr.name()))?;
        if hash.is_null() {
            return Err(keys::missing_key(ty, hash_attr.name()));
        }

        Ok(QueryRequest {
            hash_key: hash,
            range: predicate,
            index,
            page_size: options.page_size.or(self.inner.config.page_size),
            consistent_read: options.consistent_read,
            scan_forward: options.scan_forward,
        })
    }
}

fn index_field(attr: &Attribute) -> IndexField {
    match attr.role() {
        KeyRole::Hash => IndexField::HashKey,
        KeyRole::Range => IndexField::RangeKey,
        KeyRole::Plain => IndexField::Attribute(attr.stored_name().to_string()),
    }
}

impl fmt::Debug for Db {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Db")
            .field("table", &self.inner.config.table_name)
            .field("entity_types", &self.inner.registry.len())
            .finish_non_exhaustive()
    }
}

///
/// DbBuilder
///

#[derive(Debug)]
pub struct DbBuilder {
    config: TableConfig,
    registry: Registry,
}

impl DbBuilder {
    /// Register an entity type under its discriminator, injecting the
    /// discriminator attribute when the type declares none.
    pub fn register(&mut self, mut ty: EntityType) -> Result<Arc<EntityType>, Error> {
        ty.ensure_discriminator(&self.config.discriminator_attribute)?;

        let ty = Arc::new(ty);
        self.registry.register(Arc::clone(&ty))?;
        debug!("registered entity type {}", ty.name());

        Ok(ty)
    }

    /// Freeze the registry and bind every type to the new database.
    pub fn build<S: Store + 'static>(self, store: Arc<S>) -> Db {
        let Self { config, registry } = self;
        let store: Arc<dyn Store> = store;

        let inner = Arc::new_cyclic(|weak| {
            for ty in registry.iter() {
                ty.bind(weak.clone());
            }

            DbInner {
                config,
                registry,
                store,
            }
        });
        debug!(
            "built database for table '{}' with {} entity types",
            inner.config.table_name,
            inner.registry.len()
        );

        Db::from_inner(inner)
    }
}
