use crate::{
    Error,
    entity::Entity,
    model::entity::EntityType,
    relation::RelationError,
};
use log::debug;
use std::{cell::OnceCell, fmt, sync::Arc};

///
/// Resolver
/// Fetches the related entity for a stored foreign value.
///

#[derive(Clone)]
pub struct Resolver(Arc<dyn Fn(&str) -> Result<Entity, Error> + Send + Sync>);

impl Resolver {
    pub fn from_fn(f: impl Fn(&str) -> Result<Entity, Error> + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Resolver for the forward relation declared on `owner`'s attribute at
    /// `attribute`. Target lookup is memoized on the declaration.
    pub(crate) fn for_relation(owner: &Arc<EntityType>, attribute: usize) -> Self {
        let owner = Arc::clone(owner);

        Self::from_fn(move |foreign| {
            let attr = &owner.attributes()[attribute];
            let fk = attr
                .relation()
                .ok_or_else(|| RelationError::NotForwardRelation {
                    entity: owner.name().to_string(),
                    attribute: attr.name().to_string(),
                })?;

            let db = owner.db()?;
            let target = fk.target().resolve(&db)?;

            db.find(&target, &fk.lookup_method(), foreign)
        })
    }

    fn fetch(&self, foreign: &str) -> Result<Entity, Error> {
        (self.0)(foreign)
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Resolver(..)")
    }
}

///
/// ForwardRef
///
/// Lazily resolved reference held by a foreign-key attribute.
/// `Unresolved { foreign }` becomes `Resolved { entity }` on the first `get`;
/// later calls return the cached entity without fetching again.
///

#[derive(Clone, Debug)]
pub struct ForwardRef {
    foreign: String,
    target: String,
    resolver: Resolver,
    resolved: OnceCell<Entity>,
}

impl ForwardRef {
    /// Reference read off storage or assigned as a bare key.
    #[must_use]
    pub fn unresolved(
        foreign: impl Into<String>,
        target: impl Into<String>,
        resolver: Resolver,
    ) -> Self {
        Self {
            foreign: foreign.into(),
            target: target.into(),
            resolver,
            resolved: OnceCell::new(),
        }
    }

    /// Reference to an entity the caller already holds; never fetched.
    #[must_use]
    pub fn resolved(foreign: impl Into<String>, entity: Entity, resolver: Resolver) -> Self {
        let target = entity.entity_type().name().to_string();
        let resolved = OnceCell::from(entity);

        Self {
            foreign: foreign.into(),
            target,
            resolver,
            resolved,
        }
    }

    /// Stored foreign key text.
    #[must_use]
    pub fn foreign_value(&self) -> &str {
        &self.foreign
    }

    #[must_use]
    pub fn target_name(&self) -> &str {
        &self.target
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.resolved.get().is_some()
    }

    /// Related entity if it has been resolved, without fetching.
    #[must_use]
    pub fn cached(&self) -> Option<&Entity> {
        self.resolved.get()
    }

    /// Related entity, fetching it on first use.
    pub fn get(&self) -> Result<&Entity, Error> {
        if let Some(entity) = self.resolved.get() {
            return Ok(entity);
        }

        debug!("fetching {} for foreign value '{}'", self.target, self.foreign);
        let entity = self.resolver.fetch(&self.foreign)?;

        Ok(self.resolved.get_or_init(|| entity))
    }

    /// Same as [`get`](Self::get).
    pub fn resolve(&self) -> Result<&Entity, Error> {
        self.get()
    }
}
