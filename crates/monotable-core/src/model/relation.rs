use crate::{
    DEFAULT_FOREIGN_ATTRIBUTE, Error, db::Db, model::entity::EntityType,
};
use std::sync::{Arc, OnceLock, Weak};

///
/// RelationTarget
///
/// Entity type a relation points at, named so types may reference each other
/// in any declaration order. The first successful lookup is memoized.
///

#[derive(Clone, Debug)]
pub struct RelationTarget {
    name: String,
    resolved: OnceLock<Weak<EntityType>>,
}

impl RelationTarget {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resolved: OnceLock::new(),
        }
    }

    /// Target an already registered type; no lookup is needed later.
    #[must_use]
    pub fn of(ty: &Arc<EntityType>) -> Self {
        let resolved = OnceLock::new();
        let _ = resolved.set(Arc::downgrade(ty));

        Self {
            name: ty.name().to_string(),
            resolved,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolve through the database registry, memoizing the result.
    pub fn resolve(&self, db: &Db) -> Result<Arc<EntityType>, Error> {
        if let Some(ty) = self.resolved.get().and_then(Weak::upgrade) {
            return Ok(ty);
        }

        let ty = db.entity_type(&self.name)?;
        let _ = self.resolved.set(Arc::downgrade(&ty));

        Ok(ty)
    }
}

///
/// ForeignKey
///
/// Forward (many-to-one) relation declaration. The holding attribute stores
/// the target's `attribute` value; `get_method` names the finder used to
/// fetch the target from that value.
///

#[derive(Clone, Debug)]
pub struct ForeignKey {
    target: RelationTarget,
    attribute: String,
    get_method: Option<String>,
}

impl ForeignKey {
    #[must_use]
    pub fn to(target: impl Into<String>) -> Self {
        Self::with_target(RelationTarget::named(target))
    }

    #[must_use]
    pub fn to_type(target: &Arc<EntityType>) -> Self {
        Self::with_target(RelationTarget::of(target))
    }

    fn with_target(target: RelationTarget) -> Self {
        Self {
            target,
            attribute: DEFAULT_FOREIGN_ATTRIBUTE.to_string(),
            get_method: None,
        }
    }

    #[must_use]
    pub fn attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = attribute.into();
        self
    }

    #[must_use]
    pub fn get_method(mut self, method: impl Into<String>) -> Self {
        self.get_method = Some(method.into());
        self
    }

    #[must_use]
    pub const fn target(&self) -> &RelationTarget {
        &self.target
    }

    #[must_use]
    pub fn target_name(&self) -> &str {
        self.target.name()
    }

    /// Attribute on the target the stored value refers to.
    #[must_use]
    pub fn target_attribute(&self) -> &str {
        &self.attribute
    }

    /// Finder invoked on resolution; `get_by_<attribute>` unless overridden.
    #[must_use]
    pub fn lookup_method(&self) -> String {
        self.get_method
            .clone()
            .unwrap_or_else(|| format!("get_by_{}", self.attribute))
    }
}

///
/// ReverseRelation
///
/// One-to-many relation: the target's items share the owner's hash key (or,
/// with an index, the owner's value of that index's hash attribute).
///

#[derive(Clone, Debug)]
pub struct ReverseRelation {
    target: RelationTarget,
    index: Option<String>,
}

impl ReverseRelation {
    #[must_use]
    pub fn to(target: impl Into<String>) -> Self {
        Self {
            target: RelationTarget::named(target),
            index: None,
        }
    }

    #[must_use]
    pub fn to_type(target: &Arc<EntityType>) -> Self {
        Self {
            target: RelationTarget::of(target),
            index: None,
        }
    }

    #[must_use]
    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    #[must_use]
    pub const fn target(&self) -> &RelationTarget {
        &self.target
    }

    #[must_use]
    pub fn target_name(&self) -> &str {
        self.target.name()
    }

    #[must_use]
    pub fn index_name(&self) -> Option<&str> {
        self.index.as_deref()
    }
}
