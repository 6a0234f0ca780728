use crate::{
    Error,
    codec::AttributeKind,
    db::{Db, DbInner, Query, RegistryError},
    entity::Entity,
    error::ErrorOrigin,
    model::{
        SchemaError,
        attribute::{Attribute, KeyRole},
        derive::DeriveSource,
        index::IndexModel,
        relation::{ForeignKey, ReverseRelation},
    },
};
use log::warn;
use std::{
    collections::BTreeMap,
    fmt,
    sync::{Arc, OnceLock, Weak},
};

///
/// FinderFn
/// Named lookup used to resolve forward relations from a stored value.
///

pub type FinderFn = Arc<dyn Fn(&Db, &str) -> Result<Entity, Error> + Send + Sync>;

///
/// EntityType
///
/// Validated, immutable schema of one logical entity sharing the table.
/// The database back-link is bound once when the owning `Db` is built.
///

pub struct EntityType {
    name: String,
    attributes: Vec<Attribute>,
    hash_key: usize,
    range_key: Option<usize>,
    discriminator: Option<usize>,
    indexes: Vec<IndexModel>,
    reverse: Vec<(String, ReverseRelation)>,
    finders: BTreeMap<String, FinderFn>,
    db: OnceLock<Weak<DbInner>>,
}

impl EntityType {
    #[must_use]
    pub fn builder(name: impl Into<String>) -> EntityTypeBuilder {
        EntityTypeBuilder::new(name)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name() == name)
    }

    pub(crate) fn attribute_index(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a.name() == name)
    }

    pub(crate) fn require_attribute(&self, name: &str) -> Result<(usize, &Attribute), Error> {
        self.attribute_index(name)
            .map(|idx| (idx, &self.attributes[idx]))
            .ok_or_else(|| {
                SchemaError::UnknownAttribute {
                    entity: self.name.clone(),
                    attribute: name.to_string(),
                }
                .into()
            })
    }

    #[must_use]
    pub fn hash_attribute(&self) -> &Attribute {
        &self.attributes[self.hash_key]
    }

    pub(crate) const fn hash_index(&self) -> usize {
        self.hash_key
    }

    #[must_use]
    pub fn range_attribute(&self) -> Option<&Attribute> {
        self.range_key.map(|idx| &self.attributes[idx])
    }

    pub(crate) const fn range_index(&self) -> Option<usize> {
        self.range_key
    }

    #[must_use]
    pub fn discriminator_attribute(&self) -> Option<&Attribute> {
        self.discriminator.map(|idx| &self.attributes[idx])
    }

    #[must_use]
    pub fn indexes(&self) -> &[IndexModel] {
        &self.indexes
    }

    #[must_use]
    pub fn index(&self, name: &str) -> Option<&IndexModel> {
        self.indexes.iter().find(|i| i.name == name)
    }

    /// Attributes that hold a forward relation.
    pub fn forward_relations(&self) -> impl Iterator<Item = (&Attribute, &ForeignKey)> {
        self.attributes
            .iter()
            .filter_map(|a| a.relation().map(|fk| (a, fk)))
    }

    pub fn reverse_relations(&self) -> impl Iterator<Item = (&str, &ReverseRelation)> {
        self.reverse.iter().map(|(name, rel)| (name.as_str(), rel))
    }

    #[must_use]
    pub fn reverse_relation(&self, name: &str) -> Option<&ReverseRelation> {
        self.reverse
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, rel)| rel)
    }

    pub(crate) fn finder(&self, name: &str) -> Option<&FinderFn> {
        self.finders.get(name)
    }

    /// Name of the finder every type gets for its hash key.
    #[must_use]
    pub fn default_finder_name(&self) -> String {
        format!("get_by_{}", self.hash_attribute().name())
    }

    /// Database this type is registered on.
    pub fn db(&self) -> Result<Db, Error> {
        self.db
            .get()
            .and_then(Weak::upgrade)
            .map(Db::from_inner)
            .ok_or_else(|| RegistryError::Detached(self.name.clone()).into())
    }

    pub(crate) fn bind(&self, db: Weak<DbInner>) {
        let _ = self.db.set(db);
    }

    /// Inject the discriminator under `stored_name` when none is declared,
    /// otherwise check the declared one is stored there.
    pub(crate) fn ensure_discriminator(&mut self, stored_name: &str) -> Result<(), Error> {
        if let Some(idx) = self.discriminator {
            let found = self.attributes[idx].stored_name();
            if found != stored_name {
                return Err(RegistryError::DiscriminatorName {
                    entity: self.name.clone(),
                    expected: stored_name.to_string(),
                    found: found.to_string(),
                }
                .into());
            }
            return Ok(());
        }

        if self
            .attributes
            .iter()
            .any(|a| a.name() == stored_name || a.stored_name() == stored_name)
        {
            return Err(SchemaError::DuplicateAttribute {
                entity: self.name.clone(),
                attribute: stored_name.to_string(),
            }
            .into());
        }

        let mut attr = Attribute::discriminator(stored_name);
        attr.kind = AttributeKind::Static(self.name.clone());
        self.discriminator = Some(self.attributes.len());
        self.attributes.push(attr);

        Ok(())
    }

    //
    // table-level operations owned by the table collaborator
    //

    pub fn scan(&self) -> Result<Query, Error> {
        Err(self.unsupported("scan is not supported; query by hash key instead"))
    }

    pub fn create_table(&self) -> Result<(), Error> {
        Err(self.unsupported("create the table through the table collaborator"))
    }

    pub fn delete_table(&self) -> Result<(), Error> {
        Err(self.unsupported("delete the table through the table collaborator"))
    }

    pub fn dumps(&self) -> Result<String, Error> {
        Err(self.unsupported("dumping a table is not supported"))
    }

    fn unsupported(&self, message: &str) -> Error {
        warn!("unsupported operation on {}: {message}", self.name);

        Error::unsupported(ErrorOrigin::Schema, format!("{}: {message}", self.name))
    }
}

impl fmt::Debug for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityType")
            .field("name", &self.name)
            .field("attributes", &self.attributes)
            .field("indexes", &self.indexes)
            .field("reverse", &self.reverse)
            .field("finders", &self.finders.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

///
/// EntityTypeBuilder
///

pub struct EntityTypeBuilder {
    name: String,
    attributes: Vec<Attribute>,
    indexes: Vec<IndexModel>,
    reverse: Vec<(String, ReverseRelation)>,
    finders: Vec<(String, FinderFn)>,
}

impl EntityTypeBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            indexes: Vec::new(),
            reverse: Vec::new(),
            finders: Vec::new(),
        }
    }

    #[must_use]
    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    #[must_use]
    pub fn index(mut self, index: IndexModel) -> Self {
        self.indexes.push(index);
        self
    }

    #[must_use]
    pub fn reverse(mut self, name: impl Into<String>, relation: ReverseRelation) -> Self {
        self.reverse.push((name.into(), relation));
        self
    }

    #[must_use]
    pub fn finder(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&Db, &str) -> Result<Entity, Error> + Send + Sync + 'static,
    ) -> Self {
        self.finders.push((name.into(), Arc::new(f)));
        self
    }

    /// Validate the declaration and produce the immutable entity type.
    pub fn build(self) -> Result<EntityType, Error> {
        let entity = self.name;
        if entity.trim().is_empty() {
            return Err(SchemaError::EmptyEntityName.into());
        }

        let mut attributes = self.attributes;
        let mut hash_key: Option<usize> = None;
        let mut range_key: Option<usize> = None;
        let mut discriminator: Option<usize> = None;

        for (idx, attr) in attributes.iter().enumerate() {
            let attribute = attr.name().to_string();

            if attributes[..idx]
                .iter()
                .any(|a| a.name() == attr.name() || a.stored_name() == attr.stored_name())
            {
                return Err(SchemaError::DuplicateAttribute { entity, attribute }.into());
            }

            match attr.role() {
                KeyRole::Hash => {
                    if let Some(first) = hash_key {
                        return Err(SchemaError::MultipleHashKeys {
                            first: attributes[first].name().to_string(),
                            second: attribute,
                            entity,
                        }
                        .into());
                    }
                    hash_key = Some(idx);
                }
                KeyRole::Range => {
                    if let Some(first) = range_key {
                        return Err(SchemaError::MultipleRangeKeys {
                            first: attributes[first].name().to_string(),
                            second: attribute,
                            entity,
                        }
                        .into());
                    }
                    range_key = Some(idx);
                }
                KeyRole::Plain => {}
            }

            if attr.is_discriminator() {
                if let Some(first) = discriminator {
                    return Err(SchemaError::MultipleDiscriminators {
                        first: attributes[first].name().to_string(),
                        second: attribute,
                        entity,
                    }
                    .into());
                }
                if attr.is_key() {
                    return Err(SchemaError::DiscriminatorKey { entity, attribute }.into());
                }
                discriminator = Some(idx);
            }

            if attr.is_key() {
                if attr.relation().is_some() {
                    return Err(SchemaError::RelationKey { entity, attribute }.into());
                }
                if !attr.kind().wire_type().is_key_type() {
                    return Err(SchemaError::InvalidKeyType {
                        kind: attr.kind().label(),
                        entity,
                        attribute,
                    }
                    .into());
                }
            }

            if attr.relation().is_some() && attr.derivation().is_some() {
                return Err(SchemaError::DerivedRelation { entity, attribute }.into());
            }

            match attr.derivation() {
                None if attr.is_only_default() => {
                    return Err(SchemaError::OnlyDefaultWithoutSource { entity, attribute }.into());
                }
                Some(DeriveSource::Field(field)) => {
                    if field == attr.name() {
                        return Err(SchemaError::SelfDerivation { entity, attribute }.into());
                    }
                    if !attributes.iter().any(|a| a.name() == field) {
                        return Err(SchemaError::UnknownDeriveField {
                            field: field.clone(),
                            entity,
                            attribute,
                        }
                        .into());
                    }
                }
                Some(DeriveSource::HashKey) if attr.role() == KeyRole::Hash => {
                    return Err(SchemaError::HashKeyFromHashKey { entity, attribute }.into());
                }
                _ => {}
            }
        }

        let Some(hash_key) = hash_key else {
            return Err(SchemaError::MissingHashKey { entity }.into());
        };

        for index in &self.indexes {
            if let Some(missing) = index
                .attributes()
                .find(|name| !attributes.iter().any(|a| a.name() == *name))
            {
                return Err(SchemaError::UnknownIndexAttribute {
                    index: index.name.clone(),
                    attribute: missing.to_string(),
                    entity,
                }
                .into());
            }
        }
        check_unique(&entity, "index", self.indexes.iter().map(|i| i.name.as_str()))?;
        check_unique(&entity, "reverse relation", self.reverse.iter().map(|(n, _)| n.as_str()))?;
        check_unique(&entity, "finder", self.finders.iter().map(|(n, _)| n.as_str()))?;

        // the discriminator always tags items with the entity name
        if let Some(idx) = discriminator {
            attributes[idx].kind = AttributeKind::Static(entity.clone());
        }

        Ok(EntityType {
            name: entity,
            attributes,
            hash_key,
            range_key,
            discriminator,
            indexes: self.indexes,
            reverse: self.reverse,
            finders: self.finders.into_iter().collect(),
            db: OnceLock::new(),
        })
    }
}

fn check_unique<'a>(
    entity: &str,
    what: &'static str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), Error> {
    let mut seen = Vec::new();
    for name in names {
        if seen.contains(&name) {
            return Err(SchemaError::DuplicateDeclaration {
                entity: entity.to_string(),
                what,
                name: name.to_string(),
            }
            .into());
        }
        seen.push(name);
    }

    Ok(())
}
