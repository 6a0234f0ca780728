use crate::{
    Error,
    codec::{AttributeKind, EnumModel, MapModel, NumberRepr},
    model::{
        derive::{DeriveContext, DeriveSource},
        relation::ForeignKey,
    },
    value::Value,
};
use std::{fmt, sync::Arc};

///
/// KeyRole
/// Slot an attribute's encoded value is placed into.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KeyRole {
    Hash,
    Range,
    Plain,
}

///
/// DefaultValue
/// Literal or produced default applied to brand-new instances only.
///

#[derive(Clone)]
pub enum DefaultValue {
    Value(Value),
    Fn(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl DefaultValue {
    #[must_use]
    pub fn produce(&self) -> Value {
        match self {
            Self::Value(value) => value.clone(),
            Self::Fn(f) => f(),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Fn(_) => f.write_str("Fn(..)"),
        }
    }
}

///
/// FieldMeta
/// Presentation metadata. Carried for callers; the core never reads it.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldMeta {
    pub help_text: Option<String>,
    pub verbose_name: Option<String>,
    pub editable: bool,
}

impl Default for FieldMeta {
    fn default() -> Self {
        Self {
            help_text: None,
            verbose_name: None,
            editable: true,
        }
    }
}

///
/// Attribute
///
/// Declarative descriptor of one field of an entity type. The codec is chosen
/// by `kind`; derivation, relation, and discriminator behavior are optional
/// capabilities layered on top.
///

#[derive(Clone, Debug)]
pub struct Attribute {
    pub(crate) name: String,
    pub(crate) attr_name: Option<String>,
    pub(crate) kind: AttributeKind,
    pub(crate) role: KeyRole,
    pub(crate) nullable: bool,
    pub(crate) default: Option<DefaultValue>,
    pub(crate) default_for_new: Option<DefaultValue>,
    pub(crate) derivation: Option<DeriveSource>,
    pub(crate) only_default: bool,
    pub(crate) relation: Option<ForeignKey>,
    pub(crate) discriminator: bool,
    pub(crate) meta: FieldMeta,
}

impl Attribute {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: AttributeKind) -> Self {
        Self {
            name: name.into(),
            attr_name: None,
            kind,
            role: KeyRole::Plain,
            nullable: false,
            default: None,
            default_for_new: None,
            derivation: None,
            only_default: false,
            relation: None,
            discriminator: false,
            meta: FieldMeta::default(),
        }
    }

    //
    // constructors
    //

    #[must_use]
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::Text)
    }

    #[must_use]
    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::Number(NumberRepr::Int))
    }

    #[must_use]
    pub fn decimal(name: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::Number(NumberRepr::Decimal))
    }

    #[must_use]
    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::Number(NumberRepr::Float))
    }

    #[must_use]
    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::Bool)
    }

    #[must_use]
    pub fn binary(name: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::Binary)
    }

    /// UTC instant stored as epoch seconds.
    #[must_use]
    pub fn timestamp(name: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::Timestamp)
    }

    /// UTC instant stored as ISO-8601 text.
    #[must_use]
    pub fn datetime(name: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::DateTime)
    }

    #[must_use]
    pub fn json(name: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::Json)
    }

    #[must_use]
    pub fn list(name: impl Into<String>, element: Option<AttributeKind>) -> Self {
        Self::new(name, AttributeKind::List(element.map(Box::new)))
    }

    #[must_use]
    pub fn map(name: impl Into<String>, model: MapModel) -> Self {
        Self::new(name, AttributeKind::Map(model))
    }

    #[must_use]
    pub fn text_set(name: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::TextSet)
    }

    #[must_use]
    pub fn number_set(name: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::NumberSet)
    }

    #[must_use]
    pub fn binary_set(name: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::BinarySet)
    }

    #[must_use]
    pub fn enumeration(name: impl Into<String>, model: EnumModel) -> Self {
        Self::new(name, AttributeKind::Enum(model))
    }

    /// Attribute that only ever stores `literal`.
    #[must_use]
    pub fn fixed(name: impl Into<String>, literal: impl Into<String>) -> Self {
        let mut attr = Self::new(name, AttributeKind::Static(literal.into()));
        attr.meta.editable = false;
        attr
    }

    #[must_use]
    pub fn prefixed(name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::prefixed(prefix))
    }

    /// Prefixed attribute whose suffix is encoded by `inner`.
    #[must_use]
    pub fn prefixed_with(
        name: impl Into<String>,
        prefix: impl Into<String>,
        inner: AttributeKind,
    ) -> Self {
        Self::new(
            name,
            AttributeKind::Prefixed {
                prefix: prefix.into(),
                inner: Box::new(inner),
            },
        )
    }

    /// Discriminator tag. Its literal is the owning entity's name, filled in
    /// when the entity type is built.
    #[must_use]
    pub fn discriminator(name: impl Into<String>) -> Self {
        let mut attr = Self::new(name, AttributeKind::Static(String::new()));
        attr.discriminator = true;
        attr.meta.editable = false;
        attr
    }

    /// Text foreign key.
    #[must_use]
    pub fn foreign_key(name: impl Into<String>, relation: ForeignKey) -> Self {
        Self::text(name).references(relation)
    }

    //
    // chainers
    //

    #[must_use]
    pub const fn hash_key(mut self) -> Self {
        self.role = KeyRole::Hash;
        self
    }

    #[must_use]
    pub const fn range_key(mut self) -> Self {
        self.role = KeyRole::Range;
        self
    }

    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Store under a different attribute name.
    #[must_use]
    pub fn stored_as(mut self, attr_name: impl Into<String>) -> Self {
        self.attr_name = Some(attr_name.into());
        self
    }

    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Value(value.into()));
        self
    }

    #[must_use]
    pub fn default_with(mut self, f: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        self.default = Some(DefaultValue::Fn(Arc::new(f)));
        self
    }

    #[must_use]
    pub fn default_for_new(mut self, value: impl Into<Value>) -> Self {
        self.default_for_new = Some(DefaultValue::Value(value.into()));
        self
    }

    #[must_use]
    pub fn default_for_new_with(mut self, f: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        self.default_for_new = Some(DefaultValue::Fn(Arc::new(f)));
        self
    }

    /// Derive from a sibling attribute's serialized value.
    #[must_use]
    pub fn derive_from_field(mut self, field: impl Into<String>) -> Self {
        self.derivation = Some(DeriveSource::Field(field.into()));
        self
    }

    /// Derive from the entity's own hash key.
    #[must_use]
    pub fn derive_from_hash_key(mut self) -> Self {
        self.derivation = Some(DeriveSource::HashKey);
        self
    }

    #[must_use]
    pub fn derive_with(
        mut self,
        f: impl Fn(&DeriveContext<'_>) -> Result<Value, Error> + Send + Sync + 'static,
    ) -> Self {
        self.derivation = Some(DeriveSource::Function(Arc::new(f)));
        self
    }

    /// Derive only while the attribute has no value.
    #[must_use]
    pub const fn only_default(mut self) -> Self {
        self.only_default = true;
        self
    }

    #[must_use]
    pub fn references(mut self, relation: ForeignKey) -> Self {
        self.relation = Some(relation);
        self
    }

    #[must_use]
    pub fn help_text(mut self, text: impl Into<String>) -> Self {
        self.meta.help_text = Some(text.into());
        self
    }

    #[must_use]
    pub fn verbose_name(mut self, text: impl Into<String>) -> Self {
        self.meta.verbose_name = Some(text.into());
        self
    }

    #[must_use]
    pub const fn read_only(mut self) -> Self {
        self.meta.editable = false;
        self
    }

    //
    // accessors
    //

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name the value is stored under in the attribute bucket.
    #[must_use]
    pub fn stored_name(&self) -> &str {
        self.attr_name.as_deref().unwrap_or(&self.name)
    }

    #[must_use]
    pub const fn kind(&self) -> &AttributeKind {
        &self.kind
    }

    #[must_use]
    pub const fn role(&self) -> KeyRole {
        self.role
    }

    #[must_use]
    pub const fn is_key(&self) -> bool {
        matches!(self.role, KeyRole::Hash | KeyRole::Range)
    }

    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        self.nullable
    }

    #[must_use]
    pub const fn derivation(&self) -> Option<&DeriveSource> {
        self.derivation.as_ref()
    }

    #[must_use]
    pub const fn is_only_default(&self) -> bool {
        self.only_default
    }

    #[must_use]
    pub const fn relation(&self) -> Option<&ForeignKey> {
        self.relation.as_ref()
    }

    #[must_use]
    pub const fn is_discriminator(&self) -> bool {
        self.discriminator
    }

    #[must_use]
    pub const fn meta(&self) -> &FieldMeta {
        &self.meta
    }

    /// Value a brand-new instance starts with.
    #[must_use]
    pub fn initial_value(&self) -> Value {
        self.default_for_new
            .as_ref()
            .or(self.default.as_ref())
            .map_or(Value::Null, DefaultValue::produce)
    }

    /// Shape used to infer reverse-query predicates.
    #[must_use]
    pub fn key_shape(&self) -> KeyShape<'_> {
        match &self.kind {
            AttributeKind::Prefixed { prefix, .. } => KeyShape::Prefixed(prefix),
            AttributeKind::Static(literal) => KeyShape::Static(literal),
            _ => KeyShape::Other,
        }
    }
}

///
/// KeyShape
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KeyShape<'a> {
    Prefixed(&'a str),
    Static(&'a str),
    Other,
}
