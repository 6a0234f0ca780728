//! Module: item
//! Responsibility: the store's raw wire representation of one record.
//! Does not own: typed decoding (see `codec`) or entity dispatch (see `db`).
//!
//! Invariants:
//! - Key slots only ever hold `S`, `N`, or `B` values.
//! - `Null` is the absent marker; it is never placed in the attribute bucket.

use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::{self, Display},
};

///
/// AttributeValue
///
/// Tagged scalar/structured value in the store's wire format.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum AttributeValue {
    #[serde(rename = "S")]
    S(String),
    #[serde(rename = "N")]
    N(String),
    #[serde(rename = "B")]
    B(Vec<u8>),
    #[serde(rename = "BOOL")]
    Bool(bool),
    #[serde(rename = "NULL")]
    Null,
    #[serde(rename = "L")]
    L(Vec<Self>),
    #[serde(rename = "M")]
    M(BTreeMap<String, Self>),
    #[serde(rename = "SS")]
    Ss(BTreeSet<String>),
    #[serde(rename = "NS")]
    Ns(BTreeSet<String>),
    #[serde(rename = "BS")]
    Bs(BTreeSet<Vec<u8>>),
}

impl AttributeValue {
    #[must_use]
    pub const fn type_label(&self) -> &'static str {
        match self {
            Self::S(_) => "S",
            Self::N(_) => "N",
            Self::B(_) => "B",
            Self::Bool(_) => "BOOL",
            Self::Null => "NULL",
            Self::L(_) => "L",
            Self::M(_) => "M",
            Self::Ss(_) => "SS",
            Self::Ns(_) => "NS",
            Self::Bs(_) => "BS",
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether this value may occupy a hash or range key slot.
    #[must_use]
    pub const fn is_key_type(&self) -> bool {
        matches!(self, Self::S(_) | Self::N(_) | Self::B(_))
    }

    #[must_use]
    pub fn as_s(&self) -> Option<&str> {
        match self {
            Self::S(s) => Some(s),
            _ => None,
        }
    }

    /// Serialized text of a string or number value.
    ///
    /// This is the form derived keys and foreign keys are built from.
    #[must_use]
    pub fn key_text(&self) -> Option<&str> {
        match self {
            Self::S(s) | Self::N(s) => Some(s),
            _ => None,
        }
    }
}

impl Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::S(s) | Self::N(s) => write!(f, "{s}"),
            Self::B(bytes) => write!(f, "<{} bytes>", bytes.len()),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Null => write!(f, "null"),
            Self::L(items) => write!(f, "[{} items]", items.len()),
            Self::M(map) => write!(f, "{{{} entries}}", map.len()),
            Self::Ss(set) => write!(f, "<{} strings>", set.len()),
            Self::Ns(set) => write!(f, "<{} numbers>", set.len()),
            Self::Bs(set) => write!(f, "<{} blobs>", set.len()),
        }
    }
}

///
/// PrimaryKey
/// Composite primary key of one stored record.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct PrimaryKey {
    pub hash: AttributeValue,
    pub range: Option<AttributeValue>,
}

impl PrimaryKey {
    #[must_use]
    pub const fn new(hash: AttributeValue, range: Option<AttributeValue>) -> Self {
        Self { hash, range }
    }
}

impl Display for PrimaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.range {
            Some(range) => write!(f, "{} / {}", self.hash, range),
            None => write!(f, "{}", self.hash),
        }
    }
}

///
/// RawItem
///
/// One stored record: the two key slots plus the generic attribute bucket.
/// The discriminator lives in the bucket under the table's configured name.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RawItem {
    pub hash_key: AttributeValue,
    pub range_key: Option<AttributeValue>,
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl RawItem {
    #[must_use]
    pub const fn new(hash_key: AttributeValue, range_key: Option<AttributeValue>) -> Self {
        Self {
            hash_key,
            range_key,
            attributes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    #[must_use]
    pub fn primary_key(&self) -> PrimaryKey {
        PrimaryKey::new(self.hash_key.clone(), self.range_key.clone())
    }
}
