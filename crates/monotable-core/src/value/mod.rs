#[cfg(test)]
mod tests;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

///
/// Value
///
/// In-memory, typed attribute value held by an entity instance.
///
/// Null      → the attribute has no value; encodes to the absent marker.
/// Enum      → holds the member *name*; the codec maps it to the stored value.
/// Timestamp → always a UTC instant; zoned inputs are normalized on conversion
///             and naive inputs are taken as UTC.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Blob(Vec<u8>),
    BlobSet(BTreeSet<Vec<u8>>),
    Bool(bool),
    Decimal(Decimal),
    Enum(String),
    Float(f64),
    Int(i64),
    Json(serde_json::Value),
    List(Vec<Self>),
    Map(BTreeMap<String, Self>),
    NumberSet(BTreeSet<Decimal>),
    Text(String),
    TextSet(BTreeSet<String>),
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// Short label of the runtime variant, used in type errors.
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Blob(_) => "blob",
            Self::BlobSet(_) => "blob set",
            Self::Bool(_) => "bool",
            Self::Decimal(_) => "decimal",
            Self::Enum(_) => "enum",
            Self::Float(_) => "float",
            Self::Int(_) => "int",
            Self::Json(_) => "json",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::NumberSet(_) => "number set",
            Self::Text(_) => "text",
            Self::TextSet(_) => "text set",
            Self::Timestamp(_) => "timestamp",
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether the value can stand in for a foreign key scalar.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::Text(_) | Self::Int(_) | Self::Decimal(_) | Self::Float(_) | Self::Blob(_)
        )
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_timestamp(&self) -> Option<&DateTime<Utc>> {
        match self {
            Self::Timestamp(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_enum(&self) -> Option<&str> {
        match self {
            Self::Enum(member) => Some(member),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_map(&self) -> Option<&BTreeMap<String, Self>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Build an enum value from its member name.
    #[must_use]
    pub fn enum_member(member: impl Into<String>) -> Self {
        Self::Enum(member.into())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Self::Blob(value)
    }
}

impl From<Vec<Self>> for Value {
    fn from(value: Vec<Self>) -> Self {
        Self::List(value)
    }
}

impl From<BTreeMap<String, Self>> for Value {
    fn from(value: BTreeMap<String, Self>) -> Self {
        Self::Map(value)
    }
}

impl From<BTreeSet<String>> for Value {
    fn from(value: BTreeSet<String>) -> Self {
        Self::TextSet(value)
    }
}

impl From<BTreeSet<Decimal>> for Value {
    fn from(value: BTreeSet<Decimal>) -> Self {
        Self::NumberSet(value)
    }
}

impl From<BTreeSet<Vec<u8>>> for Value {
    fn from(value: BTreeSet<Vec<u8>>) -> Self {
        Self::BlobSet(value)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

// Zoned instants are normalized to UTC.
impl<Tz: TimeZone> From<DateTime<Tz>> for Value {
    fn from(value: DateTime<Tz>) -> Self {
        Self::Timestamp(value.with_timezone(&Utc))
    }
}

// A naive date-time carries no zone and is taken as UTC.
impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Self::Timestamp(value.and_utc())
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
