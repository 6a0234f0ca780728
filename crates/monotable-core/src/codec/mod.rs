//! Module: codec
//! Responsibility: pure, total encoders/decoders between typed `Value`s and
//! the store's `AttributeValue` wire format.
//! Does not own: key derivation, relation wrapping, or null-checking policy.
//!
//! Invariants:
//! - `encode(kind, Value::Null)` yields the absent marker, except for static
//!   attributes, which always yield their literal.
//! - Decoding never promotes or demotes numbers across representations.
//! - Static and prefixed attributes reject mismatched values, never coerce.

mod enums;
mod number;
mod structured;
mod time;


use crate::{error::ErrorClass, item::AttributeValue, value::Value};
use derive_more::Display;
use thiserror::Error as ThisError;

// re-exports
pub use enums::{EnumBacking, EnumMember, EnumModel};
pub use number::NumberRepr;
pub use structured::{MapField, MapModel, decode_dynamic, encode_dynamic};

///
/// CodecError
///

#[derive(Debug, ThisError)]
pub enum CodecError {
    #[error("expected {expected} value, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("expected stored {expected} value, found {found}")]
    WireMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("static value '{expected}' does not match '{found}'")]
    StaticMismatch { expected: String, found: String },

    #[error("prefix '{prefix}' was not found in stored value '{value}'")]
    MissingPrefix { prefix: String, value: String },

    #[error("'{value}' is not a member of enum {enum_name}")]
    NotEnumMember { enum_name: String, value: String },

    #[error("stored value '{value}' matches no member of enum {enum_name}")]
    UnknownEnumValue { enum_name: String, value: String },

    #[error("invalid {repr} number '{value}'")]
    InvalidNumber { repr: &'static str, value: String },

    #[error("non-finite float {0} cannot be stored")]
    NonFiniteFloat(f64),

    #[error("integer {0} has no exact float form")]
    InexactFloat(i64),

    #[error("{0} values cannot be stored in an untyped structure")]
    Untyped(&'static str),

    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),

    #[error("invalid json: {0}")]
    InvalidJson(String),

    #[error("map is not correctly typed: {0}")]
    InvalidMap(String),

    #[error("{0} values have no key text form")]
    NotKeyText(&'static str),
}

impl CodecError {
    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::TypeMismatch { .. }
            | Self::NotEnumMember { .. }
            | Self::NonFiniteFloat(_)
            | Self::InexactFloat(_)
            | Self::Untyped(_)
            | Self::InvalidMap(_)
            | Self::NotKeyText(_) => ErrorClass::Type,
            Self::WireMismatch { .. }
            | Self::StaticMismatch { .. }
            | Self::MissingPrefix { .. }
            | Self::UnknownEnumValue { .. }
            | Self::InvalidNumber { .. }
            | Self::InvalidTimestamp(_)
            | Self::InvalidJson(_) => ErrorClass::Encoding,
        }
    }

    const fn wire(expected: &'static str, raw: &AttributeValue) -> Self {
        Self::WireMismatch {
            expected,
            found: raw.type_label(),
        }
    }
}

///
/// WireType
/// Stored type tag an attribute kind encodes to.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum WireType {
    S,
    N,
    B,
    #[display("BOOL")]
    Bool,
    L,
    M,
    #[display("SS")]
    Ss,
    #[display("NS")]
    Ns,
    #[display("BS")]
    Bs,
}

impl WireType {
    /// Whether the wire type may occupy a key slot.
    #[must_use]
    pub const fn is_key_type(self) -> bool {
        matches!(self, Self::S | Self::N | Self::B)
    }

    /// Rebuild a stored value of this type from its serialized text.
    #[must_use]
    pub fn from_text(self, text: impl Into<String>) -> Option<AttributeValue> {
        match self {
            Self::S => Some(AttributeValue::S(text.into())),
            Self::N => Some(AttributeValue::N(text.into())),
            _ => None,
        }
    }
}

///
/// AttributeKind
///
/// Semantic type of an attribute. Each variant selects exactly one codec;
/// key derivation and relations are layered on top by the attribute model.
///

#[derive(Clone, Debug)]
pub enum AttributeKind {
    Binary,
    BinarySet,
    Bool,
    /// UTC date-time stored as ISO-8601 text.
    DateTime,
    Enum(EnumModel),
    Json,
    List(Option<Box<Self>>),
    Map(MapModel),
    Number(NumberRepr),
    /// Set of exact numbers.
    NumberSet,
    Prefixed {
        prefix: String,
        inner: Box<Self>,
    },
    /// Schema tag: serializes only the configured literal.
    Static(String),
    Text,
    TextSet,
    /// UTC instant stored as whole seconds since the epoch.
    Timestamp,
}

impl AttributeKind {
    /// Text with a fixed prefix.
    #[must_use]
    pub fn prefixed(prefix: impl Into<String>) -> Self {
        Self::Prefixed {
            prefix: prefix.into(),
            inner: Box::new(Self::Text),
        }
    }

    #[must_use]
    pub const fn wire_type(&self) -> WireType {
        match self {
            Self::Binary => WireType::B,
            Self::BinarySet => WireType::Bs,
            Self::Bool => WireType::Bool,
            Self::Json
            | Self::DateTime
            | Self::Prefixed { .. }
            | Self::Static(_)
            | Self::Text => WireType::S,
            Self::Enum(model) => model.wire_type(),
            Self::List(_) => WireType::L,
            Self::Map(_) => WireType::M,
            Self::Number(_) | Self::Timestamp => WireType::N,
            Self::TextSet => WireType::Ss,
            Self::NumberSet => WireType::Ns,
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::BinarySet => "binary set",
            Self::Bool => "bool",
            Self::DateTime => "datetime",
            Self::Enum(_) => "enum",
            Self::Json => "json",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Number(repr) => repr.label(),
            Self::NumberSet => "number set",
            Self::Prefixed { .. } => "prefixed text",
            Self::Static(_) => "static text",
            Self::Text => "text",
            Self::TextSet => "text set",
            Self::Timestamp => "timestamp",
        }
    }
}

/// Encode a typed value into its stored form.
pub fn encode(kind: &AttributeKind, value: &Value) -> Result<AttributeValue, CodecError> {
    if value.is_null() {
        return Ok(match kind {
            AttributeKind::Static(literal) => AttributeValue::S(literal.clone()),
            _ => AttributeValue::Null,
        });
    }

    match kind {
        AttributeKind::Binary => match value {
            Value::Blob(bytes) => Ok(AttributeValue::B(bytes.clone())),
            other => Err(mismatch(kind, other)),
        },
        AttributeKind::BinarySet => structured::encode_blob_set(value),
        AttributeKind::Bool => match value {
            Value::Bool(v) => Ok(AttributeValue::Bool(*v)),
            other => Err(mismatch(kind, other)),
        },
        AttributeKind::DateTime => time::encode_datetime(value),
        AttributeKind::Enum(model) => model.encode(value),
        AttributeKind::Json => structured::encode_json(value),
        AttributeKind::List(element) => structured::encode_list(element.as_deref(), value),
        AttributeKind::Map(model) => model.encode(value),
        AttributeKind::Number(repr) => number::encode(*repr, value),
        AttributeKind::NumberSet => structured::encode_number_set(value),
        AttributeKind::Prefixed { prefix, inner } => encode_prefixed(prefix, inner, value),
        AttributeKind::Static(literal) => match value {
            Value::Text(s) if s == literal => Ok(AttributeValue::S(literal.clone())),
            Value::Text(s) => Err(CodecError::StaticMismatch {
                expected: literal.clone(),
                found: s.clone(),
            }),
            other => Err(mismatch(kind, other)),
        },
        AttributeKind::Text => match value {
            Value::Text(s) => Ok(AttributeValue::S(s.clone())),
            other => Err(mismatch(kind, other)),
        },
        AttributeKind::TextSet => structured::encode_text_set(value),
        AttributeKind::Timestamp => time::encode_unix(value),
    }
}

/// Decode a stored value into its typed form.
pub fn decode(kind: &AttributeKind, raw: &AttributeValue) -> Result<Value, CodecError> {
    if raw.is_null() {
        return Ok(Value::Null);
    }

    match kind {
        AttributeKind::Binary => match raw {
            AttributeValue::B(bytes) => Ok(Value::Blob(bytes.clone())),
            other => Err(CodecError::wire("B", other)),
        },
        AttributeKind::BinarySet => structured::decode_blob_set(raw),
        AttributeKind::Bool => match raw {
            AttributeValue::Bool(v) => Ok(Value::Bool(*v)),
            other => Err(CodecError::wire("BOOL", other)),
        },
        AttributeKind::DateTime => time::decode_datetime(raw),
        AttributeKind::Enum(model) => model.decode(raw),
        AttributeKind::Json => structured::decode_json(raw),
        AttributeKind::List(element) => structured::decode_list(element.as_deref(), raw),
        AttributeKind::Map(model) => model.decode(raw),
        AttributeKind::Number(repr) => number::decode(*repr, raw),
        AttributeKind::NumberSet => structured::decode_number_set(raw),
        AttributeKind::Prefixed { prefix, inner } => decode_prefixed(prefix, inner, raw),
        AttributeKind::Static(literal) => match raw {
            AttributeValue::S(s) if s == literal => Ok(Value::Text(s.clone())),
            AttributeValue::S(s) => Err(CodecError::StaticMismatch {
                expected: literal.clone(),
                found: s.clone(),
            }),
            other => Err(CodecError::wire("S", other)),
        },
        AttributeKind::Text => match raw {
            AttributeValue::S(s) => Ok(Value::Text(s.clone())),
            other => Err(CodecError::wire("S", other)),
        },
        AttributeKind::TextSet => structured::decode_text_set(raw),
        AttributeKind::Timestamp => time::decode_unix(raw),
    }
}

/// Check that a value lies in the kind's domain without keeping the encoding.
pub fn check(kind: &AttributeKind, value: &Value) -> Result<(), CodecError> {
    encode(kind, value).map(drop)
}

/// Serialized key text of a value, or `None` when the value is absent.
pub fn key_text(kind: &AttributeKind, value: &Value) -> Result<Option<String>, CodecError> {
    let encoded = encode(kind, value)?;
    if encoded.is_null() {
        return Ok(None);
    }

    encoded
        .key_text()
        .map(|text| Some(text.to_string()))
        .ok_or(CodecError::NotKeyText(encoded.type_label()))
}

/// Rebuild the in-memory value a kind would encode to `text`.
///
/// Prefixed kinds read `text` as the unprefixed suffix, so encoding the result
/// adds the prefix exactly once.
pub fn value_from_text(kind: &AttributeKind, text: &str) -> Result<Value, CodecError> {
    if let AttributeKind::Prefixed { inner, .. } = kind {
        return value_from_text(inner, text);
    }

    decode_text(kind, text)
}

/// Decode a value from its full stored text, prefix included.
pub fn decode_text(kind: &AttributeKind, text: &str) -> Result<Value, CodecError> {
    let raw = kind
        .wire_type()
        .from_text(text)
        .ok_or(CodecError::NotKeyText(kind.label()))?;

    decode(kind, &raw)
}

// An empty value skips the inner codec so the empty case is never double-encoded.
fn encode_prefixed(
    prefix: &str,
    inner: &AttributeKind,
    value: &Value,
) -> Result<AttributeValue, CodecError> {
    if let Value::Text(s) = value
        && s.is_empty()
    {
        return Ok(AttributeValue::S(prefix.to_string()));
    }

    let encoded = encode(inner, value)?;
    let text = encoded
        .key_text()
        .ok_or(CodecError::NotKeyText(encoded.type_label()))?;

    Ok(AttributeValue::S(format!("{prefix}{text}")))
}

fn decode_prefixed(
    prefix: &str,
    inner: &AttributeKind,
    raw: &AttributeValue,
) -> Result<Value, CodecError> {
    let AttributeValue::S(stored) = raw else {
        return Err(CodecError::wire("S", raw));
    };
    let Some(rest) = stored.strip_prefix(prefix) else {
        return Err(CodecError::MissingPrefix {
            prefix: prefix.to_string(),
            value: stored.clone(),
        });
    };
    if rest.is_empty() {
        return Ok(Value::Text(String::new()));
    }

    let inner_raw = inner
        .wire_type()
        .from_text(rest)
        .ok_or(CodecError::NotKeyText(inner.label()))?;

    decode(inner, &inner_raw)
}

const fn mismatch(kind: &AttributeKind, value: &Value) -> CodecError {
    CodecError::TypeMismatch {
        expected: kind.label(),
        found: value.kind_label(),
    }
}
