use crate::{
    codec::{self, AttributeKind, CodecError},
    item::AttributeValue,
    value::Value,
};
use rust_decimal::Decimal;
use std::{
    collections::{BTreeMap, BTreeSet},
    str::FromStr,
};

///
/// MapField
///

#[derive(Clone, Debug)]
pub struct MapField {
    pub name: String,
    pub kind: AttributeKind,
    pub nullable: bool,
}

///
/// MapModel
///
/// Declared shape of a map attribute. A model with no fields is untyped:
/// entries are encoded from their runtime value alone.
///

#[derive(Clone, Debug, Default)]
pub struct MapModel {
    pub fields: Vec<MapField>,
}

impl MapModel {
    #[must_use]
    pub fn untyped() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>, kind: AttributeKind) -> Self {
        self.fields.push(MapField {
            name: name.into(),
            kind,
            nullable: false,
        });
        self
    }

    #[must_use]
    pub fn nullable_field(mut self, name: impl Into<String>, kind: AttributeKind) -> Self {
        self.fields.push(MapField {
            name: name.into(),
            kind,
            nullable: true,
        });
        self
    }

    #[must_use]
    pub const fn is_untyped(&self) -> bool {
        self.fields.is_empty()
    }

    fn declared(&self, name: &str) -> Option<&MapField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check every entry of a map value against the declared fields.
    pub fn validate(&self, value: &Value) -> Result<(), CodecError> {
        self.encode(value).map(drop)
    }

    pub(super) fn encode(&self, value: &Value) -> Result<AttributeValue, CodecError> {
        let Value::Map(entries) = value else {
            return Err(CodecError::TypeMismatch {
                expected: "map",
                found: value.kind_label(),
            });
        };
        if self.is_untyped() {
            return encode_dynamic(value);
        }

        if let Some(unknown) = entries.keys().find(|k| self.declared(k).is_none()) {
            return Err(CodecError::InvalidMap(format!("unknown field '{unknown}'")));
        }

        let mut out = BTreeMap::new();
        for field in &self.fields {
            let entry = entries.get(&field.name).unwrap_or(&Value::Null);
            if entry.is_null() {
                if !field.nullable {
                    return Err(CodecError::InvalidMap(format!(
                        "field '{}' is required",
                        field.name
                    )));
                }
                continue;
            }

            let encoded = codec::encode(&field.kind, entry)
                .map_err(|err| CodecError::InvalidMap(format!("field '{}': {err}", field.name)))?;
            out.insert(field.name.clone(), encoded);
        }

        Ok(AttributeValue::M(out))
    }

    pub(super) fn decode(&self, raw: &AttributeValue) -> Result<Value, CodecError> {
        let AttributeValue::M(entries) = raw else {
            return Err(CodecError::WireMismatch {
                expected: "M",
                found: raw.type_label(),
            });
        };
        if self.is_untyped() {
            return decode_dynamic(raw);
        }

        let mut out = BTreeMap::new();
        for field in &self.fields {
            if let Some(stored) = entries.get(&field.name) {
                out.insert(field.name.clone(), codec::decode(&field.kind, stored)?);
            }
        }

        Ok(Value::Map(out))
    }
}

pub(super) fn encode_json(value: &Value) -> Result<AttributeValue, CodecError> {
    match value {
        Value::Json(json) => serde_json::to_string(json)
            .map(AttributeValue::S)
            .map_err(|err| CodecError::InvalidJson(err.to_string())),
        other => Err(CodecError::TypeMismatch {
            expected: "json",
            found: other.kind_label(),
        }),
    }
}

pub(super) fn decode_json(raw: &AttributeValue) -> Result<Value, CodecError> {
    let AttributeValue::S(text) = raw else {
        return Err(CodecError::WireMismatch {
            expected: "S",
            found: raw.type_label(),
        });
    };

    serde_json::from_str(text)
        .map(Value::Json)
        .map_err(|err| CodecError::InvalidJson(err.to_string()))
}

pub(super) fn encode_list(
    element: Option<&AttributeKind>,
    value: &Value,
) -> Result<AttributeValue, CodecError> {
    let Value::List(items) = value else {
        return Err(CodecError::TypeMismatch {
            expected: "list",
            found: value.kind_label(),
        });
    };

    items
        .iter()
        .map(|item| match element {
            Some(kind) => codec::encode(kind, item),
            None => encode_dynamic(item),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(AttributeValue::L)
}

pub(super) fn decode_list(
    element: Option<&AttributeKind>,
    raw: &AttributeValue,
) -> Result<Value, CodecError> {
    let AttributeValue::L(items) = raw else {
        return Err(CodecError::WireMismatch {
            expected: "L",
            found: raw.type_label(),
        });
    };

    items
        .iter()
        .map(|item| match element {
            Some(kind) => codec::decode(kind, item),
            None => decode_dynamic(item),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Value::List)
}

// The store cannot hold an empty set, so an empty set is absent.
pub(super) fn encode_text_set(value: &Value) -> Result<AttributeValue, CodecError> {
    match value {
        Value::TextSet(set) if set.is_empty() => Ok(AttributeValue::Null),
        Value::TextSet(set) => Ok(AttributeValue::Ss(set.clone())),
        other => Err(CodecError::TypeMismatch {
            expected: "text set",
            found: other.kind_label(),
        }),
    }
}

pub(super) fn decode_text_set(raw: &AttributeValue) -> Result<Value, CodecError> {
    match raw {
        AttributeValue::Ss(set) => Ok(Value::TextSet(set.clone())),
        other => Err(CodecError::WireMismatch {
            expected: "SS",
            found: other.type_label(),
        }),
    }
}

pub(super) fn encode_number_set(value: &Value) -> Result<AttributeValue, CodecError> {
    match value {
        Value::NumberSet(set) if set.is_empty() => Ok(AttributeValue::Null),
        Value::NumberSet(set) => Ok(AttributeValue::Ns(
            set.iter().map(ToString::to_string).collect(),
        )),
        other => Err(CodecError::TypeMismatch {
            expected: "number set",
            found: other.kind_label(),
        }),
    }
}

pub(super) fn decode_number_set(raw: &AttributeValue) -> Result<Value, CodecError> {
    let AttributeValue::Ns(members) = raw else {
        return Err(CodecError::WireMismatch {
            expected: "NS",
            found: raw.type_label(),
        });
    };

    members
        .iter()
        .map(|text| {
            Decimal::from_str(text)
                .or_else(|_| Decimal::from_scientific(text))
                .map_err(|_| CodecError::InvalidNumber {
                    repr: "number set",
                    value: text.clone(),
                })
        })
        .collect::<Result<BTreeSet<_>, _>>()
        .map(Value::NumberSet)
}

pub(super) fn encode_blob_set(value: &Value) -> Result<AttributeValue, CodecError> {
    match value {
        Value::BlobSet(set) if set.is_empty() => Ok(AttributeValue::Null),
        Value::BlobSet(set) => Ok(AttributeValue::Bs(set.clone())),
        other => Err(CodecError::TypeMismatch {
            expected: "binary set",
            found: other.kind_label(),
        }),
    }
}

pub(super) fn decode_blob_set(raw: &AttributeValue) -> Result<Value, CodecError> {
    match raw {
        AttributeValue::Bs(set) => Ok(Value::BlobSet(set.clone())),
        other => Err(CodecError::WireMismatch {
            expected: "BS",
            found: other.type_label(),
        }),
    }
}

/// Encode a value with no declared kind, choosing the wire type from the
/// runtime variant.
///
/// Only variants that decode back to themselves are accepted. Floats, enums,
/// timestamps, json and empty sets need a declared kind.
pub fn encode_dynamic(value: &Value) -> Result<AttributeValue, CodecError> {
    let encoded = match value {
        Value::Null => AttributeValue::Null,
        Value::Blob(bytes) => AttributeValue::B(bytes.clone()),
        Value::Bool(v) => AttributeValue::Bool(*v),
        // integral decimals keep a fraction so they do not decode as ints
        Value::Decimal(d) if d.scale() == 0 => AttributeValue::N(format!("{d}.0")),
        Value::Decimal(d) => AttributeValue::N(d.to_string()),
        Value::Text(text) => AttributeValue::S(text.clone()),
        Value::Int(v) => AttributeValue::N(v.to_string()),
        Value::List(_) => encode_list(None, value)?,
        Value::Map(entries) => AttributeValue::M(
            entries
                .iter()
                .map(|(k, v)| encode_dynamic(v).map(|raw| (k.clone(), raw)))
                .collect::<Result<_, _>>()?,
        ),
        Value::TextSet(set) if set.is_empty() => return Err(CodecError::Untyped("empty set")),
        Value::NumberSet(set) if set.is_empty() => return Err(CodecError::Untyped("empty set")),
        Value::BlobSet(set) if set.is_empty() => return Err(CodecError::Untyped("empty set")),
        Value::TextSet(_) => encode_text_set(value)?,
        Value::NumberSet(_) => encode_number_set(value)?,
        Value::BlobSet(_) => encode_blob_set(value)?,
        Value::Enum(_) | Value::Float(_) | Value::Json(_) | Value::Timestamp(_) => {
            return Err(CodecError::Untyped(value.kind_label()));
        }
    };

    Ok(encoded)
}

/// Decode a stored value with no declared kind.
///
/// Numbers decode to `Int` when they are integral and in range, otherwise to
/// an exact `Decimal`.
pub fn decode_dynamic(raw: &AttributeValue) -> Result<Value, CodecError> {
    let decoded = match raw {
        AttributeValue::S(s) => Value::Text(s.clone()),
        AttributeValue::N(text) => match text.parse::<i64>() {
            Ok(v) => Value::Int(v),
            Err(_) => Decimal::from_str(text)
                .or_else(|_| Decimal::from_scientific(text))
                .map(Value::Decimal)
                .map_err(|_| CodecError::InvalidNumber {
                    repr: "decimal",
                    value: text.clone(),
                })?,
        },
        AttributeValue::B(bytes) => Value::Blob(bytes.clone()),
        AttributeValue::Bool(v) => Value::Bool(*v),
        AttributeValue::Null => Value::Null,
        AttributeValue::L(_) => decode_list(None, raw)?,
        AttributeValue::M(entries) => Value::Map(
            entries
                .iter()
                .map(|(k, v)| decode_dynamic(v).map(|value| (k.clone(), value)))
                .collect::<Result<_, _>>()?,
        ),
        AttributeValue::Ss(set) => Value::TextSet(set.clone()),
        AttributeValue::Ns(_) => decode_number_set(raw)?,
        AttributeValue::Bs(set) => Value::BlobSet(set.clone()),
    };

    Ok(decoded)
}
