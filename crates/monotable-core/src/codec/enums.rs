use crate::{
    codec::{CodecError, WireType},
    item::AttributeValue,
    value::Value,
};

///
/// EnumBacking
/// Stored type of an enum's underlying member values.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EnumBacking {
    Text,
    Number,
}

///
/// EnumMember
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EnumMember {
    pub name: String,
    pub value: String,
}

///
/// EnumModel
///
/// Closed set of named members. In memory an enum value is the member name;
/// stored, it is the member's underlying value.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EnumModel {
    pub name: String,
    pub backing: EnumBacking,
    pub members: Vec<EnumMember>,
}

impl EnumModel {
    /// Enum whose members are stored as text.
    #[must_use]
    pub fn text(name: impl Into<String>, members: &[(&str, &str)]) -> Self {
        Self {
            name: name.into(),
            backing: EnumBacking::Text,
            members: members
                .iter()
                .map(|(name, value)| EnumMember {
                    name: (*name).to_string(),
                    value: (*value).to_string(),
                })
                .collect(),
        }
    }

    /// Enum whose members are stored as integers.
    #[must_use]
    pub fn number(name: impl Into<String>, members: &[(&str, i64)]) -> Self {
        Self {
            name: name.into(),
            backing: EnumBacking::Number,
            members: members
                .iter()
                .map(|(name, value)| EnumMember {
                    name: (*name).to_string(),
                    value: value.to_string(),
                })
                .collect(),
        }
    }

    #[must_use]
    pub const fn wire_type(&self) -> WireType {
        match self.backing {
            EnumBacking::Text => WireType::S,
            EnumBacking::Number => WireType::N,
        }
    }

    #[must_use]
    pub fn member(&self, name: &str) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.name == name)
    }

    fn member_by_value(&self, value: &str) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.value == value)
    }

    pub(super) fn encode(&self, value: &Value) -> Result<AttributeValue, CodecError> {
        let member = match (value, self.backing) {
            (Value::Enum(name), _) => self.member(name),
            (Value::Text(text), EnumBacking::Text) => self.member_by_value(text),
            (Value::Int(v), EnumBacking::Number) => self.member_by_value(&v.to_string()),
            (other, _) => {
                return Err(CodecError::TypeMismatch {
                    expected: "enum",
                    found: other.kind_label(),
                });
            }
        };

        let member = member.ok_or_else(|| CodecError::NotEnumMember {
            enum_name: self.name.clone(),
            value: display_candidate(value),
        })?;

        Ok(match self.backing {
            EnumBacking::Text => AttributeValue::S(member.value.clone()),
            EnumBacking::Number => AttributeValue::N(member.value.clone()),
        })
    }

    pub(super) fn decode(&self, raw: &AttributeValue) -> Result<Value, CodecError> {
        let stored = match (raw, self.backing) {
            (AttributeValue::S(s), EnumBacking::Text)
            | (AttributeValue::N(s), EnumBacking::Number) => s,
            (other, backing) => {
                let expected = match backing {
                    EnumBacking::Text => "S",
                    EnumBacking::Number => "N",
                };
                return Err(CodecError::WireMismatch {
                    expected,
                    found: other.type_label(),
                });
            }
        };

        self.member_by_value(stored)
            .map(|m| Value::Enum(m.name.clone()))
            .ok_or_else(|| CodecError::UnknownEnumValue {
                enum_name: self.name.clone(),
                value: stored.clone(),
            })
    }
}

fn display_candidate(value: &Value) -> String {
    match value {
        Value::Enum(name) | Value::Text(name) => name.clone(),
        Value::Int(v) => v.to_string(),
        other => other.kind_label().to_string(),
    }
}
