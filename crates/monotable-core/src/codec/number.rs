use crate::{codec::CodecError, item::AttributeValue, value::Value};
use rust_decimal::Decimal;
use std::str::FromStr;

///
/// NumberRepr
///
/// In-memory representation a number attribute decodes to.
/// Integers are accepted on encode by every representation, as long as a
/// float can hold them exactly; decoding always yields exactly the declared
/// one.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NumberRepr {
    Int,
    Decimal,
    Float,
}

impl NumberRepr {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Decimal => "decimal",
            Self::Float => "float",
        }
    }
}

// Largest magnitude below which every integer has an exact f64 form.
const MAX_EXACT_FLOAT_INT: u64 = 1 << 53;

pub(super) fn encode(repr: NumberRepr, value: &Value) -> Result<AttributeValue, CodecError> {
    let text = match (repr, value) {
        (NumberRepr::Float, Value::Int(v)) if v.unsigned_abs() > MAX_EXACT_FLOAT_INT => {
            return Err(CodecError::InexactFloat(*v));
        }
        (_, Value::Int(v)) => v.to_string(),
        (NumberRepr::Decimal, Value::Decimal(d)) => d.to_string(),
        (NumberRepr::Float, Value::Float(f)) => {
            if !f.is_finite() {
                return Err(CodecError::NonFiniteFloat(*f));
            }
            f.to_string()
        }
        (_, other) => {
            return Err(CodecError::TypeMismatch {
                expected: repr.label(),
                found: other.kind_label(),
            });
        }
    };

    Ok(AttributeValue::N(text))
}

pub(super) fn decode(repr: NumberRepr, raw: &AttributeValue) -> Result<Value, CodecError> {
    let AttributeValue::N(text) = raw else {
        return Err(CodecError::WireMismatch {
            expected: "N",
            found: raw.type_label(),
        });
    };
    let invalid = || CodecError::InvalidNumber {
        repr: repr.label(),
        value: text.clone(),
    };

    match repr {
        NumberRepr::Int => text.parse::<i64>().map(Value::Int).map_err(|_| invalid()),
        NumberRepr::Decimal => Decimal::from_str(text)
            .or_else(|_| Decimal::from_scientific(text))
            .map(Value::Decimal)
            .map_err(|_| invalid()),
        NumberRepr::Float => match text.parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(Value::Float(f)),
            _ => Err(invalid()),
        },
    }
}
