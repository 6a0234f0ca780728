use crate::{codec::CodecError, item::AttributeValue, value::Value};
use chrono::{DateTime, Utc};

// Microsecond precision with an explicit zero offset.
const DATETIME_WRITE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f+0000";
const DATETIME_READ_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

fn timestamp_of(value: &Value, expected: &'static str) -> Result<DateTime<Utc>, CodecError> {
    match value {
        Value::Timestamp(ts) => Ok(*ts),
        other => Err(CodecError::TypeMismatch {
            expected,
            found: other.kind_label(),
        }),
    }
}

pub(super) fn encode_unix(value: &Value) -> Result<AttributeValue, CodecError> {
    let ts = timestamp_of(value, "timestamp")?;

    Ok(AttributeValue::N(ts.timestamp().to_string()))
}

pub(super) fn decode_unix(raw: &AttributeValue) -> Result<Value, CodecError> {
    let AttributeValue::N(text) = raw else {
        return Err(CodecError::WireMismatch {
            expected: "N",
            found: raw.type_label(),
        });
    };

    let seconds = text
        .parse::<i64>()
        .map_err(|_| CodecError::InvalidTimestamp(text.clone()))?;
    let ts = DateTime::<Utc>::from_timestamp(seconds, 0)
        .ok_or_else(|| CodecError::InvalidTimestamp(text.clone()))?;

    Ok(Value::Timestamp(ts))
}

pub(super) fn encode_datetime(value: &Value) -> Result<AttributeValue, CodecError> {
    let ts = timestamp_of(value, "datetime")?;

    Ok(AttributeValue::S(ts.format(DATETIME_WRITE_FORMAT).to_string()))
}

pub(super) fn decode_datetime(raw: &AttributeValue) -> Result<Value, CodecError> {
    let AttributeValue::S(text) = raw else {
        return Err(CodecError::WireMismatch {
            expected: "S",
            found: raw.type_label(),
        });
    };

    let parsed = DateTime::parse_from_str(text, DATETIME_READ_FORMAT)
        .map_err(|_| CodecError::InvalidTimestamp(text.clone()))?;

    Ok(Value::Timestamp(parsed.with_timezone(&Utc)))
}
