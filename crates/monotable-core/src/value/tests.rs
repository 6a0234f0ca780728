use super::*;
use chrono::{FixedOffset, NaiveDate};

#[test]
fn zoned_timestamps_normalize_to_utc() {
    let offset = FixedOffset::east_opt(2 * 3600).expect("valid offset");
    let local = offset
        .with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
        .single()
        .expect("unambiguous local time");

    let value = Value::from(local);
    let utc = value.as_timestamp().expect("conversion should yield a timestamp");

    assert_eq!(utc.to_rfc3339(), "2024-03-01T10:00:00+00:00");
}

#[test]
fn naive_timestamps_are_taken_as_utc() {
    let naive = NaiveDate::from_ymd_opt(2024, 3, 1)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .expect("valid naive date-time");

    let value = Value::from(naive);
    let utc = value.as_timestamp().expect("conversion should yield a timestamp");

    assert_eq!(utc.timestamp(), naive.and_utc().timestamp());
}

#[test]
fn options_map_none_to_null() {
    assert_eq!(Value::from(None::<&str>), Value::Null);
    assert_eq!(Value::from(Some("x")), Value::Text("x".to_string()));
}

#[test]
fn scalar_classification_excludes_structures() {
    assert!(Value::from("abc").is_scalar());
    assert!(Value::from(7_i64).is_scalar());
    assert!(!Value::from(true).is_scalar());
    assert!(!Value::List(vec![]).is_scalar());
    assert!(!Value::Null.is_scalar());
}
