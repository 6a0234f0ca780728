use crate::item::AttributeValue;
use rust_decimal::Decimal;
use std::{cmp::Ordering, str::FromStr};

///
/// RangePredicate
///
/// Condition on the range key of a query. Comparisons only hold between
/// values of the same stored type; `Between` is inclusive.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RangePredicate {
    Eq(AttributeValue),
    Lt(AttributeValue),
    Le(AttributeValue),
    Gt(AttributeValue),
    Ge(AttributeValue),
    Between(AttributeValue, AttributeValue),
    BeginsWith(String),
}

impl RangePredicate {
    #[must_use]
    pub fn begins_with(prefix: impl Into<String>) -> Self {
        Self::BeginsWith(prefix.into())
    }

    #[must_use]
    pub fn eq_text(value: impl Into<String>) -> Self {
        Self::Eq(AttributeValue::S(value.into()))
    }

    #[must_use]
    pub fn matches(&self, value: &AttributeValue) -> bool {
        let cmp = |bound: &AttributeValue| compare_key_values(value, bound);

        match self {
            Self::Eq(bound) => cmp(bound) == Some(Ordering::Equal),
            Self::Lt(bound) => cmp(bound) == Some(Ordering::Less),
            Self::Le(bound) => matches!(cmp(bound), Some(Ordering::Less | Ordering::Equal)),
            Self::Gt(bound) => cmp(bound) == Some(Ordering::Greater),
            Self::Ge(bound) => matches!(cmp(bound), Some(Ordering::Greater | Ordering::Equal)),
            Self::Between(low, high) => {
                matches!(cmp(low), Some(Ordering::Greater | Ordering::Equal))
                    && matches!(cmp(high), Some(Ordering::Less | Ordering::Equal))
            }
            Self::BeginsWith(prefix) => value.as_s().is_some_and(|s| s.starts_with(prefix)),
        }
    }
}

/// Order two key values the way the store sorts range keys.
///
/// Numbers compare numerically, with unparsable text after every number;
/// `None` when the stored types differ.
#[must_use]
pub fn compare_key_values(a: &AttributeValue, b: &AttributeValue) -> Option<Ordering> {
    match (a, b) {
        (AttributeValue::S(a), AttributeValue::S(b)) => Some(a.cmp(b)),
        (AttributeValue::B(a), AttributeValue::B(b)) => Some(a.cmp(b)),
        (AttributeValue::N(a), AttributeValue::N(b)) => match (parse_number(a), parse_number(b)) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            (Some(_), None) => Some(Ordering::Less),
            (None, Some(_)) => Some(Ordering::Greater),
            (None, None) => Some(a.cmp(b)),
        },
        _ => None,
    }
}

fn parse_number(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}
