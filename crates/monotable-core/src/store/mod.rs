//! Module: store
//! Responsibility: the capability surface the core consumes from its storage
//! collaborator, plus an in-memory implementation.
//! Does not own: transport, retries, or timeouts. Errors raised by a store are
//! surfaced unchanged.

pub mod memory;
mod predicate;

#[cfg(test)]
mod tests;

use crate::{
    error::ErrorClass,
    item::{AttributeValue, PrimaryKey, RawItem},
};
use std::error::Error as StdError;
use thiserror::Error as ThisError;

// re-exports
pub use memory::{MemoryStore, StoreStats};
pub use predicate::{RangePredicate, compare_key_values};

///
/// StoreError
///

#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("store backend failure: {0}")]
    Backend(#[source] Box<dyn StdError + Send + Sync>),

    #[error("invalid store request: {0}")]
    InvalidRequest(String),
}

impl StoreError {
    pub fn backend(err: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::Backend(err.into())
    }

    pub(crate) const fn class(&self) -> ErrorClass {
        ErrorClass::Store
    }
}

///
/// IndexField
/// Where an index reads one of its keys from on a stored item.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum IndexField {
    HashKey,
    RangeKey,
    /// Stored attribute name in the item bucket.
    Attribute(String),
}

impl IndexField {
    #[must_use]
    pub fn read<'a>(&self, item: &'a RawItem) -> Option<&'a AttributeValue> {
        match self {
            Self::HashKey => Some(&item.hash_key),
            Self::RangeKey => item.range_key.as_ref(),
            Self::Attribute(name) => item.attribute(name),
        }
    }
}

///
/// IndexRequest
/// Secondary index a query runs against.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IndexRequest {
    pub name: String,
    pub hash: IndexField,
    pub range: Option<IndexField>,
}

///
/// QueryRequest
///

#[derive(Clone, Debug, PartialEq)]
pub struct QueryRequest {
    pub hash_key: AttributeValue,
    pub range: Option<RangePredicate>,
    pub index: Option<IndexRequest>,
    pub page_size: Option<usize>,
    pub consistent_read: bool,
    pub scan_forward: bool,
}

///
/// QueryPage
/// One page of results. `last_evaluated_key` is set while more pages remain.
///

#[derive(Clone, Debug, Default)]
pub struct QueryPage {
    pub items: Vec<RawItem>,
    pub last_evaluated_key: Option<PrimaryKey>,
}

///
/// Store
///
/// Blocking storage capability. Every call is a suspension point; the core
/// holds no locks across them.
///

pub trait Store: Send + Sync {
    /// Point lookup by full primary key.
    fn get_item(&self, key: &PrimaryKey) -> Result<Option<RawItem>, StoreError>;

    /// Fetch one page of a hash-key query, resuming after `start`.
    fn query_page(
        &self,
        request: &QueryRequest,
        start: Option<&PrimaryKey>,
    ) -> Result<QueryPage, StoreError>;

    /// Count the items a query would return.
    fn count(&self, request: &QueryRequest) -> Result<u64, StoreError>;

    /// Insert or replace one item.
    fn put_item(&self, item: RawItem) -> Result<(), StoreError>;
}
