use crate::{
    Error,
    db::Db,
    entity::Entity,
    item::{PrimaryKey, RawItem},
    store::{QueryRequest, RangePredicate},
};
use log::debug;
use std::{collections::VecDeque, iter::FusedIterator};

///
/// QueryOptions
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QueryOptions {
    pub index: Option<String>,
    /// Items per store page; the table default applies when unset.
    pub page_size: Option<usize>,
    pub consistent_read: bool,
    pub scan_forward: bool,
    /// Stop after this many entities.
    pub limit: Option<usize>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            index: None,
            page_size: None,
            consistent_read: false,
            scan_forward: true,
            limit: None,
        }
    }
}

impl QueryOptions {
    #[must_use]
    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    #[must_use]
    pub const fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub const fn consistent(mut self) -> Self {
        self.consistent_read = true;
        self
    }

    #[must_use]
    pub const fn descending(mut self) -> Self {
        self.scan_forward = false;
        self
    }
}

///
/// Query
///
/// Lazy, forward-only sequence of decoded entities for one partition.
/// Pages are requested from the store only as the caller consumes items;
/// dropping the query stops paging. The first error ends the sequence.
///

#[derive(Debug)]
pub struct Query {
    db: Db,
    request: QueryRequest,
    buffer: VecDeque<RawItem>,
    start: Option<PrimaryKey>,
    remaining: Option<usize>,
    exhausted: bool,
    failed: bool,
}

impl Query {
    pub(crate) fn new(db: Db, request: QueryRequest, limit: Option<usize>) -> Self {
        Self {
            db,
            request,
            buffer: VecDeque::new(),
            start: None,
            remaining: limit,
            exhausted: false,
            failed: false,
        }
    }

    /// Range predicate sent with every page.
    #[must_use]
    pub const fn predicate(&self) -> Option<&RangePredicate> {
        self.request.range.as_ref()
    }

    #[must_use]
    pub const fn request(&self) -> &QueryRequest {
        &self.request
    }

    fn fetch_page(&mut self) -> Result<(), Error> {
        let page = self
            .db
            .store()
            .query_page(&self.request, self.start.as_ref())?;
        debug!(
            "query page on '{}' returned {} items",
            self.request.hash_key,
            page.items.len()
        );

        self.buffer.extend(page.items);
        self.exhausted = page.last_evaluated_key.is_none();
        self.start = page.last_evaluated_key;

        Ok(())
    }
}

impl Iterator for Query {
    type Item = Result<Entity, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.remaining == Some(0) {
            return None;
        }

        while self.buffer.is_empty() {
            if self.exhausted {
                return None;
            }
            if let Err(err) = self.fetch_page() {
                self.failed = true;
                return Some(Err(err));
            }
        }

        let raw = self.buffer.pop_front()?;
        let decoded = self.db.decode(&raw);
        match &decoded {
            Ok(_) => {
                if let Some(remaining) = &mut self.remaining {
                    *remaining -= 1;
                }
            }
            Err(_) => self.failed = true,
        }

        Some(decoded)
    }
}

impl FusedIterator for Query {}
