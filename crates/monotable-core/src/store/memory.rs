use crate::{
    item::{AttributeValue, PrimaryKey, RawItem},
    store::{QueryPage, QueryRequest, Store, StoreError, compare_key_values},
};
use std::{
    cmp::Ordering,
    collections::BTreeMap,
    sync::{
        RwLock,
        atomic::{AtomicU64, Ordering as AtomicOrdering},
    },
};

///
/// StoreStats
/// Snapshot of the calls a `MemoryStore` has served.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StoreStats {
    pub gets: u64,
    pub query_pages: u64,
    pub counts: u64,
    pub puts: u64,
}

///
/// MemoryStore
///
/// In-process table. Secondary indexes are evaluated on the fly from the
/// index fields carried by each request; items missing an index field are
/// left out, like a sparse index.
///

#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RwLock<BTreeMap<PrimaryKey, RawItem>>,
    gets: AtomicU64,
    query_pages: AtomicU64,
    counts: AtomicU64,
    puts: AtomicU64,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            gets: self.gets.load(AtomicOrdering::Relaxed),
            query_pages: self.query_pages.load(AtomicOrdering::Relaxed),
            counts: self.counts.load(AtomicOrdering::Relaxed),
            puts: self.puts.load(AtomicOrdering::Relaxed),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.read().map_or(0, |items| items.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stored copy of one item, bypassing the call counters.
    #[must_use]
    pub fn raw_item(&self, key: &PrimaryKey) -> Option<RawItem> {
        self.items.read().ok()?.get(key).cloned()
    }

    // Items a request selects, in range-key order.
    fn select(&self, request: &QueryRequest) -> Result<Vec<RawItem>, StoreError> {
        let items = self.items.read().map_err(|_| poisoned())?;

        let mut selected: Vec<(Option<AttributeValue>, RawItem)> = items
            .values()
            .filter_map(|item| {
                let (hash, range) = match &request.index {
                    Some(index) => {
                        let hash = index.hash.read(item)?;
                        let range = match &index.range {
                            Some(field) => Some(field.read(item)?.clone()),
                            None => None,
                        };
                        (hash, range)
                    }
                    None => (&item.hash_key, item.range_key.clone()),
                };
                if *hash != request.hash_key {
                    return None;
                }
                if let Some(predicate) = &request.range
                    && !range.as_ref().is_some_and(|r| predicate.matches(r))
                {
                    return None;
                }

                Some((range, item.clone()))
            })
            .collect();

        selected.sort_by(|(ra, a), (rb, b)| {
            range_order(ra.as_ref(), rb.as_ref())
                .then_with(|| a.primary_key().cmp(&b.primary_key()))
        });
        if !request.scan_forward {
            selected.reverse();
        }

        Ok(selected.into_iter().map(|(_, item)| item).collect())
    }
}

// Total order over range slots: absent first, then N, S, B, each compared
// within its own type.
fn range_order(a: Option<&AttributeValue>, b: Option<&AttributeValue>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => wire_rank(a)
            .cmp(&wire_rank(b))
            .then_with(|| compare_key_values(a, b).unwrap_or_else(|| a.cmp(b))),
    }
}

const fn wire_rank(value: &AttributeValue) -> u8 {
    match value {
        AttributeValue::N(_) => 0,
        AttributeValue::S(_) => 1,
        AttributeValue::B(_) => 2,
        _ => 3,
    }
}

impl Store for MemoryStore {
    fn get_item(&self, key: &PrimaryKey) -> Result<Option<RawItem>, StoreError> {
        self.gets.fetch_add(1, AtomicOrdering::Relaxed);
        let items = self.items.read().map_err(|_| poisoned())?;

        Ok(items.get(key).cloned())
    }

    fn query_page(
        &self,
        request: &QueryRequest,
        start: Option<&PrimaryKey>,
    ) -> Result<QueryPage, StoreError> {
        if request.page_size == Some(0) {
            return Err(StoreError::InvalidRequest("page size must be positive".to_string()));
        }
        self.query_pages.fetch_add(1, AtomicOrdering::Relaxed);

        let selected = self.select(request)?;
        let offset = match start {
            Some(key) => selected
                .iter()
                .position(|item| item.primary_key() == *key)
                .map_or(selected.len(), |pos| pos + 1),
            None => 0,
        };
        let remaining = &selected[offset..];
        let take = request.page_size.unwrap_or(remaining.len()).min(remaining.len());

        let items = remaining[..take].to_vec();
        let last_evaluated_key = if take < remaining.len() {
            items.last().map(RawItem::primary_key)
        } else {
            None
        };

        Ok(QueryPage {
            items,
            last_evaluated_key,
        })
    }

    fn count(&self, request: &QueryRequest) -> Result<u64, StoreError> {
        self.counts.fetch_add(1, AtomicOrdering::Relaxed);
        let selected = self.select(request)?;

        Ok(selected.len() as u64)
    }

    fn put_item(&self, item: RawItem) -> Result<(), StoreError> {
        if !item.hash_key.is_key_type() {
            return Err(StoreError::InvalidRequest(format!(
                "hash key must be S, N or B, found {}",
                item.hash_key.type_label()
            )));
        }
        self.puts.fetch_add(1, AtomicOrdering::Relaxed);
        let mut items = self.items.write().map_err(|_| poisoned())?;
        items.insert(item.primary_key(), item);

        Ok(())
    }
}

fn poisoned() -> StoreError {
    StoreError::backend("memory store lock poisoned")
}
