use super::*;

fn s(text: &str) -> AttributeValue {
    AttributeValue::S(text.to_string())
}

fn n(text: &str) -> AttributeValue {
    AttributeValue::N(text.to_string())
}

fn request(hash: &str) -> QueryRequest {
    QueryRequest {
        hash_key: s(hash),
        range: None,
        index: None,
        page_size: None,
        consistent_read: false,
        scan_forward: true,
    }
}

fn seeded() -> MemoryStore {
    let store = MemoryStore::new();
    for (hash, range, author) in [
        ("forum-1", "THREAD#b", "u1"),
        ("forum-1", "THREAD#a", "u2"),
        ("forum-1", "COMMENT", "u1"),
        ("forum-2", "THREAD#c", "u1"),
    ] {
        store
            .put_item(RawItem::new(s(hash), Some(s(range))).with_attribute("author", s(author)))
            .expect("put should succeed");
    }
    store
}

#[test]
fn numbers_compare_numerically() {
    assert_eq!(
        compare_key_values(&n("10"), &n("9")),
        Some(std::cmp::Ordering::Greater)
    );
    assert_eq!(compare_key_values(&n("1.50"), &n("1.5")), Some(std::cmp::Ordering::Equal));
    assert_eq!(compare_key_values(&n("1"), &s("1")), None, "types never compare");
}

#[test]
fn predicates_match_their_shapes() {
    assert!(RangePredicate::begins_with("THREAD#").matches(&s("THREAD#x")));
    assert!(RangePredicate::begins_with("THREAD#").matches(&s("THREAD#")));
    assert!(!RangePredicate::begins_with("THREAD#").matches(&s("COMMENT")));

    assert!(RangePredicate::eq_text("COMMENT").matches(&s("COMMENT")));
    assert!(!RangePredicate::eq_text("COMMENT").matches(&s("COMMENT#1")));

    let between = RangePredicate::Between(n("2"), n("4"));
    assert!(between.matches(&n("2")));
    assert!(between.matches(&n("4")));
    assert!(!between.matches(&n("5")));
}

#[test]
fn queries_return_one_partition_in_range_order() {
    let store = seeded();
    let page = store
        .query_page(&request("forum-1"), None)
        .expect("query should succeed");

    let ranges: Vec<_> = page
        .items
        .iter()
        .filter_map(|item| item.range_key.as_ref().and_then(AttributeValue::as_s))
        .collect();
    assert_eq!(ranges, ["COMMENT", "THREAD#a", "THREAD#b"]);
    assert!(page.last_evaluated_key.is_none());
}

#[test]
fn paging_resumes_after_last_key() {
    let store = seeded();
    let mut req = request("forum-1");
    req.page_size = Some(2);

    let first = store.query_page(&req, None).expect("first page");
    assert_eq!(first.items.len(), 2);
    let last = first
        .last_evaluated_key
        .expect("more items should remain after the first page");

    let second = store.query_page(&req, Some(&last)).expect("second page");
    assert_eq!(second.items.len(), 1);
    assert!(second.last_evaluated_key.is_none());
    assert_eq!(store.stats().query_pages, 2);
}

#[test]
fn index_queries_select_by_stored_attribute() {
    let store = seeded();
    let mut req = request("u1");
    req.index = Some(IndexRequest {
        name: "by_author".to_string(),
        hash: IndexField::Attribute("author".to_string()),
        range: None,
    });

    assert_eq!(store.count(&req).expect("count should succeed"), 3);

    req.range = Some(RangePredicate::begins_with("THREAD#"));
    assert_eq!(
        store.count(&req).expect("count should succeed"),
        0,
        "an index without a range attribute never satisfies a range predicate"
    );

    req.index = Some(IndexRequest {
        name: "by_author".to_string(),
        hash: IndexField::Attribute("author".to_string()),
        range: Some(IndexField::RangeKey),
    });
    assert_eq!(
        store.count(&req).expect("count should succeed"),
        2,
        "index ranges may come from the table's range key"
    );
}

#[test]
fn puts_replace_items_with_the_same_key() {
    let store = MemoryStore::new();
    let key = PrimaryKey::new(s("forum-1"), Some(s("COMMENT")));

    store
        .put_item(RawItem::new(s("forum-1"), Some(s("COMMENT"))).with_attribute("v", n("1")))
        .expect("first put");
    store
        .put_item(RawItem::new(s("forum-1"), Some(s("COMMENT"))).with_attribute("v", n("2")))
        .expect("second put");

    assert_eq!(store.len(), 1);
    let stored = store.raw_item(&key).expect("item should be stored");
    assert_eq!(stored.attribute("v"), Some(&n("2")));
    assert_eq!(store.stats().puts, 2);
}

#[test]
fn zero_page_size_is_rejected() {
    let store = seeded();
    let mut req = request("forum-1");
    req.page_size = Some(0);

    let err = store.query_page(&req, None).expect_err("page size zero is invalid");
    assert!(matches!(err, StoreError::InvalidRequest(_)));
}

#[test]
fn mixed_range_types_sort_by_wire_type_first() {
    let store = MemoryStore::new();
    let blob = AttributeValue::B(vec![0x01]);
    for range in [
        Some(n("10")),
        Some(s("a")),
        None,
        Some(blob.clone()),
        Some(n("2")),
        Some(s("0")),
    ] {
        store
            .put_item(RawItem::new(s("mixed"), range))
            .expect("put should succeed");
    }

    let ranges = |scan_forward: bool| {
        let mut req = request("mixed");
        req.scan_forward = scan_forward;
        store
            .query_page(&req, None)
            .expect("query should succeed")
            .items
            .into_iter()
            .map(|item| item.range_key)
            .collect::<Vec<_>>()
    };

    let expected = vec![
        None,
        Some(n("2")),
        Some(n("10")),
        Some(s("0")),
        Some(s("a")),
        Some(blob),
    ];
    assert_eq!(ranges(true), expected);

    let mut descending = expected;
    descending.reverse();
    assert_eq!(ranges(false), descending);
}

#[test]
fn unparsable_numbers_sort_after_numbers() {
    assert_eq!(
        compare_key_values(&n("oops"), &n("7")),
        Some(std::cmp::Ordering::Greater)
    );
    assert_eq!(
        compare_key_values(&n("7"), &n("oops")),
        Some(std::cmp::Ordering::Less)
    );
}
