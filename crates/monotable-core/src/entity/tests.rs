use super::*;
use crate::{
    error::{ErrorClass, ErrorDetail},
    item::AttributeValue,
    relation::RelationError,
    test_support::{self, Forum},
};
use std::collections::BTreeSet;

fn s(text: &str) -> AttributeValue {
    AttributeValue::S(text.to_string())
}

fn ada(forum: &Forum) -> Entity {
    Entity::create(&forum.user, [("uuid", "u-ada"), ("name", "Ada")]).expect("user should create")
}

fn relation_error(err: Error) -> RelationError {
    match err.detail {
        Some(ErrorDetail::Relation(err)) => err,
        other => panic!("expected a relation error, got {other:?}"),
    }
}

#[test]
fn new_instances_start_from_defaults() {
    let forum = test_support::forum();
    let user = Entity::new(&forum.user).expect("new user");

    assert_eq!(user.get("karma").expect("karma"), &Value::Int(0));
    assert_eq!(user.get("email").expect("email"), &Value::Null);
    assert!(user.hash_key().is_null());
}

#[test]
fn create_assigns_values_and_derives_keys() {
    let forum = test_support::forum();
    let post = Entity::create(
        &forum.post,
        [("author", "u-ada"), ("id", "hello"), ("title", "First")],
    )
    .expect("post should create");

    assert_eq!(post.hash_key(), &Value::from("u-ada"));
    assert_eq!(post.range_key(), Some(&Value::from("hello")));
    assert_eq!(post.get("title").expect("title"), &Value::from("First"));
}

#[test]
fn assignments_are_type_checked() {
    let forum = test_support::forum();
    let mut user = ada(&forum);

    let err = user.set("karma", "lots").expect_err("text is not an int");
    assert_eq!(err.class, ErrorClass::Type);
    assert!(err.message.starts_with("User.karma:"), "got {}", err.message);

    let err = user.set("nickname", "ada").expect_err("unknown attribute");
    assert!(matches!(
        err.detail,
        Some(ErrorDetail::Schema(crate::model::SchemaError::UnknownAttribute { .. }))
    ));

    user.set("karma", 3).expect("int should assign");
    assert_eq!(user.get("karma").expect("karma"), &Value::Int(3));

    user.clear("karma").expect("clear should succeed");
    assert!(user.get("karma").expect("karma").is_null());
}

#[test]
fn foreign_keys_are_read_through_relations() {
    let forum = test_support::forum();
    let post = Entity::create(&forum.post, [("author", "u-ada"), ("id", "p1"), ("title", "T")])
        .expect("post should create");

    let err = relation_error(post.get("author").expect_err("relations are not plain values"));
    assert!(matches!(err, RelationError::RelationAttribute { .. }));

    let fref = post
        .forward("author")
        .expect("author is a relation")
        .expect("author should be set");
    assert_eq!(fref.foreign_value(), "u-ada");
    assert_eq!(fref.target_name(), "User");
    assert!(!fref.is_resolved());

    assert_eq!(
        post.scalar("author").expect("scalar should decode"),
        Value::from("u-ada")
    );

    let err = relation_error(post.forward("title").expect_err("title is plain"));
    assert!(matches!(err, RelationError::NotForwardRelation { .. }));
}

#[test]
fn invalid_foreign_key_assignment_names_the_target() {
    let forum = test_support::forum();
    let mut post = Entity::new(&forum.post).expect("new post");

    let err = post
        .set("author", Value::List(vec![]))
        .expect_err("lists are not keys");
    assert!(err.message.contains("User"), "got {}", err.message);
    assert!(matches!(
        relation_error(err),
        RelationError::InvalidAssignment { ref expected, .. } if expected == "User"
    ));

    let err = post
        .set("author", 42)
        .expect_err("an int is not a text key");
    assert!(matches!(relation_error(err), RelationError::InvalidAssignment { .. }));

    let thread = Entity::create(&forum.thread, [("forum", "general"), ("slug", "x"), ("title", "X")])
        .expect("thread should create");
    let err = post
        .set_related("author", thread)
        .expect_err("a thread is not a user");
    assert!(matches!(
        relation_error(err),
        RelationError::InvalidAssignment { ref found, .. } if found == "Thread"
    ));
}

#[test]
fn assigning_an_entity_resolves_without_fetching() {
    let forum = test_support::forum();
    let mut post = Entity::new(&forum.post).expect("new post");

    post.set_related("author", ada(&forum))
        .expect("a user should assign");

    let fref = post
        .forward("author")
        .expect("author is a relation")
        .expect("author should be set");
    assert!(fref.is_resolved());
    assert_eq!(fref.foreign_value(), "u-ada");
    assert_eq!(
        post.related("author")
            .expect("resolved relation")
            .expect("author should be set")
            .get("name")
            .expect("name"),
        &Value::from("Ada")
    );
    assert_eq!(forum.store.stats().gets, 0, "no store round trip");
}

#[test]
fn related_entity_without_key_cannot_be_assigned() {
    let forum = test_support::forum();
    let mut post = Entity::new(&forum.post).expect("new post");
    let keyless = Entity::new(&forum.user).expect("new user");

    let err = post
        .set_related("author", keyless)
        .expect_err("a user without uuid has no foreign value");
    assert!(matches!(
        relation_error(err),
        RelationError::MissingForeignValue { .. }
    ));
}

#[test]
fn references_move_between_instances() {
    let forum = test_support::forum();
    let first = Entity::create(&forum.post, [("author", "u-ada"), ("id", "p1"), ("title", "T")])
        .expect("post should create");
    let fref = first
        .forward("author")
        .expect("relation")
        .expect("author should be set")
        .clone();

    let mut second = Entity::new(&forum.post).expect("new post");
    second.set_ref("author", fref.clone()).expect("same relation");
    assert_eq!(second.scalar("author").expect("scalar"), Value::from("u-ada"));

    let mut thread = Entity::new(&forum.thread).expect("new thread");
    thread
        .set_ref("author", fref)
        .expect("threads point at users too");
}

#[test]
fn encode_places_values_by_role() {
    let forum = test_support::forum();
    let post = Entity::create(
        &forum.post,
        [("author", "u-ada"), ("id", "hello"), ("title", "First")],
    )
    .expect("post should create");

    let raw = post.encode().expect("post should encode");
    assert_eq!(raw.hash_key, s("u-ada"));
    assert_eq!(raw.range_key, Some(s("POST#hello")));
    assert_eq!(raw.attribute("author"), Some(&s("u-ada")));
    assert_eq!(raw.attribute("title"), Some(&s("First")));
    assert_eq!(raw.attribute("type"), Some(&s("Post")));
    assert_eq!(raw.attribute("tags"), None, "null attributes are omitted");
    assert_eq!(raw.attribute("user_uuid"), None, "keys live in the key slots");
}

#[test]
fn encode_rejects_missing_values() {
    let forum = test_support::forum();

    let post = Entity::create(&forum.post, [("author", "u-ada"), ("id", "p1")])
        .expect("post should create");
    let err = post.encode().expect_err("title is required");
    assert_eq!(err.class, ErrorClass::Type);
    assert_eq!(err.message, "Post.title: cannot be null");

    let user = Entity::create(&forum.user, [("name", "Nobody")]).expect("user should create");
    let err = user.encode().expect_err("hash key is required");
    assert!(matches!(
        err.detail,
        Some(ErrorDetail::Schema(crate::model::SchemaError::MissingKey { .. }))
    ));
}

#[test]
fn encode_completes_missing_range_keys() {
    let forum = test_support::forum();

    let thread = Entity::create(&forum.thread, [("forum", "general"), ("title", "Pinned")])
        .expect("thread should create");
    let raw = thread.encode().expect("thread should encode");
    assert_eq!(raw.range_key, Some(s("THREAD#")));

    let profile = Entity::create(&forum.profile, [("user_uuid", "u-ada")])
        .expect("profile should create");
    let raw = profile.encode().expect("profile should encode");
    assert_eq!(raw.range_key, Some(s("PROFILE")));
}

#[test]
fn only_default_derivation_keeps_assigned_values() {
    let forum = test_support::forum();

    let derived = Entity::create(&forum.comment, [("forum", "general"), ("body", "hi")])
        .expect("comment should create");
    assert_eq!(derived.range_key(), Some(&Value::Int(1)));

    let mut assigned = Entity::new(&forum.comment).expect("new comment");
    assigned.set("forum", "general").expect("forum");
    assigned.set("body", "hi").expect("body");
    assigned.set("seq", 5).expect("seq");
    assigned.refresh_derived().expect("refresh");

    let raw = assigned.encode().expect("comment should encode");
    assert_eq!(raw.range_key, Some(AttributeValue::N("5".to_string())));
}

#[test]
fn encode_rederives_keys_from_resolved_relations() {
    let forum = test_support::forum();
    let mut post = Entity::create(&forum.post, [("id", "p1"), ("title", "T")])
        .expect("post should create");
    post.set_related("author", ada(&forum)).expect("assign user");

    let raw = post.encode().expect("post should encode");
    assert_eq!(raw.hash_key, s("u-ada"), "hash key derives from the relation");
    assert_eq!(raw.attribute("author"), Some(&s("u-ada")));
}

#[test]
fn text_sets_round_trip_through_encode() {
    let forum = test_support::forum();
    let tags: BTreeSet<String> = ["rust", "db"].into_iter().map(String::from).collect();

    let mut post = Entity::create(&forum.post, [("author", "u-ada"), ("id", "p1"), ("title", "T")])
        .expect("post should create");
    post.set("tags", tags.clone()).expect("tags should assign");

    let raw = post.encode().expect("post should encode");
    assert_eq!(raw.attribute("tags"), Some(&AttributeValue::Ss(tags)));
}
