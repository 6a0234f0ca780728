use super::*;
use crate::{
    Error,
    codec::AttributeKind,
    error::ErrorDetail,
    model::{
        attribute::{Attribute, KeyRole, KeyShape},
        entity::EntityType,
        index::IndexModel,
        relation::{ForeignKey, ReverseRelation},
    },
    test_support,
    value::Value,
};

fn schema_error(result: Result<EntityType, Error>) -> SchemaError {
    match result.expect_err("declaration should be rejected").detail {
        Some(ErrorDetail::Schema(err)) => err,
        other => panic!("expected a schema error, got {other:?}"),
    }
}

fn keyed(name: &str) -> crate::model::entity::EntityTypeBuilder {
    EntityType::builder(name).attribute(Attribute::text("id").hash_key())
}

#[test]
fn forum_types_build() {
    let post = test_support::post_type();

    assert_eq!(post.hash_attribute().name(), "user_uuid");
    assert_eq!(post.range_attribute().map(Attribute::name), Some("id"));
    assert_eq!(post.hash_attribute().role(), KeyRole::Hash);
    assert!(post.discriminator_attribute().is_none(), "injected at registration");

    let relations: Vec<_> = post.forward_relations().map(|(a, _)| a.name()).collect();
    assert_eq!(relations, ["author"]);

    let user = test_support::user_type();
    let reverse: Vec<_> = user.reverse_relations().map(|(name, _)| name).collect();
    assert_eq!(reverse, ["posts", "profile", "threads"]);
}

#[test]
fn hash_key_is_required_and_unique() {
    let err = schema_error(
        EntityType::builder("Orphan")
            .attribute(Attribute::text("name"))
            .build(),
    );
    assert!(matches!(err, SchemaError::MissingHashKey { .. }));

    let err = schema_error(
        keyed("Twice")
            .attribute(Attribute::text("other").hash_key())
            .build(),
    );
    assert!(matches!(err, SchemaError::MultipleHashKeys { ref second, .. } if second == "other"));

    let err = schema_error(
        keyed("Ranges")
            .attribute(Attribute::text("a").range_key())
            .attribute(Attribute::text("b").range_key())
            .build(),
    );
    assert!(matches!(err, SchemaError::MultipleRangeKeys { .. }));
}

#[test]
fn names_must_be_unique_in_memory_and_in_storage() {
    let err = schema_error(
        keyed("Dup")
            .attribute(Attribute::text("title"))
            .attribute(Attribute::int("title"))
            .build(),
    );
    assert!(matches!(err, SchemaError::DuplicateAttribute { ref attribute, .. } if attribute == "title"));

    let err = schema_error(
        keyed("Stored")
            .attribute(Attribute::text("a").stored_as("x"))
            .attribute(Attribute::text("b").stored_as("x"))
            .build(),
    );
    assert!(matches!(err, SchemaError::DuplicateAttribute { .. }));
}

#[test]
fn only_one_discriminator_and_never_a_key() {
    let err = schema_error(
        keyed("Tagged")
            .attribute(Attribute::discriminator("type"))
            .attribute(Attribute::discriminator("kind"))
            .build(),
    );
    assert!(matches!(err, SchemaError::MultipleDiscriminators { .. }));

    let err = schema_error(
        EntityType::builder("KeyTag")
            .attribute(Attribute::discriminator("type").hash_key())
            .build(),
    );
    assert!(matches!(err, SchemaError::DiscriminatorKey { .. }));
}

#[test]
fn declared_discriminator_holds_the_entity_name() {
    let ty = keyed("Tagged")
        .attribute(Attribute::discriminator("type"))
        .build()
        .expect("single discriminator should build");

    let attr = ty
        .discriminator_attribute()
        .expect("discriminator should be recorded");
    assert!(matches!(attr.kind(), AttributeKind::Static(name) if name == "Tagged"));
    assert!(!attr.meta().editable);
}

#[test]
fn key_attributes_need_key_types() {
    let err = schema_error(
        EntityType::builder("Flag")
            .attribute(Attribute::bool("on").hash_key())
            .build(),
    );
    assert!(matches!(err, SchemaError::InvalidKeyType { kind: "bool", .. }));

    let err = schema_error(
        EntityType::builder("Linked")
            .attribute(Attribute::foreign_key("owner", ForeignKey::to("User")).hash_key())
            .build(),
    );
    assert!(matches!(err, SchemaError::RelationKey { .. }));
}

#[test]
fn derivation_sources_are_checked_at_declaration() {
    let err = schema_error(
        keyed("Lonely")
            .attribute(Attribute::text("slug").derive_from_field("missing"))
            .build(),
    );
    assert!(matches!(err, SchemaError::UnknownDeriveField { ref field, .. } if field == "missing"));

    let err = schema_error(
        keyed("Mirror")
            .attribute(Attribute::text("slug").derive_from_field("slug"))
            .build(),
    );
    assert!(matches!(err, SchemaError::SelfDerivation { .. }));

    let err = schema_error(
        EntityType::builder("Loop")
            .attribute(Attribute::text("id").hash_key().derive_from_hash_key())
            .build(),
    );
    assert!(matches!(err, SchemaError::HashKeyFromHashKey { .. }));

    let err = schema_error(
        keyed("Sourceless")
            .attribute(Attribute::text("slug").only_default())
            .build(),
    );
    assert!(matches!(err, SchemaError::OnlyDefaultWithoutSource { .. }));

    let err = schema_error(
        keyed("DerivedLink")
            .attribute(Attribute::foreign_key("owner", ForeignKey::to("User")).derive_from_hash_key())
            .build(),
    );
    assert!(matches!(err, SchemaError::DerivedRelation { .. }));
}

#[test]
fn indexes_and_relations_are_validated() {
    let err = schema_error(
        keyed("Indexed")
            .index(IndexModel::new("by_ghost", "ghost"))
            .build(),
    );
    assert!(matches!(err, SchemaError::UnknownIndexAttribute { ref attribute, .. } if attribute == "ghost"));

    let err = schema_error(
        keyed("Related")
            .reverse("children", ReverseRelation::to("Child"))
            .reverse("children", ReverseRelation::to("Other"))
            .build(),
    );
    assert!(matches!(
        err,
        SchemaError::DuplicateDeclaration { what: "reverse relation", .. }
    ));
}

#[test]
fn empty_entity_names_are_rejected() {
    let err = schema_error(keyed("  ").build());
    assert!(matches!(err, SchemaError::EmptyEntityName));
}

#[test]
fn foreign_keys_default_to_uuid_lookup() {
    let fk = ForeignKey::to("User");
    assert_eq!(fk.target_attribute(), crate::DEFAULT_FOREIGN_ATTRIBUTE);
    assert_eq!(fk.lookup_method(), "get_by_uuid");

    let fk = ForeignKey::to("User").attribute("email");
    assert_eq!(fk.lookup_method(), "get_by_email");

    let fk = ForeignKey::to("User").attribute("email").get_method("find_by_mail");
    assert_eq!(fk.lookup_method(), "find_by_mail");
}

#[test]
fn key_shapes_follow_kinds() {
    assert_eq!(
        Attribute::prefixed("slug", "THREAD#").key_shape(),
        KeyShape::Prefixed("THREAD#")
    );
    assert_eq!(
        Attribute::fixed("kind", "COMMENT").key_shape(),
        KeyShape::Static("COMMENT")
    );
    assert_eq!(Attribute::int("seq").key_shape(), KeyShape::Other);
}

#[test]
fn initial_values_prefer_default_for_new() {
    let attr = Attribute::int("karma").default(1).default_for_new(5);
    assert_eq!(attr.initial_value(), Value::Int(5));

    let attr = Attribute::int("karma").default_with(|| Value::Int(7));
    assert_eq!(attr.initial_value(), Value::Int(7));

    assert_eq!(Attribute::text("name").initial_value(), Value::Null);
}

#[test]
fn field_metadata_is_carried() {
    let attr = Attribute::text("title")
        .help_text("Shown above the post")
        .verbose_name("Title")
        .read_only();

    assert_eq!(attr.meta().help_text.as_deref(), Some("Shown above the post"));
    assert_eq!(attr.meta().verbose_name.as_deref(), Some("Title"));
    assert!(!attr.meta().editable);
    assert!(Attribute::text("body").meta().editable);
}

#[test]
fn table_operations_are_unsupported() {
    let ty = test_support::user_type();

    assert!(ty.scan().expect_err("scan is unsupported").is_unsupported());
    assert!(ty.create_table().expect_err("create is unsupported").is_unsupported());
    assert!(ty.delete_table().expect_err("delete is unsupported").is_unsupported());
    assert!(ty.dumps().expect_err("dumps is unsupported").is_unsupported());
}

#[test]
fn unbound_types_have_no_database() {
    let err = test_support::user_type()
        .db()
        .expect_err("a type outside a database is detached");

    assert_eq!(err.class, crate::error::ErrorClass::Configuration);
}
