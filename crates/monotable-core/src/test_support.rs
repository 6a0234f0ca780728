//! Forum schema shared by unit tests: users own posts and a profile
//! singleton; threads hold comments in the thread's partition.

use crate::{
    config::TableConfig,
    db::Db,
    model::{
        attribute::Attribute,
        entity::EntityType,
        index::IndexModel,
        relation::{ForeignKey, ReverseRelation},
    },
    store::MemoryStore,
    value::Value,
};
use std::sync::Arc;

pub(crate) struct Forum {
    pub db: Db,
    pub store: Arc<MemoryStore>,
    pub user: Arc<EntityType>,
    pub profile: Arc<EntityType>,
    pub post: Arc<EntityType>,
    pub thread: Arc<EntityType>,
    pub comment: Arc<EntityType>,
}

pub(crate) fn user_type() -> EntityType {
    EntityType::builder("User")
        .attribute(Attribute::text("uuid").hash_key())
        .attribute(Attribute::text("name"))
        .attribute(Attribute::text("email").nullable())
        .attribute(Attribute::int("karma").default(0))
        .index(IndexModel::new("by_author", "uuid"))
        .reverse("posts", ReverseRelation::to("Post"))
        .reverse("profile", ReverseRelation::to("Profile"))
        .reverse("threads", ReverseRelation::to("Thread").index("by_author"))
        .build()
        .expect("User should build")
}

pub(crate) fn profile_type() -> EntityType {
    EntityType::builder("Profile")
        .attribute(Attribute::text("user_uuid").hash_key())
        .attribute(Attribute::fixed("kind", "PROFILE").range_key())
        .attribute(Attribute::text("bio").nullable())
        .build()
        .expect("Profile should build")
}

pub(crate) fn post_type() -> EntityType {
    EntityType::builder("Post")
        .attribute(
            Attribute::text("user_uuid")
                .hash_key()
                .derive_from_field("author"),
        )
        .attribute(Attribute::prefixed("id", "POST#").range_key())
        .attribute(Attribute::foreign_key("author", ForeignKey::to("User")))
        .attribute(Attribute::text("title"))
        .attribute(Attribute::text_set("tags").nullable())
        .attribute(Attribute::number_set("scores").nullable())
        .attribute(Attribute::binary_set("digests").nullable())
        .build()
        .expect("Post should build")
}

pub(crate) fn thread_type() -> EntityType {
    EntityType::builder("Thread")
        .attribute(Attribute::text("forum").hash_key())
        .attribute(Attribute::prefixed("slug", "THREAD#").range_key())
        .attribute(Attribute::text("title"))
        .attribute(Attribute::foreign_key("author", ForeignKey::to("User")).nullable())
        .index(IndexModel::new("by_author", "author").with_range_key("slug"))
        .reverse("comments", ReverseRelation::to("Comment"))
        .build()
        .expect("Thread should build")
}

pub(crate) fn comment_type() -> EntityType {
    EntityType::builder("Comment")
        .attribute(Attribute::text("forum").hash_key())
        .attribute(
            Attribute::int("seq")
                .range_key()
                .derive_with(|_| Ok(Value::Int(1)))
                .only_default(),
        )
        .attribute(Attribute::text("body"))
        .build()
        .expect("Comment should build")
}

pub(crate) fn forum() -> Forum {
    let mut builder = Db::builder(TableConfig::new("forum")).expect("config should be valid");
    let user = builder.register(user_type()).expect("register User");
    let profile = builder.register(profile_type()).expect("register Profile");
    let post = builder.register(post_type()).expect("register Post");
    let thread = builder.register(thread_type()).expect("register Thread");
    let comment = builder.register(comment_type()).expect("register Comment");

    let store = Arc::new(MemoryStore::new());
    let db = builder.build(Arc::clone(&store));

    Forum {
        db,
        store,
        user,
        profile,
        post,
        thread,
        comment,
    }
}
