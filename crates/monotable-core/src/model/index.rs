use std::fmt::{self, Display};

///
/// IndexModel
/// Secondary index declared on an entity type. Attribute names are in-memory
/// names; stored names are looked up on the owning type.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IndexModel {
    pub name: String,
    pub hash_key: String,
    pub range_key: Option<String>,
}

impl IndexModel {
    #[must_use]
    pub fn new(name: impl Into<String>, hash_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hash_key: hash_key.into(),
            range_key: None,
        }
    }

    #[must_use]
    pub fn with_range_key(mut self, range_key: impl Into<String>) -> Self {
        self.range_key = Some(range_key.into());
        self
    }

    /// Attribute names the index reads, hash first.
    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.hash_key.as_str()).chain(self.range_key.as_deref())
    }
}

impl Display for IndexModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.range_key {
            Some(range) => write!(f, "{}({}, {})", self.name, self.hash_key, range),
            None => write!(f, "{}({})", self.name, self.hash_key),
        }
    }
}
