//! Registry of the tags and keys a document accepts.
//!
//! Registration is closed-world: the parser turns a `[tag]` header into a
//! [`TagField`](crate::TagField) only if the tag has a [`Definition`], and
//! turns a token into a [`KeyField`](crate::KeyField) only if it is one of
//! the keys of the current tag's definition. Everything else is dropped.
//!
//! Both tags and keys keep their registration order, backed by [`IndexMap`]
//! and [`IndexSet`].

use crate::{Error, Result};
use indexmap::{IndexMap, IndexSet};
use tracing::{debug, warn};

/// A registered tag and the key names allowed under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    tag: String,
    keys: IndexSet<String>,
}

impl Definition {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Key names in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// Returns `true` if `key` may appear under this tag.
    #[must_use]
    pub fn key_allowed(&self, key: &str) -> bool {
        self.keys.contains(key)
    }
}

/// Ordered set of definitions, unique by tag name.
///
/// # Examples
///
/// ```rust
/// use ztk::Registry;
///
/// let mut registry = Registry::new();
/// registry.register("tag1", ["key1", "key2"]).unwrap();
///
/// let def = registry.find("tag1").unwrap();
/// assert!(def.key_allowed("key2"));
/// assert!(!def.key_allowed("key3"));
/// assert!(registry.find("tag2").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    defs: IndexMap<String, Definition>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `tag` with the given allowed keys.
    ///
    /// Repeated key names collapse into one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateDefinition`] if `tag` is already
    /// registered; the existing definition is left untouched.
    pub fn register<I, S>(&mut self, tag: &str, keys: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if self.defs.contains_key(tag) {
            warn!(tag, "duplicate definition rejected");
            return Err(Error::duplicate_definition(tag));
        }
        let keys: IndexSet<String> = keys.into_iter().map(|k| k.as_ref().to_string()).collect();
        debug!(tag, keys = keys.len(), "register definition");
        self.defs.insert(
            tag.to_string(),
            Definition {
                tag: tag.to_string(),
                keys,
            },
        );
        Ok(())
    }

    /// Looks up the definition of `tag`.
    pub fn find(&self, tag: &str) -> Option<&Definition> {
        self.defs.get(tag)
    }

    pub(crate) fn find_index(&self, tag: &str) -> Option<usize> {
        self.defs.get_index_of(tag)
    }

    pub(crate) fn get_index(&self, index: usize) -> Option<&Definition> {
        self.defs.get_index(index).map(|(_, def)| def)
    }

    /// Returns `true` if `key` is allowed under `tag`.
    #[must_use]
    pub fn key_allowed(&self, tag: &str, key: &str) -> bool {
        self.find(tag).is_some_and(|def| def.key_allowed(key))
    }

    /// Definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Definition> {
        self.defs.values()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_find() {
        let mut registry = Registry::new();
        registry.register("link", ["name", "mass", "com"]).unwrap();
        registry.register("joint", Vec::<String>::new()).unwrap();

        assert_eq!(registry.len(), 2);
        let link = registry.find("link").unwrap();
        assert_eq!(link.tag(), "link");
        assert_eq!(link.keys().collect::<Vec<_>>(), ["name", "mass", "com"]);
        assert!(registry.find("joint").unwrap().keys().next().is_none());
    }

    #[test]
    fn test_duplicate_rejected_first_kept() {
        let mut registry = Registry::new();
        registry.register("link", ["name"]).unwrap();
        let err = registry.register("link", ["mass"]).unwrap_err();

        assert!(matches!(err, Error::DuplicateDefinition { ref tag } if tag == "link"));
        assert!(registry.key_allowed("link", "name"));
        assert!(!registry.key_allowed("link", "mass"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let mut registry = Registry::new();
        registry.register("Tag", ["Key"]).unwrap();
        assert!(registry.find("tag").is_none());
        assert!(!registry.key_allowed("Tag", "key"));
    }

    #[test]
    fn test_registration_order_preserved() {
        let mut registry = Registry::new();
        for tag in ["c", "a", "b"] {
            registry.register(tag, ["k"]).unwrap();
        }
        let tags: Vec<&str> = registry.iter().map(Definition::tag).collect();
        assert_eq!(tags, ["c", "a", "b"]);
        assert_eq!(registry.find_index("a"), Some(1));
        assert_eq!(registry.get_index(2).map(Definition::tag), Some("b"));
    }

    #[test]
    fn test_repeated_keys_collapse() {
        let mut registry = Registry::new();
        registry.register("t", ["k", "k", "j"]).unwrap();
        assert_eq!(registry.find("t").unwrap().keys().count(), 2);
    }
}
