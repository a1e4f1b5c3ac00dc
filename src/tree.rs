//! Nodes of a parsed ZTK document.
//!
//! A document is a flat sequence of [`TagField`]s. Each tag field holds its
//! [`KeyField`]s in file order, and each key field holds its values in file
//! order. Tags never nest.
//!
//! ```text
//! [tag1]            <- TagField "tag1"
//! key1: 10          <-   KeyField "key1" ["10"]
//! key2: 20, 30      <-   KeyField "key2" ["20", "30"]
//! ```
//!
//! Nodes serialize with serde, which makes it easy to export a parsed
//! document:
//!
//! ```rust
//! use ztk::TagField;
//!
//! let mut tag = TagField::new("tag1");
//! tag.add_key("key1").push("10");
//!
//! let json = serde_json::to_string(&tag).unwrap();
//! assert_eq!(json, r#"{"name":"tag1","keys":[{"name":"key1","values":["10"]}]}"#);
//! ```

use serde::{Deserialize, Serialize};

/// One `key: values...` entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyField {
    name: String,
    values: Vec<String>,
}

impl KeyField {
    pub fn new(name: impl Into<String>) -> Self {
        KeyField {
            name: name.into(),
            values: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Value at `index`, if present.
    pub fn value(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Appends a value.
    pub fn push(&mut self, value: impl Into<String>) -> &mut Self {
        self.values.push(value.into());
        self
    }
}

/// One `[tag]` section with its keys.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TagField {
    name: String,
    keys: Vec<KeyField>,
}

impl TagField {
    pub fn new(name: impl Into<String>) -> Self {
        TagField {
            name: name.into(),
            keys: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn keys(&self) -> &[KeyField] {
        &self.keys
    }

    /// First key field called `name`.
    pub fn key(&self, name: &str) -> Option<&KeyField> {
        self.keys.iter().find(|k| k.name == name)
    }

    /// All key fields called `name`, in file order.
    pub fn keys_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a KeyField> + 'a {
        self.keys.iter().filter(move |k| k.name == name)
    }

    /// Appends a new, empty key field and returns it.
    pub fn add_key(&mut self, name: impl Into<String>) -> &mut KeyField {
        self.keys.push(KeyField::new(name));
        let last = self.keys.len() - 1;
        &mut self.keys[last]
    }

    pub(crate) fn keys_mut(&mut self) -> &mut Vec<KeyField> {
        &mut self.keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_field_values_keep_order() {
        let mut key = KeyField::new("key2");
        key.push("20").push("30");
        assert_eq!(key.name(), "key2");
        assert_eq!(key.values(), ["20", "30"]);
        assert_eq!(key.value(1), Some("30"));
        assert_eq!(key.value(2), None);
        assert_eq!(key.len(), 2);
    }

    #[test]
    fn test_tag_field_lookup() {
        let mut tag = TagField::new("shape");
        tag.add_key("vert").push("0");
        tag.add_key("name").push("box");
        tag.add_key("vert").push("1");

        assert_eq!(tag.keys().len(), 3);
        assert_eq!(tag.key("vert").and_then(|k| k.value(0)), Some("0"));
        let verts: Vec<&str> = tag.keys_named("vert").filter_map(|k| k.value(0)).collect();
        assert_eq!(verts, ["0", "1"]);
        assert!(tag.key("missing").is_none());
    }

    #[test]
    fn test_serde_roundtrip_through_json() {
        let mut tag = TagField::new("t");
        tag.add_key("k").push("a").push("b c");
        let json = serde_json::to_string(&tag).unwrap();
        let back: TagField = serde_json::from_str(&json).unwrap();
        assert_eq!(tag, back);
    }
}
