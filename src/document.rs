//! The top-level ZTK document.
//!
//! A [`Document`] owns the definition registry, the parsed tag fields and
//! three cursors (tag, key, value) for sequential traversal. Documents are
//! filled either by parsing ([`Document::parse_file`],
//! [`Document::parse_str`]) or programmatically ([`Document::add_tag`],
//! [`Document::add_key`], [`Document::add_value`]).
//!
//! ## Cursors
//!
//! Traversal is rewind/next style. `rewind_*` positions a cursor on the
//! first element and reports whether there is one; `next_*` moves forward
//! and reports whether it is still on an element. Moving the tag cursor
//! rewinds the key cursor onto the new tag, and moving the key cursor
//! rewinds the value cursor onto the new key.
//!
//! ```rust
//! use ztk::Document;
//!
//! let mut doc = Document::new();
//! doc.register_definition("tag1", ["key1", "key2"]).unwrap();
//! doc.parse_str("[tag1]\nkey1: 10\nkey2: 20, 30\n").unwrap();
//!
//! assert!(doc.rewind_tags());
//! assert_eq!(doc.current_tag().map(|t| t.name()), Some("tag1"));
//!
//! assert!(doc.next_key());
//! assert_eq!(doc.current_key().map(|k| k.name()), Some("key2"));
//! assert_eq!(doc.key_value_count(), 2);
//! assert_eq!(doc.current_value_as_int(), Some(20));
//! assert!(doc.next_value());
//! assert_eq!(doc.current_value(), Some("30"));
//! assert!(!doc.next_value());
//! ```

use crate::parser::Parser;
use crate::printer::Printer;
use crate::property::Property;
use crate::{Error, KeyField, Registry, Result, TagField, ZtkOptions};
use std::fmt;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};

/// What kind of item the parser dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardKind {
    /// A tag header with no registered definition.
    UnknownTag,
    /// A token read while no registered tag was active.
    Unclaimed,
    /// A token under a registered tag that is neither an allowed key nor
    /// preceded by one.
    OrphanValue,
    /// An `include` that could not be followed, or an included file that
    /// could not be read to the end.
    SkippedInclude,
}

/// An item the parser dropped instead of adding to the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discarded {
    pub kind: DiscardKind,
    pub text: String,
    pub source: PathBuf,
    pub line: usize,
}

/// A ZTK document: registry, tag fields and traversal cursors.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub(crate) options: ZtkOptions,
    pub(crate) registry: Registry,
    pub(crate) tags: Vec<TagField>,
    tag_cursor: Option<usize>,
    key_cursor: Option<usize>,
    value_cursor: Option<usize>,
    pub(crate) discarded: Vec<Discarded>,
}

impl Document {
    /// Creates an empty document with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty document with custom lexical options.
    #[must_use]
    pub fn with_options(options: ZtkOptions) -> Self {
        Document {
            options,
            ..Default::default()
        }
    }

    pub fn options(&self) -> &ZtkOptions {
        &self.options
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Registers a tag and the keys allowed under it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateDefinition`] if the tag is already
    /// registered.
    pub fn register_definition<I, S>(&mut self, tag: &str, keys: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.registry.register(tag, keys)
    }

    /// Registers a tag whose allowed keys are the match strings of a key
    /// property table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateDefinition`] if the tag is already
    /// registered.
    pub fn register_properties<T>(&mut self, tag: &str, table: &[Property<T>]) -> Result<()> {
        self.registry.register(tag, table.iter().map(|p| p.name))
    }

    /// Parses a file, following its `include` directives, and appends what
    /// it finds to this document.
    ///
    /// On success the tag cursor is rewound to the first tag.
    ///
    /// # Errors
    ///
    /// - [`Error::Open`] if `path` (or `path.ztk`) cannot be opened
    /// - [`Error::Io`] / [`Error::Encoding`] if reading `path` itself fails
    ///   midway; tags parsed before the failure stay in the document. The
    ///   same failure inside an included file only skips the rest of that
    ///   file.
    pub fn parse_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.options.validate()?;
        {
            let mut parser = Parser::new(self);
            parser.open_file(path.as_ref())?;
            parser.run()?;
        }
        self.rewind_tags();
        Ok(())
    }

    /// Parses ZTK text held in memory.
    ///
    /// `include` directives in the text open files relative to the working
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOptions`] for an unusable configuration.
    pub fn parse_str(&mut self, source: &str) -> Result<()> {
        self.parse_reader("<string>", Cursor::new(source.as_bytes().to_vec()))
    }

    /// Parses ZTK text from any reader; `name` identifies it in
    /// diagnostics.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] or [`Error::Encoding`] if reading fails.
    pub fn parse_reader<R: Read + 'static>(&mut self, name: &str, reader: R) -> Result<()> {
        self.options.validate()?;
        {
            let mut parser = Parser::new(self);
            parser.open_reader(name, Box::new(io::BufReader::new(reader)));
            parser.run()?;
        }
        self.rewind_tags();
        Ok(())
    }

    /// All tag fields in file order.
    pub fn tags(&self) -> &[TagField] {
        &self.tags
    }

    /// Tag fields called `name`, in file order.
    pub fn tags_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a TagField> + 'a {
        self.tags.iter().filter(move |t| t.name() == name)
    }

    /// Items dropped by the parser. Empty unless
    /// [`ZtkOptions::collect_discarded`] is set.
    pub fn discarded(&self) -> &[Discarded] {
        &self.discarded
    }

    pub(crate) fn record_discard(&mut self, kind: DiscardKind, text: &str, source: &Path, line: usize) {
        if self.options.collect_discarded {
            self.discarded.push(Discarded {
                kind,
                text: text.to_string(),
                source: source.to_path_buf(),
                line,
            });
        }
    }

    pub(crate) fn push_tag(&mut self, name: &str) -> &mut TagField {
        self.tags.push(TagField::new(name));
        let last = self.tags.len() - 1;
        &mut self.tags[last]
    }

    // Programmatic construction

    /// Appends a new tag field and makes it current.
    pub fn add_tag(&mut self, name: &str) -> &mut TagField {
        let index = self.tags.len();
        self.tags.push(TagField::new(name));
        self.tag_cursor = Some(index);
        self.key_cursor = None;
        self.value_cursor = None;
        &mut self.tags[index]
    }

    /// Appends a new key field to the current tag and makes it current.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoActiveTag`] if no tag is current.
    pub fn add_key(&mut self, name: &str) -> Result<&mut KeyField> {
        let t = self.tag_cursor.ok_or(Error::NoActiveTag)?;
        let keys = self.tags[t].keys_mut();
        let index = keys.len();
        keys.push(KeyField::new(name));
        self.key_cursor = Some(index);
        self.value_cursor = None;
        Ok(&mut keys[index])
    }

    /// Appends a value to the current key and makes it current.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoActiveKey`] if no key is current.
    pub fn add_value(&mut self, value: impl Into<String>) -> Result<()> {
        let (t, k) = self.key_position().ok_or(Error::NoActiveKey)?;
        let key = &mut self.tags[t].keys_mut()[k];
        key.push(value);
        self.value_cursor = Some(key.len() - 1);
        Ok(())
    }

    /// Appends an integer value to the current key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoActiveKey`] if no key is current.
    pub fn add_int(&mut self, value: i64) -> Result<()> {
        self.add_value(value.to_string())
    }

    /// Appends a floating-point value to the current key, in the shortest
    /// form that reads back to the same number.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoActiveKey`] if no key is current.
    pub fn add_double(&mut self, value: f64) -> Result<()> {
        self.add_value(value.to_string())
    }

    // Tag cursor

    /// Moves the tag cursor to the first tag and rewinds its keys.
    ///
    /// Returns `false` if the document has no tags.
    pub fn rewind_tags(&mut self) -> bool {
        self.tag_cursor = if self.tags.is_empty() { None } else { Some(0) };
        self.rewind_keys();
        self.tag_cursor.is_some()
    }

    /// Moves the tag cursor to the next tag and rewinds its keys.
    ///
    /// Returns `false` once past the last tag.
    pub fn next_tag(&mut self) -> bool {
        self.tag_cursor = self
            .tag_cursor
            .map(|i| i + 1)
            .filter(|&i| i < self.tags.len());
        self.rewind_keys();
        self.tag_cursor.is_some()
    }

    pub fn current_tag(&self) -> Option<&TagField> {
        self.tag_cursor.and_then(|i| self.tags.get(i))
    }

    /// Returns `true` if the current tag is called `name`.
    #[must_use]
    pub fn is_tag(&self, name: &str) -> bool {
        self.current_tag().is_some_and(|t| t.name() == name)
    }

    pub(crate) fn tag_index(&self) -> Option<usize> {
        self.tag_cursor
    }

    pub(crate) fn seek_tag(&mut self, index: usize) {
        if index < self.tags.len() {
            self.tag_cursor = Some(index);
            self.rewind_keys();
        }
    }

    /// Number of tags called `name`.
    #[must_use]
    pub fn count_tag_occurrences(&self, name: &str) -> usize {
        self.tags_named(name).count()
    }

    // Key cursor

    /// Moves the key cursor to the first key of the current tag and rewinds
    /// its values.
    pub fn rewind_keys(&mut self) -> bool {
        self.key_cursor = self
            .current_tag()
            .filter(|t| !t.keys().is_empty())
            .map(|_| 0);
        self.rewind_values();
        self.key_cursor.is_some()
    }

    /// Moves the key cursor to the next key of the current tag and rewinds
    /// its values.
    pub fn next_key(&mut self) -> bool {
        let len = self.current_tag().map_or(0, |t| t.keys().len());
        self.key_cursor = self.key_cursor.map(|i| i + 1).filter(|&i| i < len);
        self.rewind_values();
        self.key_cursor.is_some()
    }

    pub fn current_key(&self) -> Option<&KeyField> {
        let (t, k) = self.key_position()?;
        self.tags.get(t)?.keys().get(k)
    }

    /// Returns `true` if the current key is called `name`.
    #[must_use]
    pub fn is_key(&self, name: &str) -> bool {
        self.current_key().is_some_and(|k| k.name() == name)
    }

    /// Number of values of the current key, zero if there is none.
    #[must_use]
    pub fn key_value_count(&self) -> usize {
        self.current_key().map_or(0, KeyField::len)
    }

    fn key_position(&self) -> Option<(usize, usize)> {
        Some((self.tag_cursor?, self.key_cursor?))
    }

    pub(crate) fn key_index(&self) -> Option<usize> {
        self.key_cursor
    }

    pub(crate) fn seek_key(&mut self, index: usize) {
        let len = self.current_tag().map_or(0, |t| t.keys().len());
        if index < len {
            self.key_cursor = Some(index);
            self.rewind_values();
        }
    }

    /// Number of keys called `name` under the current tag.
    #[must_use]
    pub fn count_key_occurrences(&self, name: &str) -> usize {
        self.current_tag()
            .map_or(0, |t| t.keys_named(name).count())
    }

    // Value cursor

    /// Moves the value cursor to the first value of the current key.
    pub fn rewind_values(&mut self) -> bool {
        self.value_cursor = self.current_key().filter(|k| !k.is_empty()).map(|_| 0);
        self.value_cursor.is_some()
    }

    /// Moves the value cursor to the next value of the current key.
    pub fn next_value(&mut self) -> bool {
        let len = self.key_value_count();
        self.value_cursor = self.value_cursor.map(|i| i + 1).filter(|&i| i < len);
        self.value_cursor.is_some()
    }

    pub fn current_value(&self) -> Option<&str> {
        self.current_key()?.value(self.value_cursor?)
    }

    /// The current value parsed as an integer.
    #[must_use]
    pub fn current_value_as_int(&self) -> Option<i64> {
        self.current_value()?.trim().parse().ok()
    }

    /// The current value parsed as a floating-point number.
    #[must_use]
    pub fn current_value_as_double(&self) -> Option<f64> {
        self.current_value()?.trim().parse().ok()
    }

    /// Returns the current value and moves the value cursor forward.
    pub fn take_value(&mut self) -> Option<String> {
        let value = self.current_value()?.to_string();
        self.next_value();
        Some(value)
    }

    /// Returns the current value as an integer and moves forward.
    ///
    /// The cursor moves even if the value does not parse.
    pub fn take_int(&mut self) -> Option<i64> {
        let value = self.current_value_as_int();
        self.next_value();
        value
    }

    /// Returns the current value as a float and moves forward.
    ///
    /// The cursor moves even if the value does not parse.
    pub fn take_double(&mut self) -> Option<f64> {
        let value = self.current_value_as_double();
        self.next_value();
        value
    }

    // Output

    /// Writes the document as ZTK text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if writing fails.
    pub fn write_to<W: io::Write>(&self, mut writer: W) -> Result<()> {
        let text = self.to_string();
        writer.write_all(text.as_bytes())?;
        Ok(())
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Printer::new(&self.options, &self.registry).write_tags(f, &self.tags)
    }
}
