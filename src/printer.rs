//! ZTK text output.
//!
//! [`Printer`] writes tag fields back as ZTK text:
//!
//! ```text
//! [tag1]
//! key1: 10
//! key2: 20, 30
//! ```
//!
//! Values are written bare when the tokenizer would read them back as the
//! same single value, and quoted otherwise. Tag and key names are always
//! written bare.

use crate::{KeyField, Registry, TagField, ZtkOptions};
use indexmap::{IndexMap, IndexSet};
use std::fmt::{self, Write};
use tracing::warn;

/// Writes tags, keys and values in ZTK syntax.
pub struct Printer<'a> {
    options: &'a ZtkOptions,
    registry: &'a Registry,
}

impl<'a> Printer<'a> {
    pub fn new(options: &'a ZtkOptions, registry: &'a Registry) -> Self {
        Printer { options, registry }
    }

    /// Writes every tag, separated by blank lines.
    ///
    /// A value spelled like a key of any tag sharing its tag's name is
    /// quoted, so the text parses back the same under a registry built
    /// from these tags.
    pub fn write_tags<W: Write>(&self, out: &mut W, tags: &[TagField]) -> fmt::Result {
        let mut known: IndexMap<&str, IndexSet<&str>> = IndexMap::new();
        for tag in tags {
            known
                .entry(tag.name())
                .or_default()
                .extend(tag.keys().iter().map(KeyField::name));
        }
        for (i, tag) in tags.iter().enumerate() {
            if i > 0 {
                out.write_char('\n')?;
            }
            self.write_tag_with(out, tag, known.get(tag.name()))?;
        }
        Ok(())
    }

    pub fn write_tag<W: Write>(&self, out: &mut W, tag: &TagField) -> fmt::Result {
        self.write_tag_with(out, tag, None)
    }

    fn write_tag_with<W: Write>(
        &self,
        out: &mut W,
        tag: &TagField,
        known: Option<&IndexSet<&str>>,
    ) -> fmt::Result {
        self.write_tag_header(out, tag.name())?;
        for key in tag.keys() {
            self.write_key(out, tag, key, known)?;
        }
        Ok(())
    }

    pub fn write_tag_header<W: Write>(&self, out: &mut W, name: &str) -> fmt::Result {
        writeln!(out, "{}{}{}", self.options.tag_open, name, self.options.tag_close)
    }

    fn write_key<W: Write>(
        &self,
        out: &mut W,
        tag: &TagField,
        key: &KeyField,
        known: Option<&IndexSet<&str>>,
    ) -> fmt::Result {
        write!(out, "{}{}", key.name(), self.options.key_marker)?;
        for (i, value) in key.values().iter().enumerate() {
            out.write_str(if i == 0 { " " } else { ", " })?;
            let collides = tag.key(value).is_some()
                || known.is_some_and(|k| k.contains(value.as_str()))
                || self.registry.key_allowed(tag.name(), value);
            self.write_value(out, value, collides)?;
        }
        out.write_char('\n')
    }

    /// Writes one value, quoting it if it would not read back verbatim.
    ///
    /// `collides_with_key` forces quoting for values spelled like a key of
    /// the enclosing tag.
    pub fn write_value<W: Write>(&self, out: &mut W, value: &str, collides_with_key: bool) -> fmt::Result {
        if !collides_with_key && !self.needs_quotes(value) {
            return out.write_str(value);
        }
        let quote = self
            .options
            .quotes
            .iter()
            .copied()
            .find(|&q| !value.contains(q));
        match quote {
            Some(q) => write!(out, "{q}{value}{q}"),
            None => {
                let q = self.options.quotes.first().copied().unwrap_or('"');
                warn!(value, "value contains every quote character; output will not read back");
                write!(out, "{q}{value}{q}")
            }
        }
    }

    #[inline]
    fn needs_quotes(&self, s: &str) -> bool {
        s.is_empty()
            || s.bytes()
                .any(|b| self.options.is_delimiter(b) || self.options.is_quote(b))
            || s.starts_with(self.options.comment)
            || self.options.tag_name(s).is_some()
            || s == self.options.include_keyword
    }
}
