//! Table-driven translation between documents and application objects.
//!
//! A property table is a slice of [`Property`] entries, each pairing a match
//! string (a tag name or a key name) with an occurrence [`Count`] and two
//! callbacks: one that reads an occurrence from the document into the
//! object, and one that prints an occurrence of the object back out. The
//! same table drives both directions.
//!
//! - [`evaluate_keys`] walks the keys of the current tag and dispatches each
//!   one to the entry matching its name.
//! - [`evaluate_tags`] walks all tags and dispatches each one to the entry
//!   matching its name; the callback usually calls [`evaluate_keys`] itself.
//! - [`print_keys`] / [`print_tags`] call each entry's print callback once
//!   per expected occurrence.
//!
//! Callbacks receive the occurrence index *per entry*: for keys `a, b, a, a`
//! the `a` callback sees `0, 1, 2`.
//!
//! ## Counts
//!
//! Tables are usually authored as `const` arrays where the count of a
//! repeated entry is not known in advance ([`Count::Any`]). Before printing,
//! duplicate the table into a [`PropertyTable`] and patch the real counts
//! with [`PropertyTable::set_count`].
//!
//! ## Example
//!
//! ```rust
//! use std::io::Write;
//! use ztk::property::{evaluate_keys, print_keys, Count, Property, PropertyTable};
//! use ztk::Document;
//!
//! #[derive(Default)]
//! struct Link {
//!     name: String,
//!     mass: f64,
//!     verts: Vec<[f64; 2]>,
//! }
//!
//! const LINK_KEYS: [Property<Link>; 3] = [
//!     Property::new(
//!         "name",
//!         Count::Exact(1),
//!         Some(|link, _, doc| {
//!             link.name = doc.take_value().unwrap_or_default();
//!             Ok(())
//!         }),
//!         Some(|link, _, out| Ok(write!(out, "{}", link.name)?)),
//!     ),
//!     Property::new(
//!         "mass",
//!         Count::Exact(1),
//!         Some(|link, _, doc| {
//!             link.mass = doc.take_double().unwrap_or(0.0);
//!             Ok(())
//!         }),
//!         Some(|link, _, out| Ok(write!(out, "{}", link.mass)?)),
//!     ),
//!     Property::new(
//!         "vert",
//!         Count::Any,
//!         Some(|link, _, doc| {
//!             let x = doc.take_double().unwrap_or(0.0);
//!             let y = doc.take_double().unwrap_or(0.0);
//!             link.verts.push([x, y]);
//!             Ok(())
//!         }),
//!         Some(|link, i, out| Ok(write!(out, "{}, {}", link.verts[i][0], link.verts[i][1])?)),
//!     ),
//! ];
//!
//! let mut doc = Document::new();
//! doc.register_properties("link", &LINK_KEYS).unwrap();
//! doc.parse_str("[link]\nname: arm\nmass: 2.5\nvert: 0, 0\nvert: 1, 0\n").unwrap();
//!
//! let mut link = Link::default();
//! evaluate_keys(&mut link, &mut doc, &LINK_KEYS).unwrap();
//! assert_eq!(link.name, "arm");
//! assert_eq!(link.verts.len(), 2);
//!
//! let mut table = PropertyTable::new(&LINK_KEYS);
//! table.set_count("vert", link.verts.len());
//! let mut out = Vec::new();
//! print_keys(&mut out, &link, &table).unwrap();
//! assert_eq!(
//!     String::from_utf8(out).unwrap(),
//!     "name: arm\nmass: 2.5\nvert: 0, 0\nvert: 1, 0\n"
//! );
//! ```

use crate::{Document, Result, ZtkOptions};
use std::io::Write;
use std::ops::Deref;
use tracing::{trace, warn};

/// Reads occurrence `index` of a property from the document into the
/// object. The document's key (or tag) cursor is on the matching field.
pub type EvalFn<T> = fn(&mut T, usize, &mut Document) -> Result<()>;

/// Prints occurrence `index` of a property of the object.
pub type PrintFn<T> = fn(&T, usize, &mut dyn Write) -> Result<()>;

/// How many occurrences of a property are expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Count {
    /// Any number; prints nothing until patched.
    Any,
    /// Exactly this many. Further occurrences are not evaluated.
    Exact(usize),
}

impl Count {
    fn admits(self, index: usize) -> bool {
        match self {
            Count::Any => true,
            Count::Exact(n) => index < n,
        }
    }

    fn print_times(self) -> usize {
        match self {
            Count::Any => 0,
            Count::Exact(n) => n,
        }
    }
}

/// One entry of a property table.
pub struct Property<T> {
    pub name: &'static str,
    pub count: Count,
    pub eval: Option<EvalFn<T>>,
    pub print: Option<PrintFn<T>>,
}

impl<T> Property<T> {
    pub const fn new(
        name: &'static str,
        count: Count,
        eval: Option<EvalFn<T>>,
        print: Option<PrintFn<T>>,
    ) -> Self {
        Property {
            name,
            count,
            eval,
            print,
        }
    }
}

// Manual impls: fn pointers are Copy whatever `T` is.
impl<T> Clone for Property<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Property<T> {}

impl<T> std::fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("count", &self.count)
            .field("eval", &self.eval.is_some())
            .field("print", &self.print.is_some())
            .finish()
    }
}

/// An owned copy of a property table whose counts can be patched.
#[derive(Debug)]
pub struct PropertyTable<T> {
    entries: Vec<Property<T>>,
}

impl<T> Clone for PropertyTable<T> {
    fn clone(&self) -> Self {
        PropertyTable {
            entries: self.entries.clone(),
        }
    }
}

impl<T> PropertyTable<T> {
    /// Duplicates a (typically `const`) table.
    pub fn new(table: &[Property<T>]) -> Self {
        PropertyTable {
            entries: table.to_vec(),
        }
    }

    /// Sets the count of the first entry called `name`.
    ///
    /// Returns `false` if no entry has that name.
    pub fn set_count(&mut self, name: &str, count: usize) -> bool {
        match self.entries.iter_mut().find(|p| p.name == name) {
            Some(entry) => {
                entry.count = Count::Exact(count);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Property<T>> {
        self.entries.iter().find(|p| p.name == name)
    }
}

impl<T> Deref for PropertyTable<T> {
    type Target = [Property<T>];

    fn deref(&self) -> &Self::Target {
        &self.entries
    }
}

fn position<T>(table: &[Property<T>], name: &str) -> Option<usize> {
    table.iter().position(|p| p.name == name)
}

/// Evaluates the keys of the current tag into `obj`.
///
/// Keys without a matching entry are skipped. Before each callback the
/// value cursor is rewound onto the key; afterwards the tag and key
/// cursors are put back, so callbacks may move them freely.
///
/// # Errors
///
/// Returns the first error raised by a callback.
pub fn evaluate_keys<T>(obj: &mut T, doc: &mut Document, table: &[Property<T>]) -> Result<()> {
    let mut seen = vec![0usize; table.len()];
    if !doc.rewind_keys() {
        return Ok(());
    }
    loop {
        let (Some(tag), Some(key)) = (doc.tag_index(), doc.key_index()) else {
            break;
        };
        let slot = doc
            .current_key()
            .and_then(|k| position(table, k.name()));
        match slot {
            Some(slot) => {
                let entry = &table[slot];
                let index = seen[slot];
                seen[slot] += 1;
                if !entry.count.admits(index) {
                    warn!(key = entry.name, index, "more occurrences than expected; skipped");
                } else if let Some(eval) = entry.eval {
                    trace!(key = entry.name, index, "evaluate key");
                    doc.rewind_values();
                    eval(obj, index, doc)?;
                    doc.seek_tag(tag);
                    doc.seek_key(key);
                }
            }
            None => {
                trace!(key = ?doc.current_key().map(|k| k.name()), "no property; skipped");
            }
        }
        if !doc.next_key() {
            break;
        }
    }
    Ok(())
}

/// Evaluates every tag of the document into `obj`.
///
/// Before each callback the key cursor is rewound onto the tag; afterwards
/// the tag cursor is put back.
///
/// # Errors
///
/// Returns the first error raised by a callback.
pub fn evaluate_tags<T>(obj: &mut T, doc: &mut Document, table: &[Property<T>]) -> Result<()> {
    let mut seen = vec![0usize; table.len()];
    if !doc.rewind_tags() {
        return Ok(());
    }
    loop {
        let Some(tag) = doc.tag_index() else {
            break;
        };
        let slot = doc
            .current_tag()
            .and_then(|t| position(table, t.name()));
        if let Some(slot) = slot {
            let entry = &table[slot];
            let index = seen[slot];
            seen[slot] += 1;
            if !entry.count.admits(index) {
                warn!(tag = entry.name, index, "more occurrences than expected; skipped");
            } else if let Some(eval) = entry.eval {
                trace!(tag = entry.name, index, "evaluate tag");
                doc.rewind_keys();
                eval(obj, index, doc)?;
                doc.seek_tag(tag);
            }
        }
        if !doc.next_tag() {
            break;
        }
    }
    Ok(())
}

/// Prints `name: values` lines for every entry of a key table, using the
/// default key marker.
///
/// Each entry's callback is invoked once per expected occurrence and
/// writes the values; the key name, marker and line break are written
/// around it.
///
/// # Errors
///
/// Returns the first write or callback error.
pub fn print_keys<T>(out: &mut dyn Write, obj: &T, table: &[Property<T>]) -> Result<()> {
    print_keys_with(out, obj, table, &ZtkOptions::default())
}

/// Like [`print_keys`], with the key marker taken from `options`.
///
/// # Errors
///
/// Returns the first write or callback error.
pub fn print_keys_with<T>(
    out: &mut dyn Write,
    obj: &T,
    table: &[Property<T>],
    options: &ZtkOptions,
) -> Result<()> {
    for entry in table {
        let Some(print) = entry.print else {
            continue;
        };
        if entry.count == Count::Any {
            trace!(key = entry.name, "count not set; nothing printed");
        }
        for i in 0..entry.count.print_times() {
            write!(out, "{}{} ", entry.name, options.key_marker)?;
            print(obj, i, out)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Prints a `[name]` section for every expected occurrence of every entry
/// of a tag table, using the default brackets. The callback writes the
/// section body, typically with [`print_keys`].
///
/// # Errors
///
/// Returns the first write or callback error.
pub fn print_tags<T>(out: &mut dyn Write, obj: &T, table: &[Property<T>]) -> Result<()> {
    print_tags_with(out, obj, table, &ZtkOptions::default())
}

/// Like [`print_tags`], with the tag brackets taken from `options`. Section
/// bodies should use [`print_keys_with`] and the same options.
///
/// # Errors
///
/// Returns the first write or callback error.
pub fn print_tags_with<T>(
    out: &mut dyn Write,
    obj: &T,
    table: &[Property<T>],
    options: &ZtkOptions,
) -> Result<()> {
    let mut first = true;
    for entry in table {
        let Some(print) = entry.print else {
            continue;
        };
        for i in 0..entry.count.print_times() {
            if !first {
                writeln!(out)?;
            }
            first = false;
            writeln!(out, "{}{}{}", options.tag_open, entry.name, options.tag_close)?;
            print(obj, i, out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[derive(Default, Debug)]
    struct Trace {
        calls: Vec<(String, usize, Vec<String>)>,
    }

    fn record(name: &str, t: &mut Trace, i: usize, doc: &mut Document) {
        let mut values = Vec::new();
        while let Some(v) = doc.take_value() {
            values.push(v);
        }
        t.calls.push((name.to_string(), i, values));
    }

    const TRACE_KEYS: [Property<Trace>; 2] = [
        Property::new(
            "a",
            Count::Any,
            Some(|t, i, doc| {
                record("a", t, i, doc);
                Ok(())
            }),
            None,
        ),
        Property::new(
            "b",
            Count::Exact(1),
            Some(|t, i, doc| {
                record("b", t, i, doc);
                // Wander off; the walker must restore the key cursor.
                doc.rewind_keys();
                Ok(())
            }),
            None,
        ),
    ];

    fn doc_with(source: &str) -> Document {
        let mut doc = Document::new();
        doc.register_definition("t", ["a", "b", "c"]).unwrap();
        doc.register_definition("u", ["a"]).unwrap();
        doc.parse_str(source).unwrap();
        doc
    }

    #[test]
    fn test_index_scoped_per_entry() {
        let mut doc = doc_with("[t]\na: 1\nb: 2\na: 3\nc: 9\na: 4 5\n");
        let mut trace = Trace::default();
        evaluate_keys(&mut trace, &mut doc, &TRACE_KEYS).unwrap();

        let seen: Vec<(&str, usize)> = trace
            .calls
            .iter()
            .map(|(n, i, _)| (n.as_str(), *i))
            .collect();
        assert_eq!(seen, [("a", 0), ("b", 0), ("a", 1), ("a", 2)]);
        assert_eq!(trace.calls[3].2, ["4", "5"]);
    }

    #[test]
    fn test_exact_count_caps_evaluation() {
        let mut doc = doc_with("[t]\nb: 1\nb: 2\na: 3\n");
        let mut trace = Trace::default();
        evaluate_keys(&mut trace, &mut doc, &TRACE_KEYS).unwrap();
        let names: Vec<&str> = trace.calls.iter().map(|(n, _, _)| n.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
        assert_eq!(trace.calls[0].2, ["1"]);
    }

    const WANDER: [Property<Vec<String>>; 1] = [Property::new(
        "a",
        Count::Any,
        Some(|seen, _, doc| {
            seen.extend(doc.take_value());
            doc.next_tag();
            Ok(())
        }),
        None,
    )];

    #[test]
    fn test_evaluate_keys_restores_tag_cursor() {
        let mut doc = doc_with("[t]\na: 1\na: 2\n[t]\na: 3\na: 4\na: 5\n");
        let mut seen = Vec::new();
        evaluate_keys(&mut seen, &mut doc, &WANDER).unwrap();
        assert_eq!(seen, ["1", "2"]);
        assert_eq!(doc.tag_index(), Some(0));
    }

    #[test]
    fn test_evaluate_keys_without_tag() {
        let mut doc = Document::new();
        let mut trace = Trace::default();
        evaluate_keys(&mut trace, &mut doc, &TRACE_KEYS).unwrap();
        assert!(trace.calls.is_empty());
    }

    const TAGS: [Property<Vec<(usize, usize)>>; 1] = [Property::new(
        "u",
        Count::Any,
        Some(|seen, i, doc| {
            seen.push((i, doc.count_key_occurrences("a")));
            doc.next_tag();
            Ok(())
        }),
        None,
    )];

    #[test]
    fn test_evaluate_tags_dispatch_and_restore() {
        let mut doc = doc_with("[u]\na: 1\n[t]\na: 2\n[u]\na: 1\na: 2\n");
        let mut seen = Vec::new();
        evaluate_tags(&mut seen, &mut doc, &TAGS).unwrap();
        assert_eq!(seen, [(0, 1), (1, 2)]);
    }

    #[test]
    fn test_callback_error_propagates() {
        const FAIL: [Property<()>; 1] = [Property::new(
            "a",
            Count::Any,
            Some(|_, _, _| Err(Error::custom("bad a"))),
            None,
        )];
        let mut doc = doc_with("[t]\na: 1\n");
        let err = evaluate_keys(&mut (), &mut doc, &FAIL).unwrap_err();
        assert!(err.to_string().contains("bad a"));
    }

    const POINT: [Property<Vec<i64>>; 2] = [
        Property::new("n", Count::Exact(1), None, Some(|v, _, out| Ok(write!(out, "{}", v.len())?))),
        Property::new("x", Count::Any, None, Some(|v, i, out| Ok(write!(out, "{}", v[i])?))),
    ];

    #[test]
    fn test_print_keys_needs_patched_count() {
        let values = vec![7, 8, 9];
        let mut out = Vec::new();
        print_keys(&mut out, &values, &POINT).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "n: 3\n");

        let mut table = PropertyTable::new(&POINT);
        assert!(table.set_count("x", values.len()));
        assert!(!table.set_count("y", 1));
        let mut out = Vec::new();
        print_keys(&mut out, &values, &table).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "n: 3\nx: 7\nx: 8\nx: 9\n");
        assert_eq!(POINT[1].count, Count::Any);
    }

    #[test]
    fn test_print_tags_sections() {
        const SECTIONS: [Property<Vec<Vec<i64>>>; 1] = [Property::new(
            "p",
            Count::Any,
            None,
            Some(|all, i, out| {
                let mut keys = PropertyTable::new(&POINT);
                keys.set_count("x", all[i].len());
                print_keys(out, &all[i], &keys)
            }),
        )];
        let data = vec![vec![1], vec![2, 3]];
        let mut table = PropertyTable::new(&SECTIONS);
        table.set_count("p", data.len());

        let mut out = Vec::new();
        print_tags(&mut out, &data, &table).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "[p]\nn: 1\nx: 1\n\n[p]\nn: 2\nx: 2\nx: 3\n"
        );
    }

    #[test]
    fn test_print_with_custom_markers() {
        let options = ZtkOptions::new()
            .with_tag_brackets('<', '>')
            .with_key_marker('=');
        let sections: [Property<Vec<i64>>; 1] = [Property::new(
            "p",
            Count::Exact(2),
            None,
            Some(|v, _, out| {
                let options = ZtkOptions::new().with_key_marker('=');
                let mut keys = PropertyTable::new(&POINT);
                keys.set_count("x", v.len());
                print_keys_with(out, v, &keys, &options)
            }),
        )];
        let mut out = Vec::new();
        print_tags_with(&mut out, &vec![4], &sections, &options).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "<p>\nn= 1\nx= 4\n\n<p>\nn= 1\nx= 4\n"
        );
    }

    #[test]
    fn test_table_lookup() {
        let table = PropertyTable::new(&TRACE_KEYS);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("b").map(|p| p.count), Some(Count::Exact(1)));
        assert!(table.get("z").is_none());
    }
}
