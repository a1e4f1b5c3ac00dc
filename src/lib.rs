//! # ztk
//!
//! Parser, printer and table-driven evaluator for the ZTK ("tag-and-key")
//! document format.
//!
//! ## What is ZTK?
//!
//! ZTK is a flat, token-oriented text format for describing collections of
//! objects, such as the links and joints of a robot or the shapes of a
//! scene:
//!
//! ```text
//! % a comment
//! [link]
//! name: base
//! mass: 1.5
//! vert: 0, 0
//! vert: 1, 0
//!
//! include more_links.ztk
//! ```
//!
//! - `[name]` opens a tag field; tags never nest
//! - `key: v1, v2` adds a key field with its values to the current tag
//! - values are separated by whitespace or any of `,;:|(){}`, or enclosed in
//!   single or double quotes
//! - `include path` parses another file in place (cycles are refused)
//!
//! Only tags and keys registered beforehand are kept; everything else is
//! dropped silently.
//!
//! ## Quick Start
//!
//! ```rust
//! use ztk::Document;
//!
//! let mut doc = Document::new();
//! doc.register_definition("tag1", ["key1", "key2"]).unwrap();
//! doc.parse_str("[tag1]\nkey1: 10\nkey2: 20, 30\n[tag2]\nkey1: 99\n").unwrap();
//!
//! assert_eq!(doc.count_tag_occurrences("tag1"), 1);
//! assert_eq!(doc.count_tag_occurrences("tag2"), 0);
//!
//! let tag = &doc.tags()[0];
//! assert_eq!(tag.key("key2").unwrap().values(), ["20", "30"]);
//!
//! // Print back to ZTK text
//! assert_eq!(doc.to_string(), "[tag1]\nkey1: 10\nkey2: 20, 30\n");
//! ```
//!
//! ## Reading Into Your Own Types
//!
//! The [`property`] module maps tags and keys onto application objects
//! through a table of callbacks, and prints them back with the same table.
//!
//! ## Safety Guarantees
//!
//! - No `unsafe` code blocks
//! - Open files are closed on every exit path, including errors
//! - Include cycles and overly deep include chains are refused
//! - Parse errors keep whatever was parsed before the failure

pub mod document;
pub mod error;
pub mod filestack;
pub mod macros;
pub mod options;
mod parser;
pub mod printer;
pub mod property;
pub mod registry;
pub mod tokenizer;
pub mod tree;

pub use document::{DiscardKind, Discarded, Document};
pub use error::{Error, Result};
pub use options::ZtkOptions;
pub use printer::Printer;
pub use property::{
    evaluate_keys, evaluate_tags, print_keys, print_keys_with, print_tags, print_tags_with, Count,
    Property, PropertyTable,
};
pub use registry::{Definition, Registry};
pub use tree::{KeyField, TagField};

use std::path::Path;

/// Parses a file with the given definitions.
///
/// # Examples
///
/// ```rust,no_run
/// let doc = ztk::from_file("robot.ztk", &[("link", &["name", "mass"][..])]).unwrap();
/// println!("{} links", doc.count_tag_occurrences("link"));
/// ```
///
/// # Errors
///
/// Returns an error if a definition is repeated, the file cannot be
/// opened, or reading it fails.
pub fn from_file<P: AsRef<Path>>(path: P, definitions: &[(&str, &[&str])]) -> Result<Document> {
    let mut doc = Document::new();
    for (tag, keys) in definitions {
        doc.register_definition(tag, keys.iter())?;
    }
    doc.parse_file(path)?;
    Ok(doc)
}

/// Parses ZTK text with the given definitions.
///
/// # Examples
///
/// ```rust
/// let doc = ztk::from_str("[t]\nk: v\n", &[("t", &["k"][..])]).unwrap();
/// assert_eq!(doc.tags()[0].keys()[0].values(), ["v"]);
/// ```
///
/// # Errors
///
/// Returns an error if a definition is repeated.
pub fn from_str(source: &str, definitions: &[(&str, &[&str])]) -> Result<Document> {
    let mut doc = Document::new();
    for (tag, keys) in definitions {
        doc.register_definition(tag, keys.iter())?;
    }
    doc.parse_str(source)?;
    Ok(doc)
}

/// Prints a document as ZTK text.
///
/// # Errors
///
/// Returns [`Error::Io`] if writing fails.
pub fn to_writer<W: std::io::Write>(writer: W, doc: &Document) -> Result<()> {
    doc.write_to(writer)
}
