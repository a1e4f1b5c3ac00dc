//! Configuration options for ZTK parsing and printing.
//!
//! [`ZtkOptions`] holds the lexical conventions of the format (comment
//! marker, tag brackets, key marker, delimiters, quotes) together with a few
//! parser policies. One value is threaded into every tokenizer and printer a
//! [`Document`](crate::Document) creates.
//!
//! ## Examples
//!
//! ```rust
//! use ztk::{Document, ZtkOptions};
//!
//! // Shell-style comments, angle-bracket tags
//! let options = ZtkOptions::new()
//!     .with_comment('#')
//!     .with_tag_brackets('<', '>');
//!
//! let mut doc = Document::with_options(options);
//! doc.register_definition("body", ["mass"]).unwrap();
//! doc.parse_str("# a comment\n<body>\nmass: 1.5\n").unwrap();
//! assert_eq!(doc.count_tag_occurrences("body"), 1);
//! ```

use crate::{Error, Result};

/// Default comment marker.
pub const DEFAULT_COMMENT: char = '%';
/// Default delimiter set; whitespace always delimits in addition to these.
pub const DEFAULT_DELIMITERS: &str = ",;:|(){}";
/// Default suffix tried when a bare file name cannot be opened.
pub const DEFAULT_SUFFIX: &str = "ztk";
/// Default include directive keyword.
pub const DEFAULT_INCLUDE_KEYWORD: &str = "include";

/// Configuration options for ZTK documents.
///
/// All markers must be ASCII characters. See [`ZtkOptions::validate`].
///
/// # Examples
///
/// ```rust
/// use ztk::ZtkOptions;
///
/// let options = ZtkOptions::new();
/// assert_eq!(options.comment, '%');
/// assert_eq!(options.tag_open, '[');
/// assert_eq!(options.suffix, "ztk");
/// assert!(options.validate().is_ok());
/// ```
#[derive(Clone, Debug)]
pub struct ZtkOptions {
    pub comment: char,
    pub tag_open: char,
    pub tag_close: char,
    pub key_marker: char,
    pub delimiters: String,
    pub quotes: Vec<char>,
    pub suffix: String,
    pub include_keyword: String,
    pub max_include_depth: usize,
    pub relative_includes: bool,
    pub collect_discarded: bool,
}

impl Default for ZtkOptions {
    fn default() -> Self {
        ZtkOptions {
            comment: DEFAULT_COMMENT,
            tag_open: '[',
            tag_close: ']',
            key_marker: ':',
            delimiters: DEFAULT_DELIMITERS.to_string(),
            quotes: vec!['"', '\''],
            suffix: DEFAULT_SUFFIX.to_string(),
            include_keyword: DEFAULT_INCLUDE_KEYWORD.to_string(),
            max_include_depth: 64,
            relative_includes: false,
            collect_discarded: false,
        }
    }
}

impl ZtkOptions {
    /// Creates default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the comment marker.
    #[must_use]
    pub fn with_comment(mut self, comment: char) -> Self {
        self.comment = comment;
        self
    }

    /// Sets the characters that open and close a tag header.
    #[must_use]
    pub fn with_tag_brackets(mut self, open: char, close: char) -> Self {
        self.tag_open = open;
        self.tag_close = close;
        self
    }

    /// Sets the key marker.
    ///
    /// The marker is added to the delimiter set if missing, so that
    /// `key: value` still splits into two tokens.
    #[must_use]
    pub fn with_key_marker(mut self, marker: char) -> Self {
        self.key_marker = marker;
        if !self.delimiters.contains(marker) {
            self.delimiters.push(marker);
        }
        self
    }

    /// Replaces the delimiter set. Whitespace always delimits.
    #[must_use]
    pub fn with_delimiters(mut self, delimiters: &str) -> Self {
        self.delimiters = delimiters.to_string();
        self
    }

    /// Replaces the set of quote characters.
    #[must_use]
    pub fn with_quotes(mut self, quotes: &[char]) -> Self {
        self.quotes = quotes.to_vec();
        self
    }

    /// Sets the suffix tried when a bare file name cannot be opened.
    #[must_use]
    pub fn with_suffix(mut self, suffix: &str) -> Self {
        self.suffix = suffix.to_string();
        self
    }

    /// Sets the keyword of the include directive.
    #[must_use]
    pub fn with_include_keyword(mut self, keyword: &str) -> Self {
        self.include_keyword = keyword.to_string();
        self
    }

    /// Limits how many files may be open at once through nested includes.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ztk::ZtkOptions;
    ///
    /// let options = ZtkOptions::new().with_max_include_depth(8);
    /// assert_eq!(options.max_include_depth, 8);
    /// ```
    #[must_use]
    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    /// Resolves relative include paths against the including file's
    /// directory instead of the working directory.
    #[must_use]
    pub fn with_relative_includes(mut self, relative: bool) -> Self {
        self.relative_includes = relative;
        self
    }

    /// Records every tag, key or value the parser drops.
    #[must_use]
    pub fn with_collect_discarded(mut self, collect: bool) -> Self {
        self.collect_discarded = collect;
        self
    }

    /// Checks that the configuration can be tokenized unambiguously.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOptions`] when a marker is not ASCII, is
    /// whitespace, or collides with the delimiter set, or when the key
    /// marker is not itself a delimiter.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ztk::ZtkOptions;
    ///
    /// let bad = ZtkOptions::new().with_comment(',');
    /// assert!(bad.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        let markers = [
            ("comment marker", self.comment),
            ("tag open bracket", self.tag_open),
            ("tag close bracket", self.tag_close),
        ];
        for (what, c) in markers {
            check_ascii(what, c)?;
            if self.delimiters.contains(c) {
                return Err(Error::InvalidOptions(format!(
                    "{what} '{c}' is also a delimiter"
                )));
            }
        }
        for &q in &self.quotes {
            check_ascii("quote", q)?;
            if self.delimiters.contains(q) || q == self.comment {
                return Err(Error::InvalidOptions(format!(
                    "quote '{q}' collides with another marker"
                )));
            }
        }
        check_ascii("key marker", self.key_marker)?;
        if !self.delimiters.contains(self.key_marker) {
            return Err(Error::InvalidOptions(format!(
                "key marker '{}' must be a delimiter",
                self.key_marker
            )));
        }
        if let Some(c) = self.delimiters.chars().find(|c| !c.is_ascii()) {
            return Err(Error::InvalidOptions(format!(
                "delimiter '{c}' is not ASCII"
            )));
        }
        if self.tag_open == self.tag_close {
            return Err(Error::InvalidOptions(
                "tag brackets must differ".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the name inside a tag header, or `None` if `token` is not
    /// bracketed.
    ///
    /// Detection is purely syntactic and does not consult any registry.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ztk::ZtkOptions;
    ///
    /// let options = ZtkOptions::new();
    /// assert_eq!(options.tag_name("[link]"), Some("link"));
    /// assert_eq!(options.tag_name("link"), None);
    /// assert_eq!(options.tag_name("[]"), None);
    /// ```
    #[must_use]
    pub fn tag_name<'t>(&self, token: &'t str) -> Option<&'t str> {
        let name = token
            .strip_prefix(self.tag_open)?
            .strip_suffix(self.tag_close)?;
        (!name.is_empty()).then_some(name)
    }

    pub(crate) fn is_delimiter(&self, b: u8) -> bool {
        b.is_ascii_whitespace() || (b.is_ascii() && self.delimiters.as_bytes().contains(&b))
    }

    pub(crate) fn is_quote(&self, b: u8) -> bool {
        b.is_ascii() && self.quotes.iter().any(|&q| q as u32 == u32::from(b))
    }

    pub(crate) fn is_comment(&self, b: u8) -> bool {
        self.comment as u32 == u32::from(b)
    }
}

fn check_ascii(what: &str, c: char) -> Result<()> {
    if !c.is_ascii() || c.is_ascii_whitespace() {
        return Err(Error::InvalidOptions(format!(
            "{what} '{c}' must be a printable ASCII character"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_are_valid() {
        assert!(ZtkOptions::default().validate().is_ok());
    }

    #[test]
    fn test_key_marker_joins_delimiters() {
        let options = ZtkOptions::new().with_key_marker('=');
        assert!(options.delimiters.contains('='));
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_key_marker_must_delimit() {
        let options = ZtkOptions::new().with_delimiters(",;");
        assert!(matches!(options.validate(), Err(Error::InvalidOptions(_))));
    }

    #[test]
    fn test_non_ascii_marker_rejected() {
        let options = ZtkOptions::new().with_comment('§');
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_quote_cannot_be_delimiter() {
        let options = ZtkOptions::new().with_quotes(&['|']);
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_tag_name_custom_brackets() {
        let options = ZtkOptions::new().with_tag_brackets('<', '>');
        assert_eq!(options.tag_name("<shape>"), Some("shape"));
        assert_eq!(options.tag_name("[shape]"), None);
    }

    #[test]
    fn test_byte_classes() {
        let options = ZtkOptions::new();
        assert!(options.is_delimiter(b' '));
        assert!(options.is_delimiter(b'\n'));
        assert!(options.is_delimiter(b','));
        assert!(!options.is_delimiter(b'['));
        assert!(options.is_quote(b'"'));
        assert!(options.is_quote(b'\''));
        assert!(options.is_comment(b'%'));
        assert!(!options.is_comment(b'#'));
    }
}
