//! Token reader for ZTK sources.
//!
//! The tokenizer streams bytes from any [`BufRead`] and hands out one
//! [`Token`] per call. Between tokens it skips whitespace, delimiters and
//! one-line comments. A token is either a run of non-delimiter bytes, or the
//! text between a pair of matching quotes (which may contain delimiters,
//! whitespace and newlines verbatim).
//!
//! ```rust
//! use ztk::tokenizer::Tokenizer;
//! use ztk::ZtkOptions;
//!
//! let source = "% header\nkey2: 20, '3 0'\n";
//! let mut tokens = Tokenizer::new(source.as_bytes(), ZtkOptions::default());
//!
//! let texts: Vec<String> = std::iter::from_fn(|| tokens.next_token().unwrap())
//!     .map(|t| t.text)
//!     .collect();
//! assert_eq!(texts, ["key2", "20", "3 0"]);
//! ```

use crate::{Error, Result, ZtkOptions};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use tracing::{trace, warn};

/// One token read from a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    /// The token was enclosed in quotes.
    pub quoted: bool,
    /// 1-based line on which the token starts.
    pub line: usize,
}

impl Token {
    /// Returns the token as a tag name if it is an unquoted tag header.
    #[must_use]
    pub fn tag_name<'a>(&'a self, options: &ZtkOptions) -> Option<&'a str> {
        if self.quoted {
            None
        } else {
            options.tag_name(&self.text)
        }
    }
}

/// Streaming tokenizer over a buffered reader.
pub struct Tokenizer<R> {
    reader: R,
    options: ZtkOptions,
    source: PathBuf,
    line: usize,
}

impl<R: BufRead> Tokenizer<R> {
    /// Creates a tokenizer for an anonymous source.
    pub fn new(reader: R, options: ZtkOptions) -> Self {
        Self::with_source(reader, options, PathBuf::from("<input>"))
    }

    /// Creates a tokenizer whose diagnostics name `source`.
    pub fn with_source(reader: R, options: ZtkOptions, source: PathBuf) -> Self {
        Tokenizer {
            reader,
            options,
            source,
            line: 1,
        }
    }

    /// The name used for this source in diagnostics.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// The line the tokenizer is currently on.
    pub fn line(&self) -> usize {
        self.line
    }

    fn peek(&mut self) -> Result<Option<u8>> {
        let buf = self.reader.fill_buf()?;
        Ok(buf.first().copied())
    }

    fn bump(&mut self) -> Result<Option<u8>> {
        let b = self.peek()?;
        if let Some(b) = b {
            self.reader.consume(1);
            if b == b'\n' {
                self.line += 1;
            }
        }
        Ok(b)
    }

    /// Skips a one-line comment if the next byte is the comment marker.
    ///
    /// Returns `true` when a comment was skipped.
    pub fn skip_comment(&mut self) -> Result<bool> {
        match self.peek()? {
            Some(b) if self.options.is_comment(b) => {
                while let Some(b) = self.bump()? {
                    if b == b'\n' {
                        break;
                    }
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Skips separators and comments up to the next token.
    fn skip_separators(&mut self) -> Result<()> {
        loop {
            match self.peek()? {
                Some(b) if self.options.is_delimiter(b) => {
                    self.bump()?;
                }
                Some(_) => {
                    if !self.skip_comment()? {
                        return Ok(());
                    }
                }
                None => return Ok(()),
            }
        }
    }

    /// Returns `true` when only separators and comments remain.
    pub fn at_eof(&mut self) -> Result<bool> {
        self.skip_separators()?;
        Ok(self.peek()?.is_none())
    }

    /// Reads the next token, or `None` at end of stream.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the reader fails and [`Error::Encoding`] if
    /// the token is not valid UTF-8.
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        self.skip_separators()?;
        let Some(first) = self.peek()? else {
            return Ok(None);
        };
        let line = self.line;
        let mut bytes = Vec::new();
        let quoted = self.options.is_quote(first);

        if quoted {
            self.bump()?;
            let mut closed = false;
            while let Some(b) = self.bump()? {
                if b == first {
                    closed = true;
                    break;
                }
                bytes.push(b);
            }
            if !closed {
                warn!(
                    source = %self.source.display(),
                    line,
                    "unterminated quoted token"
                );
            }
        } else {
            while let Some(b) = self.peek()? {
                if self.options.is_delimiter(b) || self.options.is_quote(b) {
                    break;
                }
                bytes.push(b);
                self.bump()?;
            }
        }

        let text = String::from_utf8(bytes).map_err(|_| Error::encoding(&self.source, line))?;
        trace!(line, quoted, token = %text, "token");
        Ok(Some(Token { text, quoted, line }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        tokens_with(source, ZtkOptions::default())
    }

    fn tokens_with(source: &str, options: ZtkOptions) -> Vec<Token> {
        let mut tokenizer = Tokenizer::new(source.as_bytes(), options);
        let mut out = Vec::new();
        while let Some(t) = tokenizer.next_token().unwrap() {
            out.push(t);
        }
        out
    }

    fn texts(source: &str) -> Vec<String> {
        tokens(source).into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_key_line() {
        assert_eq!(texts("key2: 20, 30"), ["key2", "20", "30"]);
    }

    #[test]
    fn test_all_default_delimiters() {
        assert_eq!(
            texts("a,b;c:d|e(f)g{h}i\tj"),
            ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"]
        );
    }

    #[test]
    fn test_tag_header_is_one_token() {
        assert_eq!(texts("[tag1]\nkey1: 10"), ["[tag1]", "key1", "10"]);
    }

    #[test]
    fn test_comment_lines_skipped() {
        assert_eq!(
            texts("% leading\n[t]\n  % indented\nk: v % trailing\nw"),
            ["[t]", "k", "v", "w"]
        );
    }

    #[test]
    fn test_percent_inside_token_is_text() {
        assert_eq!(texts("ratio: 50%"), ["ratio", "50%"]);
    }

    #[test]
    fn test_quoted_tokens() {
        let toks = tokens("k: \"a, b\" 'c: d' plain");
        assert_eq!(toks[1].text, "a, b");
        assert!(toks[1].quoted);
        assert_eq!(toks[2].text, "c: d");
        assert!(toks[2].quoted);
        assert_eq!(toks[3].text, "plain");
        assert!(!toks[3].quoted);
    }

    #[test]
    fn test_quote_of_other_kind_is_verbatim() {
        assert_eq!(texts("\"it's\" 'say \"hi\"'"), ["it's", "say \"hi\""]);
    }

    #[test]
    fn test_empty_quoted_token() {
        let toks = tokens("k: \"\"");
        assert_eq!(toks.len(), 2);
        assert_eq!(toks[1].text, "");
        assert!(toks[1].quoted);
    }

    #[test]
    fn test_quote_terminates_plain_token() {
        assert_eq!(texts("ab\"cd\""), ["ab", "cd"]);
    }

    #[test]
    fn test_unterminated_quote_runs_to_eof() {
        let toks = tokens("k: \"open ended\nline");
        assert_eq!(toks[1].text, "open ended\nline");
    }

    #[test]
    fn test_line_numbers() {
        let toks = tokens("[a]\n\n% c\nk: 'x\ny' z\n");
        let lines: Vec<usize> = toks.iter().map(|t| t.line).collect();
        assert_eq!(lines, [1, 4, 4, 5]);
    }

    #[test]
    fn test_at_eof_ignores_trailing_comments() {
        let mut tokenizer = Tokenizer::new("x\n% only a comment\n  ,;\n".as_bytes(), ZtkOptions::default());
        assert!(!tokenizer.at_eof().unwrap());
        tokenizer.next_token().unwrap();
        assert!(tokenizer.at_eof().unwrap());
        assert_eq!(tokenizer.next_token().unwrap(), None);
    }

    #[test]
    fn test_skip_comment_only_at_marker() {
        let mut tokenizer = Tokenizer::new("% c\nx".as_bytes(), ZtkOptions::default());
        assert!(tokenizer.skip_comment().unwrap());
        assert!(!tokenizer.skip_comment().unwrap());
        assert_eq!(tokenizer.line(), 2);
    }

    #[test]
    fn test_custom_lexicon() {
        let options = ZtkOptions::new()
            .with_comment('#')
            .with_delimiters(",")
            .with_key_marker('=');
        assert_eq!(
            texts_with("# c\nk = a;b, c", options),
            ["k", "a;b", "c"]
        );
    }

    fn texts_with(source: &str, options: ZtkOptions) -> Vec<String> {
        tokens_with(source, options).into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_utf8_tokens() {
        assert_eq!(texts("name: Ünïcødé, 日本"), ["name", "Ünïcødé", "日本"]);
    }

    #[test]
    fn test_invalid_utf8_is_error() {
        let bytes: &[u8] = b"k: \xff\xfe";
        let mut tokenizer = Tokenizer::new(bytes, ZtkOptions::default());
        assert_eq!(tokenizer.next_token().unwrap().unwrap().text, "k");
        assert!(matches!(
            tokenizer.next_token(),
            Err(Error::Encoding { line: 1, .. })
        ));
    }

    #[test]
    fn test_quoted_tag_is_not_a_tag() {
        let options = ZtkOptions::default();
        let toks = tokens("[real] '[fake]'");
        assert_eq!(toks[0].tag_name(&options), Some("real"));
        assert_eq!(toks[1].tag_name(&options), None);
    }
}
