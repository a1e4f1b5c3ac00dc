//! Token-driven parser that fills a [`Document`].
//!
//! The parser is a three-state machine:
//!
//! | State | Meaning |
//! |-------|---------|
//! | `Idle` | no registered tag is active; plain tokens are dropped |
//! | `Tag` | a registered tag is active, no key yet; values are dropped |
//! | `Key` | a registered tag and one of its keys are active; values attach to the key |
//!
//! Each token is classified in priority order: tag header, include
//! directive, then key or value. Includes push the named file onto the
//! [`FileStack`] and parsing continues inside it; when it is exhausted the
//! frame is popped and the including file resumes right after the
//! directive. The state is shared across files, so a tag opened by an
//! included file stays active in the includer.

use crate::document::DiscardKind;
use crate::filestack::FileStack;
use crate::tokenizer::Token;
use crate::{Document, Error, Result};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    /// Index of the active tag's definition in the registry.
    Tag(usize),
    Key(usize),
}

pub(crate) struct Parser<'a> {
    doc: &'a mut Document,
    stack: FileStack,
    state: State,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(doc: &'a mut Document) -> Self {
        Parser {
            doc,
            stack: FileStack::new(),
            state: State::Idle,
        }
    }

    pub(crate) fn open_file(&mut self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "parse file");
        self.stack.push(path, &self.doc.options)?;
        Ok(())
    }

    pub(crate) fn open_reader(&mut self, name: &str, reader: Box<dyn BufRead>) {
        debug!(source = name, "parse reader");
        self.stack.push_reader(name, reader, &self.doc.options);
    }

    /// Consumes tokens until every frame on the stack is exhausted.
    ///
    /// A read or encoding failure inside an included file closes that file
    /// and parsing resumes in its includer; in the outermost source it is
    /// returned.
    pub(crate) fn run(&mut self) -> Result<()> {
        while let Some(frame) = self.stack.top_mut() {
            match frame.next_token() {
                Ok(Some(token)) => self.step(token)?,
                Ok(None) => {
                    self.stack.pop();
                }
                Err(err) if self.stack.depth() > 1 => self.abandon_include(&err),
                Err(err) => return Err(err),
            }
        }
        debug!(tags = self.doc.tags.len(), "parse finished");
        Ok(())
    }

    fn source(&self) -> PathBuf {
        self.stack
            .top()
            .map(|f| f.path().to_path_buf())
            .unwrap_or_default()
    }

    fn discard(&mut self, kind: DiscardKind, token: &Token) {
        trace!(?kind, token = %token.text, line = token.line, "discard");
        if self.doc.options.collect_discarded {
            let source = self.source();
            self.doc.record_discard(kind, &token.text, &source, token.line);
        }
    }

    /// Drops the rest of the included file on top of the stack.
    fn abandon_include(&mut self, err: &Error) {
        let source = self.source();
        let line = self.stack.top().map_or(0, |f| f.line());
        warn!(source = %source.display(), error = %err, "rest of included file skipped");
        if self.doc.options.collect_discarded {
            let text = source.display().to_string();
            self.doc
                .record_discard(DiscardKind::SkippedInclude, &text, &source, line);
        }
        self.stack.pop();
    }

    fn step(&mut self, token: Token) -> Result<()> {
        if let Some(name) = token.tag_name(&self.doc.options) {
            let name = name.to_string();
            self.enter_tag(&name, &token);
            return Ok(());
        }
        if !token.quoted && token.text == self.doc.options.include_keyword {
            return self.include(&token);
        }

        let def = match self.state {
            State::Idle => {
                self.discard(DiscardKind::Unclaimed, &token);
                return Ok(());
            }
            State::Tag(def) | State::Key(def) => def,
        };
        let is_key = !token.quoted
            && self
                .doc
                .registry
                .get_index(def)
                .is_some_and(|d| d.key_allowed(&token.text));

        if is_key {
            if let Some(tag) = self.doc.tags.last_mut() {
                tag.add_key(token.text);
                self.state = State::Key(def);
            }
        } else if let State::Key(_) = self.state {
            if let Some(key) = self
                .doc
                .tags
                .last_mut()
                .and_then(|t| t.keys_mut().last_mut())
            {
                key.push(token.text);
            }
        } else {
            self.discard(DiscardKind::OrphanValue, &token);
        }
        Ok(())
    }

    fn enter_tag(&mut self, name: &str, token: &Token) {
        match self.doc.registry.find_index(name) {
            Some(def) => {
                trace!(tag = name, line = token.line, "tag");
                self.doc.push_tag(name);
                self.state = State::Tag(def);
            }
            None => {
                debug!(tag = name, line = token.line, "unregistered tag dropped");
                self.discard(DiscardKind::UnknownTag, token);
                self.state = State::Idle;
            }
        }
    }

    /// Handles an include directive whose keyword was just read.
    ///
    /// Files that cannot be opened, are already open, or would exceed the
    /// depth limit are skipped with a warning.
    fn include(&mut self, directive: &Token) -> Result<()> {
        let Some(frame) = self.stack.top_mut() else {
            return Ok(());
        };
        let Some(target) = frame.next_token()? else {
            warn!(line = directive.line, "include without a path at end of input");
            return Ok(());
        };

        let mut path = PathBuf::from(&target.text);
        if self.doc.options.relative_includes && path.is_relative() {
            if let Some(base) = frame.base_dir() {
                path = base.join(path);
            }
        }

        let limit = self.doc.options.max_include_depth;
        let pushed = if self.stack.depth() >= limit {
            Err(Error::IncludeDepth {
                path: path.clone(),
                limit,
            })
        } else {
            self.stack.push(&path, &self.doc.options).map(|_| ())
        };

        match pushed {
            Ok(()) => {
                debug!(path = %path.display(), depth = self.stack.depth(), "include");
                Ok(())
            }
            Err(err) if err.is_include_recoverable() => {
                warn!(line = target.line, error = %err, "include skipped");
                self.discard(DiscardKind::SkippedInclude, &target);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}
