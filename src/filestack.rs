//! The chain of files currently open through `include` directives.
//!
//! Each [`FileFrame`] owns the reader of one file and the canonical path it
//! was opened under. Pushing a path that is already on the stack fails with
//! [`Error::DuplicateInclude`], which is what stops include cycles. Frames
//! close their file when popped or when the stack is dropped.

use crate::tokenizer::{Token, Tokenizer};
use crate::{Error, Result, ZtkOptions};
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::trace;

/// One open source on the include chain.
pub struct FileFrame {
    path: PathBuf,
    from_file: bool,
    tokenizer: Tokenizer<Box<dyn BufRead>>,
}

impl FileFrame {
    /// The canonical path of the file, or the name given to an in-memory
    /// source.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory that relative includes from this frame resolve against.
    pub fn base_dir(&self) -> Option<&Path> {
        if self.from_file {
            self.path.parent()
        } else {
            None
        }
    }

    pub fn line(&self) -> usize {
        self.tokenizer.line()
    }

    pub fn next_token(&mut self) -> Result<Option<Token>> {
        self.tokenizer.next_token()
    }

    pub fn at_eof(&mut self) -> Result<bool> {
        self.tokenizer.at_eof()
    }
}

/// Stack of open frames, innermost last.
#[derive(Default)]
pub struct FileStack {
    frames: Vec<FileFrame>,
}

impl FileStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens `path` and pushes it as the new top frame.
    ///
    /// When `path` cannot be opened and has no extension, `path.<suffix>`
    /// is tried as well.
    ///
    /// # Errors
    ///
    /// - [`Error::Open`] if no candidate file can be opened
    /// - [`Error::DuplicateInclude`] if the file is already on the stack
    pub fn push(&mut self, path: &Path, options: &ZtkOptions) -> Result<&mut FileFrame> {
        let (file, opened) = open_with_suffix(path, &options.suffix)?;
        let canonical = fs::canonicalize(&opened).unwrap_or(opened);
        if self.contains(&canonical) {
            return Err(Error::duplicate_include(&canonical));
        }
        trace!(path = %canonical.display(), depth = self.frames.len() + 1, "push file");
        let reader: Box<dyn BufRead> = Box::new(BufReader::new(file));
        Ok(self.push_frame(FileFrame {
            tokenizer: Tokenizer::with_source(reader, options.clone(), canonical.clone()),
            path: canonical,
            from_file: true,
        }))
    }

    /// Pushes an in-memory source named `name`.
    pub fn push_reader(
        &mut self,
        name: &str,
        reader: Box<dyn BufRead>,
        options: &ZtkOptions,
    ) -> &mut FileFrame {
        let path = PathBuf::from(name);
        trace!(source = name, depth = self.frames.len() + 1, "push reader");
        self.push_frame(FileFrame {
            tokenizer: Tokenizer::with_source(reader, options.clone(), path.clone()),
            path,
            from_file: false,
        })
    }

    fn push_frame(&mut self, frame: FileFrame) -> &mut FileFrame {
        self.frames.push(frame);
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    /// Closes the top frame and returns the frame now on top, if any.
    pub fn pop(&mut self) -> Option<&mut FileFrame> {
        if let Some(frame) = self.frames.pop() {
            trace!(path = %frame.path.display(), "pop file");
        }
        self.frames.last_mut()
    }

    /// Closes every frame.
    pub fn clear(&mut self) {
        while self.pop().is_some() {}
    }

    pub fn top_mut(&mut self) -> Option<&mut FileFrame> {
        self.frames.last_mut()
    }

    pub fn top(&self) -> Option<&FileFrame> {
        self.frames.last()
    }

    /// Returns `true` if `path` is open anywhere on the stack.
    pub fn contains(&self, path: &Path) -> bool {
        self.frames.iter().any(|f| f.from_file && f.path == path)
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

fn open_with_suffix(path: &Path, suffix: &str) -> Result<(File, PathBuf)> {
    match File::open(path) {
        Ok(file) => Ok((file, path.to_path_buf())),
        Err(err) => {
            if path.extension().is_none() && !suffix.is_empty() {
                let alt = path.with_extension(suffix);
                if let Ok(file) = File::open(&alt) {
                    return Ok((file, alt));
                }
            }
            Err(Error::open(path, &err))
        }
    }
}
