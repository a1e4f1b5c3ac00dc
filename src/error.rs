//! Error types for ZTK parsing, printing and evaluation.
//!
//! ## Error Categories
//!
//! - **File errors**: a file could not be opened, or was already open in the
//!   current include chain
//! - **Registry errors**: a tag was registered twice
//! - **Content errors**: a token was not valid UTF-8, or the reader failed
//! - **Construction errors**: a key or value was added with no tag or key to
//!   hold it
//!
//! Tags, keys and values that the registry does not recognize are *not*
//! errors. They are dropped silently, and can be inspected through
//! [`Document::discarded`](crate::Document::discarded) when
//! [`ZtkOptions::collect_discarded`](crate::ZtkOptions) is enabled.
//!
//! ## Examples
//!
//! ```rust
//! use ztk::{Document, Error};
//!
//! let mut doc = Document::new();
//! doc.register_definition("link", ["name", "mass"]).unwrap();
//!
//! let err = doc.register_definition("link", ["name"]).unwrap_err();
//! assert!(matches!(err, Error::DuplicateDefinition { .. }));
//! ```

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Represents all possible errors raised by this crate.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The file (with or without the default suffix) could not be opened
    #[error("cannot open {}: {reason}", path.display())]
    Open { path: PathBuf, reason: String },

    /// The file is already open further up the include chain
    #[error("{} is already being parsed (include cycle)", path.display())]
    DuplicateInclude { path: PathBuf },

    /// The include chain reached the configured depth limit
    #[error("cannot include {}: include depth limit of {limit} reached", path.display())]
    IncludeDepth { path: PathBuf, limit: usize },

    /// The tag already has a definition
    #[error("tag [{tag}] is already defined")]
    DuplicateDefinition { tag: String },

    /// A token is not valid UTF-8
    #[error("invalid UTF-8 in {} at line {line}", path.display())]
    Encoding { path: PathBuf, line: usize },

    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// A key was added while no tag is current
    #[error("no current tag to add a key to")]
    NoActiveTag,

    /// A value was added while no key is current
    #[error("no current key to add a value to")]
    NoActiveKey,

    /// The lexical configuration is unusable
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates an open error from the failed path and the underlying cause.
    pub fn open(path: &Path, err: &io::Error) -> Self {
        Error::Open {
            path: path.to_path_buf(),
            reason: err.to_string(),
        }
    }

    /// Creates a duplicate include error.
    pub fn duplicate_include(path: &Path) -> Self {
        Error::DuplicateInclude {
            path: path.to_path_buf(),
        }
    }

    /// Creates a duplicate definition error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ztk::Error;
    ///
    /// let err = Error::duplicate_definition("joint");
    /// assert_eq!(err.to_string(), "tag [joint] is already defined");
    /// ```
    pub fn duplicate_definition(tag: &str) -> Self {
        Error::DuplicateDefinition {
            tag: tag.to_string(),
        }
    }

    /// Creates an encoding error.
    pub fn encoding(path: &Path, line: usize) -> Self {
        Error::Encoding {
            path: path.to_path_buf(),
            line,
        }
    }

    /// Creates a custom error with a display message.
    ///
    /// Property-table callbacks use this to reject values they cannot
    /// interpret.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ztk::Error;
    ///
    /// let err = Error::custom("mass must be positive");
    /// assert!(err.to_string().contains("mass must be positive"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns `true` for errors that only skip one `include` directive
    /// instead of aborting the parse.
    #[must_use]
    pub fn is_include_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Open { .. } | Error::DuplicateInclude { .. } | Error::IncludeDepth { .. }
        )
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::io(&err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
