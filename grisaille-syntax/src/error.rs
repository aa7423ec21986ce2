//! Error types for reading content streams.

use core::fmt;

/// A specialized [`Result`] type for content stream parsing.
pub type Result<T> = core::result::Result<T, Error>;

/// The kind of problem encountered while reading a content stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The data ended in the middle of an object.
    UnexpectedEof,
    /// A closing delimiter (`]`, `>>`, `)` or `}`) without a matching opening one.
    UnexpectedDelimiter,
    /// A literal or hex string without its closing delimiter.
    UnterminatedString,
    /// A malformed number.
    InvalidNumber,
    /// A name with an invalid `#xx` escape.
    InvalidName,
    /// An operator keyword that is not valid ASCII.
    InvalidKeyword,
    /// A dictionary key that is not a name.
    InvalidDictKey,
    /// An inline image without the `ID` keyword.
    MissingImageData,
    /// An inline image without the `EI` keyword.
    MissingEndImage,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof => f.write_str("unexpected end of data"),
            Self::UnexpectedDelimiter => f.write_str("unexpected delimiter"),
            Self::UnterminatedString => f.write_str("unterminated string"),
            Self::InvalidNumber => f.write_str("invalid number"),
            Self::InvalidName => f.write_str("invalid name"),
            Self::InvalidKeyword => f.write_str("invalid operator keyword"),
            Self::InvalidDictKey => f.write_str("dictionary key is not a name"),
            Self::MissingImageData => f.write_str("inline image without ID"),
            Self::MissingEndImage => f.write_str("inline image without EI"),
        }
    }
}

/// An error encountered while parsing a content stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    offset: usize,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }

    /// The kind of error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The byte offset in the content stream at which the error was detected.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at offset {}", self.kind, self.offset)
    }
}

impl core::error::Error for Error {}
