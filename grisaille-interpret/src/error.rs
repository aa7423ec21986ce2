//! Error types for interpreting content streams.

use grisaille_syntax::filter::FilterError;
use grisaille_syntax::object::Name;
use core::fmt;

/// A specialized [`Result`] type for content stream interpretation.
pub type Result<T> = core::result::Result<T, Error>;

/// An error encountered while interpreting a content stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The content stream is malformed.
    Parse(grisaille_syntax::Error),
    /// A color space name is not defined in the resources.
    UndefinedColorspace(Name),
    /// A pattern name is not defined in the resources.
    UndefinedPattern(Name),
    /// A shading name is not defined in the resources.
    UndefinedShading(Name),
    /// An XObject name is not defined in the resources.
    UndefinedXObject(Name),
    /// A color space with an unsupported number of components.
    UnsupportedColorspace(usize),
    /// An image couldn't be encoded with the requested filter and parameters.
    UnsupportedEncodingParameters,
    /// An operator has a missing or wrongly typed operand.
    InvalidOperand(String),
    /// Image data couldn't be decoded.
    ImageDecode(String),
    /// A function couldn't be parsed or evaluated.
    Function(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "failed to parse content stream: {e}"),
            Self::UndefinedColorspace(n) => write!(f, "undefined color space {n:?}"),
            Self::UndefinedPattern(n) => write!(f, "undefined pattern {n:?}"),
            Self::UndefinedShading(n) => write!(f, "undefined shading {n:?}"),
            Self::UndefinedXObject(n) => write!(f, "undefined XObject {n:?}"),
            Self::UnsupportedColorspace(n) => {
                write!(f, "unsupported color space with {n} components")
            }
            Self::UnsupportedEncodingParameters => f.write_str("unsupported encoding parameters"),
            Self::InvalidOperand(op) => write!(f, "invalid operand for operator {op}"),
            Self::ImageDecode(msg) => write!(f, "failed to decode image: {msg}"),
            Self::Function(msg) => write!(f, "invalid function: {msg}"),
        }
    }
}

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<grisaille_syntax::Error> for Error {
    fn from(value: grisaille_syntax::Error) -> Self {
        Self::Parse(value)
    }
}

impl From<FilterError> for Error {
    fn from(value: FilterError) -> Self {
        match value {
            FilterError::UnsupportedEncodingParameters(_) => Self::UnsupportedEncodingParameters,
            other => Self::ImageDecode(other.to_string()),
        }
    }
}
