//! Stream filters for image data.
//!
//! Only the filters an image codec needs are covered: decoding of the general-purpose
//! and JPEG filters, and re-encoding with the same filter after a transformation.

mod ascii_85;
mod ascii_hex;
mod dct;
mod flate;
mod run_length;

use crate::object::Dict;
use core::fmt;

/// A stream filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
    /// `ASCIIHexDecode`.
    AsciiHexDecode,
    /// `ASCII85Decode`.
    Ascii85Decode,
    /// `FlateDecode`.
    FlateDecode,
    /// `RunLengthDecode`.
    RunLengthDecode,
    /// `DCTDecode`.
    DctDecode,
    /// `CCITTFaxDecode`.
    CcittFaxDecode,
    /// `JBIG2Decode`.
    Jbig2Decode,
    /// `JPXDecode`.
    JpxDecode,
}

impl Filter {
    /// Parse a filter from its name. Both the full names and the abbreviations
    /// allowed in inline images are accepted.
    pub fn from_name(name: &[u8]) -> Option<Self> {
        Some(match name {
            b"ASCIIHexDecode" | b"AHx" => Self::AsciiHexDecode,
            b"ASCII85Decode" | b"A85" => Self::Ascii85Decode,
            b"FlateDecode" | b"Fl" => Self::FlateDecode,
            b"RunLengthDecode" | b"RL" => Self::RunLengthDecode,
            b"DCTDecode" | b"DCT" => Self::DctDecode,
            b"CCITTFaxDecode" | b"CCF" => Self::CcittFaxDecode,
            b"JBIG2Decode" => Self::Jbig2Decode,
            b"JPXDecode" => Self::JpxDecode,
            _ => return None,
        })
    }

    /// The full name of the filter.
    pub fn name(self) -> &'static str {
        match self {
            Self::AsciiHexDecode => "ASCIIHexDecode",
            Self::Ascii85Decode => "ASCII85Decode",
            Self::FlateDecode => "FlateDecode",
            Self::RunLengthDecode => "RunLengthDecode",
            Self::DctDecode => "DCTDecode",
            Self::CcittFaxDecode => "CCITTFaxDecode",
            Self::Jbig2Decode => "JBIG2Decode",
            Self::JpxDecode => "JPXDecode",
        }
    }

    /// Whether the filter is one of the dedicated image formats whose pixels are
    /// never inspected (JPX and the bilevel codecs).
    pub fn is_opaque_image_format(self) -> bool {
        matches!(self, Self::JpxDecode | Self::CcittFaxDecode | Self::Jbig2Decode)
    }

    /// Decode `data`.
    ///
    /// `params` are the decode parameters of the filter (for example the predictor
    /// settings of `FlateDecode`).
    pub fn decode(self, data: &[u8], params: Option<&Dict>) -> Result<Vec<u8>, FilterError> {
        let decoded = match self {
            Self::AsciiHexDecode => ascii_hex::decode(data),
            Self::Ascii85Decode => ascii_85::decode(data),
            Self::FlateDecode => flate::decode(data, params),
            Self::RunLengthDecode => run_length::decode(data),
            Self::DctDecode => return dct::decode(data),
            Self::CcittFaxDecode | Self::Jbig2Decode | Self::JpxDecode => {
                return Err(FilterError::Unsupported(self));
            }
        };

        decoded.ok_or(FilterError::Corrupt(self))
    }

    /// Encode `data`, which holds samples laid out as described by `layout`.
    pub fn encode(self, data: &[u8], layout: &ImageLayout) -> Result<Vec<u8>, FilterError> {
        match self {
            Self::AsciiHexDecode => Ok(ascii_hex::encode(data)),
            Self::FlateDecode => flate::encode(data).ok_or(FilterError::Corrupt(self)),
            Self::RunLengthDecode => Ok(run_length::encode(data)),
            Self::DctDecode => dct::encode(data, layout),
            Self::Ascii85Decode
            | Self::CcittFaxDecode
            | Self::Jbig2Decode
            | Self::JpxDecode => Err(FilterError::UnsupportedEncodingParameters(self)),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The layout of the samples handed to [`Filter::encode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageLayout {
    /// The width in pixels.
    pub width: u32,
    /// The height in pixels.
    pub height: u32,
    /// The number of color components per pixel.
    pub components: u8,
    /// The number of bits per component.
    pub bits_per_component: u8,
}

/// An error raised by a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterError {
    /// Decoding with this filter is not supported.
    Unsupported(Filter),
    /// The filter can't encode data with the given parameters.
    UnsupportedEncodingParameters(Filter),
    /// The data is corrupt.
    Corrupt(Filter),
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported(filter) => write!(f, "decoding {filter} is not supported"),
            Self::UnsupportedEncodingParameters(filter) => {
                write!(f, "unsupported encoding parameters for {filter}")
            }
            Self::Corrupt(filter) => write!(f, "corrupt {filter} data"),
        }
    }
}

impl core::error::Error for FilterError {}
