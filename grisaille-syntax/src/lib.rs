/*!
A reader and writer for PDF content streams.

This crate parses the bytes of a content stream into a [`ContentStream`], a list of
[`Operator`]s that own their operand [`Object`](object::Object)s. Inline images are read as a
single operand of the `BI` operator. A content stream can be modified and written back with
[`ContentStream::to_bytes`].

The [`filter`] module contains the stream filters that are needed to decode image data and
to re-encode it after its samples were changed.

## Features
- `images` (default): JPEG (`DCTDecode`) decoding and encoding.

## Safety
This crate forbids unsafe code via a crate-level attribute.
*/

#![forbid(unsafe_code)]

pub mod content;
pub mod error;
pub mod filter;
pub mod object;
pub(crate) mod reader;

pub use content::{ContentStream, InlineImage, Operator, parse};
pub use error::{Error, ErrorKind, Result};
