/*!
Color detection, marking detection and grayscale conversion for PDF content streams.

All three tasks walk over the operators of a content stream with a small interpreter that
tracks the current stroking and non-stroking colors (see [`interpret::process`]) and hands
each operator to a set of handlers:

- [`ColorDetector`] decides whether a stream paints anything in a color other than gray.
- [`MarkingDetector`] decides whether a stream leaves a visible mark on the page at all.
- [`GrayscaleTransformer`] rewrites a stream, and the resources it uses, to gray.

Forms and tiling patterns are visited recursively. Named resources are looked up through the
[`ResourceScope`] trait, for which [`Resources`] is an in-memory implementation.

The [`summary`] module builds per-document records of the colored or marked pages.

## Features
- `serde`: `Serialize` implementations for the summary records.

## Safety
This crate forbids unsafe code via a crate-level attribute.
*/

#![forbid(unsafe_code)]

pub mod color;
mod context;
pub mod detect;
pub mod error;
pub mod function;
pub mod gray;
pub mod image;
pub mod interpret;
pub mod mark;
pub mod pattern;
pub mod resources;
pub mod shading;
pub mod state;
pub mod summary;
pub mod x_object;

pub use color::{COLOR_TOLERANCE, Color, ColorSpace};
pub use detect::ColorDetector;
pub use error::{Error, Result};
pub use gray::GrayscaleTransformer;
pub use interpret::{InterpreterSettings, InterpreterWarning};
pub use mark::MarkingDetector;
pub use resources::{ResourceScope, Resources};
pub use state::GraphicsState;
