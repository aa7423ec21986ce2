//! Tiling and shading patterns.

use crate::resources::Resources;
use crate::shading::Shading;
use grisaille_syntax::ContentStream;

/// A PDF pattern.
#[derive(Clone, Debug)]
pub enum Pattern {
    /// A tiling pattern.
    Tiling(TilingPattern),
    /// A shading pattern.
    Shading(ShadingPattern),
}

impl Pattern {
    /// Whether the pattern brings its own colors.
    ///
    /// Uncolored tiling patterns are painted with the color given to `SC`/`scn` along with
    /// the pattern name, so they can't introduce a color themselves.
    pub fn is_colored_tiling(&self) -> bool {
        matches!(self, Self::Tiling(t) if t.colored)
    }
}

/// A tiling pattern, whose cell is painted by a content stream of its own.
#[derive(Clone, Debug)]
pub struct TilingPattern {
    /// The content stream painting a single pattern cell.
    pub content: ContentStream,
    /// The resources of the content stream.
    pub resources: Resources,
    /// Whether this is a colored tiling pattern (`PaintType` 1). Uncolored tiling
    /// patterns (`PaintType` 2) only describe a shape.
    pub colored: bool,
}

impl TilingPattern {
    /// Create a new tiling pattern.
    pub fn new(content: ContentStream, resources: Resources, colored: bool) -> Self {
        Self {
            content,
            resources,
            colored,
        }
    }
}

/// A shading pattern.
#[derive(Clone, Debug)]
pub struct ShadingPattern {
    /// The underlying shading of the pattern.
    pub shading: Shading,
}

impl ShadingPattern {
    /// Create a new shading pattern.
    pub fn new(shading: Shading) -> Self {
        Self { shading }
    }
}

impl From<TilingPattern> for Pattern {
    fn from(value: TilingPattern) -> Self {
        Self::Tiling(value)
    }
}

impl From<ShadingPattern> for Pattern {
    fn from(value: ShadingPattern) -> Self {
        Self::Shading(value)
    }
}
