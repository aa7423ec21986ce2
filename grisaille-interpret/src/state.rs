//! The graphics state that color operators change.

use crate::color::{Color, ColorSpace};

/// The part of the graphics state that color operators affect.
#[derive(Debug, Clone)]
pub struct GraphicsState {
    /// The stroking color space.
    pub stroke_cs: ColorSpace,
    /// The stroking color.
    pub stroke_color: Color,
    /// The non-stroking color space.
    pub non_stroke_cs: ColorSpace,
    /// The non-stroking color.
    pub non_stroke_color: Color,
}

impl GraphicsState {
    pub(crate) fn set_stroke(&mut self, cs: ColorSpace, color: Color) {
        self.stroke_cs = cs;
        self.stroke_color = color;
    }

    pub(crate) fn set_non_stroke(&mut self, cs: ColorSpace, color: Color) {
        self.non_stroke_cs = cs;
        self.non_stroke_color = color;
    }
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            stroke_cs: ColorSpace::device_gray(),
            stroke_color: Color::Gray(0.0),
            non_stroke_cs: ColorSpace::device_gray(),
            non_stroke_color: Color::Gray(0.0),
        }
    }
}
