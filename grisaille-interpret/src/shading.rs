//! PDF shadings.

use crate::color::ColorSpace;
use crate::error::{Error, Result};
use crate::function::Function;
use grisaille_syntax::object::{Dict, Name};
use log::warn;

/// Tint transform from RGB to gray, with the operands `R G B` on the stack.
pub(crate) const RGB_TO_GRAY_PROGRAM: &str = "{ 0.11 mul exch 0.59 mul add exch 0.3 mul add }";

/// Tint transform from CMYK to gray, with the operands `C M Y K` on the stack.
pub(crate) const CMYK_TO_GRAY_PROGRAM: &str =
    "{ exch 0.11 mul add exch 0.59 mul add exch 0.3 mul add dup 1.0 ge { pop 1.0 } if }";

/// A PDF shading.
///
/// Only the color space takes part in color detection and grayscale conversion, the
/// geometry of the shading is kept as an opaque dictionary.
#[derive(Clone, Debug)]
pub struct Shading {
    /// The shading type, from 1 (function-based) to 7 (tensor-product patch mesh).
    pub shading_type: u8,
    /// The color space of the shading.
    pub color_space: ColorSpace,
    /// The remaining entries of the shading dictionary.
    pub params: Dict,
}

impl Shading {
    /// Create a new shading without any further parameters.
    pub fn new(shading_type: u8, color_space: ColorSpace) -> Self {
        Self {
            shading_type,
            color_space,
            params: Dict::new(),
        }
    }

    /// Set the remaining entries of the shading dictionary.
    pub fn with_params(mut self, params: Dict) -> Self {
        self.params = params;
        self
    }

    /// Read a shading from its dictionary.
    ///
    /// The color space must be given inline, either as a family name or as an array.
    pub fn from_dict(dict: &Dict) -> Option<Self> {
        let Some(shading_type) = dict
            .get("ShadingType")
            .and_then(|o| o.as_number())
            .and_then(|n| u8::try_from(n.as_i32()).ok())
        else {
            warn!("shading is missing its shading type");

            return None;
        };

        let Some(color_space) = dict.get("ColorSpace").and_then(ColorSpace::from_object) else {
            warn!("shading has an unsupported color space");

            return None;
        };

        let params = dict
            .iter()
            .filter(|(k, _)| **k != "ShadingType" && **k != "ColorSpace")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Some(Self {
            shading_type,
            color_space,
            params,
        })
    }

    /// The number of color components of the shading's color space.
    pub fn num_components(&self) -> usize {
        self.color_space.num_components()
    }

    /// Whether the shading can produce colors other than grays.
    ///
    /// This is decided by the number of color components alone: one component is gray,
    /// three and four components (RGB and CMYK) are assumed to be colored.
    pub fn is_colored(&self) -> Result<bool> {
        match self.num_components() {
            1 => Ok(false),
            3 | 4 => Ok(true),
            n => Err(Error::UnsupportedColorspace(n)),
        }
    }

    /// Convert the shading to grayscale.
    ///
    /// Three and four component shadings get a DeviceN color space whose tint transform
    /// computes the gray value, with DeviceGray as its alternate space. The original
    /// components are kept, so the geometry and functions of the shading stay valid.
    pub fn to_grayscale(&self) -> Result<Self> {
        let (names, program) = match self.num_components() {
            1 => return Ok(self.clone()),
            3 => (["R", "G", "B"].as_slice(), RGB_TO_GRAY_PROGRAM),
            4 => (["C", "M", "Y", "K"].as_slice(), CMYK_TO_GRAY_PROGRAM),
            n => return Err(Error::UnsupportedColorspace(n)),
        };

        let domain = vec![(0.0, 1.0); names.len()];
        let tint_transform = Function::postscript(&domain, &[(0.0, 1.0)], program)?;
        let color_space = ColorSpace::device_n(
            names.iter().map(|n| Name::new(n)).collect(),
            ColorSpace::device_gray(),
            tint_transform,
        );

        Ok(Self {
            shading_type: self.shading_type,
            color_space,
            params: self.params.clone(),
        })
    }
}
