//! Colors, color spaces and the predicates deciding whether a color is colored or visible.

use crate::function::Function;
use grisaille_syntax::object::{Dict, Name, Object};
use log::warn;
use smallvec::{SmallVec, smallvec};
use std::sync::Arc;

/// The smallest channel difference that is visible on a typical mid-range color laser
/// printer, for channel values in the range 0 to 1.
pub const COLOR_TOLERANCE: f32 = 3.1 / 255.0;

/// Channel values below this are visible ink in additive color spaces.
const ADDITIVE_ZERO: f32 = 1.0 - COLOR_TOLERANCE;

/// A storage for the components of colors.
pub type ColorComponents = SmallVec<[f32; 4]>;

/// Convert an RGB color into a gray value, using the luma weights `0.3`, `0.59` and `0.11`.
pub fn rgb_to_gray(rgb: [f32; 3]) -> f32 {
    0.3 * rgb[0] + 0.59 * rgb[1] + 0.11 * rgb[2]
}

/// Convert a CMYK color into RGB.
pub fn cmyk_to_rgb(cmyk: [f32; 4]) -> [f32; 3] {
    let [c, m, y, k] = cmyk.map(|v| v.clamp(0.0, 1.0));

    [(1.0 - c) * (1.0 - k), (1.0 - m) * (1.0 - k), (1.0 - y) * (1.0 - k)]
}

/// Whether the channels of an RGB color (normalized to 0..1) differ by more than
/// [`COLOR_TOLERANCE`].
pub fn is_rgb_colored(rgb: [f32; 3]) -> bool {
    let [r, g, b] = rgb;

    (r - g).abs() > COLOR_TOLERANCE
        || (r - b).abs() > COLOR_TOLERANCE
        || (g - b).abs() > COLOR_TOLERANCE
}

fn visible_additive(components: &[f32]) -> bool {
    components.iter().any(|c| c.abs() < ADDITIVE_ZERO)
}

fn visible_subtractive(components: &[f32]) -> bool {
    components.iter().any(|c| c.abs() > COLOR_TOLERANCE)
}

/// A color, as set by a color operator.
#[derive(Debug, Clone)]
pub enum Color {
    /// A DeviceGray color.
    Gray(f32),
    /// A DeviceRGB color.
    Rgb([f32; 3]),
    /// A DeviceCMYK color.
    Cmyk([f32; 4]),
    /// A Lab color, with `L` in 0..100 and `a`/`b` in the range of the color space.
    Lab([f32; 3]),
    /// A CalRGB color.
    CalRgb([f32; 3]),
    /// A CalGray color.
    CalGray(f32),
    /// A pattern, optionally with the color of an uncolored tiling pattern.
    Pattern {
        /// The name of the pattern resource.
        name: Name,
        /// The color in the underlying color space of the pattern color space.
        underlying: Option<Box<Color>>,
    },
    /// A color in a color space that is defined in terms of another one (Indexed,
    /// Separation, DeviceN or ICCBased).
    Components(ColorSpace, ColorComponents),
}

impl Color {
    /// The numeric components of the color.
    ///
    /// For patterns, these are the components of the underlying color, if any.
    pub fn components(&self) -> ColorComponents {
        match self {
            Self::Gray(v) | Self::CalGray(v) => smallvec![*v],
            Self::Rgb(c) | Self::Lab(c) | Self::CalRgb(c) => c.iter().copied().collect(),
            Self::Cmyk(c) => c.iter().copied().collect(),
            Self::Pattern { underlying, .. } => underlying
                .as_ref()
                .map(|c| c.components())
                .unwrap_or_default(),
            Self::Components(_, c) => c.clone(),
        }
    }

    /// Whether this is a pattern color.
    pub fn is_pattern(&self) -> bool {
        matches!(self, Self::Pattern { .. })
    }

    /// Whether the color is visibly different from a gray.
    ///
    /// Gray colors are never colored. For Lab colors only `a` and `b` are considered,
    /// lightness alone never makes a color colored.
    ///
    /// # Panics
    ///
    /// Panics for pattern colors, whose coloredness depends on the pattern and not on
    /// the color itself.
    pub fn is_colored(&self) -> bool {
        match self {
            Self::Gray(_) | Self::CalGray(_) => false,
            Self::Rgb(c) | Self::CalRgb(c) => is_rgb_colored(*c),
            // Black doesn't add any color.
            Self::Cmyk([c, m, y, _]) => is_rgb_colored([*c, *m, *y]),
            Self::Lab([_, a, b]) => a.abs() > COLOR_TOLERANCE || b.abs() > COLOR_TOLERANCE,
            Self::Components(cs, c) => match cs.to_rgb(c) {
                Some(rgb) => is_rgb_colored(rgb),
                None => {
                    warn!("failed to convert {} color to RGB", cs.family_name());

                    false
                }
            },
            Self::Pattern { name, .. } => {
                panic!("unknown color type: pattern color {name} has no coloredness of its own")
            }
        }
    }

    /// Whether the color deposits visible ink.
    ///
    /// Additive colors are visible when any channel is darker than almost-white. For Lab
    /// colors only the lightness is considered, scaled from 0..100 to 0..1. CMYK colors are visible when any channel
    /// carries more than a trace of ink.
    ///
    /// # Panics
    ///
    /// Panics for pattern colors.
    pub fn is_visible(&self) -> bool {
        match self {
            Self::Gray(v) | Self::CalGray(v) => visible_additive(&[*v]),
            Self::Rgb(c) | Self::CalRgb(c) => visible_additive(c),
            Self::Lab([l, _, _]) => visible_additive(&[*l / 100.0]),
            Self::Cmyk(c) => visible_subtractive(c),
            Self::Components(cs, c) => match cs.to_rgb(c) {
                Some(rgb) => visible_additive(&rgb),
                None => {
                    warn!("failed to convert {} color to RGB", cs.family_name());

                    true
                }
            },
            Self::Pattern { name, .. } => {
                panic!("unknown color type: pattern color {name} has no visibility of its own")
            }
        }
    }
}

#[derive(Debug)]
pub(crate) enum ColorSpaceType {
    DeviceGray,
    DeviceRgb,
    DeviceCmyk,
    CalGray(CalGray),
    CalRgb(CalRgb),
    Lab(Lab),
    Indexed(Indexed),
    Pattern(Option<ColorSpace>),
    Separation(Tinted),
    DeviceN(Tinted),
    IccBased(IccBased),
}

/// A PDF color space.
#[derive(Debug, Clone)]
pub struct ColorSpace(Arc<ColorSpaceType>);

impl ColorSpace {
    fn new(inner: ColorSpaceType) -> Self {
        Self(Arc::new(inner))
    }

    /// The DeviceGray color space.
    pub fn device_gray() -> Self {
        Self::new(ColorSpaceType::DeviceGray)
    }

    /// The DeviceRGB color space.
    pub fn device_rgb() -> Self {
        Self::new(ColorSpaceType::DeviceRgb)
    }

    /// The DeviceCMYK color space.
    pub fn device_cmyk() -> Self {
        Self::new(ColorSpaceType::DeviceCmyk)
    }

    /// A pattern color space, with the color space of uncolored tiling patterns.
    pub fn pattern(underlying: Option<Self>) -> Self {
        Self::new(ColorSpaceType::Pattern(underlying))
    }

    /// A CalGray color space, from its parameter dictionary.
    pub fn cal_gray(dict: &Dict) -> Self {
        Self::new(ColorSpaceType::CalGray(CalGray::new(dict)))
    }

    /// A CalRGB color space, from its parameter dictionary.
    pub fn cal_rgb(dict: &Dict) -> Self {
        Self::new(ColorSpaceType::CalRgb(CalRgb::new(dict)))
    }

    /// A Lab color space, from its parameter dictionary.
    pub fn lab(dict: &Dict) -> Self {
        Self::new(ColorSpaceType::Lab(Lab::new(dict)))
    }

    /// An indexed color space.
    ///
    /// Returns `None` if the lookup table is too short for `hival + 1` entries.
    pub fn indexed(base: Self, hival: u8, lookup: Vec<u8>) -> Option<Self> {
        let needed = (usize::from(hival) + 1) * base.num_components();

        if lookup.len() < needed {
            warn!(
                "indexed lookup table has {} bytes, expected {needed}",
                lookup.len()
            );

            return None;
        }

        Some(Self::new(ColorSpaceType::Indexed(Indexed {
            base,
            hival,
            lookup,
        })))
    }

    /// A Separation color space.
    pub fn separation(name: Name, alternate: Self, tint_transform: Function) -> Self {
        Self::new(ColorSpaceType::Separation(Tinted {
            names: vec![name],
            alternate,
            tint_transform,
        }))
    }

    /// A DeviceN color space.
    pub fn device_n(names: Vec<Name>, alternate: Self, tint_transform: Function) -> Self {
        Self::new(ColorSpaceType::DeviceN(Tinted {
            names,
            alternate,
            tint_transform,
        }))
    }

    /// An ICC-based color space with `n` components.
    ///
    /// Colors are converted through `alternate`, or through the device color space with
    /// the same number of components. Returns `None` if neither exists.
    pub fn icc_based(n: usize, alternate: Option<Self>) -> Option<Self> {
        let alternate = match alternate {
            Some(alternate) => alternate,
            None => Self::device_for_components(n)?,
        };

        Some(Self::new(ColorSpaceType::IccBased(IccBased { n, alternate })))
    }

    fn device_for_components(n: usize) -> Option<Self> {
        match n {
            1 => Some(Self::device_gray()),
            3 => Some(Self::device_rgb()),
            4 => Some(Self::device_cmyk()),
            _ => {
                warn!("no device color space with {n} components");

                None
            }
        }
    }

    /// Resolve one of the color space names that need no resource lookup.
    pub fn from_name(name: &Name) -> Option<Self> {
        match name.as_bytes() {
            b"DeviceGray" | b"G" => Some(Self::device_gray()),
            b"DeviceRGB" | b"RGB" => Some(Self::device_rgb()),
            b"DeviceCMYK" | b"CMYK" | b"CalCMYK" => Some(Self::device_cmyk()),
            b"Pattern" => Some(Self::pattern(None)),
            _ => None,
        }
    }

    /// Create a color space from its object representation, for example
    /// `[/Indexed /DeviceRGB 1 <FF000000FF00>]`.
    ///
    /// Abbreviated inline image names (`G`, `RGB`, `CMYK`, `I`) are accepted. Names of
    /// color space resources are not resolved here.
    pub fn from_object(object: &Object) -> Option<Self> {
        if let Some(name) = object.as_name() {
            return Self::from_name(name);
        }

        let array = object.as_array()?;
        let (family, rest) = array.split_first()?;
        let family = family.as_name()?;

        match family.as_bytes() {
            b"DeviceGray" | b"G" | b"DeviceRGB" | b"RGB" | b"DeviceCMYK" | b"CMYK"
            | b"CalCMYK" => Self::from_name(family),
            b"CalGray" => Some(Self::cal_gray(rest.first()?.as_dict()?)),
            b"CalRGB" => Some(Self::cal_rgb(rest.first()?.as_dict()?)),
            b"Lab" => Some(Self::lab(rest.first()?.as_dict()?)),
            b"ICCBased" => {
                let dict = rest.first()?.as_dict()?;
                let n = usize::try_from(dict.get("N")?.as_number()?.as_i32()).ok()?;
                let alternate = dict.get("Alternate").and_then(Self::from_object);

                Self::icc_based(n, alternate)
            }
            b"Indexed" | b"I" => {
                let base = Self::from_object(rest.first()?)?;
                let hival = u8::try_from(rest.get(1)?.as_number()?.as_i32()).ok()?;
                let lookup = rest.get(2)?.as_string()?.to_vec();

                Self::indexed(base, hival, lookup)
            }
            b"Separation" => {
                let name = rest.first()?.as_name()?.clone();
                let alternate = Self::from_object(rest.get(1)?)?;
                let tint = Function::from_dict(rest.get(2)?.as_dict()?, None).ok()?;

                Some(Self::separation(name, alternate, tint))
            }
            b"DeviceN" => {
                let names = rest
                    .first()?
                    .as_array()?
                    .iter()
                    .map(|n| n.as_name().cloned())
                    .collect::<Option<Vec<_>>>()?;
                let alternate = Self::from_object(rest.get(1)?)?;
                let tint = Function::from_dict(rest.get(2)?.as_dict()?, None).ok()?;

                Some(Self::device_n(names, alternate, tint))
            }
            b"Pattern" => {
                let underlying = match rest.first() {
                    Some(o) => Some(Self::from_object(o)?),
                    None => None,
                };

                Some(Self::pattern(underlying))
            }
            _ => {
                warn!("unsupported color space: {family}");

                None
            }
        }
    }

    /// The name of the color space family, for example `DeviceRGB` or `Indexed`.
    pub fn family_name(&self) -> &'static str {
        match self.0.as_ref() {
            ColorSpaceType::DeviceGray => "DeviceGray",
            ColorSpaceType::DeviceRgb => "DeviceRGB",
            ColorSpaceType::DeviceCmyk => "DeviceCMYK",
            ColorSpaceType::CalGray(_) => "CalGray",
            ColorSpaceType::CalRgb(_) => "CalRGB",
            ColorSpaceType::Lab(_) => "Lab",
            ColorSpaceType::Indexed(_) => "Indexed",
            ColorSpaceType::Pattern(_) => "Pattern",
            ColorSpaceType::Separation(_) => "Separation",
            ColorSpaceType::DeviceN(_) => "DeviceN",
            ColorSpaceType::IccBased(_) => "ICCBased",
        }
    }

    /// Whether this is a pattern color space.
    pub fn is_pattern(&self) -> bool {
        matches!(self.0.as_ref(), ColorSpaceType::Pattern(_))
    }

    /// Whether this is one of the device color spaces.
    pub fn is_device(&self) -> bool {
        matches!(
            self.0.as_ref(),
            ColorSpaceType::DeviceGray | ColorSpaceType::DeviceRgb | ColorSpaceType::DeviceCmyk
        )
    }

    /// Whether this is DeviceGray or CalGray.
    pub fn is_gray(&self) -> bool {
        matches!(
            self.0.as_ref(),
            ColorSpaceType::DeviceGray | ColorSpaceType::CalGray(_)
        )
    }

    /// The color space of uncolored tiling patterns, for pattern color spaces.
    pub fn underlying(&self) -> Option<&Self> {
        match self.0.as_ref() {
            ColorSpaceType::Pattern(cs) => cs.as_ref(),
            _ => None,
        }
    }

    /// The alternate color space of Separation, DeviceN and ICC-based color spaces.
    pub fn alternate(&self) -> Option<&Self> {
        match self.0.as_ref() {
            ColorSpaceType::Separation(t) | ColorSpaceType::DeviceN(t) => Some(&t.alternate),
            ColorSpaceType::IccBased(i) => Some(&i.alternate),
            _ => None,
        }
    }

    /// The tint transform of Separation and DeviceN color spaces.
    pub fn tint_transform(&self) -> Option<&Function> {
        match self.0.as_ref() {
            ColorSpaceType::Separation(t) | ColorSpaceType::DeviceN(t) => {
                Some(&t.tint_transform)
            }
            _ => None,
        }
    }

    /// The colorant names of Separation and DeviceN color spaces.
    pub fn colorant_names(&self) -> &[Name] {
        match self.0.as_ref() {
            ColorSpaceType::Separation(t) | ColorSpaceType::DeviceN(t) => &t.names,
            _ => &[],
        }
    }

    /// The number of components of a color in this color space.
    pub fn num_components(&self) -> usize {
        match self.0.as_ref() {
            ColorSpaceType::DeviceGray
            | ColorSpaceType::CalGray(_)
            | ColorSpaceType::Indexed(_)
            | ColorSpaceType::Separation(_) => 1,
            ColorSpaceType::DeviceRgb | ColorSpaceType::CalRgb(_) | ColorSpaceType::Lab(_) => 3,
            ColorSpaceType::DeviceCmyk => 4,
            ColorSpaceType::DeviceN(t) => t.names.len(),
            ColorSpaceType::IccBased(i) => i.n,
            ColorSpaceType::Pattern(cs) => cs.as_ref().map(Self::num_components).unwrap_or(0),
        }
    }

    /// The color that is selected when the color space is set with `CS` or `cs`.
    pub fn initial_color(&self) -> Color {
        match self.0.as_ref() {
            ColorSpaceType::DeviceGray => Color::Gray(0.0),
            ColorSpaceType::DeviceRgb => Color::Rgb([0.0; 3]),
            ColorSpaceType::DeviceCmyk => Color::Cmyk([0.0, 0.0, 0.0, 1.0]),
            ColorSpaceType::CalGray(_) => Color::CalGray(0.0),
            ColorSpaceType::CalRgb(_) => Color::CalRgb([0.0; 3]),
            ColorSpaceType::Lab(_) => Color::Lab([0.0; 3]),
            ColorSpaceType::Indexed(_) => Color::Components(self.clone(), smallvec![0.0]),
            ColorSpaceType::Separation(t) | ColorSpaceType::DeviceN(t) => {
                Color::Components(self.clone(), smallvec![1.0; t.names.len()])
            }
            ColorSpaceType::IccBased(i) => {
                let mut components: ColorComponents = smallvec![0.0; i.n];

                if i.n == 4 {
                    components[3] = 1.0;
                }

                Color::Components(self.clone(), components)
            }
            ColorSpaceType::Pattern(_) => Color::Pattern {
                name: Name::new(""),
                underlying: None,
            },
        }
    }

    /// Create a color in this color space from its numeric components.
    ///
    /// Returns `None` for pattern color spaces and if the number of components doesn't
    /// match.
    pub fn color(&self, components: &[f32]) -> Option<Color> {
        if self.is_pattern() || components.len() != self.num_components() {
            return None;
        }

        let color = match self.0.as_ref() {
            ColorSpaceType::DeviceGray => Color::Gray(components[0]),
            ColorSpaceType::CalGray(_) => Color::CalGray(components[0]),
            ColorSpaceType::DeviceRgb => Color::Rgb(components.try_into().ok()?),
            ColorSpaceType::CalRgb(_) => Color::CalRgb(components.try_into().ok()?),
            ColorSpaceType::Lab(_) => Color::Lab(components.try_into().ok()?),
            ColorSpaceType::DeviceCmyk => Color::Cmyk(components.try_into().ok()?),
            _ => Color::Components(self.clone(), components.iter().copied().collect()),
        };

        Some(color)
    }

    /// The default decode array for images with `bpc` bits per component.
    pub fn default_decode(&self, bpc: u8) -> SmallVec<[(f32, f32); 4]> {
        match self.0.as_ref() {
            ColorSpaceType::Indexed(_) => {
                smallvec![(0.0, 2.0_f32.powi(i32::from(bpc)) - 1.0)]
            }
            ColorSpaceType::Lab(l) => smallvec![
                (0.0, 100.0),
                (l.range[0], l.range[1]),
                (l.range[2], l.range[3]),
            ],
            _ => smallvec![(0.0, 1.0); self.num_components()],
        }
    }

    /// Convert a color given by its components into RGB.
    ///
    /// Returns `None` if the components don't fit the color space, or for pattern color
    /// spaces.
    pub fn to_rgb(&self, c: &[f32]) -> Option<[f32; 3]> {
        if c.len() < self.num_components() {
            return None;
        }

        let rgb = match self.0.as_ref() {
            ColorSpaceType::DeviceGray => {
                let v = c[0].clamp(0.0, 1.0);
                [v, v, v]
            }
            ColorSpaceType::DeviceRgb => [c[0], c[1], c[2]].map(|v| v.clamp(0.0, 1.0)),
            ColorSpaceType::DeviceCmyk => cmyk_to_rgb([c[0], c[1], c[2], c[3]]),
            ColorSpaceType::CalGray(cal) => {
                let v = cal.to_gray(c[0]);
                [v, v, v]
            }
            ColorSpaceType::CalRgb(cal) => cal.to_rgb([c[0], c[1], c[2]]),
            ColorSpaceType::Lab(lab) => lab.to_rgb([c[0], c[1], c[2]]),
            ColorSpaceType::Indexed(i) => i.to_rgb(c[0])?,
            ColorSpaceType::Separation(t) | ColorSpaceType::DeviceN(t) => {
                let alternate = t.tint_transform.eval(&c[..t.names.len()])?;
                t.alternate.to_rgb(&alternate)?
            }
            ColorSpaceType::IccBased(i) => i.alternate.to_rgb(c)?,
            ColorSpaceType::Pattern(_) => return None,
        };

        Some(rgb)
    }

    /// Convert a color given by its components into a gray value.
    pub fn to_gray(&self, c: &[f32]) -> Option<f32> {
        self.to_rgb(c).map(rgb_to_gray)
    }
}

fn read_floats<const N: usize>(dict: &Dict, key: &str) -> Option<[f32; N]> {
    let array = dict.get(key)?.as_array()?;

    if array.len() != N {
        warn!("expected {N} numbers in /{key}, found {}", array.len());

        return None;
    }

    let mut out = [0.0; N];

    for (o, v) in out.iter_mut().zip(array) {
        *o = v.as_f32()?;
    }

    Some(out)
}

#[derive(Debug)]
pub(crate) struct CalGray {
    white_point: [f32; 3],
    gamma: f32,
}

// See <https://github.com/mozilla/pdf.js/blob/06f44916c8936b92f464d337fe3a0a6b2b78d5b4/src/core/colorspace.js#L752>
impl CalGray {
    fn new(dict: &Dict) -> Self {
        let white_point = read_floats(dict, "WhitePoint").unwrap_or([1.0, 1.0, 1.0]);
        let gamma = dict.get("Gamma").and_then(Object::as_f32).unwrap_or(1.0);

        Self { white_point, gamma }
    }

    fn to_gray(&self, a: f32) -> f32 {
        let l = self.white_point[1] * a.clamp(0.0, 1.0).powf(self.gamma);

        ((295.8 * l.powf(0.333_333_34) - 40.8).max(0.0) / 255.0).min(1.0)
    }
}

const BRADFORD_SCALE_MATRIX: [f32; 9] = [
    0.8951, 0.2664, -0.1614, -0.7502, 1.7135, 0.0367, 0.0389, -0.0685, 1.0296,
];

const BRADFORD_SCALE_INVERSE_MATRIX: [f32; 9] = [
    0.9869929, -0.1470543, 0.1599627, 0.4323053, 0.5183603, 0.0492912, -0.0085287, 0.0400428,
    0.9684867,
];

const SRGB_D65_XYZ_TO_RGB_MATRIX: [f32; 9] = [
    3.2404542, -1.5371385, -0.4985314, -0.969_266, 1.8760108, 0.0415560, 0.0556434, -0.2040259,
    1.0572252,
];

const FLAT_WHITEPOINT: [f32; 3] = [1.0, 1.0, 1.0];
const D65_WHITEPOINT: [f32; 3] = [0.95047, 1.0, 1.08883];

fn srgb_transfer_function(color: f32) -> f32 {
    if color <= 0.0031308 {
        (12.92 * color).clamp(0.0, 1.0)
    } else if color >= 0.99554525 {
        1.0
    } else {
        ((1.0 + 0.055) * color.powf(1.0 / 2.4) - 0.055).clamp(0.0, 1.0)
    }
}

fn matrix_product(a: &[f32; 9], b: &[f32; 3]) -> [f32; 3] {
    [
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2],
        a[3] * b[0] + a[4] * b[1] + a[5] * b[2],
        a[6] * b[0] + a[7] * b[1] + a[8] * b[2],
    ]
}

fn normalize_white_point_to_d65(source_white_point: &[f32; 3], xyz: &[f32; 3]) -> [f32; 3] {
    let lms = matrix_product(&BRADFORD_SCALE_MATRIX, xyz);
    let lms_d65 = [
        lms[0] * D65_WHITEPOINT[0] / source_white_point[0],
        lms[1] * D65_WHITEPOINT[1] / source_white_point[1],
        lms[2] * D65_WHITEPOINT[2] / source_white_point[2],
    ];

    matrix_product(&BRADFORD_SCALE_INVERSE_MATRIX, &lms_d65)
}

fn xyz_to_srgb(source_white_point: &[f32; 3], xyz: &[f32; 3]) -> [f32; 3] {
    let xyz_d65 = normalize_white_point_to_d65(source_white_point, xyz);

    matrix_product(&SRGB_D65_XYZ_TO_RGB_MATRIX, &xyz_d65).map(srgb_transfer_function)
}

#[derive(Debug)]
pub(crate) struct CalRgb {
    white_point: [f32; 3],
    black_point: [f32; 3],
    matrix: [f32; 9],
    gamma: [f32; 3],
}

// See <https://github.com/mozilla/pdf.js/blob/06f44916c8936b92f464d337fe3a0a6b2b78d5b4/src/core/colorspace.js#L846>
impl CalRgb {
    fn new(dict: &Dict) -> Self {
        Self {
            white_point: read_floats(dict, "WhitePoint").unwrap_or([1.0, 1.0, 1.0]),
            black_point: read_floats(dict, "BlackPoint").unwrap_or([0.0, 0.0, 0.0]),
            matrix: read_floats(dict, "Matrix")
                .unwrap_or([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]),
            gamma: read_floats(dict, "Gamma").unwrap_or([1.0, 1.0, 1.0]),
        }
    }

    fn decode_l(l: f32) -> f32 {
        if l < 0.0 {
            -Self::decode_l(-l)
        } else if l > 8.0 {
            ((l + 16.0) / 116.0).powi(3)
        } else {
            l * ((8.0_f32 + 16.0) / 116.0).powi(3) / 8.0
        }
    }

    fn compensate_black_point(&self, xyz_flat: &[f32; 3]) -> [f32; 3] {
        if self.black_point == [0.0, 0.0, 0.0] {
            return *xyz_flat;
        }

        let zero_decode_l = Self::decode_l(0.0);
        let mut out = [0.0; 3];

        for i in 0..3 {
            let src = Self::decode_l(self.black_point[i]);
            let scale = (1.0 - zero_decode_l) / (1.0 - src);
            let offset = 1.0 - scale;
            out[i] = xyz_flat[i] * scale + offset;
        }

        out
    }

    fn normalize_white_point_to_flat(&self, xyz: &[f32; 3]) -> [f32; 3] {
        let wp = &self.white_point;

        if wp[0] == 1.0 && wp[2] == 1.0 {
            return *xyz;
        }

        let lms = matrix_product(&BRADFORD_SCALE_MATRIX, xyz);
        let lms_flat = [lms[0] / wp[0], lms[1] / wp[1], lms[2] / wp[2]];

        matrix_product(&BRADFORD_SCALE_INVERSE_MATRIX, &lms_flat)
    }

    fn to_rgb(&self, c: [f32; 3]) -> [f32; 3] {
        let [r, g, b] = c.map(|v| v.clamp(0.0, 1.0));
        let [gr, gg, gb] = self.gamma;
        let [agr, bgg, cgb] = [
            if r == 1.0 { 1.0 } else { r.powf(gr) },
            if g == 1.0 { 1.0 } else { g.powf(gg) },
            if b == 1.0 { 1.0 } else { b.powf(gb) },
        ];

        let m = &self.matrix;
        let xyz = [
            m[0] * agr + m[3] * bgg + m[6] * cgb,
            m[1] * agr + m[4] * bgg + m[7] * cgb,
            m[2] * agr + m[5] * bgg + m[8] * cgb,
        ];

        let xyz_flat = self.normalize_white_point_to_flat(&xyz);
        let xyz_black = self.compensate_black_point(&xyz_flat);

        xyz_to_srgb(&FLAT_WHITEPOINT, &xyz_black)
    }
}

#[derive(Debug)]
pub(crate) struct Lab {
    white_point: [f32; 3],
    range: [f32; 4],
}

impl Lab {
    fn new(dict: &Dict) -> Self {
        Self {
            white_point: read_floats(dict, "WhitePoint").unwrap_or([0.9505, 1.0, 1.089]),
            range: read_floats(dict, "Range").unwrap_or([-100.0, 100.0, -100.0, 100.0]),
        }
    }

    fn to_rgb(&self, c: [f32; 3]) -> [f32; 3] {
        fn inverse(t: f32) -> f32 {
            if t > 6.0 / 29.0 {
                t.powi(3)
            } else {
                3.0 * (6.0_f32 / 29.0).powi(2) * (t - 4.0 / 29.0)
            }
        }

        let l = c[0].clamp(0.0, 100.0);
        let a = c[1].clamp(self.range[0], self.range[1]);
        let b = c[2].clamp(self.range[2], self.range[3]);

        let fy = (l + 16.0) / 116.0;
        let fx = fy + a / 500.0;
        let fz = fy - b / 200.0;

        let wp = &self.white_point;
        let xyz = [wp[0] * inverse(fx), wp[1] * inverse(fy), wp[2] * inverse(fz)];

        xyz_to_srgb(wp, &xyz)
    }
}

#[derive(Debug)]
pub(crate) struct Indexed {
    base: ColorSpace,
    hival: u8,
    lookup: Vec<u8>,
}

impl Indexed {
    fn to_rgb(&self, index: f32) -> Option<[f32; 3]> {
        let index = (index.clamp(0.0, f32::from(self.hival)) + 0.5) as usize;
        let n = self.base.num_components();
        let entry = self.lookup.get(index * n..(index + 1) * n)?;

        let components = entry
            .iter()
            .zip(self.base.default_decode(8))
            .map(|(b, (min, max))| min + f32::from(*b) / 255.0 * (max - min))
            .collect::<ColorComponents>();

        self.base.to_rgb(&components)
    }
}

#[derive(Debug)]
pub(crate) struct Tinted {
    names: Vec<Name>,
    alternate: ColorSpace,
    tint_transform: Function,
}

#[derive(Debug)]
pub(crate) struct IccBased {
    n: usize,
    alternate: ColorSpace,
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn assert_rgb(actual: [f32; 3], expected: [f32; 3]) {
        assert_rgb_within(actual, expected, 0.01);
    }

    fn assert_rgb_within(actual: [f32; 3], expected: [f32; 3], tolerance: f32) {
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < tolerance, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn gray_is_never_colored() {
        for v in [0.0, 0.25, 0.5, 1.0] {
            assert!(!Color::Gray(v).is_colored());
            assert!(!Color::CalGray(v).is_colored());
        }
    }

    #[test]
    fn rgb_tolerance_boundary() {
        assert!(!Color::Rgb([0.4, 0.4, 0.4]).is_colored());
        assert!(!Color::Rgb([0.5, 0.5, 0.5 + COLOR_TOLERANCE * 0.99]).is_colored());
        assert!(Color::Rgb([0.5, 0.5, 0.5 + COLOR_TOLERANCE * 1.01]).is_colored());
        assert!(Color::CalRgb([1.0, 0.0, 0.0]).is_colored());
    }

    #[test]
    fn cmyk_ignores_black() {
        assert!(!Color::Cmyk([0.2, 0.2, 0.2, 0.9]).is_colored());
        assert!(!Color::Cmyk([0.0, 0.0, 0.0, 1.0]).is_colored());
        assert!(Color::Cmyk([0.0, 1.0, 0.0, 0.0]).is_colored());
    }

    #[test]
    fn lab_uses_a_and_b() {
        assert!(!Color::Lab([50.0, 0.0, 0.0]).is_colored());
        assert!(!Color::Lab([100.0, 0.01, -0.01]).is_colored());
        assert!(Color::Lab([0.0, 0.0, -20.0]).is_colored());
    }

    #[test]
    #[should_panic(expected = "unknown color type")]
    fn pattern_color_panics() {
        Color::Pattern {
            name: Name::new("P0"),
            underlying: None,
        }
        .is_colored();
    }

    #[test]
    fn visibility() {
        assert!(Color::Gray(0.0).is_visible());
        assert!(!Color::Gray(1.0).is_visible());
        assert!(!Color::Rgb([1.0, 1.0, 0.995]).is_visible());
        assert!(Color::Rgb([1.0, 1.0, 0.9]).is_visible());
        assert!(!Color::Cmyk([0.0, 0.0, 0.0, 0.0]).is_visible());
        assert!(Color::Cmyk([0.0, 0.0, 0.0, 0.5]).is_visible());
        // Only the lightness counts.
        assert!(Color::Lab([50.0, 0.0, 0.0]).is_visible());
        assert!(Color::Lab([0.0, 80.0, 0.0]).is_visible());
        assert!(!Color::Lab([100.0, 80.0, 0.0]).is_visible());
    }

    #[test]
    fn luma_weights() {
        assert!((rgb_to_gray([1.0, 0.0, 0.0]) - 0.3).abs() < EPSILON);
        assert!((rgb_to_gray([0.0, 0.0, 1.0]) - 0.11).abs() < EPSILON);

        for v in [0.0, 0.2, 0.7, 1.0] {
            assert!((rgb_to_gray([v, v, v]) - v).abs() < EPSILON);
        }
    }

    #[test]
    fn cmyk_conversion() {
        assert_rgb(cmyk_to_rgb([0.0, 0.0, 0.0, 1.0]), [0.0, 0.0, 0.0]);
        assert_rgb(cmyk_to_rgb([1.0, 0.0, 0.0, 0.0]), [0.0, 1.0, 1.0]);
        assert_rgb(cmyk_to_rgb([0.0, 0.5, 0.0, 0.5]), [0.5, 0.25, 0.5]);
    }

    #[test]
    fn lab_conversion() {
        let lab = ColorSpace::lab(&Dict::new());

        assert_rgb(lab.to_rgb(&[100.0, 0.0, 0.0]).unwrap(), [1.0, 1.0, 1.0]);
        assert_rgb(lab.to_rgb(&[0.0, 0.0, 0.0]).unwrap(), [0.0, 0.0, 0.0]);

        let red = lab.to_rgb(&[53.24, 80.09, 67.2]).unwrap();
        assert!(red[0] > 0.9 && red[1] < 0.1 && red[2] < 0.1, "{red:?}");
    }

    #[test]
    fn cal_rgb_identity() {
        let cal = ColorSpace::cal_rgb(&Dict::new());
        // The white point adaption leaves a slight tint on white.
        assert_rgb_within(cal.to_rgb(&[1.0, 1.0, 1.0]).unwrap(), [1.0, 1.0, 1.0], 0.03);
        assert_rgb(cal.to_rgb(&[0.0, 0.0, 0.0]).unwrap(), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn indexed_lookup() {
        let cs = ColorSpace::indexed(
            ColorSpace::device_rgb(),
            1,
            vec![0xff, 0x00, 0x00, 0x80, 0x80, 0x80],
        )
        .unwrap();

        assert_eq!(cs.num_components(), 1);
        assert_rgb(cs.to_rgb(&[0.0]).unwrap(), [1.0, 0.0, 0.0]);
        assert_rgb(cs.to_rgb(&[7.0]).unwrap(), [0.5, 0.5, 0.5]);
        assert!(cs.color(&[0.0]).unwrap().is_colored());
        assert!(!cs.color(&[1.0]).unwrap().is_colored());
    }

    #[test]
    fn indexed_table_too_short() {
        assert!(ColorSpace::indexed(ColorSpace::device_rgb(), 2, vec![0; 6]).is_none());
    }

    #[test]
    fn separation_through_tint_transform() {
        let tint = Function::exponential(
            (0.0, 1.0),
            &[0.0, 0.0, 0.0, 0.0],
            &[0.0, 1.0, 0.0, 0.0],
            1.0,
        );
        let cs = ColorSpace::separation(Name::new("Magenta"), ColorSpace::device_cmyk(), tint);

        assert_eq!(cs.num_components(), 1);
        assert_rgb(cs.to_rgb(&[1.0]).unwrap(), [1.0, 0.0, 1.0]);
        assert!(matches!(cs.initial_color(), Color::Components(_, c) if c.as_slice() == [1.0]));
    }

    #[test]
    fn from_object() {
        let cs = ColorSpace::from_object(&Object::Name(Name::new("RGB"))).unwrap();
        assert_eq!(cs.family_name(), "DeviceRGB");

        let indexed = Object::Array(vec![
            Object::Name(Name::new("I")),
            Object::Name(Name::new("G")),
            Object::from(1),
            Object::String(vec![0x00, 0xff]),
        ]);
        let cs = ColorSpace::from_object(&indexed).unwrap();
        assert_eq!(cs.family_name(), "Indexed");
        assert_rgb(cs.to_rgb(&[1.0]).unwrap(), [1.0, 1.0, 1.0]);

        let mut icc = Dict::new();
        icc.insert("N", 3);
        let cs = ColorSpace::from_object(&Object::Array(vec![
            Object::Name(Name::new("ICCBased")),
            Object::Dict(icc),
        ]))
        .unwrap();
        assert_eq!(cs.num_components(), 3);
        assert_eq!(cs.alternate().unwrap().family_name(), "DeviceRGB");

        let pattern = ColorSpace::from_object(&Object::Array(vec![
            Object::Name(Name::new("Pattern")),
            Object::Name(Name::new("DeviceCMYK")),
        ]))
        .unwrap();
        assert!(pattern.is_pattern());
        assert_eq!(pattern.underlying().unwrap().num_components(), 4);

        assert!(ColorSpace::from_object(&Object::Name(Name::new("CS0"))).is_none());
    }

    #[test]
    fn initial_colors() {
        assert!(matches!(
            ColorSpace::device_cmyk().initial_color(),
            Color::Cmyk([0.0, 0.0, 0.0, 1.0])
        ));
        assert!(ColorSpace::pattern(None).initial_color().is_pattern());
    }

    #[test]
    fn color_requires_matching_components() {
        assert!(ColorSpace::device_rgb().color(&[1.0, 0.0]).is_none());
        assert!(ColorSpace::pattern(None).color(&[]).is_none());
        assert!(matches!(
            ColorSpace::device_rgb().color(&[1.0, 0.0, 0.0]),
            Some(Color::Rgb(_))
        ));
    }
}
