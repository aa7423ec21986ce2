//! Image and form XObjects.

use crate::color::ColorSpace;
use crate::error::{Error, Result};
use crate::resources::{ResourceScope, Resources};
use grisaille_syntax::filter::Filter;
use grisaille_syntax::object::{Dict, Name, Object};
use grisaille_syntax::{ContentStream, InlineImage};

/// An XObject.
#[derive(Clone, Debug)]
pub enum XObject {
    /// An image XObject.
    Image(ImageXObject),
    /// A form XObject.
    Form(FormXObject),
}

impl From<ImageXObject> for XObject {
    fn from(value: ImageXObject) -> Self {
        Self::Image(value)
    }
}

impl From<FormXObject> for XObject {
    fn from(value: FormXObject) -> Self {
        Self::Form(value)
    }
}

/// A form XObject.
#[derive(Clone, Debug)]
pub struct FormXObject {
    /// The content stream of the form.
    pub content: ContentStream,
    /// The resources of the form. Forms without resources use the resources of the
    /// content stream that paints them.
    pub resources: Option<Resources>,
}

impl FormXObject {
    /// Create a new form XObject.
    pub fn new(content: ContentStream, resources: Option<Resources>) -> Self {
        Self { content, resources }
    }
}

/// An image, either an image XObject or an inline image.
#[derive(Clone, Debug)]
pub struct ImageXObject {
    /// The width in pixels.
    pub width: u32,
    /// The height in pixels.
    pub height: u32,
    /// The color space of the image. Image masks have none.
    pub color_space: Option<ColorSpace>,
    /// The number of bits per color component.
    pub bits_per_component: u8,
    /// The filters the data is encoded with, in the order they need to be applied for
    /// decoding, together with their decode parameters.
    pub filters: Vec<(Filter, Option<Dict>)>,
    /// The encoded image data.
    pub data: Vec<u8>,
    /// The decode array, as flat list of `[min max]` pairs.
    pub decode: Option<Vec<f32>>,
    /// Whether the image is a stencil mask.
    pub image_mask: bool,
    /// Whether the image has a soft mask.
    pub has_soft_mask: bool,
}

/// Keys of an inline image dictionary that [`ImageXObject::to_inline`] writes itself.
const INLINE_IMAGE_KEYS: &[&str] = &[
    "W",
    "Width",
    "H",
    "Height",
    "CS",
    "ColorSpace",
    "BPC",
    "BitsPerComponent",
    "F",
    "Filter",
    "DP",
    "DecodeParms",
    "D",
    "Decode",
    "L",
    "Length",
];

impl ImageXObject {
    /// Create a new, unfiltered image.
    pub fn new(
        width: u32,
        height: u32,
        color_space: ColorSpace,
        bits_per_component: u8,
        data: Vec<u8>,
    ) -> Self {
        Self {
            width,
            height,
            color_space: Some(color_space),
            bits_per_component,
            filters: vec![],
            data,
            decode: None,
            image_mask: false,
            has_soft_mask: false,
        }
    }

    /// Add a filter the data is encoded with.
    pub fn with_filter(mut self, filter: Filter, params: Option<Dict>) -> Self {
        self.filters.push((filter, params));
        self
    }

    /// Mark the image as having a soft mask.
    pub fn with_soft_mask(mut self) -> Self {
        self.has_soft_mask = true;
        self
    }

    /// Read an image from its dictionary and its encoded data.
    ///
    /// Both the full and the abbreviated inline image keys are accepted. A color space
    /// given by name is resolved against `resources` unless it is a device color space.
    pub fn from_dict(dict: &Dict, data: Vec<u8>, resources: &dyn ResourceScope) -> Result<Self> {
        let dimension = |keys: &[&str]| -> Result<u32> {
            dict.get_any(keys)
                .and_then(Object::as_number)
                .and_then(|n| u32::try_from(n.as_i32()).ok())
                .ok_or_else(|| Error::ImageDecode(format!("missing or invalid /{}", keys[0])))
        };

        let width = dimension(&["W", "Width"])?;
        let height = dimension(&["H", "Height"])?;
        let image_mask = dict
            .get_any(&["IM", "ImageMask"])
            .and_then(Object::as_bool)
            .unwrap_or(false);

        let bits_per_component = if image_mask {
            1
        } else {
            dict.get_any(&["BPC", "BitsPerComponent"])
                .and_then(Object::as_number)
                .and_then(|n| u8::try_from(n.as_i32()).ok())
                .unwrap_or(8)
        };

        let color_space = match dict.get_any(&["CS", "ColorSpace"]) {
            _ if image_mask => None,
            None => None,
            Some(Object::Name(name)) => Some(
                ColorSpace::from_name(name)
                    .or_else(|| resources.color_space(name))
                    .ok_or_else(|| Error::UndefinedColorspace(name.clone()))?,
            ),
            Some(object) => Some(
                ColorSpace::from_object(object)
                    .ok_or_else(|| Error::ImageDecode("unsupported image color space".into()))?,
            ),
        };

        let decode = dict
            .get_any(&["D", "Decode"])
            .and_then(Object::as_array)
            .map(|a| a.iter().filter_map(Object::as_f32).collect());

        Ok(Self {
            width,
            height,
            color_space,
            bits_per_component,
            filters: read_filters(dict)?,
            data,
            decode,
            image_mask,
            has_soft_mask: dict.get("SMask").is_some(),
        })
    }

    /// Read an inline image.
    pub fn from_inline(image: &InlineImage, resources: &dyn ResourceScope) -> Result<Self> {
        Self::from_dict(&image.dict, image.data.clone(), resources)
    }

    /// Write the image as an inline image.
    ///
    /// Entries of `template` that don't describe the image data (for example `/I`) are
    /// kept, the others are replaced by the values of this image.
    pub fn to_inline(&self, template: &Dict) -> InlineImage {
        let mut dict = template
            .iter()
            .filter(|(k, _)| !INLINE_IMAGE_KEYS.iter().any(|key| *k == key))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect::<Dict>();

        dict.insert("W", clamped_i32(self.width));
        dict.insert("H", clamped_i32(self.height));

        if let Some(cs) = self.color_space.as_ref().filter(|cs| cs.is_device()) {
            dict.insert("CS", Name::new(cs.family_name()));
        }

        if !self.image_mask {
            dict.insert("BPC", i32::from(self.bits_per_component));
        }

        match self.filters.as_slice() {
            [] => {}
            [(filter, params)] => {
                dict.insert("F", Name::new(filter.name()));

                if let Some(params) = params {
                    dict.insert("DP", params.clone());
                }
            }
            filters => {
                let names = filters
                    .iter()
                    .map(|(f, _)| Object::Name(Name::new(f.name())))
                    .collect();
                dict.insert("F", Object::Array(names));

                if filters.iter().any(|(_, p)| p.is_some()) {
                    let params = filters
                        .iter()
                        .map(|(_, p)| p.clone().map(Object::Dict).unwrap_or(Object::Null))
                        .collect();
                    dict.insert("DP", Object::Array(params));
                }
            }
        }

        if let Some(decode) = &self.decode {
            dict.insert(
                "D",
                Object::Array(decode.iter().map(|v| Object::from(*v)).collect()),
            );
        }

        InlineImage::new(dict, self.data.clone())
    }

    /// The number of color components per pixel.
    pub fn num_components(&self) -> usize {
        self.color_space
            .as_ref()
            .map(ColorSpace::num_components)
            .unwrap_or(1)
    }

    /// Whether the image data is encoded with `filter`.
    pub fn has_filter(&self, filter: Filter) -> bool {
        self.filters.iter().any(|(f, _)| *f == filter)
    }

    /// The first filter whose data can't be inspected (JPX, CCITT or JBIG2).
    pub fn opaque_filter(&self) -> Option<Filter> {
        self.filters
            .iter()
            .map(|(f, _)| *f)
            .find(|f| f.is_opaque_image_format())
    }

    /// The filter that is applied to the samples first when encoding, i.e. the last
    /// one in decoding order.
    pub fn image_filter(&self) -> Option<Filter> {
        self.filters.last().map(|(f, _)| *f)
    }
}

fn clamped_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

fn read_filters(dict: &Dict) -> Result<Vec<(Filter, Option<Dict>)>> {
    let names = match dict.get_any(&["F", "Filter"]) {
        None => vec![],
        Some(Object::Name(name)) => vec![name],
        Some(Object::Array(array)) => array
            .iter()
            .map(|o| {
                o.as_name()
                    .ok_or_else(|| Error::ImageDecode("filter is not a name".into()))
            })
            .collect::<Result<_>>()?,
        Some(_) => return Err(Error::ImageDecode("invalid /Filter entry".into())),
    };

    let params = match dict.get_any(&["DP", "DecodeParms"]) {
        Some(Object::Dict(params)) => vec![Some(params.clone())],
        Some(Object::Array(array)) => array.iter().map(|o| o.as_dict().cloned()).collect(),
        _ => vec![],
    };

    names
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let filter = Filter::from_name(name.as_bytes())
                .ok_or_else(|| Error::ImageDecode(format!("unsupported filter {name}")))?;

            Ok((filter, params.get(i).cloned().flatten()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use grisaille_syntax::parse;

    fn inline(content: &[u8]) -> InlineImage {
        let stream = parse(content).unwrap();
        stream[0].inline_image().unwrap().clone()
    }

    #[test]
    fn inline_image() {
        let image = inline(b"BI /W 2 /H 3 /CS /RGB /BPC 4 /F /AHx /D [1 0 1 0 1 0] ID 00 EI");
        let image = ImageXObject::from_inline(&image, &Resources::new()).unwrap();

        assert_eq!((image.width, image.height), (2, 3));
        assert_eq!(image.num_components(), 3);
        assert_eq!(image.bits_per_component, 4);
        assert_eq!(image.image_filter(), Some(Filter::AsciiHexDecode));
        assert_eq!(image.decode.as_deref(), Some([1.0, 0.0, 1.0, 0.0, 1.0, 0.0].as_slice()));
        assert!(!image.image_mask);
    }

    #[test]
    fn named_color_space() {
        let resources = Resources::new().with_color_space("CS0", ColorSpace::device_cmyk());
        let image = inline(b"BI /W 1 /H 1 /CS /CS0 /BPC 8 ID 0000 EI");
        let image = ImageXObject::from_inline(&image, &resources).unwrap();

        assert_eq!(image.num_components(), 4);

        let image = inline(b"BI /W 1 /H 1 /CS /CS1 /BPC 8 ID 0000 EI");
        assert_eq!(
            ImageXObject::from_inline(&image, &resources).unwrap_err(),
            Error::UndefinedColorspace(Name::new("CS1"))
        );
    }

    #[test]
    fn image_mask() {
        let image = inline(b"BI /W 8 /H 1 /IM true ID \x00 EI");
        let image = ImageXObject::from_inline(&image, &Resources::new()).unwrap();

        assert!(image.image_mask);
        assert!(image.color_space.is_none());
        assert_eq!(image.bits_per_component, 1);
    }

    #[test]
    fn filter_chain() {
        let image = inline(b"BI /W 1 /H 1 /CS /G /F [/A85 /DCT] /DP [null << /ColorTransform 0 >>] ID ~> EI");
        let image = ImageXObject::from_inline(&image, &Resources::new()).unwrap();

        assert_eq!(image.filters.len(), 2);
        assert_eq!(image.filters[0], (Filter::Ascii85Decode, None));
        assert!(image.filters[1].1.is_some());
        assert_eq!(image.image_filter(), Some(Filter::DctDecode));
        assert!(image.has_filter(Filter::Ascii85Decode));
        assert_eq!(image.opaque_filter(), None);
    }

    #[test]
    fn unsupported_filter() {
        let image = inline(b"BI /W 1 /H 1 /CS /G /F /LZW ID \x00 EI");
        assert!(matches!(
            ImageXObject::from_inline(&image, &Resources::new()),
            Err(Error::ImageDecode(_))
        ));
    }

    #[test]
    fn write_inline() {
        let template = inline(b"BI /W 1 /H 1 /CS /RGB /BPC 8 /I true /F /Fl ID abc EI");
        let image = ImageXObject::new(1, 1, ColorSpace::device_gray(), 8, vec![0x7f])
            .with_filter(Filter::RunLengthDecode, None);

        let written = image.to_inline(&template.dict);
        let mut out = vec![];
        written.write(&mut out);

        assert_eq!(
            out,
            b"BI /I true /W 1 /H 1 /CS /DeviceGray /BPC 8 /F /RunLengthDecode ID \x7f\nEI"
        );
    }
}
