//! Decoding image samples into RGB pixels and encoding grayscale images.

use crate::color::{ColorComponents, ColorSpace, rgb_to_gray};
use crate::error::{Error, Result};
use crate::x_object::ImageXObject;
use grisaille_syntax::filter::{Filter, ImageLayout};
use log::warn;
use smallvec::SmallVec;
use std::borrow::Cow;

/// The decoded samples of an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    /// The width in pixels.
    pub width: u32,
    /// The height in pixels.
    pub height: u32,
    /// The number of color components per pixel.
    pub components: u8,
    /// The number of bits per component.
    pub bits_per_component: u8,
    /// The samples, row by row. Each row starts at a byte boundary.
    pub samples: Vec<u8>,
}

impl RawImage {
    /// The number of bytes of a single row.
    pub fn row_len(&self) -> usize {
        (self.width as usize * usize::from(self.components) * usize::from(self.bits_per_component))
            .div_ceil(8)
    }

    /// The layout of the samples, as needed for encoding.
    pub fn layout(&self) -> ImageLayout {
        ImageLayout {
            width: self.width,
            height: self.height,
            components: self.components,
            bits_per_component: self.bits_per_component,
        }
    }
}

/// Decoding and encoding of image data.
///
/// Color detection only decodes, the grayscale transform decodes and encodes.
pub trait ImageCodec {
    /// Decode the data of an image into its samples.
    fn decode(&self, image: &ImageXObject) -> Result<RawImage>;

    /// Encode samples with `filter`, or leave them unencoded.
    ///
    /// Fails with [`Error::UnsupportedEncodingParameters`] if the filter can't encode
    /// the samples.
    fn encode(&self, image: &RawImage, filter: Option<Filter>) -> Result<Vec<u8>>;
}

/// The image codec based on the filters of `grisaille-syntax`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCodec;

impl ImageCodec for DefaultCodec {
    fn decode(&self, image: &ImageXObject) -> Result<RawImage> {
        let mut components = u8::try_from(image.num_components())
            .map_err(|_| Error::ImageDecode("too many color components".into()))?;
        let mut bits_per_component = image.bits_per_component;
        let mut data = Cow::Borrowed(image.data.as_slice());

        for (filter, params) in &image.filters {
            data = Cow::Owned(filter.decode(&data, params.as_ref())?);

            // JPEG data determines its own sample layout.
            if *filter == Filter::DctDecode {
                bits_per_component = 8;
                let pixels = image.width as usize * image.height as usize;

                if pixels > 0 && data.len() % pixels == 0 {
                    components = u8::try_from(data.len() / pixels)
                        .map_err(|_| Error::ImageDecode("invalid JPEG layout".into()))?;
                }
            }
        }

        if !matches!(bits_per_component, 1 | 2 | 4 | 8 | 16) {
            return Err(Error::ImageDecode(format!(
                "unsupported bits per component {bits_per_component}"
            )));
        }

        let mut raw = RawImage {
            width: image.width,
            height: image.height,
            components,
            bits_per_component,
            samples: data.into_owned(),
        };

        let expected = raw
            .row_len()
            .checked_mul(raw.height as usize)
            .ok_or_else(|| Error::ImageDecode("image dimensions are too large".into()))?;
        let missing = expected.saturating_sub(raw.samples.len());

        // Some images are missing a few bytes at the end, treat them as zero. Anything
        // beyond the last row means the dimensions don't describe the data.
        if missing > raw.row_len() {
            return Err(Error::ImageDecode(format!(
                "image data is too short ({} < {expected} bytes)",
                raw.samples.len()
            )));
        }

        if missing > 0 {
            warn!("image data is missing {missing} bytes, padding with zeroes");
            raw.samples.resize(expected, 0);
        }

        Ok(raw)
    }

    fn encode(&self, image: &RawImage, filter: Option<Filter>) -> Result<Vec<u8>> {
        match filter {
            None => Ok(image.samples.clone()),
            Some(filter) => Ok(filter.encode(&image.samples, &image.layout())?),
        }
    }
}

/// Unpack the samples of each pixel into one value per component.
fn unpack(raw: &RawImage) -> Vec<u16> {
    let bpc = usize::from(raw.bits_per_component);
    let per_row = raw.width as usize * usize::from(raw.components);
    let mut out = Vec::with_capacity(per_row * raw.height as usize);

    for row in raw.samples.chunks(raw.row_len().max(1)).take(raw.height as usize) {
        match bpc {
            8 => out.extend(row.iter().take(per_row).map(|v| u16::from(*v))),
            16 => out.extend(
                row.chunks_exact(2)
                    .take(per_row)
                    .map(|v| u16::from_be_bytes([v[0], v[1]])),
            ),
            _ => {
                let mask = (1_u16 << bpc) - 1;

                for i in 0..per_row {
                    let bit = i * bpc;
                    let byte = row.get(bit / 8).copied().unwrap_or(0);
                    let shift = 8 - bpc - bit % 8;

                    out.push((u16::from(byte) >> shift) & mask);
                }
            }
        }
    }

    out
}

/// Convert the samples of an image into RGB pixels, applying the decode array of the
/// image and the conversion of its color space.
///
/// Image masks are treated as DeviceGray images.
pub(crate) fn rgb_pixels(image: &ImageXObject, raw: &RawImage) -> Result<Vec<[f32; 3]>> {
    let color_space = image
        .color_space
        .clone()
        .unwrap_or_else(ColorSpace::device_gray);
    let n = color_space.num_components();

    if n != usize::from(raw.components) {
        return Err(Error::ImageDecode(format!(
            "expected {n} color components, found {}",
            raw.components
        )));
    }

    let decode = decode_ranges(image, &color_space, raw.bits_per_component);
    let max = 2.0_f32.powi(i32::from(raw.bits_per_component)) - 1.0;
    let samples = unpack(raw);

    let mut pixels = Vec::with_capacity(samples.len() / n.max(1));
    let mut components = ColorComponents::new();

    for pixel in samples.chunks_exact(n.max(1)) {
        components.clear();
        components.extend(
            pixel
                .iter()
                .zip(&decode)
                .map(|(s, (d_min, d_max))| d_min + f32::from(*s) * (d_max - d_min) / max),
        );

        let rgb = color_space.to_rgb(&components).ok_or_else(|| {
            Error::ImageDecode(format!(
                "failed to convert {} pixel to RGB",
                color_space.family_name()
            ))
        })?;

        pixels.push(rgb);
    }

    Ok(pixels)
}

fn decode_ranges(image: &ImageXObject, cs: &ColorSpace, bpc: u8) -> SmallVec<[(f32, f32); 4]> {
    match image.decode.as_deref() {
        Some(decode) if decode.len() == cs.num_components() * 2 => {
            decode.chunks_exact(2).map(|d| (d[0], d[1])).collect()
        }
        Some(_) => {
            warn!("decode array doesn't match the color space, ignoring it");

            cs.default_decode(bpc)
        }
        None => cs.default_decode(bpc),
    }
}

/// Build an 8-bit grayscale image from RGB pixels.
pub(crate) fn gray_image(pixels: &[[f32; 3]], width: u32, height: u32) -> RawImage {
    let samples = pixels
        .iter()
        .map(|rgb| (rgb_to_gray(*rgb).clamp(0.0, 1.0) * 255.0).round() as u8)
        .collect();

    RawImage {
        width,
        height,
        components: 1,
        bits_per_component: 8,
        samples,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::is_rgb_colored;

    fn rgb_image(samples: Vec<u8>, width: u32) -> ImageXObject {
        let height = (samples.len() / 3) as u32 / width;
        ImageXObject::new(width, height, ColorSpace::device_rgb(), 8, samples)
    }

    #[test]
    fn decode_unfiltered() {
        let image = rgb_image(vec![255, 0, 0, 10, 10, 10], 2);
        let raw = DefaultCodec.decode(&image).unwrap();

        assert_eq!(raw.components, 3);
        assert_eq!(raw.row_len(), 6);

        let pixels = rgb_pixels(&image, &raw).unwrap();
        assert_eq!(pixels.len(), 2);
        assert!(is_rgb_colored(pixels[0]));
        assert!(!is_rgb_colored(pixels[1]));
    }

    #[test]
    fn decode_through_filters() {
        let image = rgb_image(vec![], 1)
            .with_filter(Filter::AsciiHexDecode, None);
        let image = ImageXObject {
            height: 1,
            data: b"0000FF>".to_vec(),
            ..image
        };

        let raw = DefaultCodec.decode(&image).unwrap();
        assert_eq!(raw.samples, [0, 0, 255]);
    }

    #[test]
    fn pads_short_data() {
        let image = rgb_image(vec![1, 2, 3], 1);
        let image = ImageXObject { height: 2, ..image };

        let raw = DefaultCodec.decode(&image).unwrap();
        assert_eq!(raw.samples, [1, 2, 3, 0, 0, 0]);
    }

    #[test]
    fn rejects_dimensions_larger_than_the_data() {
        let image = rgb_image(vec![1, 2, 3], 1);
        let image = ImageXObject {
            width: 100_000,
            height: 100_000,
            ..image
        };

        assert!(matches!(DefaultCodec.decode(&image), Err(Error::ImageDecode(_))));

        let image = ImageXObject {
            width: u32::MAX,
            height: u32::MAX,
            ..rgb_image(vec![1, 2, 3], 1)
        };
        assert!(matches!(DefaultCodec.decode(&image), Err(Error::ImageDecode(_))));
    }

    #[test]
    fn unpack_low_bit_depths() {
        // Two rows of three 2-bit samples, each row padded to a full byte.
        let raw = RawImage {
            width: 3,
            height: 2,
            components: 1,
            bits_per_component: 2,
            samples: vec![0b0001_1000, 0b1110_0100],
        };

        assert_eq!(unpack(&raw), [0, 1, 2, 3, 2, 1]);
    }

    #[test]
    fn unpack_16_bit() {
        let raw = RawImage {
            width: 1,
            height: 1,
            components: 1,
            bits_per_component: 16,
            samples: vec![0x12, 0x34],
        };

        assert_eq!(unpack(&raw), [0x1234]);
    }

    #[test]
    fn decode_array_inverts() {
        let mut image = ImageXObject::new(2, 1, ColorSpace::device_gray(), 1, vec![0b1000_0000]);
        image.decode = Some(vec![1.0, 0.0]);

        let raw = DefaultCodec.decode(&image).unwrap();
        let pixels = rgb_pixels(&image, &raw).unwrap();

        assert_eq!(pixels, [[0.0; 3], [1.0; 3]]);
    }

    #[test]
    fn indexed_pixels() {
        let cs = ColorSpace::indexed(ColorSpace::device_rgb(), 1, vec![0, 0, 0, 0, 0, 255]).unwrap();
        let image = ImageXObject::new(2, 1, cs, 8, vec![0, 1]);

        let raw = DefaultCodec.decode(&image).unwrap();
        let pixels = rgb_pixels(&image, &raw).unwrap();

        assert_eq!(pixels, [[0.0, 0.0, 0.0], [0.0, 0.0, 1.0]]);
    }

    #[test]
    fn component_mismatch() {
        let image = rgb_image(vec![0, 0, 0], 1);
        let raw = RawImage {
            components: 1,
            ..DefaultCodec.decode(&image).unwrap()
        };

        assert!(matches!(rgb_pixels(&image, &raw), Err(Error::ImageDecode(_))));
    }

    #[test]
    fn to_gray() {
        let gray = gray_image(&[[1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0; 3]], 3, 1);

        assert_eq!(gray.samples, [77, 28, 255]);
        assert_eq!(gray.layout().components, 1);
    }

    #[test]
    fn encode_unfiltered_and_flate() {
        let gray = gray_image(&[[0.5; 3]; 4], 2, 2);

        assert_eq!(DefaultCodec.encode(&gray, None).unwrap(), gray.samples);

        let encoded = DefaultCodec.encode(&gray, Some(Filter::FlateDecode)).unwrap();
        let decoded = Filter::FlateDecode.decode(&encoded, None).unwrap();
        assert_eq!(decoded, gray.samples);

        assert_eq!(
            DefaultCodec.encode(&gray, Some(Filter::Ascii85Decode)),
            Err(Error::UnsupportedEncodingParameters)
        );
    }
}
