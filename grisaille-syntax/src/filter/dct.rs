use crate::filter::{Filter, FilterError, ImageLayout};

#[cfg(feature = "images")]
pub(crate) fn decode(data: &[u8]) -> Result<Vec<u8>, FilterError> {
    use std::io::Cursor;
    use zune_jpeg::zune_core::colorspace::ColorSpace;
    use zune_jpeg::zune_core::options::DecoderOptions;

    let corrupt = |_| FilterError::Corrupt(Filter::DctDecode);

    let options = DecoderOptions::default()
        .set_max_width(u16::MAX as usize)
        .set_max_height(u16::MAX as usize);
    let mut decoder = zune_jpeg::JpegDecoder::new_with_options(Cursor::new(data), options);
    decoder.decode_headers().map_err(corrupt)?;

    // Keep the number of components of the image, the color space of the
    // image XObject decides how they are interpreted.
    let out_colorspace = match decoder.input_colorspace() {
        Some(ColorSpace::Luma | ColorSpace::LumaA) => ColorSpace::Luma,
        Some(ColorSpace::CMYK | ColorSpace::YCCK) => ColorSpace::CMYK,
        _ => ColorSpace::RGB,
    };

    decoder.set_options(options.jpeg_set_out_colorspace(out_colorspace));
    decoder.decode().map_err(corrupt)
}

#[cfg(not(feature = "images"))]
pub(crate) fn decode(_: &[u8]) -> Result<Vec<u8>, FilterError> {
    Err(FilterError::Unsupported(Filter::DctDecode))
}

#[cfg(feature = "images")]
pub(crate) fn encode(data: &[u8], layout: &ImageLayout) -> Result<Vec<u8>, FilterError> {
    use image::ExtendedColorType;
    use image::codecs::jpeg::JpegEncoder;

    const QUALITY: u8 = 85;

    let color_type = match (layout.components, layout.bits_per_component) {
        (1, 8) => ExtendedColorType::L8,
        (3, 8) => ExtendedColorType::Rgb8,
        _ => return Err(FilterError::UnsupportedEncodingParameters(Filter::DctDecode)),
    };

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, QUALITY)
        .encode(data, layout.width, layout.height, color_type)
        .map_err(|_| FilterError::Corrupt(Filter::DctDecode))?;

    Ok(out)
}

#[cfg(not(feature = "images"))]
pub(crate) fn encode(_: &[u8], _: &ImageLayout) -> Result<Vec<u8>, FilterError> {
    Err(FilterError::UnsupportedEncodingParameters(Filter::DctDecode))
}
