use crate::object::Dict;
use flate2::Compression;
use flate2::read::{DeflateDecoder, ZlibDecoder};
use flate2::write::ZlibEncoder;
use log::warn;
use std::io::{Read, Write};

const COMPRESSION_LEVEL: u32 = 6;

struct PredictorParams {
    predictor: u8,
    colors: u8,
    bits_per_component: u8,
    columns: usize,
}

impl PredictorParams {
    fn from_params(dict: &Dict) -> Self {
        let get = |key: &str, default: i32| {
            dict.get(key)
                .and_then(|o| o.as_number())
                .map(|n| n.as_i32())
                .unwrap_or(default)
        };

        Self {
            predictor: u8::try_from(get("Predictor", 1)).unwrap_or(1),
            colors: u8::try_from(get("Colors", 1)).unwrap_or(1),
            bits_per_component: u8::try_from(get("BitsPerComponent", 8)).unwrap_or(8),
            columns: usize::try_from(get("Columns", 1)).unwrap_or(1),
        }
    }

    fn bytes_per_pixel(&self) -> usize {
        (usize::from(self.bits_per_component) * usize::from(self.colors)).div_ceil(8)
    }

    fn row_length_in_bytes(&self) -> usize {
        (self.columns * usize::from(self.colors) * usize::from(self.bits_per_component))
            .div_ceil(8)
    }
}

impl Default for PredictorParams {
    fn default() -> Self {
        Self {
            predictor: 1,
            colors: 1,
            bits_per_component: 8,
            columns: 1,
        }
    }
}

pub(crate) fn decode(data: &[u8], params: Option<&Dict>) -> Option<Vec<u8>> {
    let decoded = zlib(data).or_else(|| deflate(data))?;
    let params = params.map(PredictorParams::from_params).unwrap_or_default();

    apply_predictor(decoded, &params)
}

pub(crate) fn encode(data: &[u8]) -> Option<Vec<u8>> {
    let mut e = ZlibEncoder::new(Vec::new(), Compression::new(COMPRESSION_LEVEL));
    e.write_all(data).ok()?;
    e.finish().ok()
}

fn zlib(data: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    ZlibDecoder::new(data).read_to_end(&mut out).ok()?;
    Some(out)
}

fn deflate(data: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    DeflateDecoder::new(data).read_to_end(&mut out).ok()?;
    Some(out)
}

fn apply_predictor(data: Vec<u8>, params: &PredictorParams) -> Option<Vec<u8>> {
    match params.predictor {
        1 => Some(data),
        2 => apply_tiff_predictor(data, params),
        10..=15 => apply_png_predictor(&data, params),
        other => {
            warn!("unknown predictor {other}");
            None
        }
    }
}

fn apply_tiff_predictor(mut data: Vec<u8>, params: &PredictorParams) -> Option<Vec<u8>> {
    if params.bits_per_component != 8 {
        warn!(
            "TIFF predictor with {} bits per component is not supported",
            params.bits_per_component
        );
        return None;
    }

    let row_len = params.row_length_in_bytes();
    let colors = usize::from(params.colors);

    if row_len == 0 {
        return None;
    }

    for row in data.chunks_mut(row_len) {
        for i in colors..row.len() {
            row[i] = row[i].wrapping_add(row[i - colors]);
        }
    }

    Some(data)
}

fn apply_png_predictor(data: &[u8], params: &PredictorParams) -> Option<Vec<u8>> {
    let row_len = params.row_length_in_bytes();
    let bpp = params.bytes_per_pixel();

    // Each row starts with the predictor that is used for it.
    let num_rows = data.len().div_ceil(row_len + 1);
    let mut out = vec![0; num_rows * row_len];

    for (i, row) in data.chunks(row_len + 1).enumerate() {
        let (&predictor, input) = row.split_first()?;

        let (prev_rows, rest) = out.split_at_mut(i * row_len);
        let prev = prev_rows.get(prev_rows.len().saturating_sub(row_len)..).filter(|_| i > 0);
        let cur = &mut rest[..row_len];

        for j in 0..row_len {
            let raw = input.get(j).copied().unwrap_or(0);
            let left = if j >= bpp { cur[j - bpp] } else { 0 };
            let up = prev.map(|p| p[j]).unwrap_or(0);
            let up_left = if j >= bpp {
                prev.map(|p| p[j - bpp]).unwrap_or(0)
            } else {
                0
            };

            cur[j] = match predictor {
                0 => raw,
                1 => raw.wrapping_add(left),
                2 => raw.wrapping_add(up),
                3 => raw.wrapping_add(((u16::from(left) + u16::from(up)) / 2) as u8),
                4 => raw.wrapping_add(paeth(left, up, up_left)),
                other => {
                    warn!("unknown PNG predictor {other}");
                    return None;
                }
            };
        }
    }

    Some(out)
}

fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let p = i16::from(a) + i16::from(b) - i16::from(c);
    let pa = (p - i16::from(a)).abs();
    let pb = (p - i16::from(b)).abs();
    let pc = (p - i16::from(c)).abs();

    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Object;

    fn params(predictor: i32, colors: i32, columns: i32) -> Dict {
        let mut dict = Dict::new();
        dict.insert("Predictor", Object::from(predictor));
        dict.insert("Colors", Object::from(colors));
        dict.insert("Columns", Object::from(columns));
        dict
    }

    #[test]
    fn encode_then_decode() {
        let data = b"grisaille grisaille grisaille".to_vec();
        let encoded = encode(&data).unwrap();

        assert_ne!(encoded, data);
        assert_eq!(decode(&encoded, None).unwrap(), data);
    }

    #[test]
    fn raw_deflate_fallback() {
        let mut e = flate2::write::DeflateEncoder::new(Vec::new(), Compression::default());
        e.write_all(b"abc").unwrap();
        let encoded = e.finish().unwrap();

        assert_eq!(decode(&encoded, None).unwrap(), b"abc");
    }

    #[test]
    fn png_up_predictor() {
        let raw = [2, 1, 2, 3, 2, 1, 1, 1];
        let encoded = encode(&raw).unwrap();
        let decoded = decode(&encoded, Some(&params(12, 1, 3))).unwrap();

        assert_eq!(decoded, [1, 2, 3, 2, 3, 4]);
    }

    #[test]
    fn png_sub_and_paeth_predictor() {
        let raw = [1, 10, 5, 5, 4, 0, 0, 0];
        let encoded = encode(&raw).unwrap();
        let decoded = decode(&encoded, Some(&params(15, 1, 3))).unwrap();

        assert_eq!(decoded, [10, 15, 20, 10, 15, 20]);
    }

    #[test]
    fn tiff_predictor() {
        let raw = [10, 20, 1, 1];
        let encoded = encode(&raw).unwrap();
        let decoded = decode(&encoded, Some(&params(2, 2, 2))).unwrap();

        assert_eq!(decoded, [10, 20, 11, 21]);
    }
}
