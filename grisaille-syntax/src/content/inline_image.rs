use crate::error::{Error, ErrorKind, Result};
use crate::object::{self, Dict};
use crate::reader::{Reader, is_delimiter, is_whitespace};
use log::warn;
use memchr::memmem;

/// An inline image, consisting of its dictionary and its (still encoded) data.
///
/// The dictionary is kept as written, so abbreviated keys such as `/W` or `/CS`
/// are not expanded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InlineImage {
    /// The image dictionary.
    pub dict: Dict,
    /// The image data between `ID` and `EI`.
    pub data: Vec<u8>,
}

impl InlineImage {
    /// Create a new inline image.
    pub fn new(dict: Dict, data: Vec<u8>) -> Self {
        Self { dict, data }
    }

    /// Write the image, including the `BI`, `ID` and `EI` keywords.
    pub fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(b"BI ");

        if !self.dict.is_empty() {
            self.dict.write_entries(out);
            out.push(b' ');
        }

        out.extend_from_slice(b"ID ");
        out.extend_from_slice(&self.data);
        out.extend_from_slice(b"\nEI");
    }
}

/// Read an inline image. The reader is positioned right after `BI`.
pub(crate) fn read(r: &mut Reader<'_>) -> Result<InlineImage> {
    let dict = read_dict(r)?;

    // Exactly one whitespace byte separates `ID` from the data.
    r.forward();
    let data_start = r.offset();

    if let Some(len) = explicit_length(&dict) {
        if let Some(data) = read_with_length(r, len) {
            return Ok(InlineImage::new(dict, data));
        }

        warn!("inline image length doesn't match its data, searching for EI instead");
        r.jump(data_start);
    }

    let data = read_until_end_marker(r, data_start)?;

    Ok(InlineImage::new(dict, data))
}

fn read_dict(r: &mut Reader<'_>) -> Result<Dict> {
    let mut dict = Dict::new();

    loop {
        r.skip_whitespace_and_comments();

        match r.peek_byte() {
            None => return Err(r.error(ErrorKind::MissingImageData)),
            Some(b'/') => {
                let key = object::read(r)?;
                let value = object::read(r)?;

                if let Some(key) = key.as_name() {
                    dict.insert(key.clone(), value);
                }
            }
            Some(_) => {
                let start = r.offset();

                if r.read_regular() == b"ID" {
                    return Ok(dict);
                }

                return Err(Error::new(ErrorKind::MissingImageData, start));
            }
        }
    }
}

fn explicit_length(dict: &Dict) -> Option<usize> {
    let len = dict.get_any(&["L", "Length"])?.as_number()?.as_i32();
    usize::try_from(len).ok()
}

fn read_with_length(r: &mut Reader<'_>, len: usize) -> Option<Vec<u8>> {
    let data = r.read_bytes(len)?.to_vec();
    r.skip_whitespace_and_comments();
    r.forward_tag(b"EI")?;

    Some(data)
}

fn read_until_end_marker(r: &mut Reader<'_>, data_start: usize) -> Result<Vec<u8>> {
    let tail = r.tail();
    let finder = memmem::Finder::new(b"EI");

    for pos in finder.find_iter(tail) {
        // The byte in front of `EI` may be the one that terminated `ID`.
        let before = data_start
            .checked_add(pos)
            .and_then(|p| p.checked_sub(1))
            .and_then(|p| r.range(p..p + 1))
            .and_then(|b| b.first().copied());
        let after = tail.get(pos + 2).copied();

        let valid_before = before.is_some_and(is_whitespace);
        let valid_after = after.is_none_or(|b| is_whitespace(b) || is_delimiter(b));

        if valid_before && valid_after {
            // The whitespace in front of `EI` is not part of the data.
            let data = tail[..pos.saturating_sub(1)].to_vec();
            r.jump(data_start + pos + 2);

            return Ok(data);
        }
    }

    Err(Error::new(ErrorKind::MissingEndImage, data_start))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Name, Number, Object};

    fn read_str(input: &[u8]) -> Result<InlineImage> {
        let mut r = Reader::new(input);
        read(&mut r)
    }

    #[test]
    fn simple() {
        let image = read_str(b" /W 2 /H 1 /BPC 8 /CS /RGB /F [/AHx] ID 0000FF00FF00>\nEI Q").unwrap();

        assert_eq!(image.dict.get("W"), Some(&Object::Number(Number::Integer(2))));
        assert_eq!(image.dict.get("CS"), Some(&Object::Name(Name::new("RGB"))));
        assert_eq!(image.data, b"0000FF00FF00>");
    }

    #[test]
    fn ei_inside_data() {
        let image = read_str(b" /W 4 /H 1 /CS /G /BPC 8 ID xEIy EI").unwrap();
        assert_eq!(image.data, b"xEIy");
    }

    #[test]
    fn explicit_length() {
        let image = read_str(b" /W 3 /H 1 /CS /G /BPC 8 /L 3 ID a E\nEI").unwrap();
        assert_eq!(image.data, b"a E");
    }

    #[test]
    fn empty_data() {
        let image = read_str(b" /W 0 /H 0 ID EI").unwrap();
        assert!(image.data.is_empty());
    }

    #[test]
    fn missing_id() {
        let err = read_str(b" /W 1 /H 1 EI").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingImageData);
    }

    #[test]
    fn missing_ei() {
        let err = read_str(b" /W 1 /H 1 ID abc").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingEndImage);
    }

    #[test]
    fn write() {
        let image = read_str(b"/W 1 /H 1 /CS /G /BPC 8 ID \x7f EI").unwrap();
        let mut out = vec![];
        image.write(&mut out);

        assert_eq!(out, b"BI /W 1 /H 1 /CS /G /BPC 8 ID \x7f\nEI");
    }
}
