use crate::reader::{hex_digit, is_whitespace};

pub(crate) fn decode(data: &[u8]) -> Option<Vec<u8>> {
    let mut decoded = Vec::with_capacity(data.len() / 2);
    let mut high = None;

    // We are lenient and don't require a `>` at the end.
    for &b in data {
        if b == b'>' {
            break;
        }

        if is_whitespace(b) {
            continue;
        }

        let digit = hex_digit(b)?;

        match high.take() {
            Some(h) => decoded.push(h << 4 | digit),
            None => high = Some(digit),
        }
    }

    // In case the number of digits is odd, pad with 0.
    if let Some(h) = high {
        decoded.push(h << 4);
    }

    Some(decoded)
}

pub(crate) fn encode(data: &[u8]) -> Vec<u8> {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";

    let mut encoded = Vec::with_capacity(data.len() * 2 + 1);

    for &b in data {
        encoded.push(HEX[(b >> 4) as usize]);
        encoded.push(HEX[(b & 0xf) as usize]);
    }

    encoded.push(b'>');
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_simple() {
        assert_eq!(decode(b"AF3E2901>").unwrap(), [0xaf, 0x3e, 0x29, 0x01]);
    }

    #[test]
    fn decode_whitespaces() {
        assert_eq!(decode(b"AF3   E2 \n 901>").unwrap(), [0xaf, 0x3e, 0x29, 0x01]);
    }

    #[test]
    fn decode_with_padding() {
        assert_eq!(decode(b"AF3E291>").unwrap(), [0xaf, 0x3e, 0x29, 0x10]);
    }

    #[test]
    fn decode_invalid() {
        assert!(decode(b"AFXX>").is_none());
    }

    #[test]
    fn encode_simple() {
        assert_eq!(encode(&[0x00, 0x7f, 0xff]), b"007FFF>");
    }
}
