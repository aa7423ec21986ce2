use crate::reader::is_whitespace;

pub(crate) fn decode(data: &[u8]) -> Option<Vec<u8>> {
    let data = data.strip_prefix(b"<~").unwrap_or(data);
    let mut decoded = Vec::with_capacity(data.len() * 4 / 5);
    let mut group = [0_u8; 5];
    let mut len = 0;
    let mut terminated = false;

    for &b in data {
        match b {
            b'~' => {
                terminated = true;
                break;
            }
            b if is_whitespace(b) => {}
            b'z' if len == 0 => decoded.extend_from_slice(&[0; 4]),
            b'!'..=b'u' => {
                group[len] = b - b'!';
                len += 1;

                if len == 5 {
                    decoded.extend_from_slice(&word(group)?);
                    len = 0;
                }
            }
            _ => return None,
        }
    }

    if !terminated {
        log::warn!("ASCII85 data is missing its end-of-data marker");
    }

    // A partial group is padded with the highest digit and truncated afterwards.
    match len {
        0 => {}
        1 => return None,
        _ => {
            group[len..].fill(b'u' - b'!');
            decoded.extend_from_slice(&word(group)?[..len - 1]);
        }
    }

    Some(decoded)
}

fn word(digits: [u8; 5]) -> Option<[u8; 4]> {
    let value = digits
        .iter()
        .fold(0_u64, |acc, &d| acc * 85 + u64::from(d));

    // 85^5 > 256^4, so not every group is valid.
    u32::try_from(value).ok().map(u32::to_be_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_simple() {
        assert_eq!(decode(b"87cURDZ~>").unwrap(), b"Hello");
    }

    #[test]
    fn decode_spaces_and_prefix() {
        assert_eq!(decode(b"<~87  cURD\n Z~>").unwrap(), b"Hello");
    }

    #[test]
    fn decode_zeros() {
        assert_eq!(decode(b"z~>").unwrap(), [0, 0, 0, 0]);
    }

    #[test]
    fn decode_invalid() {
        assert!(decode(b"87cU{~>").is_none());
        assert!(decode(b"s8W-\"~>").is_none());
    }
}
