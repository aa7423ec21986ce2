use crate::error::{ErrorKind, Result};
use crate::reader::{Reader, hex_digit, is_whitespace};

pub(crate) fn read_literal(r: &mut Reader<'_>) -> Result<Vec<u8>> {
    let start = r.offset();
    let unterminated = || crate::error::Error::new(ErrorKind::UnterminatedString, start);

    r.forward_tag(b"(").ok_or_else(unterminated)?;

    let mut out = Vec::new();
    let mut depth = 1_u32;

    loop {
        let b = r.read_byte().ok_or_else(unterminated)?;

        match b {
            b'\\' => {
                let escaped = r.read_byte().ok_or_else(unterminated)?;

                match escaped {
                    b'n' => out.push(b'\n'),
                    b'r' => out.push(b'\r'),
                    b't' => out.push(b'\t'),
                    b'b' => out.push(0x08),
                    b'f' => out.push(0x0c),
                    b'0'..=b'7' => {
                        let mut value = u32::from(escaped - b'0');

                        for _ in 0..2 {
                            match r.peek_byte() {
                                Some(d @ b'0'..=b'7') => {
                                    r.forward();
                                    value = value * 8 + u32::from(d - b'0');
                                }
                                _ => break,
                            }
                        }

                        // High-order overflow is ignored.
                        out.push(value as u8);
                    }
                    // A backslash at the end of a line continues the string.
                    b'\r' => {
                        r.forward_tag(b"\n");
                    }
                    b'\n' => {}
                    // `\(`, `\)`, `\\` and unknown escapes produce the character itself.
                    other => out.push(other),
                }
            }
            b'(' => {
                depth += 1;
                out.push(b);
            }
            b')' => {
                depth -= 1;

                if depth == 0 {
                    return Ok(out);
                }

                out.push(b);
            }
            b'\r' => {
                // End-of-line markers are normalized to a single line feed.
                r.forward_tag(b"\n");
                out.push(b'\n');
            }
            _ => out.push(b),
        }
    }
}

pub(crate) fn read_hex(r: &mut Reader<'_>) -> Result<Vec<u8>> {
    let start = r.offset();
    let unterminated = || crate::error::Error::new(ErrorKind::UnterminatedString, start);

    r.forward_tag(b"<").ok_or_else(unterminated)?;

    let mut out = Vec::new();
    let mut high = None;

    loop {
        let b = r.read_byte().ok_or_else(unterminated)?;

        if b == b'>' {
            break;
        }

        if is_whitespace(b) {
            continue;
        }

        let digit = hex_digit(b).ok_or_else(|| r.error(ErrorKind::UnterminatedString))?;

        match high.take() {
            Some(h) => out.push(h << 4 | digit),
            None => high = Some(digit),
        }
    }

    // An odd number of digits behaves as if a final 0 followed.
    if let Some(h) = high {
        out.push(h << 4);
    }

    Ok(out)
}

pub(crate) fn write_literal(data: &[u8], out: &mut Vec<u8>) {
    out.push(b'(');

    for &b in data {
        match b {
            b'(' | b')' | b'\\' => out.extend_from_slice(&[b'\\', b]),
            b'\n' => out.extend_from_slice(b"\\n"),
            b'\r' => out.extend_from_slice(b"\\r"),
            b'\t' => out.extend_from_slice(b"\\t"),
            0x20..=0x7e => out.push(b),
            _ => out.extend_from_slice(format!("\\{b:03o}").as_bytes()),
        }
    }

    out.push(b')');
}
