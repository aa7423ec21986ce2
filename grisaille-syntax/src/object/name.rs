use crate::error::{ErrorKind, Result};
use crate::reader::{Reader, hex_digit, is_regular};
use smallvec::SmallVec;
use std::borrow::Borrow;
use std::fmt;

/// A name object, stored in its decoded form (`#xx` escapes resolved).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(SmallVec<[u8; 16]>);

impl Name {
    /// Create a new name from its decoded bytes.
    pub fn new(data: impl AsRef<[u8]>) -> Self {
        Self(SmallVec::from_slice(data.as_ref()))
    }

    /// The decoded bytes of the name.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The name as a string, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.0).ok()
    }

    pub(crate) fn write(&self, out: &mut Vec<u8>) {
        const HEX: &[u8; 16] = b"0123456789ABCDEF";

        out.push(b'/');

        for &b in self.0.iter() {
            if b == b'#' || !(0x21..=0x7e).contains(&b) || !is_regular(b) {
                out.extend_from_slice(&[b'#', HEX[(b >> 4) as usize], HEX[(b & 0xf) as usize]]);
            } else {
                out.push(b);
            }
        }
    }
}

impl Borrow<[u8]> for Name {
    fn borrow(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        self.0.as_slice() == other.as_bytes()
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        self.0.as_slice() == other.as_bytes()
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

pub(crate) fn read(r: &mut Reader<'_>) -> Result<Name> {
    r.forward_tag(b"/")
        .ok_or_else(|| r.error(ErrorKind::InvalidName))?;

    let start = r.offset();
    let raw = r.read_regular();

    if !raw.contains(&b'#') {
        return Ok(Name::new(raw));
    }

    let mut decoded = SmallVec::<[u8; 16]>::new();
    let mut bytes = raw.iter().copied().enumerate();

    while let Some((i, b)) = bytes.next() {
        if b == b'#' {
            let invalid = || crate::error::Error::new(ErrorKind::InvalidName, start + i);
            let hi = bytes.next().and_then(|(_, b)| hex_digit(b)).ok_or_else(invalid)?;
            let lo = bytes.next().and_then(|(_, b)| hex_digit(b)).ok_or_else(invalid)?;
            decoded.push(hi << 4 | lo);
        } else {
            decoded.push(b);
        }
    }

    Ok(Name(decoded))
}
