use crate::error::{Error, ErrorKind, Result};
use crate::object::{Name, Object, name, read as read_object};
use crate::reader::Reader;

/// A dictionary that keeps its entries in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dict {
    entries: Vec<(Name, Object)>,
}

impl Dict {
    /// Create a new, empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value stored under `key`.
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<&Object> {
        let key = key.as_ref();
        self.entries
            .iter()
            .find(|(k, _)| k.as_bytes() == key)
            .map(|(_, v)| v)
    }

    /// Get the value of the first key in `keys` that is present.
    ///
    /// Useful for inline image dictionaries, where each key has a full and an
    /// abbreviated form.
    pub fn get_any(&self, keys: &[&str]) -> Option<&Object> {
        keys.iter().find_map(|k| self.get(k))
    }

    /// Insert an entry, replacing the value of an existing entry with the same key.
    pub fn insert(&mut self, key: impl Into<Name>, value: impl Into<Object>) {
        let key = key.into();
        let value = value.into();

        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Remove the entry stored under `key`.
    pub fn remove(&mut self, key: impl AsRef<[u8]>) -> Option<Object> {
        let key = key.as_ref();
        let idx = self.entries.iter().position(|(k, _)| k.as_bytes() == key)?;
        Some(self.entries.remove(idx).1)
    }

    /// Iterate over the entries.
    pub fn iter(&self) -> impl Iterator<Item = (&Name, &Object)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// The number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the dictionary has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn write_entries(&self, out: &mut Vec<u8>) {
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                out.push(b' ');
            }

            key.write(out);
            out.push(b' ');
            value.write(out);
        }
    }

    pub(crate) fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(b"<<");
        self.write_entries(out);
        out.extend_from_slice(b">>");
    }
}

impl FromIterator<(Name, Object)> for Dict {
    fn from_iter<T: IntoIterator<Item = (Name, Object)>>(iter: T) -> Self {
        let mut dict = Self::new();

        for (k, v) in iter {
            dict.insert(k, v);
        }

        dict
    }
}

pub(crate) fn read(r: &mut Reader<'_>) -> Result<Dict> {
    let start = r.offset();
    r.forward_tag(b"<<")
        .ok_or_else(|| r.error(ErrorKind::UnexpectedDelimiter))?;

    let mut dict = Dict::new();

    loop {
        r.skip_whitespace_and_comments();

        match r.peek_byte() {
            None => return Err(Error::new(ErrorKind::UnexpectedEof, start)),
            Some(b'>') => {
                r.forward_tag(b">>")
                    .ok_or_else(|| r.error(ErrorKind::UnexpectedDelimiter))?;
                return Ok(dict);
            }
            Some(b'/') => {
                let key = name::read(r)?;
                r.skip_whitespace_and_comments();

                if r.peek_byte() == Some(b'>') {
                    return Err(r.error(ErrorKind::UnexpectedDelimiter));
                }

                let value = read_object(r)?;
                dict.insert(key, value);
            }
            Some(_) => return Err(r.error(ErrorKind::InvalidDictKey)),
        }
    }
}
