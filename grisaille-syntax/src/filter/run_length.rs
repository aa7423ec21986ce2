use crate::reader::Reader;
use log::warn;

const EOD: u8 = 128;
const MAX_RUN: usize = 128;

pub(crate) fn decode(data: &[u8]) -> Option<Vec<u8>> {
    let mut reader = Reader::new(data);
    let mut decoded = vec![];

    if decode_inner(&mut reader, &mut decoded).is_none() {
        warn!("run-length data ended prematurely");
    }

    Some(decoded)
}

fn decode_inner(reader: &mut Reader<'_>, decoded: &mut Vec<u8>) -> Option<()> {
    loop {
        let length = reader.read_byte()?;

        match length {
            EOD => return Some(()),
            0..=127 => decoded.extend_from_slice(reader.read_bytes(length as usize + 1)?),
            _ => {
                let length = 257 - length as usize;
                let byte = reader.read_byte()?;
                decoded.extend(core::iter::repeat_n(byte, length));
            }
        }
    }
}

pub(crate) fn encode(data: &[u8]) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(data.len() + data.len() / MAX_RUN + 2);
    let mut literal_start = 0;
    let mut i = 0;

    let flush_literal = |encoded: &mut Vec<u8>, literal: &[u8]| {
        for chunk in literal.chunks(MAX_RUN) {
            encoded.push((chunk.len() - 1) as u8);
            encoded.extend_from_slice(chunk);
        }
    };

    while i < data.len() {
        let byte = data[i];
        let run = data[i..]
            .iter()
            .take(MAX_RUN)
            .take_while(|&&b| b == byte)
            .count();

        // Runs of two are cheaper to keep in a literal.
        if run >= 3 {
            flush_literal(&mut encoded, &data[literal_start..i]);
            encoded.push((257 - run) as u8);
            encoded.push(byte);

            i += run;
            literal_start = i;
        } else {
            i += run;
        }
    }

    flush_literal(&mut encoded, &data[literal_start..]);
    encoded.push(EOD);

    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_length() {
        let input = [4, 10, 11, 12, 13, 14, 253, 3, 128];
        assert_eq!(decode(&input).unwrap(), [10, 11, 12, 13, 14, 3, 3, 3, 3]);
    }

    #[test]
    fn premature_end() {
        assert_eq!(decode(&[1, 7]).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn encode_runs_and_literals() {
        let data = [1, 2, 2, 5, 5, 5, 5, 9];
        let encoded = encode(&data);

        assert_eq!(encoded, [2, 1, 2, 2, 253, 5, 0, 9, 128]);
        assert_eq!(decode(&encoded).unwrap(), data);
    }

    #[test]
    fn encode_long_run() {
        let data = vec![7; 300];
        let encoded = encode(&data);

        assert_eq!(encoded, [129, 7, 129, 7, 213, 7, 128]);
        assert_eq!(decode(&encoded).unwrap(), data);
    }
}
