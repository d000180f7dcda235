use std::io::{self, Read};

use lincode::{NdArray, Tensor};
use log::debug;

/// Splits a character stream into fixed-length blocks of bits
///
/// Only the characters `0` and `1` count, everything else (newlines, spaces, separators)
/// is skipped. An incomplete block at the end of the stream is dropped.
pub struct Blocks<R> {
    bytes: io::Bytes<R>,
    len: usize,
}

impl<R: Read> Blocks<R> {
    pub fn new(reader: R, len: usize) -> Self {
        Blocks {
            bytes: reader.bytes(),
            len,
        }
    }
}

impl<R: Read> Iterator for Blocks<R> {
    type Item = io::Result<Tensor<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }
        let mut bits = Vec::with_capacity(self.len);
        while bits.len() < self.len {
            match self.bytes.next() {
                Some(Ok(b'0')) => bits.push(0),
                Some(Ok(b'1')) => bits.push(1),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Some(Err(e)),
                None => {
                    if !bits.is_empty() {
                        debug!(
                            "dropping incomplete block of {} bits, expected {}",
                            bits.len(),
                            self.len
                        );
                    }
                    return None;
                }
            }
        }
        Some(Ok(Tensor::vector(bits)))
    }
}

/// Renders a bit vector as a string of `0` and `1`
pub fn bit_string<A: NdArray<Elem = u8>>(bits: &A) -> String {
    bits.iter()
        .map(|b| if b & 1 == 1 { '1' } else { '0' })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn skips_noise_and_chunks() {
        let input = "10 1\n1x0 0\r\n1 1";
        let blocks: Vec<String> = Blocks::new(input.as_bytes(), 3)
            .map(|b| bit_string(&b.unwrap()))
            .collect();
        assert_eq!(blocks, vec!["101", "100"]);
    }

    #[test]
    fn incomplete_tail_is_dropped() {
        let blocks: Vec<_> = Blocks::new("1010110".as_bytes(), 4).collect();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].as_ref().unwrap().as_slice(), &[1, 0, 1, 0]);
    }

    #[test]
    fn empty_blocks_end_immediately() {
        assert_eq!(Blocks::new("0101".as_bytes(), 0).count(), 0);
    }
}
