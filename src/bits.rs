//! Bit packing against a code table and bit unpacking against a tree.
//!
//! Bits are written most significant first. The final byte is zero-padded
//! and the number of padding bits travels alongside the bytes so the
//! decoder can stop exactly at the last payload bit.

use std::ptr;

use tracing::debug;

use crate::error::{try_reserve, Error, Result};
use crate::huffman::{CodeTable, HuffmanTree, Node};

/// A byte-aligned bit stream plus the count of trailing padding bits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackedBits {
    /// Packed bytes, MSB-first.
    pub bytes: Vec<u8>,
    /// Zero bits appended to the final byte, in `0..=7`.
    pub padding: u8,
}

impl PackedBits {
    /// Number of payload bits, excluding padding.
    pub fn bit_len(&self) -> usize {
        (self.bytes.len() * 8).saturating_sub(self.padding as usize)
    }
}

/// Appends bits into a growing byte buffer.
#[derive(Debug, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    bit_count: usize,
}

impl BitWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer whose buffer already holds room for `bits` bits.
    pub fn with_bit_capacity(bits: usize) -> Result<Self> {
        let mut bytes = Vec::new();
        try_reserve(&mut bytes, bits.div_ceil(8))?;
        Ok(Self {
            bytes,
            bit_count: 0,
        })
    }

    /// Append a single bit.
    pub fn push_bit(&mut self, bit: bool) {
        let byte_index = self.bit_count / 8;
        let bit_offset = self.bit_count % 8;

        if byte_index >= self.bytes.len() {
            self.bytes.push(0);
        }
        if bit {
            self.bytes[byte_index] |= 1 << (7 - bit_offset);
        }
        self.bit_count += 1;
    }

    /// Append a code given as a sequence of `0`/`1` values.
    pub fn push_code(&mut self, code: &[u8]) {
        for &bit in code {
            self.push_bit(bit != 0);
        }
    }

    /// Number of bits written so far.
    pub fn bit_count(&self) -> usize {
        self.bit_count
    }

    /// Close the stream, zero-padding the last byte.
    pub fn finish(self) -> PackedBits {
        let padding = ((8 - self.bit_count % 8) % 8) as u8;
        PackedBits {
            bytes: self.bytes,
            padding,
        }
    }
}

/// Reads bits MSB-first, stopping at a fixed bit count.
#[derive(Debug)]
pub struct BitReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    limit: usize,
}

impl<'a> BitReader<'a> {
    /// Read `bytes`, ignoring the last `padding` bits.
    pub fn new(bytes: &'a [u8], padding: u8) -> Result<Self> {
        if padding > 7 {
            return Err(Error::format(format!("padding of {padding} bits exceeds 7")));
        }
        let available = bytes.len() * 8;
        if (padding as usize) > available {
            return Err(Error::format(format!(
                "padding of {padding} bits in an empty bit stream"
            )));
        }
        Ok(Self {
            bytes,
            pos: 0,
            limit: available - padding as usize,
        })
    }

    /// Bits consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Payload bits in the stream.
    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Iterator for BitReader<'_> {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        if self.pos >= self.limit {
            return None;
        }
        let byte = self.bytes[self.pos / 8];
        let bit = (byte >> (7 - self.pos % 8)) & 1 == 1;
        self.pos += 1;
        Some(bit)
    }
}

/// Pack `data` using `codes`.
///
/// # Errors
/// Returns [`Error::MissingCode`] if a byte of `data` has no code.
pub fn encode(data: &[u8], codes: &CodeTable) -> Result<PackedBits> {
    let mut total_bits = 0usize;
    for &b in data {
        match codes.code_len(b) {
            0 => return Err(Error::MissingCode(b)),
            n => total_bits += n,
        }
    }

    let mut writer = BitWriter::with_bit_capacity(total_bits)?;
    for &b in data {
        if let Some(code) = codes.get(b) {
            writer.push_code(code);
        }
    }
    let packed = writer.finish();
    debug!(
        input = data.len(),
        packed = packed.bytes.len(),
        padding = packed.padding,
        "packed bit stream"
    );
    Ok(packed)
}

/// Decode `bytes` against `tree`, ignoring the final `padding` bits.
///
/// # Errors
/// - [`Error::Format`] if padding is out of range or a bit leads into a
///   branch the tree does not have.
/// - [`Error::DecodeAlignment`] if the stream ends partway through a code.
pub fn decode(bytes: &[u8], padding: u8, tree: &HuffmanTree) -> Result<Vec<u8>> {
    let mut reader = BitReader::new(bytes, padding)?;
    let total_bits = reader.limit();
    let root = tree.root();
    let mut out = Vec::new();

    if let Node::Leaf { symbol, .. } = root {
        // a bare leaf decodes one symbol per `0` bit
        for bit in reader.by_ref() {
            if bit {
                return Err(Error::format("bit 1 under a single-leaf tree"));
            }
            out.push(*symbol);
        }
        return Ok(out);
    }

    let mut cursor = root;
    while let Some(bit) = reader.next() {
        let next = match cursor {
            Node::Internal { left, right, .. } => {
                if bit {
                    right.as_deref()
                } else {
                    left.as_deref()
                }
            }
            Node::Leaf { .. } => None,
        };

        match next {
            Some(Node::Leaf { symbol, .. }) => {
                out.push(*symbol);
                cursor = root;
            }
            Some(node) => cursor = node,
            None => {
                return Err(Error::format(format!(
                    "bit {} leads into an absent branch",
                    reader.position() - 1
                )))
            }
        }
    }

    if !ptr::eq(cursor, root) {
        return Err(Error::DecodeAlignment {
            consumed_bits: reader.position(),
            total_bits,
        });
    }

    debug!(packed = bytes.len(), decoded = out.len(), "unpacked bit stream");
    Ok(out)
}
