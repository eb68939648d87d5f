//! On-disk container layout.
//!
//! All integers are little-endian.
//!
//! ```text
//! u32   header_len
//! ---- header block (header_len bytes) ----
//! u32   file_count
//! u8    padding bits (0..=7)
//! u32   tree_len
//! u64   data_len
//! file_count x { u16 name_len, name (UTF-8), u64 start, u64 length }
//! ---- end of header block ----
//! tree_len bytes   serialized tree
//! data_len bytes   packed bit stream
//! ```
//!
//! The packed length is always taken from `data_len`; the bytes that
//! follow the tree must match it exactly.

use std::io::{self, Cursor, Read, Write};

use tracing::debug;

use crate::config::Config;
use crate::error::{try_reserve, Error, Result};

/// Smallest encoded boundary entry: length prefix, a one-byte name, two offsets.
const MIN_BOUNDARY_LEN: usize = 2 + 1 + 8 + 8;

/// One logical file's span inside the concatenated buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBoundary {
    /// Base file name, without any directory part.
    pub name: String,
    /// Offset of the first byte.
    pub start: u64,
    /// Length in bytes.
    pub len: u64,
}

impl FileBoundary {
    /// Offset one past the last byte.
    pub fn end(&self) -> u64 {
        self.start + self.len
    }
}

/// Container metadata preceding the tree and packed data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHeader {
    /// Padding bits in the last packed byte.
    pub padding: u8,
    /// Length of the serialized tree.
    pub tree_len: u32,
    /// Length of the packed bit stream.
    pub data_len: u64,
    /// Files in concatenation order.
    pub boundaries: Vec<FileBoundary>,
}

impl ContainerHeader {
    /// Number of files described.
    pub fn file_count(&self) -> usize {
        self.boundaries.len()
    }

    /// Length of the decoded buffer implied by the boundary table.
    pub fn original_len(&self) -> u64 {
        self.boundaries.iter().map(|b| b.len).sum()
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&(self.boundaries.len() as u32).to_le_bytes())?;
        writer.write_all(&[self.padding])?;
        writer.write_all(&self.tree_len.to_le_bytes())?;
        writer.write_all(&self.data_len.to_le_bytes())?;

        for b in &self.boundaries {
            let name = b.name.as_bytes();
            writer.write_all(&(name.len() as u16).to_le_bytes())?;
            writer.write_all(name)?;
            writer.write_all(&b.start.to_le_bytes())?;
            writer.write_all(&b.len.to_le_bytes())?;
        }
        Ok(())
    }

    fn read_from(block: &[u8], config: &Config) -> Result<Self> {
        let mut cursor = Cursor::new(block);

        let file_count = read_u32(&mut cursor, "file count")? as usize;
        if file_count.saturating_mul(MIN_BOUNDARY_LEN) > block.len() {
            return Err(Error::format(format!(
                "header claims {file_count} files but holds {} bytes",
                block.len()
            )));
        }

        let padding = read_u8(&mut cursor, "padding")?;
        if padding > 7 {
            return Err(Error::format(format!("padding of {padding} bits exceeds 7")));
        }
        let tree_len = read_u32(&mut cursor, "tree length")?;
        let data_len = read_u64(&mut cursor, "data length")?;

        let mut boundaries = Vec::with_capacity(file_count);
        let mut expected_start = 0u64;
        for i in 0..file_count {
            let name_len = read_u16(&mut cursor, "name length")? as usize;
            if name_len > config.max_name_len {
                return Err(Error::format(format!(
                    "file {i} name is {name_len} bytes, limit is {}",
                    config.max_name_len
                )));
            }
            let mut name = vec![0u8; name_len];
            cursor
                .read_exact(&mut name)
                .map_err(|_| Error::format(format!("header truncated in name of file {i}")))?;
            let name = String::from_utf8(name)
                .map_err(|_| Error::format(format!("file {i} name is not valid UTF-8")))?;
            validate_name(&name)?;

            let start = read_u64(&mut cursor, "file start")?;
            let len = read_u64(&mut cursor, "file length")?;
            if start != expected_start {
                return Err(Error::format(format!(
                    "file {name:?} starts at {start}, expected {expected_start}"
                )));
            }
            expected_start = start
                .checked_add(len)
                .ok_or_else(|| Error::format(format!("file {name:?} length overflows")))?;

            boundaries.push(FileBoundary { name, start, len });
        }

        if cursor.position() as usize != block.len() {
            return Err(Error::format(format!(
                "header block has {} unread bytes",
                block.len() - cursor.position() as usize
            )));
        }

        Ok(Self {
            padding,
            tree_len,
            data_len,
            boundaries,
        })
    }
}

/// A parsed container borrowing its sections from the source bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container<'a> {
    /// Parsed header.
    pub header: ContainerHeader,
    /// Serialized tree section.
    pub tree: &'a [u8],
    /// Packed bit stream section.
    pub data: &'a [u8],
}

/// Reject names that could escape the output directory.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return Err(Error::format(format!("unusable file name {name:?}")));
    }
    Ok(())
}

/// Assemble a container from its parts.
///
/// # Errors
/// [`Error::Format`] if `header` disagrees with the section lengths or a
/// name cannot be stored.
pub fn encode(header: &ContainerHeader, tree: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    if header.padding > 7 {
        return Err(Error::format(format!(
            "padding of {} bits exceeds 7",
            header.padding
        )));
    }
    if header.tree_len as usize != tree.len() || header.data_len != data.len() as u64 {
        return Err(Error::format("header lengths disagree with sections"));
    }
    if header.boundaries.len() > u32::MAX as usize {
        return Err(Error::format("too many files for one container"));
    }
    for b in &header.boundaries {
        validate_name(&b.name)?;
        if b.name.len() > u16::MAX as usize {
            return Err(Error::format(format!("file name {:?} is too long", b.name)));
        }
    }

    let mut block = Vec::new();
    header.write_to(&mut block)?;
    let block_len = u32::try_from(block.len())
        .map_err(|_| Error::format("header block exceeds 4 GiB"))?;

    let mut out = Vec::new();
    try_reserve(&mut out, 4 + block.len() + tree.len() + data.len())?;
    out.write_all(&block_len.to_le_bytes())?;
    out.write_all(&block)?;
    out.write_all(tree)?;
    out.write_all(data)?;

    debug!(
        files = header.file_count(),
        header = block.len(),
        tree = tree.len(),
        data = data.len(),
        "encoded container"
    );
    Ok(out)
}

/// Split container bytes into header, tree and packed data.
///
/// # Errors
/// - [`Error::Format`] if the header block or tree section is malformed or
///   truncated.
/// - [`Error::SizeMismatch`] if the bytes after the tree are not exactly
///   the declared packed length.
pub fn decode<'a>(bytes: &'a [u8], config: &Config) -> Result<Container<'a>> {
    let mut cursor = Cursor::new(bytes);
    let header_len = read_u32(&mut cursor, "header length")? as usize;

    let rest = &bytes[4..];
    if header_len > rest.len() {
        return Err(Error::format(format!(
            "header block declares {header_len} bytes, {} available",
            rest.len()
        )));
    }
    let (block, rest) = rest.split_at(header_len);
    let header = ContainerHeader::read_from(block, config)?;

    let tree_len = header.tree_len as usize;
    if tree_len > rest.len() {
        return Err(Error::format(format!(
            "tree section truncated: {tree_len} bytes declared, {} available",
            rest.len()
        )));
    }
    let (tree, data) = rest.split_at(tree_len);

    if data.len() as u64 != header.data_len {
        return Err(Error::SizeMismatch {
            declared: header.data_len,
            available: data.len() as u64,
        });
    }

    debug!(
        files = header.file_count(),
        tree = tree.len(),
        data = data.len(),
        "decoded container"
    );
    Ok(Container { header, tree, data })
}

fn read_array<const N: usize>(cursor: &mut Cursor<&[u8]>, what: &str) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    cursor
        .read_exact(&mut buf)
        .map_err(|_| Error::format(format!("header truncated reading {what}")))?;
    Ok(buf)
}

fn read_u8(cursor: &mut Cursor<&[u8]>, what: &str) -> Result<u8> {
    Ok(read_array::<1>(cursor, what)?[0])
}

fn read_u16(cursor: &mut Cursor<&[u8]>, what: &str) -> Result<u16> {
    read_array(cursor, what).map(u16::from_le_bytes)
}

fn read_u32(cursor: &mut Cursor<&[u8]>, what: &str) -> Result<u32> {
    read_array(cursor, what).map(u32::from_le_bytes)
}

fn read_u64(cursor: &mut Cursor<&[u8]>, what: &str) -> Result<u64> {
    read_array(cursor, what).map(u64::from_le_bytes)
}
