//! # Huffman Packing
//!
//! *Multi-file archives with frequency-weighted prefix codes.*
//!
//! ## Intuition First
//!
//! Some bytes show up far more often than others. If common bytes get short
//! bit strings and rare bytes get long ones, the total comes out smaller than
//! eight bits per byte. The only rule is that no code may be the start of
//! another, so a decoder reading one bit at a time always knows where each
//! symbol ends. Every such code is a path through a binary tree: `0` goes
//! left, `1` goes right, and symbols sit at the leaves.
//!
//! ## The Problem
//!
//! Given byte counts, pick the tree that minimises the total encoded length,
//! then store enough alongside the bits to undo it:
//! - the tree shape, so the decoder can walk it,
//! - how many padding bits fill out the last byte,
//! - where each original file starts and ends in the concatenated stream.
//!
//! ## Historical Context
//!
//! ```text
//! 1948  Shannon     Entropy as the fundamental limit
//! 1949  Fano        Shannon-Fano coding: top-down, not always optimal
//! 1952  Huffman     Bottom-up merging: optimal prefix codes
//! 1977  Ziv-Lempel  Dictionary coders, later paired with Huffman (DEFLATE)
//! ```
//!
//! ## Mathematical Formulation
//!
//! For symbols with counts $f_s$ and code lengths $\ell_s$, minimise
//!
//! ```text
//! L = sum_s f_s * l_s    subject to    sum_s 2^(-l_s) <= 1
//! ```
//!
//! Merging the two lightest subtrees at every step attains the minimum.
//!
//! ## Complexity Analysis
//!
//! - **Time**: $O(n + k \log k)$ for $n$ input bytes and $k \le 256$ distinct
//!   values; decoding is $O(\text{bits})$.
//! - **Space**: the whole input, packed output and decoded output are held
//!   in memory for one call.
//!
//! ## Failure Modes
//!
//! 1. **Corrupt containers**: unknown tree markers, truncated sections and
//!    length mismatches are reported, never silently decoded.
//! 2. **Degenerate input**: a single distinct byte still needs one bit per
//!    symbol; an empty file set has nothing to compress and is an error.
//!
//! ## Implementation Notes
//!
//! [`compress`] and [`decompress`] are pure buffer-to-buffer calls. The
//! [`archive`] module holds the filesystem side used by the `huffpack`
//! binary.

#![warn(missing_docs)]
#![warn(clippy::all)]

use tracing::debug;

pub mod archive;
pub mod bits;
pub mod config;
pub mod container;
pub mod error;
pub mod frequency;
pub mod heap;
pub mod huffman;
pub mod stats;
pub mod tree_codec;

pub use archive::Entry;
pub use config::Config;
pub use container::{ContainerHeader, FileBoundary};
pub use error::{Error, Result};
pub use frequency::FrequencyTable;
pub use huffman::{CodeTable, HuffmanTree, Node};
pub use stats::CompressionStats;

/// Compress a file set into container bytes using default limits.
///
/// # Errors
/// See [`compress_with`].
pub fn compress(entries: &[Entry]) -> Result<Vec<u8>> {
    compress_with(entries, &Config::default())
}

/// Compress a file set into container bytes.
///
/// # Errors
/// - [`Error::EmptyInput`] if the entries hold no data.
/// - [`Error::Format`] if a file name is unusable or repeated.
/// - [`Error::AllocationFailed`] if a working buffer cannot be reserved.
pub fn compress_with(entries: &[Entry], config: &Config) -> Result<Vec<u8>> {
    let (buffer, boundaries) = archive::pack(entries, config)?;

    let freqs = FrequencyTable::from_bytes(&buffer);
    let tree = HuffmanTree::build(&freqs).ok_or(Error::EmptyInput)?;
    let codes = tree.codes();
    debug!(
        input = buffer.len(),
        distinct = freqs.distinct(),
        depth = tree.depth(),
        "built code table"
    );

    let packed = bits::encode(&buffer, &codes)?;
    let tree_bytes = tree_codec::serialize(&tree);

    let header = ContainerHeader {
        padding: packed.padding,
        tree_len: u32::try_from(tree_bytes.len())
            .map_err(|_| Error::format("serialized tree exceeds 4 GiB"))?,
        data_len: packed.bytes.len() as u64,
        boundaries,
    };
    container::encode(&header, &tree_bytes, &packed.bytes)
}

/// Restore a file set from container bytes using default limits.
///
/// # Errors
/// See [`decompress_with`].
pub fn decompress(bytes: &[u8]) -> Result<Vec<Entry>> {
    decompress_with(bytes, &Config::default())
}

/// Restore a file set from container bytes.
///
/// # Errors
/// - [`Error::Format`] for a malformed header, boundary table or tree.
/// - [`Error::SizeMismatch`] if the packed section is not the declared length.
/// - [`Error::DecodeAlignment`] if the bit stream ends partway through a code.
pub fn decompress_with(bytes: &[u8], config: &Config) -> Result<Vec<Entry>> {
    let parsed = container::decode(bytes, config)?;
    let tree = tree_codec::deserialize(parsed.tree, config.max_tree_depth)?;
    let buffer = bits::decode(parsed.data, parsed.header.padding, &tree)?;
    debug!(
        files = parsed.header.file_count(),
        decoded = buffer.len(),
        "decoded payload"
    );
    archive::unpack(&buffer, &parsed.header.boundaries)
}
