//! Error types for Huffman compression and container handling.

use std::path::PathBuf;

use thiserror::Error;

/// Error variants for compress and decompress calls.
///
/// Every variant aborts the call that produced it; nothing is recovered
/// silently.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O error occurred while reading or writing a stream.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// An I/O error tied to a specific file on disk.
    #[error("io error on {}: {source}", path.display())]
    File {
        /// The file being read or written.
        path: PathBuf,
        /// The underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// A buffer of the required size could not be reserved.
    #[error("allocation failed: could not reserve {requested} bytes")]
    AllocationFailed {
        /// Number of bytes requested.
        requested: usize,
    },

    /// The file set holds no data at all.
    #[error("empty input: nothing to compress")]
    EmptyInput,

    /// The container header, boundary table or serialized tree is malformed.
    #[error("format error: {0}")]
    Format(String),

    /// The bit stream did not end on a symbol boundary.
    #[error("decode alignment error: stream ended mid-symbol after {consumed_bits} of {total_bits} bits")]
    DecodeAlignment {
        /// Bits consumed before the stream ran out.
        consumed_bits: usize,
        /// Payload bits declared by the container (excluding padding).
        total_bits: usize,
    },

    /// The header-declared packed length disagrees with the bytes present.
    #[error("size mismatch: header declares {declared} packed bytes, {available} available")]
    SizeMismatch {
        /// Length recorded in the header.
        declared: u64,
        /// Length actually present after the tree section.
        available: u64,
    },

    /// The encoder was handed a byte that has no code in its table.
    #[error("no code for byte 0x{0:02x}")]
    MissingCode(u8),
}

impl Error {
    /// Create a format error.
    pub fn format(message: impl Into<String>) -> Self {
        Error::Format(message.into())
    }

    /// Wrap an I/O error with the path it concerns.
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::File {
            path: path.into(),
            source,
        }
    }
}

/// A specialized Result type for compression operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Reserve space for `additional` more bytes, reporting failure as an error.
pub(crate) fn try_reserve(buf: &mut Vec<u8>, additional: usize) -> Result<()> {
    buf.try_reserve_exact(additional)
        .map_err(|_| Error::AllocationFailed {
            requested: additional,
        })
}
