//! Statistics for a compress or decompress run.

use std::time::Duration;

/// Sizes and timing from one operation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CompressionStats {
    /// Uncompressed size in bytes.
    pub original_size: u64,
    /// Container size in bytes.
    pub compressed_size: u64,
    /// Wall-clock time taken.
    pub elapsed: Duration,
}

impl CompressionStats {
    /// Create stats from a completed operation.
    pub fn new(original_size: u64, compressed_size: u64, elapsed: Duration) -> Self {
        Self {
            original_size,
            compressed_size,
            elapsed,
        }
    }

    /// Compressed size over original size.
    pub fn ratio(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        self.compressed_size as f64 / self.original_size as f64
    }

    /// Space saved, as a percentage of the original size. Negative when
    /// the container is larger than its input.
    pub fn savings_percent(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        (1.0 - self.ratio()) * 100.0
    }

    /// Throughput over the original size, in bytes per second.
    pub fn throughput_bps(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.original_size as f64 / secs
    }
}
