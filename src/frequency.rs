//! Byte histograms.

/// Occurrence counts for every byte value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; 256],
}

impl FrequencyTable {
    /// Count every byte of `data` in a single pass.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut counts = [0u64; 256];
        for &b in data {
            counts[b as usize] += 1;
        }
        Self { counts }
    }

    /// Build a table from explicit counts.
    pub fn from_counts(counts: [u64; 256]) -> Self {
        Self { counts }
    }

    /// Count for a single byte value.
    pub fn count(&self, byte: u8) -> u64 {
        self.counts[byte as usize]
    }

    /// All 256 counts, indexed by byte value.
    pub fn counts(&self) -> &[u64; 256] {
        &self.counts
    }

    /// Number of byte values that occur at least once.
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Total number of bytes counted.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// `(byte, count)` pairs for the bytes that occur, in byte order.
    pub fn present(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &c)| c > 0)
            .map(|(b, &c)| (b as u8, c))
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self { counts: [0; 256] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_abracadabra() {
        let table = FrequencyTable::from_bytes(b"abracadabra");
        assert_eq!(table.count(b'a'), 5);
        assert_eq!(table.count(b'b'), 2);
        assert_eq!(table.count(b'r'), 2);
        assert_eq!(table.count(b'c'), 1);
        assert_eq!(table.count(b'd'), 1);
        assert_eq!(table.count(b'z'), 0);
        assert_eq!(table.distinct(), 5);
        assert_eq!(table.total(), 11);
    }

    #[test]
    fn empty_input_is_all_zero() {
        let table = FrequencyTable::from_bytes(&[]);
        assert_eq!(table, FrequencyTable::default());
        assert_eq!(table.distinct(), 0);
        assert_eq!(table.present().count(), 0);
    }

    #[test]
    fn present_is_in_byte_order() {
        let table = FrequencyTable::from_bytes(&[9, 3, 3, 200]);
        let present: Vec<_> = table.present().collect();
        assert_eq!(present, vec![(3, 2), (9, 1), (200, 1)]);
    }
}
