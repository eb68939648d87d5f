//! Codec limits.

/// Limits applied when building and reading containers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Longest stored file name, in bytes. Longer names are cut at a
    /// character boundary when packing.
    pub max_name_len: usize,

    /// Deepest internal-node nesting accepted when reading a tree.
    pub max_tree_depth: usize,
}

impl Config {
    /// Default cap on stored file names.
    pub const DEFAULT_MAX_NAME_LEN: usize = 255;

    /// Default tree nesting bound. A Huffman tree over 256 symbols is at
    /// most 255 levels deep.
    pub const DEFAULT_MAX_TREE_DEPTH: usize = 256;

    /// Set the file name cap.
    pub fn with_max_name_len(mut self, len: usize) -> Self {
        self.max_name_len = len;
        self
    }

    /// Set the tree nesting bound.
    pub fn with_max_tree_depth(mut self, depth: usize) -> Self {
        self.max_tree_depth = depth;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_name_len: Self::DEFAULT_MAX_NAME_LEN,
            max_tree_depth: Self::DEFAULT_MAX_TREE_DEPTH,
        }
    }
}
