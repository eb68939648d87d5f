//! Huffman tree construction and prefix-code generation.
//!
//! Given a byte histogram, the greedy construction repeatedly merges the
//! two lightest subtrees until one tree remains. Reading the path from the
//! root to each leaf (`0` = left, `1` = right) gives that byte's code.
//!
//! # Historical Context
//!
//! David Huffman (1952) developed this algorithm as a term paper at MIT.
//! It was the first practical algorithm for constructing optimal prefix codes.

use tracing::trace;

use crate::frequency::FrequencyTable;
use crate::heap::{MinHeap, Weighted};

/// Huffman tree node.
///
/// Each parent exclusively owns its children. Absent children only appear
/// in the degenerate single-symbol tree, whose root carries the lone leaf
/// on its left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A symbol.
    Leaf {
        /// The byte this leaf decodes to.
        symbol: u8,
        /// Occurrence count (zero for deserialized trees).
        freq: u64,
    },
    /// A merge point.
    Internal {
        /// Subtree reached by a `0` bit.
        left: Option<Box<Node>>,
        /// Subtree reached by a `1` bit.
        right: Option<Box<Node>>,
        /// Sum of the children's counts (zero for deserialized trees).
        freq: u64,
    },
}

impl Node {
    /// Create a leaf.
    pub fn leaf(symbol: u8, freq: u64) -> Self {
        Node::Leaf { symbol, freq }
    }

    /// Create an internal node over two subtrees.
    pub fn merge(left: Node, right: Node) -> Self {
        Node::Internal {
            freq: left.freq() + right.freq(),
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
        }
    }

    /// Aggregate weight of this subtree.
    pub fn freq(&self) -> u64 {
        match self {
            Node::Leaf { freq, .. } => *freq,
            Node::Internal { freq, .. } => *freq,
        }
    }

    /// Whether this node is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}

impl Weighted for Node {
    fn weight(&self) -> u64 {
        self.freq()
    }
}

/// A complete prefix tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    root: Node,
}

impl HuffmanTree {
    /// Build the optimal prefix tree for a histogram.
    ///
    /// Returns `None` when no byte occurs. A histogram with a single
    /// distinct byte yields an internal root whose left child is that
    /// byte's leaf, so the byte still gets a one-bit code.
    pub fn build(freqs: &FrequencyTable) -> Option<Self> {
        let k = freqs.distinct();
        trace!(distinct = k, "building huffman tree");

        match k {
            0 => None,
            1 => {
                let (symbol, freq) = freqs.present().next()?;
                Some(Self {
                    root: Node::Internal {
                        left: Some(Box::new(Node::leaf(symbol, freq))),
                        right: None,
                        freq,
                    },
                })
            }
            _ => {
                let mut heap = MinHeap::with_capacity(k);
                for (symbol, freq) in freqs.present() {
                    heap.insert(Node::leaf(symbol, freq));
                }

                while heap.len() > 1 {
                    let (a, b) = match (heap.extract_min(), heap.extract_min()) {
                        (Some(a), Some(b)) => (a, b),
                        _ => return None,
                    };
                    heap.insert(Node::merge(a, b));
                }

                heap.extract_min().map(|root| Self { root })
            }
        }
    }

    /// Wrap an already-built root.
    pub fn from_root(root: Node) -> Self {
        Self { root }
    }

    /// Build directly from raw data.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        Self::build(&FrequencyTable::from_bytes(data))
    }

    /// The root node.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Derive the code table for this tree.
    pub fn codes(&self) -> CodeTable {
        CodeTable::from_tree(self)
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(&self.root, 0usize)];
        while let Some((node, d)) = stack.pop() {
            match node {
                Node::Leaf { .. } => max = max.max(d),
                Node::Internal { left, right, .. } => {
                    stack.extend(left.as_deref().map(|n| (n, d + 1)));
                    stack.extend(right.as_deref().map(|n| (n, d + 1)));
                }
            }
        }
        max
    }
}

/// Per-byte prefix codes.
///
/// Each code is a sequence of bits (`0` or `1`), most significant first.
/// Bytes absent from the source data have empty entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    codes: Vec<Vec<u8>>,
}

impl CodeTable {
    /// Walk `tree` in pre-order, recording the path to every leaf.
    pub fn from_tree(tree: &HuffmanTree) -> Self {
        let mut codes = vec![Vec::new(); 256];
        let mut prefix = Vec::new();
        Self::build_codes(&tree.root, &mut prefix, &mut codes);
        Self { codes }
    }

    fn build_codes(node: &Node, prefix: &mut Vec<u8>, codes: &mut [Vec<u8>]) {
        match node {
            Node::Leaf { symbol, .. } => {
                // a leaf at the root still needs one bit
                codes[*symbol as usize] = if prefix.is_empty() {
                    vec![0]
                } else {
                    prefix.clone()
                };
            }
            Node::Internal { left, right, .. } => {
                if let Some(left) = left {
                    prefix.push(0);
                    Self::build_codes(left, prefix, codes);
                    prefix.pop();
                }
                if let Some(right) = right {
                    prefix.push(1);
                    Self::build_codes(right, prefix, codes);
                    prefix.pop();
                }
            }
        }
    }

    /// The code for `byte`, or `None` if the byte never occurred.
    pub fn get(&self, byte: u8) -> Option<&[u8]> {
        let code = &self.codes[byte as usize];
        (!code.is_empty()).then_some(code.as_slice())
    }

    /// Code length in bits for `byte` (zero if absent).
    pub fn code_len(&self, byte: u8) -> usize {
        self.codes[byte as usize].len()
    }

    /// Populated `(byte, code)` entries in byte order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &[u8])> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_empty())
            .map(|(b, c)| (b as u8, c.as_slice()))
    }

    /// Total encoded length in bits for data with histogram `freqs`.
    pub fn encoded_bits(&self, freqs: &FrequencyTable) -> u64 {
        freqs
            .present()
            .map(|(b, c)| c * self.code_len(b) as u64)
            .sum()
    }
}
