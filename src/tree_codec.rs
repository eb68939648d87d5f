//! Compact pre-order serialization of a Huffman tree.
//!
//! One marker byte per node position:
//!
//! ```text
//! 0            absent child
//! 1 <byte>     leaf carrying <byte>
//! 2 <L> <R>    internal node, followed by its left then right subtree
//! ```
//!
//! Both directions use an explicit stack, and decoding bounds nesting depth,
//! since the bytes come from a file that may be corrupt or hostile.

use tracing::trace;

use crate::error::{Error, Result};
use crate::huffman::{HuffmanTree, Node};

/// Marker for an absent child.
pub const MARKER_ABSENT: u8 = 0;
/// Marker for a leaf; followed by its symbol byte.
pub const MARKER_LEAF: u8 = 1;
/// Marker for an internal node; followed by both subtrees.
pub const MARKER_INTERNAL: u8 = 2;

/// Serialize `tree` in pre-order.
pub fn serialize(tree: &HuffmanTree) -> Vec<u8> {
    let mut out = Vec::new();
    let mut stack = vec![Some(tree.root())];

    while let Some(node) = stack.pop() {
        match node {
            None => out.push(MARKER_ABSENT),
            Some(Node::Leaf { symbol, .. }) => {
                out.push(MARKER_LEAF);
                out.push(*symbol);
            }
            Some(Node::Internal { left, right, .. }) => {
                out.push(MARKER_INTERNAL);
                stack.push(right.as_deref());
                stack.push(left.as_deref());
            }
        }
    }

    trace!(bytes = out.len(), "serialized tree");
    out
}

/// An internal node whose children are still being read.
struct Frame {
    left: Option<Option<Box<Node>>>,
}

/// Rebuild a tree from its serialized form.
///
/// The whole of `bytes` must describe exactly one tree.
///
/// # Errors
/// [`Error::Format`] on an unknown marker, truncated input, nesting deeper
/// than `max_depth`, a repeated leaf symbol, trailing bytes, or an absent
/// child anywhere except the right side of a single-symbol root.
pub fn deserialize(bytes: &[u8], max_depth: usize) -> Result<HuffmanTree> {
    let mut pos = 0usize;
    let mut seen = [false; 256];
    let mut stack: Vec<Frame> = Vec::new();

    let root = 'read: loop {
        let marker = *bytes
            .get(pos)
            .ok_or_else(|| Error::format(format!("tree truncated at offset {pos}")))?;
        pos += 1;

        let mut item = match marker {
            MARKER_ABSENT => None,
            MARKER_LEAF => {
                let symbol = *bytes.get(pos).ok_or_else(|| {
                    Error::format(format!("tree truncated in leaf at offset {pos}"))
                })?;
                pos += 1;
                if std::mem::replace(&mut seen[symbol as usize], true) {
                    return Err(Error::format(format!(
                        "leaf symbol 0x{symbol:02x} appears twice"
                    )));
                }
                Some(Node::leaf(symbol, 0))
            }
            MARKER_INTERNAL => {
                if stack.len() >= max_depth {
                    return Err(Error::format(format!(
                        "tree nesting exceeds {max_depth} levels"
                    )));
                }
                stack.push(Frame { left: None });
                continue;
            }
            other => {
                return Err(Error::format(format!(
                    "unknown tree marker {other} at offset {}",
                    pos - 1
                )))
            }
        };

        // hand the finished subtree to its parent, closing parents as they fill
        loop {
            let Some(frame) = stack.last_mut() else {
                break 'read item;
            };
            if frame.left.is_none() {
                frame.left = Some(item.map(Box::new));
                continue 'read;
            }

            let left = frame.left.take().flatten();
            stack.pop();
            let right = item.map(Box::new);

            let Some(left) = left else {
                return Err(Error::format("internal node without a left child"));
            };
            if right.is_none() && !(stack.is_empty() && left.is_leaf()) {
                return Err(Error::format(
                    "absent right child outside a single-symbol root",
                ));
            }
            item = Some(Node::Internal {
                left: Some(left),
                right,
                freq: 0,
            });
        }
    };

    let root = root.ok_or_else(|| Error::format("serialized tree has no root"))?;
    if pos != bytes.len() {
        return Err(Error::format(format!(
            "{} trailing bytes after serialized tree",
            bytes.len() - pos
        )));
    }

    Ok(HuffmanTree::from_root(root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    const DEPTH: usize = Config::DEFAULT_MAX_TREE_DEPTH;

    #[test]
    fn two_leaf_layout() {
        let tree = HuffmanTree::from_root(Node::merge(Node::leaf(b'x', 1), Node::leaf(b'y', 2)));
        assert_eq!(serialize(&tree), vec![2, 1, b'x', 1, b'y']);
    }

    #[test]
    fn single_symbol_layout() {
        let tree = HuffmanTree::from_bytes(b"zzz").unwrap();
        let bytes = serialize(&tree);
        assert_eq!(bytes, vec![2, 1, b'z', 0]);

        let back = deserialize(&bytes, DEPTH).unwrap();
        assert_eq!(back.codes(), tree.codes());
    }

    #[test]
    fn round_trip_preserves_shape() {
        let tree = HuffmanTree::from_bytes(b"she sells sea shells by the sea shore").unwrap();
        let bytes = serialize(&tree);
        let back = deserialize(&bytes, DEPTH).unwrap();

        assert_eq!(serialize(&back), bytes);
        assert_eq!(back.codes(), tree.codes());
    }

    #[test]
    fn unknown_marker_is_rejected() {
        let err = deserialize(&[2, 1, b'a', 9], DEPTH).unwrap_err();
        assert!(err.to_string().contains("unknown tree marker 9"));
    }

    #[test]
    fn truncation_is_rejected() {
        for bytes in [&[][..], &[2][..], &[2, 1][..], &[2, 1, b'a'][..], &[2, 1, b'a', 2, 1, b'b'][..]] {
            assert!(matches!(deserialize(bytes, DEPTH), Err(Error::Format(_))));
        }
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let err = deserialize(&[2, 1, b'a', 1, b'b', 0], DEPTH).unwrap_err();
        assert!(err.to_string().contains("trailing"));
    }

    #[test]
    fn duplicate_leaves_are_rejected() {
        assert!(deserialize(&[2, 1, b'a', 1, b'a'], DEPTH).is_err());
    }

    #[test]
    fn misplaced_absent_children_are_rejected() {
        // absent root
        assert!(deserialize(&[0], DEPTH).is_err());
        // absent left child
        assert!(deserialize(&[2, 0, 1, b'a'], DEPTH).is_err());
        // absent right child below the root
        assert!(deserialize(&[2, 1, b'a', 2, 1, b'b', 0], DEPTH).is_err());
    }

    #[test]
    fn deep_nesting_is_bounded() {
        let mut bytes = vec![MARKER_INTERNAL; 100_000];
        bytes.extend_from_slice(&[1, 0]);
        let err = deserialize(&bytes, DEPTH).unwrap_err();
        assert!(err.to_string().contains("nesting"));
    }

    #[test]
    fn deepest_valid_tree_fits() {
        // a caterpillar over 256 symbols is 255 levels deep
        let mut bytes = Vec::new();
        for s in 0..255u8 {
            bytes.extend_from_slice(&[MARKER_INTERNAL, MARKER_LEAF, s]);
        }
        bytes.extend_from_slice(&[MARKER_LEAF, 255]);

        let tree = deserialize(&bytes, DEPTH).unwrap();
        assert_eq!(tree.depth(), 255);
        assert_eq!(tree.codes().iter().count(), 256);
    }
}
