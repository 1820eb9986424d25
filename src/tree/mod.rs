mod compact;
mod empty;
mod regular;

use std::sync::Arc;

pub use compact::CompactMSSMT;
pub use empty::EmptyTree;
pub use regular::MSSMT;

use crate::Branch;
use crate::Hasher;
use crate::Leaf;
use crate::Node;
use crate::TreeError;

/// Get the bit at the given index in the key.
/// Bits are read least significant first within each byte.
pub fn bit_index(index: usize, key: &[u8]) -> u8 {
    (key[index / 8] >> (index % 8)) & 1
}

/// Walk up the tree from the node to the root node.
/// * `key` - key of the node we want to reach.
/// * `start` - starting leaf.
/// * `siblings` - All the sibling nodes on the path (from the leaf to the root).
/// * `for_each` - Closure that is executed at each step of the traversal of the tree.
///     * `height: usize` - height of the parent in the tree
///     * `current: &Node<HASH_SIZE, H>` - current node on the way up
///     * `sibling: &Node<HASH_SIZE, H>` - sibling node of the current node
///     * `parent: &Node<HASH_SIZE, H>` - parent node of the current node
///
/// Fails with [`TreeError::InvalidMerkleProof`] when `siblings` is not exactly one
/// node per level and with [`TreeError::SumOverflow`] when two siblings can't be summed.
pub fn walk_up<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone, DbError>(
    key: &[u8; HASH_SIZE],
    start: Leaf<HASH_SIZE, H>,
    siblings: &[Arc<Node<HASH_SIZE, H>>],
    mut for_each: impl FnMut(usize, &Node<HASH_SIZE, H>, &Node<HASH_SIZE, H>, &Node<HASH_SIZE, H>),
) -> Result<Branch<HASH_SIZE, H>, TreeError<DbError>> {
    let max_levels = HASH_SIZE * 8;
    if siblings.len() != max_levels {
        return Err(TreeError::InvalidMerkleProof);
    }
    let mut current = Arc::new(Node::Leaf(start));
    let mut root = None;
    for i in (0..max_levels).rev() {
        let sibling = siblings[max_levels - 1 - i].clone();
        if current.sum().checked_add(sibling.sum()).is_none() {
            return Err(TreeError::SumOverflow);
        }
        // order the children based on the path
        let parent = if bit_index(i, key) == 0 {
            Branch::new_with_arc_children(current.clone(), sibling.clone())
        } else {
            Branch::new_with_arc_children(sibling.clone(), current.clone())
        };
        let parent_node = Node::Branch(parent.clone());
        for_each(i, &current, &sibling, &parent_node);
        current = Arc::new(parent_node);
        root = Some(parent);
    }
    root.ok_or(TreeError::ExpectedBranch)
}
