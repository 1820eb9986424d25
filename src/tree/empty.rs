//! Empty tree implementation for the Merkle Sum Sparse Merkle Tree
use std::{marker::PhantomData, sync::Arc};

use crate::node::{Hasher, Node};

/// Helper struct to create an empty mssmt.
///
/// `empty_tree()[h]` is the root of an empty subtree at height `h`: index `0`
/// is the empty root and index `HASH_SIZE * 8` the empty leaf.
pub struct EmptyTree<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone>(PhantomData<H>);

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone> EmptyTree<HASH_SIZE, H> {
    /// Builds the `HASH_SIZE * 8 + 1` empty nodes. This hashes once per level so
    /// callers keep the result around (see [`crate::Db::empty_tree`]).
    pub fn empty_tree() -> Arc<Vec<Node<HASH_SIZE, H>>> {
        let max_height = HASH_SIZE * 8;
        let mut empty_tree = Vec::with_capacity(max_height + 1);
        empty_tree.push(Node::<HASH_SIZE, H>::new_empty_leaf());

        for i in 1..=max_height {
            empty_tree.push(Node::new_branch(
                empty_tree[i - 1].clone(),
                empty_tree[i - 1].clone(),
            ));
        }
        empty_tree.reverse();
        Arc::new(empty_tree)
    }
}
