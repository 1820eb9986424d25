//! Full Merkle Sum Sparse Merkle Tree: every non-empty branch is stored.

use std::{marker::PhantomData, sync::Arc};

use crate::{
    db::Db,
    node::{Branch, Hasher, Leaf, Node},
    Proof, TreeError,
};

use super::{bit_index, walk_up};

/// Merkle sum sparse merkle tree.
/// * `HASH_SIZE` - size of the hash digest in bytes.
/// * `H` - Hasher that will be used to hash nodes.
/// * `DbError` - error type of the node store.
pub struct MSSMT<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone, DbError> {
    db: Box<dyn Db<HASH_SIZE, H, DbError = DbError>>,
    _phantom: PhantomData<H>,
}

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone, DbError> MSSMT<HASH_SIZE, H, DbError> {
    pub fn new(db: Box<dyn Db<HASH_SIZE, H, DbError = DbError>>) -> Self {
        Self {
            db,
            _phantom: PhantomData,
        }
    }

    pub fn db(&self) -> &dyn Db<HASH_SIZE, H, DbError = DbError> {
        self.db.as_ref()
    }

    /// Max height of the tree
    pub const fn max_levels() -> usize {
        HASH_SIZE * 8
    }

    /// Root node of the tree, the empty root until something is inserted.
    pub fn root(&self) -> Result<Branch<HASH_SIZE, H>, TreeError<DbError>> {
        if let Some(branch) = self.db.get_root_node() {
            return Ok(branch);
        }
        match &self.db.empty_tree()[0] {
            Node::Branch(branch) => Ok(branch.clone()),
            _ => Err(TreeError::ExpectedBranch),
        }
    }

    /// Walk down the tree from the root node to the leaf at `key`.
    /// * `for_each` - Closure that is executed at each step of the traversal of the tree
    ///   with the height, the next node, its sibling and the current node.
    pub fn walk_down(
        &self,
        key: &[u8; HASH_SIZE],
        mut for_each: impl FnMut(usize, &Node<HASH_SIZE, H>, Node<HASH_SIZE, H>, Node<HASH_SIZE, H>),
    ) -> Result<Leaf<HASH_SIZE, H>, TreeError<DbError>> {
        let mut current = Node::Branch(self.root()?);
        for i in 0..Self::max_levels() {
            let (left, right) = self.db.get_children(i, current.hash())?;
            let (next, sibling) = if bit_index(i, key) == 0 {
                (left, right)
            } else {
                (right, left)
            };
            for_each(i, &next, sibling, current);
            current = next;
        }
        let Node::Leaf(leaf) = current else {
            return Err(TreeError::ExpectedLeaf);
        };
        Ok(leaf)
    }

    /// Insert a leaf in the tree, replacing whatever was at `key`.
    pub fn insert(
        &mut self,
        key: [u8; HASH_SIZE],
        leaf: Leaf<HASH_SIZE, H>,
    ) -> Result<(), TreeError<DbError>> {
        let replaced = self.get(&key)?.sum();
        self.root()?
            .sum()
            .checked_sub(replaced)
            .and_then(|rest| rest.checked_add(leaf.sum()))
            .ok_or(TreeError::SumOverflow)?;
        let mut prev_parents = Vec::with_capacity(Self::max_levels());
        let mut siblings = Vec::with_capacity(Self::max_levels());

        self.walk_down(&key, |_, _next, sibling, parent| {
            prev_parents.push(parent.hash());
            siblings.push(Arc::new(sibling));
        })?;
        prev_parents.reverse();
        siblings.reverse();

        let empty_tree = self.db.empty_tree();
        let mut branches_delete = Vec::new();
        let mut branches_insertion = Vec::new();
        let root = walk_up(
            &key,
            leaf.clone(),
            &siblings,
            |height, _current, _sibling, parent| {
                let prev_parent = prev_parents[Self::max_levels() - height - 1];
                if prev_parent != empty_tree[height].hash() {
                    branches_delete.push(prev_parent);
                }
                if parent.hash() != empty_tree[height].hash() {
                    if let Node::Branch(parent) = parent {
                        branches_insertion.push(parent.clone());
                    }
                }
            },
        )?;

        for key in branches_delete {
            self.db.delete_branch(&key)?;
        }
        for branch in branches_insertion {
            self.db.insert_branch(branch)?;
        }

        self.db.insert_leaf(leaf)?;
        self.db.update_root(root)
    }

    /// Sibling path for `key`, whether or not a leaf lives there.
    pub fn merkle_proof(&self, key: &[u8; HASH_SIZE]) -> Result<Proof<HASH_SIZE, H>, TreeError<DbError>> {
        let mut proof = Vec::with_capacity(Self::max_levels());
        self.walk_down(key, |_, _next, sibling, _| {
            proof.push(sibling);
        })?;
        proof.reverse();
        Ok(Proof::new(proof))
    }

    /// Sibling path for a key that holds a leaf.
    pub fn inclusion_proof(
        &self,
        key: &[u8; HASH_SIZE],
    ) -> Result<Proof<HASH_SIZE, H>, TreeError<DbError>> {
        let mut proof = Vec::with_capacity(Self::max_levels());
        let leaf = self.walk_down(key, |_, _next, sibling, _| {
            proof.push(sibling);
        })?;
        if leaf.is_empty() {
            return Err(TreeError::KeyNotFound(hex::encode(key)));
        }
        proof.reverse();
        Ok(Proof::new(proof))
    }

    pub fn get(&self, key: &[u8; HASH_SIZE]) -> Result<Leaf<HASH_SIZE, H>, TreeError<DbError>> {
        self.walk_down(key, |_, _, _, _| {})
    }
}
