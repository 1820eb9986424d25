//! Merkle proofs over the tree.
//!
//! A [`Proof`] is the list of siblings met on the way from a leaf up to the
//! root, leaf level first. Most siblings of a sparse tree are empty subtrees,
//! so a proof can be compressed into the non-empty siblings plus a bitmap
//! flagging the empty ones.
use std::convert::Infallible;
use std::fmt::Debug;
use std::sync::Arc;

use bitvec::order::Lsb0;
use bitvec::vec::BitVec;

use crate::encoding::{put_u16_len, DecodeError, Reader};
use crate::{walk_up, Branch, ComputedNode, EmptyTree, Hasher, Leaf, Node, TreeError};

/// A merkle proof for a given key.
#[derive(Clone)]
pub struct Proof<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone> {
    nodes: Vec<Node<HASH_SIZE, H>>,
}

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone> Proof<HASH_SIZE, H> {
    /// Creates a new proof from the siblings, leaf level first.
    pub fn new(nodes: Vec<Node<HASH_SIZE, H>>) -> Self {
        Self { nodes }
    }

    /// Returns the nodes in the proof.
    pub fn nodes(&self) -> &[Node<HASH_SIZE, H>] {
        &self.nodes
    }

    fn arc_nodes(&self) -> Vec<Arc<Node<HASH_SIZE, H>>> {
        self.nodes.iter().cloned().map(Arc::new).collect()
    }

    /// Computes the root implied by the proof for `leaf` at `key`.
    pub fn root<DbError>(
        &self,
        key: &[u8; HASH_SIZE],
        leaf: Leaf<HASH_SIZE, H>,
    ) -> Result<Branch<HASH_SIZE, H>, TreeError<DbError>> {
        walk_up(key, leaf, &self.arc_nodes(), |_, _, _, _| {})
    }

    /// Verify a merkle proof for a given key.
    ///
    /// # Arguments
    ///
    /// * `key` - The key of the leaf
    /// * `leaf` - The leaf expected at `key`
    /// * `root_hash` - The expected root hash of the tree
    ///
    /// # Returns
    ///
    /// Returns `Ok(())` if the proof is valid, otherwise returns an error.
    pub fn verify_merkle_proof<DbError>(
        &self,
        key: &[u8; HASH_SIZE],
        leaf: Leaf<HASH_SIZE, H>,
        root_hash: [u8; HASH_SIZE],
    ) -> Result<(), TreeError<DbError>> {
        let got_root = self.root(key, leaf)?;
        if got_root.hash() == root_hash {
            Ok(())
        } else {
            Err(TreeError::InvalidMerkleProof)
        }
    }

    /// Checks that `leaf` sits at `key` under `root`, comparing both the hash
    /// and the sum. Malformed proofs are rejected, never panic.
    pub fn verify_inclusion(
        &self,
        key: &[u8; HASH_SIZE],
        leaf: Leaf<HASH_SIZE, H>,
        root: &ComputedNode<HASH_SIZE>,
    ) -> bool {
        match self.root::<Infallible>(key, leaf) {
            Ok(got) => got.hash() == root.hash() && got.sum() == root.sum(),
            Err(_) => false,
        }
    }

    /// Same proof with every sibling reduced to its hash and sum.
    pub fn to_computed(&self) -> Self {
        Self::new(self.nodes.iter().map(Node::to_computed).collect())
    }

    /// Compresses the proof into a compressed proof. Only proofs with one node
    /// per level can be compressed.
    pub fn compress(&self) -> Result<CompressedProof<HASH_SIZE, H>, DecodeError> {
        if self.nodes.len() != HASH_SIZE * 8 {
            return Err(DecodeError::InvalidProof("proof does not cover every level"));
        }
        let empty_tree = EmptyTree::<HASH_SIZE, H>::empty_tree();
        let mut bits = BitVec::with_capacity(self.nodes.len());
        let mut nodes = Vec::new();
        for (i, node) in self.nodes.iter().enumerate() {
            if node.hash() == empty_tree[HASH_SIZE * 8 - i].hash() {
                bits.push(true);
            } else {
                bits.push(false);
                nodes.push(node.to_computed());
            }
        }
        Ok(CompressedProof::new(nodes, bits))
    }
}

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone> Debug for Proof<HASH_SIZE, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Proof").field("nodes", &self.nodes).finish()
    }
}

/// Proofs are equal when their siblings have the same hashes and sums,
/// however the siblings are represented.
impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone> PartialEq for Proof<HASH_SIZE, H> {
    fn eq(&self, other: &Self) -> bool {
        same_nodes(&self.nodes, &other.nodes)
    }
}

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone> Eq for Proof<HASH_SIZE, H> {}

fn same_nodes<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone>(
    a: &[Node<HASH_SIZE, H>],
    b: &[Node<HASH_SIZE, H>],
) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(a, b)| a.hash() == b.hash() && a.sum() == b.sum())
}

/// A compressed merkle proof for a given key.
/// Empty siblings are not stored, a set bit flags them instead.
#[derive(Clone)]
pub struct CompressedProof<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone> {
    nodes: Vec<Node<HASH_SIZE, H>>,
    bits: BitVec<u8, Lsb0>,
}

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone> CompressedProof<HASH_SIZE, H> {
    /// Creates a new compressed proof from a list of nodes and a bitvector.
    pub fn new(nodes: Vec<Node<HASH_SIZE, H>>, bits: BitVec<u8, Lsb0>) -> Self {
        Self { nodes, bits }
    }

    pub fn nodes(&self) -> &[Node<HASH_SIZE, H>] {
        &self.nodes
    }

    /// Decompresses the proof into a proof.
    pub fn decompress(&self) -> Result<Proof<HASH_SIZE, H>, DecodeError> {
        if self.bits.len() != HASH_SIZE * 8 {
            return Err(DecodeError::InvalidProof("bitmap does not cover every level"));
        }
        if self.nodes.len() != self.bits.count_zeros() {
            return Err(DecodeError::InvalidProof("node count does not match bitmap"));
        }
        let empty_tree = EmptyTree::<HASH_SIZE, H>::empty_tree();
        let mut stored = self.nodes.iter();
        let mut nodes = Vec::with_capacity(self.bits.len());
        for (i, bit) in self.bits.iter().enumerate() {
            if *bit {
                nodes.push(empty_tree[HASH_SIZE * 8 - i].clone());
            } else {
                let node = stored
                    .next()
                    .ok_or(DecodeError::InvalidProof("node count does not match bitmap"))?;
                nodes.push(node.clone());
            }
        }
        Ok(Proof::new(nodes))
    }

    /// `count u16 | (hash | sum u64)* | bitmap`, big-endian.
    pub fn encode(&self) -> Result<Vec<u8>, DecodeError> {
        let mut encoded =
            Vec::with_capacity(2 + self.nodes.len() * ComputedNode::<HASH_SIZE>::ENCODED_SIZE);
        put_u16_len(&mut encoded, self.nodes.len())?;
        for node in self.nodes.iter() {
            ComputedNode::new(node.hash(), node.sum()).encode(&mut encoded);
        }
        encoded.extend_from_slice(self.bits.as_raw_slice());
        Ok(encoded)
    }

    /// Decodes a proof produced by [`CompressedProof::encode`]. The input must
    /// hold exactly one proof.
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = Reader::new(data);
        let nb_nodes = reader.u16()?;
        let mut nodes = Vec::with_capacity(nb_nodes as usize);
        for _ in 0..nb_nodes {
            nodes.push(Node::Computed(ComputedNode::read(&mut reader)?));
        }
        let bits = BitVec::<u8, Lsb0>::from_slice(reader.take(HASH_SIZE)?);
        reader.finish()?;
        if nodes.len() != bits.count_zeros() {
            return Err(DecodeError::InvalidProof("node count does not match bitmap"));
        }
        Ok(Self::new(nodes, bits))
    }
}

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone> Debug for CompressedProof<HASH_SIZE, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompressedProof")
            .field("nodes", &self.nodes)
            .field("bits", &self.bits)
            .finish()
    }
}

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE> + Clone> PartialEq
    for CompressedProof<HASH_SIZE, H>
{
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits && same_nodes(&self.nodes, &other.nodes)
    }
}
