use std::fmt::Display;

use super::Sum;
use crate::encoding::{DecodeError, Reader};

/// A computed node. Useful for traversing the tree without reconstructing branches
/// which contains their children and are expensive to reconstruct.
///
/// This is also what a split commitment root is: the hash and sum of the
/// accumulator root.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ComputedNode<const HASH_SIZE: usize> {
    node_hash: [u8; HASH_SIZE],
    sum: Sum,
}

impl<const HASH_SIZE: usize> ComputedNode<HASH_SIZE> {
    /// Size of [`ComputedNode::encode`] output.
    pub const ENCODED_SIZE: usize = HASH_SIZE + 8;

    pub fn new(node_hash: [u8; HASH_SIZE], sum: Sum) -> Self {
        Self { node_hash, sum }
    }

    pub fn hash(&self) -> [u8; HASH_SIZE] {
        self.node_hash
    }

    pub fn sum(&self) -> Sum {
        self.sum
    }

    /// `hash ‖ sum` with the sum big-endian.
    pub fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.node_hash);
        out.extend_from_slice(&self.sum.to_be_bytes());
    }

    pub(crate) fn read(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let node_hash = reader.array::<HASH_SIZE>()?;
        let sum = reader.u64()?;
        Ok(Self::new(node_hash, sum))
    }
}

impl<const HASH_SIZE: usize> Display for ComputedNode<HASH_SIZE> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Computed {{ sum: {}, hash: {} }}",
            self.sum(),
            hex::encode(self.hash())
        )
    }
}

#[cfg(test)]
mod test {
    use super::ComputedNode;
    use crate::encoding::Reader;
    use hex_literal::hex;

    #[test]
    fn test_computed_node_display() {
        let computed_node = ComputedNode::new([0; 32], 1);
        assert_eq!(format!("{}", computed_node), "Computed { sum: 1, hash: 0000000000000000000000000000000000000000000000000000000000000000 }");
    }

    #[test]
    fn test_computed_node_encoding() {
        let node = ComputedNode::new(
            hex!("af5570f5a1810b7af78caf4bc70a660f0df51e42baf91d4de5b2328de0e83dfc"),
            0x0102,
        );
        let mut out = Vec::new();
        node.encode(&mut out);
        assert_eq!(out.len(), ComputedNode::<32>::ENCODED_SIZE);
        assert_eq!(&out[32..], &[0, 0, 0, 0, 0, 0, 1, 2]);

        let mut reader = Reader::new(&out);
        assert_eq!(ComputedNode::<32>::read(&mut reader).unwrap(), node);
        reader.finish().unwrap();
    }
}
