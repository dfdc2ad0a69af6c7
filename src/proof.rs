//! # Merkle Proofs
//!
//! A proof is the ordered list of raw node encodings along the
//! root-to-target path, sufficient to replay hash verification without
//! the full trie. Generation (see [`crate::trie::TxTrie::prove`]) reads
//! from the builder's node store; verification reads only from the
//! supplied list and trusts nothing in it.

use alloy_primitives::{keccak256, B256};
use serde::{Deserialize, Serialize};

use crate::error::{ProofError, Result};
use crate::nibbles::Nibbles;
use crate::node::{Node, NodeRef};

/// Inclusion proof for one (key, value) entry of a trie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    /// The key being proven (RLP-encoded transaction index)
    pub key: Vec<u8>,
    /// The committed value (raw transaction blob)
    pub value: Vec<u8>,
    /// Raw RLP encodings of the visited nodes, root first
    pub nodes: Vec<Vec<u8>>,
}

impl Proof {
    /// Create new proof
    pub fn new(key: Vec<u8>, value: Vec<u8>, nodes: Vec<Vec<u8>>) -> Self {
        Proof { key, value, nodes }
    }

    /// Verify against a trusted root hash. The proof is treated as fully
    /// adversarial: every failure collapses to `false`, nothing panics,
    /// and the walk is bounded by the supplied node list.
    pub fn verify(&self, root: B256) -> bool {
        self.check(root).is_ok()
    }

    /// Reason-carrying form of [`Proof::verify`] for diagnostics. Every
    /// failure mode maps to [`ProofError::ProofMismatch`] so no
    /// step-level oracle leaks to the supplier of the proof.
    pub fn check(&self, root: B256) -> Result<()> {
        let mut expected = NodeRef::Hash(root);
        let mut remaining = Nibbles::from_bytes(&self.key);

        for raw in &self.nodes {
            // the node must be the one its parent committed to
            let matches = match &expected {
                NodeRef::Hash(hash) => keccak256(raw) == *hash,
                NodeRef::Inline(bytes) => raw == bytes,
                NodeRef::Empty => false,
            };
            if !matches {
                return Err(ProofError::ProofMismatch);
            }

            let node = Node::decode(raw).map_err(|_| ProofError::ProofMismatch)?;

            expected = match node {
                Node::Empty => return Err(ProofError::ProofMismatch),

                Node::Leaf { path, value } => {
                    // terminal: the leaf must consume the key exactly
                    if path == remaining && value == self.value {
                        return Ok(());
                    }
                    return Err(ProofError::ProofMismatch);
                }

                Node::Extension { path, child } => {
                    if !remaining.starts_with(&path) {
                        return Err(ProofError::ProofMismatch);
                    }
                    remaining = remaining.slice(path.len());
                    child
                }

                Node::Branch { children, value } => match remaining.split_first() {
                    None => {
                        // terminal: the key ends at this branch
                        if value.as_deref() == Some(self.value.as_slice()) {
                            return Ok(());
                        }
                        return Err(ProofError::ProofMismatch);
                    }
                    Some((index, rest)) => {
                        remaining = rest;
                        let slot = children[index as usize].clone();
                        if slot.is_empty() {
                            return Err(ProofError::ProofMismatch);
                        }
                        slot
                    }
                },
            };
        }

        // nodes exhausted before a terminal check
        Err(ProofError::ProofMismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::EMPTY_ROOT;
    use crate::rlp::encode_index;
    use crate::trie::TxTrie;

    fn sample_block(count: usize) -> Vec<Vec<u8>> {
        // distinct pseudo-transaction blobs, large enough to hash-reference
        (0..count)
            .map(|i| {
                let mut blob = vec![0xf8, i as u8];
                blob.extend((0..64).map(|j| (i * 31 + j) as u8));
                blob
            })
            .collect()
    }

    #[test]
    fn test_three_transaction_scenario() {
        let txs = sample_block(3);
        let trie = TxTrie::from_transactions(&txs).unwrap();
        let root = trie.root_hash();

        let proof = trie.prove(&encode_index(1)).unwrap();
        assert_eq!(proof.value, txs[1]);
        assert!(proof.verify(root));

        // the {0,1}-only trie commits to a different structure
        let shorter = TxTrie::from_transactions(&txs[..2]).unwrap();
        assert_ne!(shorter.root_hash(), root);
        assert!(!proof.verify(shorter.root_hash()));
    }

    #[test]
    fn test_generate_then_verify_every_index() {
        // 17 transactions forces branching at the first key nibble
        let txs = sample_block(17);
        let trie = TxTrie::from_transactions(&txs).unwrap();
        let root = trie.root_hash();

        for (i, tx) in txs.iter().enumerate() {
            let proof = trie.prove(&encode_index(i as u64)).unwrap();
            assert_eq!(proof.value, *tx);
            assert!(proof.nodes.len() > 1, "index {i} should walk a path");
            assert!(proof.verify(root), "proof for index {i} should verify");
        }
    }

    #[test]
    fn test_key_not_found() {
        let txs = sample_block(3);
        let trie = TxTrie::from_transactions(&txs).unwrap();
        assert_eq!(
            trie.prove(&encode_index(3)).unwrap_err(),
            ProofError::KeyNotFound
        );
        assert_eq!(
            trie.prove(&encode_index(99)).unwrap_err(),
            ProofError::KeyNotFound
        );
    }

    #[test]
    fn test_empty_block() {
        let trie = TxTrie::from_transactions(&[]).unwrap();
        assert_eq!(trie.root_hash(), EMPTY_ROOT);
        assert_eq!(
            trie.prove(&encode_index(0)).unwrap_err(),
            ProofError::KeyNotFound
        );
    }

    #[test]
    fn test_tampered_nodes_rejected() {
        let txs = sample_block(5);
        let trie = TxTrie::from_transactions(&txs).unwrap();
        let root = trie.root_hash();
        let proof = trie.prove(&encode_index(2)).unwrap();
        assert!(proof.verify(root));

        // flipping any single bit of any node breaks the hash chain
        for node_index in 0..proof.nodes.len() {
            for byte_index in 0..proof.nodes[node_index].len() {
                for bit in 0..8 {
                    let mut tampered = proof.clone();
                    tampered.nodes[node_index][byte_index] ^= 1 << bit;
                    assert!(
                        !tampered.verify(root),
                        "bit {bit} of byte {byte_index} in node {node_index}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_substituted_value_rejected() {
        let txs = sample_block(4);
        let trie = TxTrie::from_transactions(&txs).unwrap();
        let root = trie.root_hash();

        let mut proof = trie.prove(&encode_index(1)).unwrap();
        proof.value = txs[2].clone();
        assert!(!proof.verify(root));

        let mut proof = trie.prove(&encode_index(1)).unwrap();
        proof.value.push(0x00);
        assert!(!proof.verify(root));
    }

    #[test]
    fn test_wrong_root_rejected() {
        let txs = sample_block(4);
        let trie = TxTrie::from_transactions(&txs).unwrap();
        let proof = trie.prove(&encode_index(0)).unwrap();

        assert!(!proof.verify(EMPTY_ROOT));
        assert!(!proof.verify(B256::ZERO));
    }

    #[test]
    fn test_truncated_and_empty_node_list_rejected() {
        let txs = sample_block(17);
        let trie = TxTrie::from_transactions(&txs).unwrap();
        let root = trie.root_hash();

        let mut proof = trie.prove(&encode_index(9)).unwrap();
        assert!(proof.nodes.len() > 1);
        proof.nodes.pop();
        assert!(!proof.verify(root));

        let mut proof = trie.prove(&encode_index(9)).unwrap();
        proof.nodes.clear();
        assert!(!proof.verify(root));
    }

    #[test]
    fn test_reordered_nodes_rejected() {
        let txs = sample_block(17);
        let trie = TxTrie::from_transactions(&txs).unwrap();
        let root = trie.root_hash();

        let mut proof = trie.prove(&encode_index(3)).unwrap();
        assert!(proof.nodes.len() >= 2);
        proof.nodes.swap(0, 1);
        assert!(!proof.verify(root));
    }

    #[test]
    fn test_garbage_nodes_never_panic() {
        let proof = Proof::new(
            encode_index(1),
            b"value".to_vec(),
            vec![vec![0xff; 40], vec![], vec![0xc0]],
        );
        assert!(!proof.verify(B256::ZERO));
        assert!(!proof.verify(keccak256([0xff; 40])));
    }

    #[test]
    fn test_check_reports_single_reason() {
        let txs = sample_block(3);
        let trie = TxTrie::from_transactions(&txs).unwrap();
        let proof = trie.prove(&encode_index(0)).unwrap();

        assert_eq!(proof.check(trie.root_hash()), Ok(()));
        assert_eq!(proof.check(B256::ZERO), Err(ProofError::ProofMismatch));
    }

    #[test]
    fn test_inline_nodes_in_proof() {
        // tiny values keep leaves under 32 bytes, so the walk crosses
        // inline references
        let txs: Vec<Vec<u8>> = (0..3).map(|i| vec![i as u8 + 1]).collect();
        let trie = TxTrie::from_transactions(&txs).unwrap();
        let root = trie.root_hash();

        for i in 0..txs.len() {
            let proof = trie.prove(&encode_index(i as u64)).unwrap();
            assert!(proof.verify(root), "inline proof for index {i}");
        }
    }

    #[test]
    fn test_branch_value_terminal() {
        // one key a strict nibble-prefix of another: the shorter key's
        // walk ends in a branch value slot, not a leaf
        let mut trie = TxTrie::in_memory();
        trie.insert(&[0x12], vec![0xaa; 40]).unwrap();
        trie.insert(&[0x12, 0x34], vec![0xbb; 40]).unwrap();
        let root = trie.root_hash();

        let at_branch = trie.prove(&[0x12]).unwrap();
        assert_eq!(at_branch.value, vec![0xaa; 40]);
        assert!(at_branch.verify(root));

        let at_leaf = trie.prove(&[0x12, 0x34]).unwrap();
        assert_eq!(at_leaf.value, vec![0xbb; 40]);
        assert!(at_leaf.verify(root));

        // the two proofs are not interchangeable
        let mut crossed = at_branch.clone();
        crossed.key = at_leaf.key.clone();
        assert!(!crossed.verify(root));
    }

    #[test]
    fn test_proof_serde_roundtrip() {
        let txs = sample_block(3);
        let trie = TxTrie::from_transactions(&txs).unwrap();
        let proof = trie.prove(&encode_index(1)).unwrap();

        let json = serde_json::to_string(&proof).unwrap();
        let restored: Proof = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, proof);
        assert!(restored.verify(trie.root_hash()));
    }
}
