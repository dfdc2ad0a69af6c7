//! # Block-level API
//!
//! Facades tying the trie machinery to the records a block source hands
//! over: a trusted header carrying the transactions root, and the block's
//! raw transaction blobs with their indices. Fetching and deserializing
//! those records is the caller's concern.

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::proof::Proof;
use crate::rlp;
use crate::trie::TxTrie;

/// Trusted block header record, as supplied by an external source.
///
/// Nothing here validates `block_hash` against `transactions_root`;
/// deciding which header to trust is entirely the caller's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Hash of the block this header describes
    pub block_hash: B256,
    /// Root of the block's transactions trie
    pub transactions_root: B256,
}

/// Build the transactions trie for a block and prove the transaction at
/// `target_index`. Fails with [`crate::ProofError::KeyNotFound`] when the
/// index is outside the block.
pub fn build_and_prove(transactions: &[Vec<u8>], target_index: u64) -> Result<Proof> {
    let trie = TxTrie::from_transactions(transactions)?;
    trie.prove(&rlp::encode_index(target_index))
}

/// Root hash committing a block's transaction list
pub fn transactions_root(transactions: &[Vec<u8>]) -> Result<B256> {
    Ok(TxTrie::from_transactions(transactions)?.root_hash())
}

/// Verify an untrusted proof against a trusted transactions root
pub fn verify_proof(root: B256, proof: &Proof) -> bool {
    proof.verify(root)
}

/// Verify an untrusted proof against the transactions root of a trusted
/// header
pub fn verify_against_header(header: &BlockHeader, proof: &Proof) -> bool {
    proof.verify(header.transactions_root)
}
