//! # Transaction Inclusion Proofs
//!
//! Merkle Patricia trie proofs that a transaction is committed in a
//! block's transactions root.
//!
//! Two sides of the same walk:
//! - **Generation**: build the trie from a block's transaction list
//!   ([`TxTrie::from_transactions`]) and record the root-to-leaf path for
//!   one index ([`build_and_prove`]).
//! - **Verification**: replay that path against a trusted root using
//!   nothing but the supplied node bytes ([`verify_proof`]); any flipped
//!   bit breaks the hash chain.
//!
//! The crate is offline and pure: no networking, no persistence, no
//! consensus rules. Callers bring their own trusted header.

pub mod block;
pub mod error;
pub mod nibbles;
pub mod node;
pub mod proof;
pub mod rlp;
pub mod trie;

pub use block::{
    build_and_prove, transactions_root, verify_against_header, verify_proof, BlockHeader,
};
pub use error::{ProofError, Result};
pub use nibbles::Nibbles;
pub use node::{Node, NodeRef, EMPTY_ROOT};
pub use proof::Proof;
pub use rlp::{encode_index, RlpItem};
pub use trie::{MemoryStore, NodeStore, TxTrie};
