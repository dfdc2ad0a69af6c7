//! # Trie Node Model
//!
//! The four node shapes of the Merkle Patricia trie:
//! 1. Empty - the canonical empty marker
//! 2. Leaf - stores a value at the remaining key
//! 3. Extension - shares a common prefix path
//! 4. Branch - 16-way branch point + optional value
//!
//! A node's identity is the keccak256 hash of its RLP encoding. Nodes
//! whose encoding stays under 32 bytes are embedded inline in their
//! parent instead of being referenced by hash.

use alloy_primitives::{b256, keccak256, B256};

use crate::error::{ProofError, Result};
use crate::nibbles::Nibbles;
use crate::rlp::{self, RlpItem};

/// Root hash of the empty trie: `keccak256(rlp(""))`
pub const EMPTY_ROOT: B256 =
    b256!("56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421");

/// Reference to a child node - either inline data or a hash
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NodeRef {
    /// No child
    #[default]
    Empty,
    /// Raw encoding of a node shorter than 32 bytes, embedded directly
    Inline(Vec<u8>),
    /// Hash of a node stored elsewhere
    Hash(B256),
}

impl NodeRef {
    /// Check if empty
    pub fn is_empty(&self) -> bool {
        matches!(self, NodeRef::Empty)
    }

    /// Raw RLP item bytes for embedding in a parent's encoding
    fn encoded(&self) -> Vec<u8> {
        match self {
            NodeRef::Empty => vec![0x80],
            NodeRef::Inline(raw) => raw.clone(),
            NodeRef::Hash(hash) => rlp::encode_bytes(hash.as_slice()),
        }
    }
}

/// MPT node types
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Node {
    /// Empty node (null)
    #[default]
    Empty,

    /// Leaf node: [hp(path, leaf), value]
    Leaf { path: Nibbles, value: Vec<u8> },

    /// Extension node: [hp(path, extension), child]
    Extension { path: Nibbles, child: NodeRef },

    /// Branch node: [child0, ..., child15, value]
    Branch {
        children: Box<[NodeRef; 16]>,
        value: Option<Vec<u8>>,
    },
}

impl Node {
    /// Create a branch with no children and no value
    pub fn empty_branch() -> Self {
        Node::Branch {
            children: Box::new(std::array::from_fn(|_| NodeRef::Empty)),
            value: None,
        }
    }

    /// Check if node is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, Node::Empty)
    }

    /// Canonical RLP encoding of this node
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Node::Empty => vec![0x80],

            Node::Leaf { path, value } => {
                let mut payload = rlp::encode_bytes(&path.encode_hex_prefix(true));
                payload.extend_from_slice(&rlp::encode_bytes(value));
                rlp::wrap_list(payload)
            }

            Node::Extension { path, child } => {
                let mut payload = rlp::encode_bytes(&path.encode_hex_prefix(false));
                payload.extend_from_slice(&child.encoded());
                rlp::wrap_list(payload)
            }

            Node::Branch { children, value } => {
                let mut payload = Vec::new();
                for child in children.iter() {
                    payload.extend_from_slice(&child.encoded());
                }
                match value {
                    Some(v) => payload.extend_from_slice(&rlp::encode_bytes(v)),
                    None => payload.push(0x80),
                }
                rlp::wrap_list(payload)
            }
        }
    }

    /// keccak256 of the encoding. The empty node hashes to `EMPTY_ROOT`.
    pub fn hash(&self) -> B256 {
        keccak256(self.encode())
    }

    /// How a parent refers to this node: inline when the encoding is
    /// shorter than 32 bytes, by hash otherwise.
    pub fn reference(&self) -> NodeRef {
        if self.is_empty() {
            return NodeRef::Empty;
        }
        let encoded = self.encode();
        if encoded.len() < 32 {
            NodeRef::Inline(encoded)
        } else {
            NodeRef::Hash(keccak256(&encoded))
        }
    }

    /// Decode a node from its raw RLP encoding. The RLP layer enforces
    /// canonical form, so any accepted node re-encodes to the same bytes.
    pub fn decode(bytes: &[u8]) -> Result<Node> {
        let item = rlp::decode(bytes)?;
        let items = match &item {
            RlpItem::Bytes(b) if b.is_empty() => return Ok(Node::Empty),
            RlpItem::Bytes(_) => {
                return Err(ProofError::MalformedNode("non-empty string payload"))
            }
            RlpItem::List(items) => items,
        };

        match items.len() {
            2 => {
                let path_bytes = items[0]
                    .as_bytes()
                    .ok_or(ProofError::MalformedNode("path must be a string"))?;
                let (path, is_leaf) = Nibbles::decode_hex_prefix(path_bytes)?;

                if is_leaf {
                    let value = items[1]
                        .as_bytes()
                        .ok_or(ProofError::MalformedNode("leaf value must be a string"))?;
                    Ok(Node::Leaf {
                        path,
                        value: value.to_vec(),
                    })
                } else {
                    let child = decode_ref(&items[1])?;
                    if child.is_empty() {
                        return Err(ProofError::MalformedNode("extension without child"));
                    }
                    Ok(Node::Extension { path, child })
                }
            }
            17 => {
                let mut children: [NodeRef; 16] = Default::default();
                for (slot, item) in children.iter_mut().zip(&items[..16]) {
                    *slot = decode_ref(item)?;
                }
                let value_bytes = items[16]
                    .as_bytes()
                    .ok_or(ProofError::MalformedNode("branch value must be a string"))?;
                let value = if value_bytes.is_empty() {
                    None
                } else {
                    Some(value_bytes.to_vec())
                };
                Ok(Node::Branch {
                    children: Box::new(children),
                    value,
                })
            }
            _ => Err(ProofError::MalformedNode("unexpected list arity")),
        }
    }
}

/// Decode a child reference slot: the empty string, a 32-byte hash, or a
/// nested list carrying an inline node.
fn decode_ref(item: &RlpItem) -> Result<NodeRef> {
    match item {
        RlpItem::Bytes(b) if b.is_empty() => Ok(NodeRef::Empty),
        RlpItem::Bytes(b) if b.len() == 32 => Ok(NodeRef::Hash(B256::from_slice(b))),
        RlpItem::Bytes(_) => Err(ProofError::MalformedNode(
            "reference must be empty or 32 bytes",
        )),
        RlpItem::List(_) => Ok(NodeRef::Inline(rlp::encode(item))),
    }
}
