//! # Transaction Trie Builder
//!
//! Builds the Merkle Patricia trie committing a block's transaction list
//! and computes its root hash. Keys are the RLP-encoded transaction
//! indices, values the raw transaction blobs.
//!
//! Nodes whose encoding reaches 32 bytes are persisted into a
//! content-addressed store keyed by their hash; shorter nodes stay inline
//! in their parent. The store is private to one build and lives only long
//! enough to produce proofs.

use std::collections::HashMap;

use alloy_primitives::{keccak256, B256};

use crate::error::{ProofError, Result};
use crate::nibbles::Nibbles;
use crate::node::{Node, NodeRef};
use crate::proof::Proof;
use crate::rlp;

/// Content-addressed storage for encoded trie nodes
pub trait NodeStore {
    /// Get node bytes by hash
    fn get(&self, hash: &B256) -> Option<Vec<u8>>;

    /// Store node bytes, returns their hash
    fn insert(&mut self, data: Vec<u8>) -> B256;
}

/// In-memory node store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    nodes: HashMap<B256, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl NodeStore for MemoryStore {
    fn get(&self, hash: &B256) -> Option<Vec<u8>> {
        self.nodes.get(hash).cloned()
    }

    fn insert(&mut self, data: Vec<u8>) -> B256 {
        let hash = keccak256(&data);
        self.nodes.insert(hash, data);
        hash
    }
}

/// Merkle Patricia trie over a block's transactions
#[derive(Debug)]
pub struct TxTrie<S: NodeStore = MemoryStore> {
    /// Root node, kept live; children spill into the store
    root: Node,
    /// Node store backing hash references
    store: S,
}

impl TxTrie<MemoryStore> {
    /// Create an empty trie backed by an in-memory store
    pub fn in_memory() -> Self {
        TxTrie::new(MemoryStore::new())
    }

    /// Build the transaction trie for a block: key `rlp(index)`, value the
    /// raw transaction blob. Same transaction set, same root, regardless
    /// of order.
    pub fn from_transactions(transactions: &[Vec<u8>]) -> Result<Self> {
        let mut trie = TxTrie::in_memory();
        for (index, tx) in transactions.iter().enumerate() {
            trie.insert(&rlp::encode_index(index as u64), tx.clone())?;
        }
        Ok(trie)
    }
}

impl<S: NodeStore> TxTrie<S> {
    /// Create an empty trie over the given store
    pub fn new(store: S) -> Self {
        TxTrie {
            root: Node::Empty,
            store,
        }
    }

    /// Root hash; the empty trie yields [`crate::node::EMPTY_ROOT`]
    pub fn root_hash(&self) -> B256 {
        self.root.hash()
    }

    /// Check if trie is empty
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Get value for key
    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.prove(key).ok().map(|proof| proof.value)
    }

    /// Insert key-value pair
    pub fn insert(&mut self, key: &[u8], value: Vec<u8>) -> Result<()> {
        let nibbles = Nibbles::from_bytes(key);
        let root = std::mem::take(&mut self.root);
        self.root = self.insert_node(root, nibbles, value)?;
        Ok(())
    }

    /// Walk from the root to `key`, recording the raw encoding of every
    /// visited node in root-first order. Inline children are recorded as
    /// their own proof elements.
    pub fn prove(&self, key: &[u8]) -> Result<Proof> {
        let mut remaining = Nibbles::from_bytes(key);
        let mut nodes: Vec<Vec<u8>> = Vec::new();
        let mut current = self.root.clone();

        loop {
            let next = match &current {
                Node::Empty => return Err(ProofError::KeyNotFound),

                Node::Leaf { path, value } => {
                    nodes.push(current.encode());
                    if *path != remaining {
                        return Err(ProofError::KeyNotFound);
                    }
                    return Ok(Proof {
                        key: key.to_vec(),
                        value: value.clone(),
                        nodes,
                    });
                }

                Node::Extension { path, child } => {
                    nodes.push(current.encode());
                    if !remaining.starts_with(path) {
                        return Err(ProofError::KeyNotFound);
                    }
                    remaining = remaining.slice(path.len());
                    self.resolve(child)?
                }

                Node::Branch { children, value } => {
                    nodes.push(current.encode());
                    match remaining.split_first() {
                        None => {
                            let value = value.clone().ok_or(ProofError::KeyNotFound)?;
                            return Ok(Proof {
                                key: key.to_vec(),
                                value,
                                nodes,
                            });
                        }
                        Some((index, rest)) => {
                            let slot = &children[index as usize];
                            if slot.is_empty() {
                                return Err(ProofError::KeyNotFound);
                            }
                            remaining = rest;
                            self.resolve(slot)?
                        }
                    }
                }
            };
            current = next;
        }
    }

    /// Resolve a node reference to a decoded node
    fn resolve(&self, node_ref: &NodeRef) -> Result<Node> {
        match node_ref {
            NodeRef::Empty => Ok(Node::Empty),
            NodeRef::Inline(raw) => Node::decode(raw),
            NodeRef::Hash(hash) => {
                let data = self
                    .store
                    .get(hash)
                    .ok_or_else(|| ProofError::NodeNotFound(hex::encode(hash)))?;
                Node::decode(&data)
            }
        }
    }

    /// Persist a node, returning how its parent should refer to it
    fn store_node(&mut self, node: Node) -> NodeRef {
        if node.is_empty() {
            return NodeRef::Empty;
        }
        let encoded = node.encode();
        if encoded.len() < 32 {
            NodeRef::Inline(encoded)
        } else {
            NodeRef::Hash(self.store.insert(encoded))
        }
    }

    /// Recursive insertion: diverge leaves/extensions at the first
    /// mismatching nibble into a branch
    fn insert_node(&mut self, node: Node, key: Nibbles, value: Vec<u8>) -> Result<Node> {
        match node {
            Node::Empty => Ok(Node::Leaf { path: key, value }),

            Node::Leaf {
                path: leaf_path,
                value: leaf_value,
            } => {
                if leaf_path == key {
                    // overwrite
                    return Ok(Node::Leaf { path: key, value });
                }

                let common = key.common_prefix_len(&leaf_path);
                let mut children: Box<[NodeRef; 16]> =
                    Box::new(std::array::from_fn(|_| NodeRef::Empty));
                let mut branch_value = None;

                self.place_entry(
                    &mut children,
                    &mut branch_value,
                    leaf_path.slice(common),
                    leaf_value,
                );
                self.place_entry(&mut children, &mut branch_value, key.slice(common), value);

                let branch = Node::Branch {
                    children,
                    value: branch_value,
                };
                Ok(self.wrap_prefix(key.slice_range(0, common), branch))
            }

            Node::Extension {
                path: ext_path,
                child,
            } => {
                let common = key.common_prefix_len(&ext_path);

                if common == ext_path.len() {
                    // full match: descend into the child
                    let child_node = self.resolve(&child)?;
                    let new_child = self.insert_node(child_node, key.slice(common), value)?;
                    return Ok(Node::Extension {
                        path: ext_path,
                        child: self.store_node(new_child),
                    });
                }

                // split the extension at the divergence point
                let mut children: Box<[NodeRef; 16]> =
                    Box::new(std::array::from_fn(|_| NodeRef::Empty));
                let mut branch_value = None;

                let ext_rest = ext_path.slice(common);
                if let Some((index, rest)) = ext_rest.split_first() {
                    children[index as usize] = if rest.is_empty() {
                        child
                    } else {
                        let shortened = Node::Extension { path: rest, child };
                        self.store_node(shortened)
                    };
                }

                self.place_entry(&mut children, &mut branch_value, key.slice(common), value);

                let branch = Node::Branch {
                    children,
                    value: branch_value,
                };
                Ok(self.wrap_prefix(ext_path.slice_range(0, common), branch))
            }

            Node::Branch {
                mut children,
                value: branch_value,
            } => match key.split_first() {
                None => Ok(Node::Branch {
                    children,
                    value: Some(value),
                }),
                Some((index, rest)) => {
                    let slot = std::mem::take(&mut children[index as usize]);
                    let child_node = self.resolve(&slot)?;
                    let new_child = self.insert_node(child_node, rest, value)?;
                    children[index as usize] = self.store_node(new_child);
                    Ok(Node::Branch {
                        children,
                        value: branch_value,
                    })
                }
            },
        }
    }

    /// Attach an entry under a branch being assembled: an exhausted key
    /// lands in the value slot, otherwise the first nibble picks the slot
    /// and the rest becomes a leaf
    fn place_entry(
        &mut self,
        children: &mut [NodeRef; 16],
        branch_value: &mut Option<Vec<u8>>,
        key: Nibbles,
        value: Vec<u8>,
    ) {
        match key.split_first() {
            None => *branch_value = Some(value),
            Some((index, rest)) => {
                let leaf = Node::Leaf { path: rest, value };
                children[index as usize] = self.store_node(leaf);
            }
        }
    }

    /// Wrap a node in an extension when the shared prefix is non-empty
    fn wrap_prefix(&mut self, prefix: Nibbles, node: Node) -> Node {
        if prefix.is_empty() {
            node
        } else {
            Node::Extension {
                path: prefix,
                child: self.store_node(node),
            }
        }
    }
}
