//! # Error types for proof generation and verification

use thiserror::Error;

/// Failures surfaced by the codec, builder, generator and verifier.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProofError {
    /// RLP input is structurally invalid or not in canonical form.
    #[error("malformed RLP encoding: {0}")]
    MalformedEncoding(&'static str),

    /// Hex-prefix byte string is empty or carries an invalid flag/pad.
    #[error("invalid hex-prefix encoding")]
    InvalidHexPrefix,

    /// Decoded RLP shape matches none of the four trie node types.
    #[error("malformed trie node: {0}")]
    MalformedNode(&'static str),

    /// The target key is absent from the built trie (generation only).
    #[error("key not found in trie")]
    KeyNotFound,

    /// A hash reference could not be resolved from the node store.
    /// Indicates a bug on the trusted side, never an adversarial input.
    #[error("node not found in store: {0}")]
    NodeNotFound(String),

    /// Umbrella for every verification failure: hash mismatch, value
    /// mismatch, or premature exhaustion of nodes or key nibbles.
    #[error("proof does not match the given root")]
    ProofMismatch,
}

/// Result type for proof operations.
pub type Result<T> = std::result::Result<T, ProofError>;
