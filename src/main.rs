//! # Transaction Proof Demo
//!
//! Builds a small block's transaction trie, proves one transaction and
//! shows that tampering is rejected.

use tx_proof::{
    build_and_prove, encode_index, transactions_root, verify_against_header, verify_proof,
    BlockHeader, TxTrie, EMPTY_ROOT,
};

use alloy_primitives::keccak256;

fn main() -> tx_proof::Result<()> {
    println!("=== Transaction inclusion proof demo ===\n");

    // Stand-ins for RLP-encoded transactions fetched from a block
    let transactions: Vec<Vec<u8>> = (0u8..3)
        .map(|i| {
            let mut blob = vec![0xf8, i];
            blob.extend((0..48).map(|j| i.wrapping_mul(31).wrapping_add(j)));
            blob
        })
        .collect();

    let root = transactions_root(&transactions)?;
    println!("Block with {} transactions", transactions.len());
    println!("Transactions root: 0x{}", hex::encode(root));
    println!();

    // Prove the transaction at index 1
    let proof = build_and_prove(&transactions, 1)?;
    println!("Proof for index 1:");
    println!("  key:   0x{}", hex::encode(&proof.key));
    println!("  value: {} bytes", proof.value.len());
    println!("  nodes: {}", proof.nodes.len());
    for (i, node) in proof.nodes.iter().enumerate() {
        println!("    [{}] {} bytes, keccak 0x{}...",
            i, node.len(), &hex::encode(keccak256(node))[..16]);
    }
    println!();

    println!("Verify against real root:   {}", verify_proof(root, &proof));

    // A header from elsewhere carrying the same root
    let header = BlockHeader {
        block_hash: keccak256(b"demo block"),
        transactions_root: root,
    };
    println!("Verify against header:      {}", verify_against_header(&header, &proof));

    // Wrong root: a trie over only the first two transactions
    let shorter_root = transactions_root(&transactions[..2])?;
    println!("Verify against {{0,1}} root:  {}", verify_proof(shorter_root, &proof));

    // Tampering: flip one bit in the middle of the last proof node
    let mut tampered = proof.clone();
    if let Some(node) = tampered.nodes.last_mut() {
        let mid = node.len() / 2;
        node[mid] ^= 0x01;
    }
    println!("Verify tampered proof:      {}", verify_proof(root, &tampered));

    // Substituted value
    let mut forged = proof.clone();
    forged.value = transactions[2].clone();
    println!("Verify substituted value:   {}", verify_proof(root, &forged));
    println!();

    // Empty block edge case
    let empty = TxTrie::from_transactions(&[])?;
    println!("Empty block root: 0x{}", hex::encode(empty.root_hash()));
    println!("Matches EMPTY_ROOT: {}", empty.root_hash() == EMPTY_ROOT);
    println!(
        "Proving index 0 in an empty block: {:?}",
        empty.prove(&encode_index(0)).unwrap_err()
    );

    Ok(())
}
