//! Solana-side concerns: wallet identity, transaction wire formats, and
//! JSON-RPC access for blockhash fetch and broadcast.

pub mod rpc;
pub mod tx;
pub mod wallet;
