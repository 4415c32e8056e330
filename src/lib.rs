//! Automated seller for Tensor marketplace bids.
//!
//! Queries a wallet's NFT holdings, finds the best acceptable collection
//! bid, asks Tensor to build the sale transaction(s), signs them locally,
//! and submits them to Solana. One run sells at most one item.

pub mod chain;
pub mod config;
pub mod execution;
pub mod market;
pub mod monitoring;
