//! Cryptographic utilities for Ethereum and Solana

pub mod eth;
pub mod sol;

pub use eth::{checksum_address, keccak256, EthKeyPair, EthSignature};
pub use sol::{verify_signature, SolKeyPair, SolSignature};
