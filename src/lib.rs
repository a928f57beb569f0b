//! quotesign - signs unsigned transactions handed out by a quoting service
//!
//! Two pipelines, one contract (`unsigned bytes + key -> signed bytes`):
//! - EVM type-2 (EIP-1559): RLP decode, keccak256 digest, secp256k1 sign,
//!   canonical re-encode with `yParity`, `r`, `s` appended
//! - Solana: versioned container first, legacy container as fallback,
//!   Ed25519 signature written into the signer's slot only
//!
//! # Security
//!
//! - Signers are pure functions over borrowed key handles
//! - Decoded key material is zeroized on drop
//! - Keys and signatures are never logged

pub mod codec;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod keystore;
pub mod quote;
pub mod security;
pub mod signer;

pub use errors::{QuoteSignError, Result};
