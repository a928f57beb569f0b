//! Key files
//!
//! Loads signing keys from the JSON files the quoting workflow keeps per
//! network (`keys/<network>/<name>.json`).

pub mod loader;

pub use loader::{load_evm_key, load_key, load_solana_key, SignerKey};
