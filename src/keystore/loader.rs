//! Key loader
//!
//! EVM key files hold `{ "privateKey": "0x..." }`; Solana key files hold the
//! 64-byte `seed || pubkey` secret as a JSON array of numbers. File contents
//! and decoded bytes are zeroized once the key handle exists.

use crate::crypto::{EthKeyPair, SolKeyPair};
use crate::errors::{QuoteSignError, Result};
use crate::quote::ChainFamily;
use crate::security::SecureBytes;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;
use zeroize::Zeroizing;

/// A loaded signing key for either chain family
#[derive(Debug)]
pub enum SignerKey {
    Evm(EthKeyPair),
    Solana(SolKeyPair),
}

impl SignerKey {
    pub fn family(&self) -> ChainFamily {
        match self {
            SignerKey::Evm(_) => ChainFamily::Evm,
            SignerKey::Solana(_) => ChainFamily::Solana,
        }
    }

    /// Checksummed EVM address or base58 Solana public key
    pub fn public_address(&self) -> String {
        match self {
            SignerKey::Evm(keypair) => keypair.address_checksum(),
            SignerKey::Solana(keypair) => keypair.public_key_base58(),
        }
    }
}

#[derive(Deserialize)]
struct EvmKeyFile {
    #[serde(rename = "privateKey", default)]
    private_key: Option<SecretString>,
}

/// Load a key file for the given chain family
pub fn load_key(path: impl AsRef<Path>, family: ChainFamily) -> Result<SignerKey> {
    match family {
        ChainFamily::Evm => load_evm_key(path).map(SignerKey::Evm),
        ChainFamily::Solana => load_solana_key(path).map(SignerKey::Solana),
    }
}

/// Load an EVM key file (`{ "privateKey": "0x..." }`)
pub fn load_evm_key(path: impl AsRef<Path>) -> Result<EthKeyPair> {
    let path = path.as_ref();
    let contents = read_key_file(path)?;

    let file: EvmKeyFile = serde_json::from_str(&contents)?;
    let private_key = file
        .private_key
        .filter(|key| !key.expose_secret().trim().is_empty())
        .ok_or_else(|| {
            QuoteSignError::InvalidKeyFormat(format!("No privateKey in {}", path.display()))
        })?;

    let keypair = EthKeyPair::from_hex(&private_key)?;
    debug!("Loaded EVM key {} from {:?}", keypair.address_checksum(), path);
    Ok(keypair)
}

/// Load a Solana key file (JSON array of 64 bytes)
pub fn load_solana_key(path: impl AsRef<Path>) -> Result<SolKeyPair> {
    let path = path.as_ref();
    let contents = read_key_file(path)?;

    let secret = SecureBytes::new(serde_json::from_str::<Vec<u8>>(&contents).map_err(|e| {
        QuoteSignError::InvalidKeyFormat(format!(
            "{} is not a JSON byte array: {}",
            path.display(),
            e
        ))
    })?);

    let keypair = SolKeyPair::from_keypair_bytes(secret.expose())?;
    debug!("Loaded Solana key {} from {:?}", keypair.public_key_base58(), path);
    Ok(keypair)
}

fn read_key_file(path: &Path) -> Result<Zeroizing<String>> {
    fs::read_to_string(path).map(Zeroizing::new).map_err(|e| {
        QuoteSignError::StorageError(format!("Cannot read key file {}: {}", path.display(), e))
    })
}
