//! Signing services
//!
//! Both pipelines share one contract: unsigned payload in, signed payload
//! out. [`PayloadSigner`] expresses it over the text encodings the quoting
//! service uses (hex for EVM, base64 for Solana).

pub mod ethereum;
pub mod solana;

pub use ethereum::{sign_type2, sign_type2_hex, SignedEip1559Transaction};
pub use solana::{sign_base64, sign_transaction, SignedSolanaTransaction, TransactionFormat};

use crate::crypto::{EthKeyPair, SolKeyPair};
use crate::errors::{QuoteSignError, Result};
use crate::keystore::SignerKey;
use crate::quote::{ChainFamily, Network, Quote, SubmitTransactionRequest};
use tracing::info;

/// Signs an encoded unsigned payload
pub trait PayloadSigner {
    fn family(&self) -> ChainFamily;

    fn sign_payload(&self, unsigned: &str) -> Result<String>;
}

impl PayloadSigner for EthKeyPair {
    fn family(&self) -> ChainFamily {
        ChainFamily::Evm
    }

    fn sign_payload(&self, unsigned: &str) -> Result<String> {
        let raw = ethereum::decode_hex_payload(unsigned)?;
        Ok(sign_type2(&raw, self)?.raw_tx_hex())
    }
}

impl PayloadSigner for SolKeyPair {
    fn family(&self) -> ChainFamily {
        ChainFamily::Solana
    }

    fn sign_payload(&self, unsigned: &str) -> Result<String> {
        sign_base64(unsigned, self)
    }
}

impl PayloadSigner for SignerKey {
    fn family(&self) -> ChainFamily {
        SignerKey::family(self)
    }

    fn sign_payload(&self, unsigned: &str) -> Result<String> {
        match self {
            SignerKey::Evm(keypair) => keypair.sign_payload(unsigned),
            SignerKey::Solana(keypair) => keypair.sign_payload(unsigned),
        }
    }
}

/// Sign a quote's unsigned payload and build the submission request
pub fn sign_quote(
    quote: &Quote,
    network: Network,
    signer: &dyn PayloadSigner,
    travel_rule_compliant: bool,
) -> Result<SubmitTransactionRequest> {
    if signer.family() != network.family() {
        return Err(QuoteSignError::UnsupportedNetwork(format!(
            "{} key cannot sign for network {}",
            signer.family().as_str(),
            network
        )));
    }

    let unsigned = quote.unsigned_transaction()?;
    let signed_payload = signer.sign_payload(unsigned)?;

    info!(
        "Signed quote {} for {} ({} chars)",
        quote.quote_id,
        network,
        signed_payload.len()
    );

    Ok(SubmitTransactionRequest {
        network: network.as_str().to_string(),
        quote_id: quote.quote_id.clone(),
        signed_payload,
        travel_rule_compliant,
    })
}
