//! Quote workflow types
//!
//! The quoting service hands out `{ quote_id, transaction }`; the submission
//! service takes `{ network, quote_id, signed_payload, travel_rule_compliant }`
//! and answers with a hash or signature used only for reporting. This module
//! holds those shapes and the network catalogue, not the transport.

use crate::errors::{QuoteSignError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Signing family a network belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainFamily {
    Evm,
    Solana,
}

impl ChainFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainFamily::Evm => "evm",
            ChainFamily::Solana => "solana",
        }
    }
}

/// Networks the quoting service settles on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    Ethereum,
    Sepolia,
    Solana,
    SolanaDevnet,
}

impl Network {
    /// Wire name used in quote and submission requests
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Ethereum => "eth",
            Network::Sepolia => "sepolia",
            Network::Solana => "solana",
            Network::SolanaDevnet => "solana-devnet",
        }
    }

    pub fn family(&self) -> ChainFamily {
        match self {
            Network::Ethereum | Network::Sepolia => ChainFamily::Evm,
            Network::Solana | Network::SolanaDevnet => ChainFamily::Solana,
        }
    }

    /// Block explorer page for a submitted transaction hash or signature
    pub fn explorer_tx_url(&self, reference: &str) -> String {
        match self {
            Network::Ethereum => format!("https://etherscan.io/tx/{}", reference),
            Network::Sepolia => format!("https://sepolia.etherscan.io/tx/{}", reference),
            Network::Solana => format!("https://explorer.solana.com/tx/{}", reference),
            Network::SolanaDevnet => {
                format!("https://explorer.solana.com/tx/{}?cluster=devnet", reference)
            }
        }
    }
}

impl FromStr for Network {
    type Err = QuoteSignError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "eth" | "ethereum" | "mainnet" => Ok(Network::Ethereum),
            "sepolia" => Ok(Network::Sepolia),
            "solana" | "sol" => Ok(Network::Solana),
            "solana-devnet" | "devnet" => Ok(Network::SolanaDevnet),
            _ => Err(QuoteSignError::UnsupportedNetwork(s.to_string())),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A quote as returned by the quoting service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub quote_id: String,
    /// Unsigned payload: `0x02...` hex for EVM, base64 for Solana
    #[serde(default)]
    pub transaction: Option<String>,
}

impl Quote {
    /// Parse a quote response, bare or wrapped as `{ "quote": { ... } }`
    pub fn from_response(json: &str) -> Result<Self> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Envelope {
            Wrapped { quote: Quote },
            Bare(Quote),
        }

        let envelope: Envelope = serde_json::from_str(json)
            .map_err(|e| QuoteSignError::InvalidQuote(format!("Unreadable quote response: {}", e)))?;

        Ok(match envelope {
            Envelope::Wrapped { quote } => quote,
            Envelope::Bare(quote) => quote,
        })
    }

    /// The unsigned payload, which every signable quote must carry
    pub fn unsigned_transaction(&self) -> Result<&str> {
        match self.transaction.as_deref().map(str::trim) {
            Some(tx) if !tx.is_empty() => Ok(tx),
            _ => Err(QuoteSignError::InvalidQuote(format!(
                "Quote {} missing unsigned transaction payload",
                self.quote_id
            ))),
        }
    }
}

/// Body of the submission call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitTransactionRequest {
    pub network: String,
    pub quote_id: String,
    pub signed_payload: String,
    pub travel_rule_compliant: bool,
}

/// What the submission service answers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitTransactionResponse {
    #[serde(default)]
    pub tx_hash: Option<String>,
    #[serde(default)]
    pub signature: Option<String>,
}

impl SubmitTransactionResponse {
    /// Reporting reference: the Solana signature if present, else the hash
    pub fn reference(&self) -> Option<&str> {
        non_empty(&self.signature).or_else(|| non_empty(&self.tx_hash))
    }

    pub fn explorer_url(&self, network: Network) -> Option<String> {
        self.reference().map(|r| network.explorer_tx_url(r))
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_parsing() {
        assert_eq!("sepolia".parse::<Network>().unwrap(), Network::Sepolia);
        assert_eq!("Solana-Devnet".parse::<Network>().unwrap(), Network::SolanaDevnet);
        assert_eq!("ethereum".parse::<Network>().unwrap(), Network::Ethereum);
        assert!(matches!(
            "bitcoin".parse::<Network>(),
            Err(QuoteSignError::UnsupportedNetwork(_))
        ));
    }

    #[test]
    fn test_network_families() {
        assert_eq!(Network::Sepolia.family(), ChainFamily::Evm);
        assert_eq!(Network::SolanaDevnet.family(), ChainFamily::Solana);
        assert_eq!(Network::SolanaDevnet.to_string(), "solana-devnet");
    }

    #[test]
    fn test_explorer_urls() {
        assert_eq!(
            Network::Sepolia.explorer_tx_url("0xabc"),
            "https://sepolia.etherscan.io/tx/0xabc"
        );
        assert_eq!(
            Network::SolanaDevnet.explorer_tx_url("5sig"),
            "https://explorer.solana.com/tx/5sig?cluster=devnet"
        );
    }

    #[test]
    fn test_quote_from_wrapped_and_bare_response() {
        let wrapped = r#"{"quote": {"quote_id": "q-1", "transaction": "0x02c0", "fee": "12"}}"#;
        let bare = r#"{"quote_id": "q-1", "transaction": "0x02c0"}"#;

        let a = Quote::from_response(wrapped).unwrap();
        let b = Quote::from_response(bare).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.unsigned_transaction().unwrap(), "0x02c0");
    }

    #[test]
    fn test_quote_without_transaction() {
        let quote = Quote::from_response(r#"{"quote_id": "q-2"}"#).unwrap();
        assert!(matches!(
            quote.unsigned_transaction(),
            Err(QuoteSignError::InvalidQuote(_))
        ));

        assert!(matches!(
            Quote::from_response("[]"),
            Err(QuoteSignError::InvalidQuote(_))
        ));
    }

    #[test]
    fn test_submit_request_wire_names() {
        let request = SubmitTransactionRequest {
            network: "sepolia".to_string(),
            quote_id: "q-1".to_string(),
            signed_payload: "0x02".to_string(),
            travel_rule_compliant: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["quote_id"], "q-1");
        assert_eq!(json["signed_payload"], "0x02");
        assert_eq!(json["travel_rule_compliant"], false);
    }

    #[test]
    fn test_submit_response_reference() {
        let solana: SubmitTransactionResponse =
            serde_json::from_str(r#"{"signature": "5sig", "tx_hash": "other"}"#).unwrap();
        assert_eq!(solana.reference(), Some("5sig"));

        let evm: SubmitTransactionResponse = serde_json::from_str(r#"{"tx_hash": "0xabc"}"#).unwrap();
        assert_eq!(
            evm.explorer_url(Network::Sepolia).as_deref(),
            Some("https://sepolia.etherscan.io/tx/0xabc")
        );

        assert_eq!(SubmitTransactionResponse::default().reference(), None);
    }

    #[test]
    fn test_empty_signature_falls_back_to_tx_hash() {
        let response: SubmitTransactionResponse =
            serde_json::from_str(r#"{"signature": "", "tx_hash": "0xabc"}"#).unwrap();
        assert_eq!(response.reference(), Some("0xabc"));

        let both_empty: SubmitTransactionResponse =
            serde_json::from_str(r#"{"signature": "", "tx_hash": ""}"#).unwrap();
        assert_eq!(both_empty.reference(), None);
    }
}
