//! Wire codecs for the payloads the signers rewrite

pub mod rlp;
pub mod solana;

pub use self::rlp::RlpItem;
pub use self::solana::{parse_transaction, ParsedTransaction};
