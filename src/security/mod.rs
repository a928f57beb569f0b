//! Secure handling of private key material
//!
//! Decoded key bytes are owned by [`SecureBytes`], which zeroes its buffer
//! on drop. Hex key strings travel as `secrecy::SecretString`.

pub mod zeroize;

pub use self::zeroize::SecureBytes;
