//! Zeroize-on-drop ownership for decoded key material
//!
//! Private keys arrive as hex strings or JSON byte arrays. Every decoded
//! intermediate is held in a [`SecureBytes`] so it is wiped as soon as the
//! key handle has been built.

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Owned byte buffer that is zeroed when dropped
#[derive(ZeroizeOnDrop)]
pub struct SecureBytes {
    inner: Vec<u8>,
}

impl SecureBytes {
    pub fn new(data: Vec<u8>) -> Self {
        Self { inner: data }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn expose(&self) -> &[u8] {
        &self.inner
    }

    /// Wipe the contents now rather than at drop time
    pub fn zeroize_now(&mut self) {
        self.inner.zeroize();
    }

    /// Decode hex (with or without a `0x` prefix) straight into a secure buffer
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let digits = s.trim();
        let digits = digits.strip_prefix("0x").unwrap_or(digits);
        hex::decode(digits).map(Self::new)
    }
}

impl std::fmt::Debug for SecureBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecureBytes([REDACTED; {}])", self.inner.len())
    }
}
