//! Length validators and byte helpers.
//!
//! Every public entry point accepts any `AsRef<[u8]>` and funnels it through
//! one of these before a cipher primitive sees it.

use thiserror::Error;

use crate::error::{CryptoError, Expected, Result};

#[derive(Debug, Error)]
pub enum UtilError {
    #[error("Invalid hex string")]
    InvalidHex,
}

/// Copy `bytes` into a fixed-size array, rejecting any other length.
pub fn fixed<const N: usize>(name: &str, bytes: &[u8]) -> Result<[u8; N]> {
    bytes
        .try_into()
        .map_err(|_| CryptoError::size_mismatch(name, Expected::Exactly(N), bytes.len()))
}

/// Copy the first `N` bytes of `bytes`, rejecting anything shorter.
pub fn at_least<const N: usize>(name: &str, bytes: &[u8]) -> Result<[u8; N]> {
    if bytes.len() < N {
        return Err(CryptoError::size_mismatch(
            name,
            Expected::AtLeast(N),
            bytes.len(),
        ));
    }
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    Ok(out)
}

/// Convert a hex string to bytes. Surrounding whitespace is ignored.
pub fn hex_to_bytes(hex: &str) -> std::result::Result<Vec<u8>, UtilError> {
    hex::decode(hex.trim()).map_err(|_| UtilError::InvalidHex)
}

/// Convert bytes to a hex string.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}
