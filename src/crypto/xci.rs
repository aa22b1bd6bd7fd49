//! AES-128-CBC decryption of the gamecard's wrapped header.
//!
//! The 0x70-byte region is decrypted as one unit with its own IV.

use aes::Aes128;
use cbc::cipher::block_padding::NoPadding;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};

use super::utils::fixed;
use crate::error::{CryptoError, Result};

/// Wrapped header key size in bytes.
pub const XCI_KEY_SIZE: usize = 0x10;

/// Wrapped header IV size in bytes.
pub const XCI_IV_SIZE: usize = 0x10;

/// Size of the wrapped header region.
pub const XCI_HEADER_SIZE: usize = 0x70;

type Aes128CbcDec = cbc::Decryptor<Aes128>;
type Aes128CbcEnc = cbc::Encryptor<Aes128>;

type Validated = ([u8; XCI_KEY_SIZE], [u8; XCI_IV_SIZE], [u8; XCI_HEADER_SIZE]);

fn validate(key: &[u8], iv: &[u8], contents: &[u8]) -> Result<Validated> {
    Ok((
        fixed("key", key)?,
        fixed("iv", iv)?,
        fixed("contents", contents)?,
    ))
}

/// Decrypt the 0x70-byte wrapped header.
pub fn decrypt_xci_header(
    key: impl AsRef<[u8]>,
    iv: impl AsRef<[u8]>,
    contents: impl AsRef<[u8]>,
) -> Result<[u8; XCI_HEADER_SIZE]> {
    let (key, iv, mut buffer) = validate(key.as_ref(), iv.as_ref(), contents.as_ref())?;

    Aes128CbcDec::new(&key.into(), &iv.into())
        .decrypt_padded_mut::<NoPadding>(&mut buffer)
        .map_err(|e| CryptoError::PrimitiveFailure(format!("xci header: {:?}", e)))?;

    Ok(buffer)
}

/// Encrypt a plaintext wrapped header. Inverse of [`decrypt_xci_header`].
pub fn encrypt_xci_header(
    key: impl AsRef<[u8]>,
    iv: impl AsRef<[u8]>,
    contents: impl AsRef<[u8]>,
) -> Result<[u8; XCI_HEADER_SIZE]> {
    let (key, iv, mut buffer) = validate(key.as_ref(), iv.as_ref(), contents.as_ref())?;

    Aes128CbcEnc::new(&key.into(), &iv.into())
        .encrypt_padded_mut::<NoPadding>(&mut buffer, XCI_HEADER_SIZE)
        .map_err(|e| CryptoError::PrimitiveFailure(format!("xci header: {:?}", e)))?;

    Ok(buffer)
}
