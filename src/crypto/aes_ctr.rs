//! AES-128-CTR content decryption.
//!
//! The 16-byte counter block is split in two: the high 8 bytes are the
//! section's fixed nonce, the low 8 bytes are a big-endian block counter.
//! The counter for the block covering absolute offset `o` is
//! `seed_low64 + o / 16`, so any block can be decrypted without touching
//! the ones before it.
//!
//! Uses Ctr64BE (big-endian 64-bit counter), which increments exactly the
//! low half and wraps within it.

use aes::Aes128;
use ctr::cipher::{KeyIvInit, StreamCipher};

use super::utils::fixed;
use crate::error::{CryptoError, Result};

/// Content key size in bytes.
pub const CTR_KEY_SIZE: usize = 0x10;

/// Counter seed size in bytes (128-bit counter block).
pub const CTR_SEED_SIZE: usize = 0x10;

/// AES block size in bytes.
pub const AES_BLOCK_SIZE: usize = 16;

type Aes128Ctr64BE = ctr::Ctr64BE<Aes128>;

/// Counter block for `block_index`, derived from `seed`.
///
/// Byte `15 - j` of the low half holds byte `j` (little end first) of
/// `seed_low64 + block_index`.
pub fn counter_for_block(seed: &[u8; CTR_SEED_SIZE], block_index: u64) -> [u8; CTR_SEED_SIZE] {
    let mut counter = [0u8; CTR_SEED_SIZE];
    counter[..8].copy_from_slice(&seed[..8]);

    let mut low = [0u8; 8];
    low.copy_from_slice(&seed[8..]);
    let value = u64::from_be_bytes(low).wrapping_add(block_index);
    counter[8..].copy_from_slice(&value.to_be_bytes());
    counter
}

/// XOR the keystream starting at `first_block` into `buf` in place.
///
/// `buf` must start on a block boundary; its length need not be a
/// multiple of the block size.
pub fn apply_ctr_keystream(
    key: &[u8; CTR_KEY_SIZE],
    seed: &[u8; CTR_SEED_SIZE],
    first_block: u64,
    buf: &mut [u8],
) -> Result<()> {
    let counter = counter_for_block(seed, first_block);
    let mut cipher = Aes128Ctr64BE::new(key.into(), &counter.into());
    cipher
        .try_apply_keystream(buf)
        .map_err(|e| CryptoError::PrimitiveFailure(format!("ctr keystream: {:?}", e)))
}

/// Encrypt a whole stream from block 0.
///
/// CTR output is the same size as the input.
pub fn encrypt_aes_ctr(
    plaintext: &[u8],
    key: impl AsRef<[u8]>,
    seed: impl AsRef<[u8]>,
) -> Result<Vec<u8>> {
    let key: [u8; CTR_KEY_SIZE] = fixed("key", key.as_ref())?;
    let seed: [u8; CTR_SEED_SIZE] = fixed("counter", seed.as_ref())?;

    let mut output = plaintext.to_vec();
    apply_ctr_keystream(&key, &seed, 0, &mut output)?;
    Ok(output)
}

/// Decrypt a whole stream from block 0.
pub fn decrypt_aes_ctr(
    ciphertext: &[u8],
    key: impl AsRef<[u8]>,
    seed: impl AsRef<[u8]>,
) -> Result<Vec<u8>> {
    // CTR mode: decrypt is identical to encrypt
    encrypt_aes_ctr(ciphertext, key, seed)
}

/// Decrypt `len` bytes at `start` from an in-memory ciphertext stream.
///
/// Only the blocks covering `[start, start + len)` are processed. Unlike a
/// clamped slice, a window past the end is an error.
pub fn decrypt_aes_ctr_range(
    ciphertext: &[u8],
    key: impl AsRef<[u8]>,
    seed: impl AsRef<[u8]>,
    start: usize,
    len: usize,
) -> Result<Vec<u8>> {
    let key: [u8; CTR_KEY_SIZE] = fixed("key", key.as_ref())?;
    let seed: [u8; CTR_SEED_SIZE] = fixed("counter", seed.as_ref())?;

    let end = start
        .checked_add(len)
        .filter(|&end| end <= ciphertext.len())
        .ok_or(CryptoError::OutOfRange {
            offset: start as u64,
            size: len as u64,
            length: ciphertext.len() as u64,
        })?;
    if len == 0 {
        return Ok(Vec::new());
    }

    let start_block = start / AES_BLOCK_SIZE;
    let aligned_start = start_block * AES_BLOCK_SIZE;

    let mut decrypted = ciphertext[aligned_start..end].to_vec();
    apply_ctr_keystream(&key, &seed, start_block as u64, &mut decrypted)?;

    // Drop the leading bytes of the first block
    decrypted.drain(..start - aligned_start);
    Ok(decrypted)
}
