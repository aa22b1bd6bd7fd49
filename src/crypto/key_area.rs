//! AES-128-ECB key area decryption.
//!
//! The key area is a list of 0x10-byte wrapped keys. Each element is
//! decrypted on its own with the same key; position in the list is the key
//! slot, so output order always matches input order.

use aes::cipher::generic_array::GenericArray;
use aes::Aes128;
use ecb::cipher::{BlockDecryptMut, BlockEncryptMut, KeyInit};

use super::utils::fixed;
use crate::error::Result;

/// Key area key size in bytes.
pub const KEY_AREA_KEY_SIZE: usize = 0x10;

/// Size of one key area element.
pub const KEY_AREA_ENTRY_SIZE: usize = 0x10;

type Aes128EcbDec = ecb::Decryptor<Aes128>;
type Aes128EcbEnc = ecb::Encryptor<Aes128>;

fn decrypt_entry(key: &[u8; KEY_AREA_KEY_SIZE], entry: &[u8; KEY_AREA_ENTRY_SIZE]) -> [u8; KEY_AREA_ENTRY_SIZE] {
    let mut ecb = Aes128EcbDec::new(GenericArray::from_slice(key));
    let mut out = *entry;
    ecb.decrypt_block_mut(GenericArray::from_mut_slice(&mut out));
    out
}

fn validate_entries<E: AsRef<[u8]>>(entries: &[E]) -> Result<Vec<[u8; KEY_AREA_ENTRY_SIZE]>> {
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| fixed(&format!("area[{}]", i), entry.as_ref()))
        .collect()
}

/// Decrypt a single key area element.
pub fn decrypt_key_area_entry(
    key: impl AsRef<[u8]>,
    entry: impl AsRef<[u8]>,
) -> Result<[u8; KEY_AREA_ENTRY_SIZE]> {
    let key: [u8; KEY_AREA_KEY_SIZE] = fixed("key", key.as_ref())?;
    let entry: [u8; KEY_AREA_ENTRY_SIZE] = fixed("entry", entry.as_ref())?;
    Ok(decrypt_entry(&key, &entry))
}

/// Decrypt every element of a key area.
///
/// All elements are validated before any is decrypted; the first element
/// with a bad length is named in the error (`area[i]`).
pub fn decrypt_key_area<E: AsRef<[u8]>>(
    key: impl AsRef<[u8]>,
    area: &[E],
) -> Result<Vec<[u8; KEY_AREA_ENTRY_SIZE]>> {
    let key: [u8; KEY_AREA_KEY_SIZE] = fixed("key", key.as_ref())?;
    let entries = validate_entries(area)?;

    Ok(entries.iter().map(|entry| decrypt_entry(&key, entry)).collect())
}

/// Encrypt key area elements. Inverse of [`decrypt_key_area`].
pub fn encrypt_key_area<E: AsRef<[u8]>>(
    key: impl AsRef<[u8]>,
    area: &[E],
) -> Result<Vec<[u8; KEY_AREA_ENTRY_SIZE]>> {
    let key: [u8; KEY_AREA_KEY_SIZE] = fixed("key", key.as_ref())?;
    let entries = validate_entries(area)?;

    Ok(entries
        .into_iter()
        .map(|mut entry| {
            let mut ecb = Aes128EcbEnc::new(GenericArray::from_slice(&key));
            ecb.encrypt_block_mut(GenericArray::from_mut_slice(&mut entry));
            entry
        })
        .collect())
}
