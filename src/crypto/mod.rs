//! Fixed-layout decryptors and the counter-mode primitives.
//!
//! Header (XTS), key area (ECB) and the gamecard's wrapped header (CBC) are
//! decrypted once per container open. Content uses AES-128-CTR, see
//! `aes_ctr` and [`crate::reader::CtrReader`].

pub mod aes_ctr;
pub mod header;
pub mod key_area;
pub mod utils;
pub mod xci;

#[cfg(test)]
mod tests;

// Re-export primary functions for convenience
pub use aes_ctr::{counter_for_block, decrypt_aes_ctr, decrypt_aes_ctr_range, encrypt_aes_ctr};
pub use header::{decrypt_header, encrypt_header, HEADER_SIZE};
pub use key_area::{decrypt_key_area, decrypt_key_area_entry, encrypt_key_area};
pub use utils::{bytes_to_hex, hex_to_bytes};
pub use xci::{decrypt_xci_header, encrypt_xci_header, XCI_HEADER_SIZE};
