//! AES-128-XTS header decryption.
//!
//! The first 0xC00 bytes of a content archive are encrypted in 0x200-byte
//! sectors with a 0x20-byte key split into data and tweak halves. The tweak
//! is the sector index stored big-endian, not the IEEE little-endian form.
//!
//! Sectors 0 and 1 hold the archive header proper. The four filesystem
//! headers that follow are sectors 2..=5 for `NCA3`, while `NCA2` encrypts
//! each of them on its own as sector 0.

use aes::cipher::generic_array::GenericArray;
use aes::cipher::KeyInit;
use aes::Aes128;
use xts_mode::Xts128;

use super::utils::{at_least, fixed};
use crate::error::Result;

/// Header key size in bytes (two AES-128 keys).
pub const HEADER_KEY_SIZE: usize = 0x20;

/// Size of the encrypted header region.
pub const HEADER_SIZE: usize = 0xC00;

/// XTS sector size used by the header.
pub const HEADER_SECTOR_SIZE: usize = 0x200;

/// Bytes covered by the archive header proper (sectors 0 and 1).
const MAIN_HEADER_SIZE: usize = 0x400;

const MAGIC_RANGE: std::ops::Range<usize> = 0x200..0x204;

/// Big-endian sector tweak.
pub fn sector_tweak(sector_index: u128) -> [u8; 0x10] {
    sector_index.to_be_bytes()
}

/// Build an XTS context from a 0x20-byte key.
pub(crate) fn xts_from_key(key: &[u8; HEADER_KEY_SIZE]) -> Xts128<Aes128> {
    let data = Aes128::new(GenericArray::from_slice(&key[..0x10]));
    let tweak = Aes128::new(GenericArray::from_slice(&key[0x10..]));
    Xts128::new(data, tweak)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionLayout {
    /// Filesystem headers continue the sector numbering (sectors 2..=5).
    Contiguous,
    /// Every filesystem header is its own sector 0.
    Independent,
}

fn section_layout(magic: &[u8]) -> SectionLayout {
    match magic {
        b"NCA3" => SectionLayout::Contiguous,
        b"NCA2" => SectionLayout::Independent,
        other => {
            log::warn!(
                "Unrecognised header magic {:02X?}, assuming contiguous sector layout",
                other
            );
            SectionLayout::Contiguous
        }
    }
}

/// Decrypt the 0xC00-byte header.
///
/// `header` may be longer than 0xC00 bytes; only the leading region is used.
pub fn decrypt_header(key: impl AsRef<[u8]>, header: impl AsRef<[u8]>) -> Result<[u8; HEADER_SIZE]> {
    let key: [u8; HEADER_KEY_SIZE] = fixed("key", key.as_ref())?;
    let mut buffer: [u8; HEADER_SIZE] = at_least("header", header.as_ref())?;

    let xts = xts_from_key(&key);
    xts.decrypt_area(
        &mut buffer[..MAIN_HEADER_SIZE],
        HEADER_SECTOR_SIZE,
        0,
        sector_tweak,
    );

    match section_layout(&buffer[MAGIC_RANGE]) {
        SectionLayout::Contiguous => xts.decrypt_area(
            &mut buffer[MAIN_HEADER_SIZE..],
            HEADER_SECTOR_SIZE,
            (MAIN_HEADER_SIZE / HEADER_SECTOR_SIZE) as u128,
            sector_tweak,
        ),
        SectionLayout::Independent => {
            for section in buffer[MAIN_HEADER_SIZE..].chunks_mut(HEADER_SECTOR_SIZE) {
                xts.decrypt_area(section, HEADER_SECTOR_SIZE, 0, sector_tweak);
            }
        }
    }

    Ok(buffer)
}

/// Encrypt a plaintext 0xC00-byte header. Inverse of [`decrypt_header`].
pub fn encrypt_header(key: impl AsRef<[u8]>, header: impl AsRef<[u8]>) -> Result<[u8; HEADER_SIZE]> {
    let key: [u8; HEADER_KEY_SIZE] = fixed("key", key.as_ref())?;
    let mut buffer: [u8; HEADER_SIZE] = at_least("header", header.as_ref())?;

    // Layout is chosen from the plaintext magic before it gets encrypted.
    let layout = section_layout(&buffer[MAGIC_RANGE]);

    let xts = xts_from_key(&key);
    xts.encrypt_area(
        &mut buffer[..MAIN_HEADER_SIZE],
        HEADER_SECTOR_SIZE,
        0,
        sector_tweak,
    );

    match layout {
        SectionLayout::Contiguous => xts.encrypt_area(
            &mut buffer[MAIN_HEADER_SIZE..],
            HEADER_SECTOR_SIZE,
            (MAIN_HEADER_SIZE / HEADER_SECTOR_SIZE) as u128,
            sector_tweak,
        ),
        SectionLayout::Independent => {
            for section in buffer[MAIN_HEADER_SIZE..].chunks_mut(HEADER_SECTOR_SIZE) {
                xts.encrypt_area(section, HEADER_SECTOR_SIZE, 0, sector_tweak);
            }
        }
    }

    Ok(buffer)
}
