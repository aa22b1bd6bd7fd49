//! XTS sector reader.
//!
//! Sections encrypted with AES-128-XTS are decrypted a whole sector at a
//! time, the tweak being the big-endian index of the sector in the source.
//! Reads are widened to sector boundaries and trimmed, like the CTR reader.

use aes::Aes128;
use xts_mode::Xts128;
use zeroize::Zeroize;

use super::{trim, BlockSpan, Region};
use crate::crypto::aes_ctr::AES_BLOCK_SIZE;
use crate::crypto::header::{sector_tweak, xts_from_key, HEADER_KEY_SIZE, HEADER_SECTOR_SIZE};
use crate::crypto::utils::fixed;
use crate::error::{CryptoError, Expected, Result};
use crate::source::ByteSource;

/// Default XTS sector size.
pub const DEFAULT_SECTOR_SIZE: usize = HEADER_SECTOR_SIZE;

pub struct XtsReader<S> {
    xts: Xts128<Aes128>,
    sector_size: usize,
    region: Region,
    source: S,
}

impl<S: ByteSource> XtsReader<S> {
    /// Bind a 0x20-byte key to the whole of `source`, with 0x200-byte sectors.
    pub fn new(key: impl AsRef<[u8]>, source: S) -> Result<Self> {
        let mut key: [u8; HEADER_KEY_SIZE] = fixed("key", key.as_ref())?;
        let xts = xts_from_key(&key);
        key.zeroize();

        let region = Region::tail(0, source.size())?;
        log::debug!("XTS session over {:#x} bytes", region.length);
        Ok(Self {
            xts,
            sector_size: DEFAULT_SECTOR_SIZE,
            region,
            source,
        })
    }

    /// Use a different sector size. Must be a non-zero multiple of 16.
    pub fn with_sector_size(mut self, sector_size: usize) -> Result<Self> {
        if sector_size == 0 || sector_size % AES_BLOCK_SIZE != 0 {
            return Err(CryptoError::size_mismatch(
                "sector_size",
                Expected::MultipleOf(AES_BLOCK_SIZE),
                sector_size,
            ));
        }
        log::debug!("XTS sector size {:#x}", sector_size);
        self.sector_size = sector_size;
        Ok(self)
    }

    /// Expose the source from `base_offset` to its end.
    pub fn with_base_offset(self, base_offset: u64) -> Result<Self> {
        let region = Region::tail(base_offset, self.source.size())?;
        Ok(self.into_region(region))
    }

    /// Expose `length` bytes of the source starting at `base_offset`.
    pub fn with_region(self, base_offset: u64, length: u64) -> Result<Self> {
        let region = Region::new(base_offset, length, self.source.size())?;
        Ok(self.into_region(region))
    }

    fn into_region(mut self, region: Region) -> Self {
        log::debug!(
            "XTS session region: base {:#x}, length {:#x}",
            region.base_offset,
            region.length
        );
        self.region = region;
        self
    }

    pub fn sector_size(&self) -> usize {
        self.sector_size
    }

    pub fn len(&self) -> u64 {
        self.region.length
    }

    pub fn is_empty(&self) -> bool {
        self.region.length == 0
    }

    /// Decrypt `size` bytes of the region starting at `offset`.
    pub async fn read(&self, offset: u64, size: usize) -> Result<Vec<u8>> {
        if size == 0 {
            return Ok(Vec::new());
        }

        let position = self.region.locate(offset, size)?;
        let out_of_range = || CryptoError::OutOfRange {
            offset,
            size: size as u64,
            length: self.region.length,
        };
        let span = BlockSpan::new(position, size as u64, self.sector_size as u64)
            .ok_or_else(out_of_range)?;
        let fetch_len = usize::try_from(span.len()).map_err(|_| out_of_range())?;

        // A sector cannot be decrypted from part of its ciphertext.
        let mut buf = self.source.read(span.aligned_start, fetch_len).await?;
        if buf.len() < fetch_len {
            log::warn!(
                "Source returned {:#x} of {:#x} bytes at {:#x}",
                buf.len(),
                fetch_len,
                span.aligned_start
            );
            return Err(out_of_range());
        }

        self.xts.decrypt_area(
            &mut buf,
            self.sector_size,
            span.first_block() as u128,
            sector_tweak,
        );
        Ok(trim(buf, span.skew, size))
    }
}

impl<S: ByteSource> ByteSource for XtsReader<S> {
    async fn read(&self, offset: u64, size: usize) -> Result<Vec<u8>> {
        XtsReader::read(self, offset, size).await
    }

    fn size(&self) -> u64 {
        self.region.length
    }
}
