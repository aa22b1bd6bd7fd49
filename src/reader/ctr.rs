//! Counter-mode random-access reader.
//!
//! A `CtrReader` binds a content key, a counter seed and a region of a
//! ciphertext source. `read(offset, size)` returns exactly `size` decrypted
//! bytes of the region at `offset`, for any offset and length.
//!
//! The counter for every block is derived from its absolute position in the
//! source (`(base_offset + offset) / 16`), never from read history, so reads
//! may be issued concurrently and in any order.

use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{trim, BlockSpan, Region};
use crate::crypto::aes_ctr::{apply_ctr_keystream, AES_BLOCK_SIZE, CTR_KEY_SIZE, CTR_SEED_SIZE};
use crate::crypto::utils::fixed;
use crate::error::{CryptoError, Result};
use crate::source::ByteSource;

#[derive(Zeroize, ZeroizeOnDrop)]
struct CtrKeys {
    key: [u8; CTR_KEY_SIZE],
    seed: [u8; CTR_SEED_SIZE],
}

pub struct CtrReader<S> {
    keys: CtrKeys,
    region: Region,
    source: S,
}

impl<S: ByteSource> CtrReader<S> {
    /// Bind `key` and `counter_seed` to the whole of `source`.
    pub fn new(key: impl AsRef<[u8]>, counter_seed: impl AsRef<[u8]>, source: S) -> Result<Self> {
        let keys = CtrKeys {
            key: fixed("key", key.as_ref())?,
            seed: fixed("counter", counter_seed.as_ref())?,
        };
        let region = Region::tail(0, source.size())?;
        log::debug!("CTR session over {:#x} bytes", region.length);
        Ok(Self {
            keys,
            region,
            source,
        })
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
            "CTR session region: base {:#x}, length {:#x}",
            region.base_offset,
            region.length
        );
        self.region = region;
        self
    }

    /// Offset of the region within the source.
    pub fn base_offset(&self) -> u64 {
        self.region.base_offset
    }

    /// Length of the decrypted region.
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
        let span = BlockSpan::new(position, size as u64, AES_BLOCK_SIZE as u64)
            .ok_or_else(out_of_range)?;

        // Clamped to the region end, not the aligned end. CTR decrypts a partial last block.
        let fetch_end = span.aligned_end.min(self.region.end());
        let fetch_len =
            usize::try_from(fetch_end - span.aligned_start).map_err(|_| out_of_range())?;
        let needed = span.skew + size;

        let mut buf = self.source.read(span.aligned_start, fetch_len).await?;
        if buf.len() < needed {
            log::warn!(
                "Source returned {:#x} of {:#x} bytes at {:#x}",
                buf.len(),
                fetch_len,
                span.aligned_start
            );
            return Err(out_of_range());
        }

        apply_ctr_keystream(&self.keys.key, &self.keys.seed, span.first_block(), &mut buf)?;
        Ok(trim(buf, span.skew, size))
    }
}

impl<S: ByteSource> ByteSource for CtrReader<S> {
    async fn read(&self, offset: u64, size: usize) -> Result<Vec<u8>> {
        CtrReader::read(self, offset, size).await
    }

    fn size(&self) -> u64 {
        self.region.length
    }
}
