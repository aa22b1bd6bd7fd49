//! Seekable byte sources.
//!
//! A `ByteSource` hands out byte ranges by absolute offset. Readers consume
//! one and implement the trait themselves, so a decrypted region can be fed
//! to anything that takes a source, including another reader.

mod file;
mod memory;

#[cfg(test)]
pub(crate) mod mock;

use std::sync::Arc;

use crate::error::Result;

pub use file::FileSource;
pub use memory::MemorySource;

/// Random-access provider of bytes.
///
/// Implementations own their concurrency contract: `read` takes `&self`, and
/// a source that needs exclusive access (a seeking file handle, say) must
/// serialize internally.
#[allow(async_fn_in_trait)]
pub trait ByteSource {
    /// Read up to `size` bytes starting at `offset`.
    ///
    /// Returns fewer bytes only when the source ends before `offset + size`.
    async fn read(&self, offset: u64, size: usize) -> Result<Vec<u8>>;

    /// Total logical length in bytes.
    fn size(&self) -> u64;
}

impl<S: ByteSource> ByteSource for &S {
    async fn read(&self, offset: u64, size: usize) -> Result<Vec<u8>> {
        (**self).read(offset, size).await
    }

    fn size(&self) -> u64 {
        (**self).size()
    }
}

impl<S: ByteSource> ByteSource for Arc<S> {
    async fn read(&self, offset: u64, size: usize) -> Result<Vec<u8>> {
        (**self).read(offset, size).await
    }

    fn size(&self) -> u64 {
        (**self).size()
    }
}
