//! In-memory byte source.

use super::ByteSource;
use crate::error::Result;

/// Owned bytes served by offset. Safe to share across concurrent reads.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    data: Vec<u8>,
}

impl MemorySource {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }
}

impl ByteSource for MemorySource {
    async fn read(&self, offset: u64, size: usize) -> Result<Vec<u8>> {
        let len = self.data.len();
        let start = usize::try_from(offset).map_or(len, |o| o.min(len));
        let end = start.saturating_add(size).min(len);
        Ok(self.data[start..end].to_vec())
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }
}
