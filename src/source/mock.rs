//! Mock sources for tests.

use std::sync::Mutex;

use super::{ByteSource, MemorySource};
use crate::error::Result;

/// Serves bytes from memory and records every requested `(offset, size)`.
pub struct RecordingSource {
    inner: MemorySource,
    requests: Mutex<Vec<(u64, usize)>>,
}

impl RecordingSource {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            inner: MemorySource::new(data),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<(u64, usize)> {
        self.requests.lock().unwrap().clone()
    }
}

impl ByteSource for RecordingSource {
    async fn read(&self, offset: u64, size: usize) -> Result<Vec<u8>> {
        self.requests.lock().unwrap().push((offset, size));
        self.inner.read(offset, size).await
    }

    fn size(&self) -> u64 {
        self.inner.size()
    }
}

/// Always fails with the given I/O error kind.
pub struct FailingSource {
    pub size: u64,
    pub kind: std::io::ErrorKind,
}

impl ByteSource for FailingSource {
    async fn read(&self, _offset: u64, _size: usize) -> Result<Vec<u8>> {
        Err(std::io::Error::new(self.kind, "source unavailable").into())
    }

    fn size(&self) -> u64 {
        self.size
    }
}

/// Claims a larger size than it can actually serve.
pub struct ShortSource {
    pub inner: MemorySource,
    pub claimed_size: u64,
}

impl ByteSource for ShortSource {
    async fn read(&self, offset: u64, size: usize) -> Result<Vec<u8>> {
        self.inner.read(offset, size).await
    }

    fn size(&self) -> u64 {
        self.claimed_size
    }
}
