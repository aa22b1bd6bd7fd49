//! File-backed byte source.
//!
//! A single tokio file handle behind a mutex. Every read seeks, so reads are
//! serialized here rather than by the caller.

use std::io::SeekFrom;
use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::sync::Mutex;

use super::ByteSource;
use crate::error::Result;

pub struct FileSource {
    file: Mutex<File>,
    len: u64,
}

impl FileSource {
    /// Open `path` read-only. The length is taken once, at open time.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref()).await?;
        let len = file.metadata().await?.len();
        log::debug!("Opened {:?} ({:#x} bytes)", path.as_ref(), len);
        Ok(Self {
            file: Mutex::new(file),
            len,
        })
    }
}

impl ByteSource for FileSource {
    async fn read(&self, offset: u64, size: usize) -> Result<Vec<u8>> {
        if offset >= self.len || size == 0 {
            return Ok(Vec::new());
        }
        let wanted = (self.len - offset).min(size as u64) as usize;

        let mut file = self.file.lock().await;
        file.seek(SeekFrom::Start(offset)).await?;

        let mut buf = vec![0u8; wanted];
        let mut filled = 0;
        while filled < wanted {
            let n = file.read(&mut buf[filled..]).await?;
            if n == 0 {
                // File shrank since open
                break;
            }
            filled += n;
        }
        buf.truncate(filled);
        Ok(buf)
    }

    fn size(&self) -> u64 {
        self.len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CryptoError;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("nca-decrypt-test-{}-{}", name, std::process::id()))
    }

    #[tokio::test]
    async fn test_file_source_reads_window() {
        let path = temp_path("window");
        let content: Vec<u8> = (0..100u8).collect();
        std::fs::write(&path, &content).unwrap();

        let source = FileSource::open(&path).await.unwrap();
        assert_eq!(source.size(), 100);
        assert_eq!(source.read(10, 5).await.unwrap(), &content[10..15]);
        // Out-of-order reads are fine: each one seeks.
        assert_eq!(source.read(0, 3).await.unwrap(), &content[..3]);
        assert_eq!(source.read(95, 10).await.unwrap(), &content[95..]);
        assert!(source.read(100, 1).await.unwrap().is_empty());

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_file_source_missing_file() {
        let err = FileSource::open(temp_path("missing-does-not-exist"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, CryptoError::SourceFailure(_)));
    }
}
