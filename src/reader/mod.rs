//! Random-access decrypting readers.
//!
//! Both readers map a window of the decrypted region onto an aligned span of
//! the underlying source, decrypt that span into a call-local buffer and trim
//! it back to the window. Neither keeps any state between reads.

pub mod ctr;
pub mod xts;

use crate::error::{CryptoError, Result};

pub use self::ctr::CtrReader;
pub use self::xts::XtsReader;

/// Aligned span covering `[position, position + size)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BlockSpan {
    /// Absolute offset of the first fetched block.
    pub aligned_start: u64,
    /// Absolute offset just past the last fetched block.
    pub aligned_end: u64,
    /// Leading bytes of the first block that belong before the window.
    pub skew: usize,
    block: u64,
}

impl BlockSpan {
    /// `None` if the span would run past `u64::MAX`.
    pub fn new(position: u64, size: u64, block: u64) -> Option<Self> {
        debug_assert!(block > 0);
        let skew = position % block;
        let aligned_start = position - skew;
        let end = position.checked_add(size)?;
        let aligned_end = match end % block {
            0 => end,
            rem => end.checked_add(block - rem)?,
        };
        Some(Self {
            aligned_start,
            aligned_end,
            skew: skew as usize,
            block,
        })
    }

    /// Index of the first block in the span.
    pub fn first_block(&self) -> u64 {
        self.aligned_start / self.block
    }

    pub fn len(&self) -> u64 {
        self.aligned_end - self.aligned_start
    }
}

/// Region of the source that a reader exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Region {
    pub base_offset: u64,
    pub length: u64,
}

impl Region {
    /// Validate `[base_offset, base_offset + length)` against the source size.
    pub fn new(base_offset: u64, length: u64, source_size: u64) -> Result<Self> {
        match base_offset.checked_add(length) {
            Some(end) if end <= source_size => Ok(Self {
                base_offset,
                length,
            }),
            _ => Err(CryptoError::OutOfRange {
                offset: base_offset,
                size: length,
                length: source_size,
            }),
        }
    }

    /// Everything from `base_offset` to the end of the source.
    pub fn tail(base_offset: u64, source_size: u64) -> Result<Self> {
        let length = source_size.checked_sub(base_offset).ok_or(CryptoError::OutOfRange {
            offset: base_offset,
            size: 0,
            length: source_size,
        })?;
        Ok(Self {
            base_offset,
            length,
        })
    }

    pub fn end(&self) -> u64 {
        self.base_offset + self.length
    }

    /// Absolute position of a window, or `OutOfRange` if it leaves the region.
    pub fn locate(&self, offset: u64, size: usize) -> Result<u64> {
        let out_of_range = || CryptoError::OutOfRange {
            offset,
            size: size as u64,
            length: self.length,
        };
        let end = offset.checked_add(size as u64).ok_or_else(out_of_range)?;
        if end > self.length {
            return Err(out_of_range());
        }
        Ok(self.base_offset + offset)
    }
}

/// Narrow a decrypted span buffer to the caller's window.
pub(crate) fn trim(mut buf: Vec<u8>, skew: usize, size: usize) -> Vec<u8> {
    buf.truncate(skew + size);
    buf.drain(..skew);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_aligned_read() {
        let span = BlockSpan::new(0, 16, 16).unwrap();
        assert_eq!(span.aligned_start, 0);
        assert_eq!(span.aligned_end, 16);
        assert_eq!(span.skew, 0);
        assert_eq!(span.first_block(), 0);
        assert_eq!(span.len(), 16);
    }

    #[test]
    fn test_span_unaligned_read_covers_two_blocks() {
        let span = BlockSpan::new(5, 16, 16).unwrap();
        assert_eq!(span.aligned_start, 0);
        assert_eq!(span.aligned_end, 32);
        assert_eq!(span.skew, 5);
        assert_eq!(span.len(), 32);
    }

    #[test]
    fn test_span_inside_one_block() {
        let span = BlockSpan::new(0x23, 3, 16).unwrap();
        assert_eq!(span.aligned_start, 0x20);
        assert_eq!(span.aligned_end, 0x30);
        assert_eq!(span.skew, 3);
        assert_eq!(span.first_block(), 2);
    }

    #[test]
    fn test_span_sector_sized_blocks() {
        let span = BlockSpan::new(0x3F0, 0x20, 0x200).unwrap();
        assert_eq!(span.aligned_start, 0x200);
        assert_eq!(span.aligned_end, 0x600);
        assert_eq!(span.skew, 0x1F0);
        assert_eq!(span.first_block(), 1);
    }

    #[test]
    fn test_span_overflow() {
        assert!(BlockSpan::new(u64::MAX - 4, 2, 16).is_none());
        assert!(BlockSpan::new(u64::MAX, 1, 16).is_none());
    }

    #[test]
    fn test_region_bounds() {
        let region = Region::new(0x10, 0x20, 0x40).unwrap();
        assert_eq!(region.end(), 0x30);
        assert_eq!(region.locate(0, 0x20).unwrap(), 0x10);
        assert_eq!(region.locate(0x1F, 1).unwrap(), 0x2F);
        assert!(matches!(
            region.locate(0x1F, 2),
            Err(CryptoError::OutOfRange { length: 0x20, .. })
        ));
        assert!(region.locate(u64::MAX, 1).is_err());

        assert!(Region::new(0x30, 0x20, 0x40).is_err());
        assert!(Region::new(u64::MAX, 1, 0x40).is_err());
    }

    #[test]
    fn test_region_tail() {
        assert_eq!(Region::tail(0x10, 0x40).unwrap().length, 0x30);
        assert_eq!(Region::tail(0x40, 0x40).unwrap().length, 0);
        assert!(Region::tail(0x41, 0x40).is_err());
    }

    #[test]
    fn test_trim() {
        let buf: Vec<u8> = (0..32).collect();
        assert_eq!(trim(buf.clone(), 5, 16), (5..21).collect::<Vec<u8>>());
        assert_eq!(trim(buf, 0, 32).len(), 32);
    }
}
