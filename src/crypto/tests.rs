//! Cross-module tests: readers checked against the cipher crates directly,
//! and property tests over arbitrary windows.

use aes::Aes128;
use ctr::cipher::{KeyIvInit, StreamCipher};
use proptest::prelude::*;

use crate::crypto::{decrypt_header, decrypt_key_area, decrypt_xci_header, hex_to_bytes};
use crate::error::{CryptoError, Expected};
use crate::reader::CtrReader;
use crate::source::mock::RecordingSource;
use crate::source::MemorySource;

const KEY_HEX: &str = "ac31f3da4bd7c4a56116789b748cdf1f";

fn key() -> Vec<u8> {
    hex_to_bytes(KEY_HEX).unwrap()
}

/// Reference ciphertext straight from `ctr`, independent of the crate's
/// counter derivation.
fn reference_encrypt(plain: &[u8], key: &[u8], seed: &[u8; 16]) -> Vec<u8> {
    let mut out = plain.to_vec();
    let mut cipher = ctr::Ctr64BE::<Aes128>::new_from_slices(key, seed).unwrap();
    cipher.apply_keystream(&mut out);
    out
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread().build().unwrap()
}

#[tokio::test]
async fn test_worked_example_windows() {
    let plain: Vec<u8> = (0..64u8).collect();
    let cipher = reference_encrypt(&plain, &key(), &[0u8; 16]);
    let source = RecordingSource::new(cipher);
    let reader = CtrReader::new(key(), [0u8; 16], &source).unwrap();

    assert_eq!(reader.read(0, 16).await.unwrap(), &plain[0..16]);
    assert_eq!(reader.read(5, 16).await.unwrap(), &plain[5..21]);
    assert_eq!(source.requests(), vec![(0, 16), (0, 32)]);
}

#[tokio::test]
async fn test_reader_matches_reference_with_nonce() {
    let mut seed = [0u8; 16];
    seed[..8].copy_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x00, 0x00, 0x01]);
    seed[8..].copy_from_slice(&7u64.to_be_bytes());

    let plain: Vec<u8> = (0..0x1000).map(|i| (i ^ (i >> 8)) as u8).collect();
    let cipher = reference_encrypt(&plain, &key(), &seed);
    let reader = CtrReader::new(key(), seed, MemorySource::new(cipher)).unwrap();

    assert_eq!(reader.read(0x7F3, 0x333).await.unwrap(), &plain[0x7F3..0xB26]);
}

#[test]
fn test_fixed_layout_size_errors_report_actual_length() {
    let err = decrypt_header([0u8; 0x20], [0u8; 0x100]).unwrap_err();
    assert!(matches!(
        err,
        CryptoError::SizeMismatch {
            expected: Expected::AtLeast(0xC00),
            actual: 0x100,
            ..
        }
    ));

    let err = decrypt_key_area([0u8; 0x10], &[[0u8; 0x11]]).unwrap_err();
    assert!(matches!(err, CryptoError::SizeMismatch { actual: 0x11, .. }));

    let err = decrypt_xci_header([0u8; 0x10], [0u8; 0x10], [0u8; 0x60]).unwrap_err();
    assert!(matches!(err, CryptoError::SizeMismatch { actual: 0x60, .. }));
}

proptest! {
    #[test]
    fn prop_unaligned_read_equals_trimmed_aligned_read(
        base in 0u64..48,
        offset in 0u64..0x180,
        size in 1usize..0x80,
        seed in any::<[u8; 16]>(),
    ) {
        // Keep the low counter half well clear of wrap-around.
        let mut seed = seed;
        seed[8] &= 0x7F;

        let plain: Vec<u8> = (0..0x240).map(|i| (i * 13 % 256) as u8).collect();
        let cipher = reference_encrypt(&plain, &key(), &seed);
        let reader = CtrReader::new(key(), seed, MemorySource::new(cipher))
            .unwrap()
            .with_base_offset(base)
            .unwrap();
        prop_assume!(offset + size as u64 <= reader.len());

        let rt = runtime();
        let direct = rt.block_on(reader.read(offset, size)).unwrap();

        // Smallest block-aligned superset, clipped to the region, then trimmed.
        let position = base + offset;
        let end = position + size as u64;
        let abs_start = (position - position % 16).max(base);
        let abs_end = end.div_ceil(16).saturating_mul(16).min(base + reader.len());
        let superset_start = abs_start - base;
        let superset = rt
            .block_on(reader.read(superset_start, (abs_end - abs_start) as usize))
            .unwrap();
        let trimmed = &superset[(offset - superset_start) as usize..][..size];

        prop_assert_eq!(&direct[..], trimmed);
        prop_assert_eq!(&direct[..], &plain[position as usize..position as usize + size]);
    }

    #[test]
    fn prop_reads_are_deterministic(
        offset in 0u64..0x100,
        size in 1usize..0x100,
        other_offset in 0u64..0x100,
    ) {
        let plain = vec![0x5Cu8; 0x200];
        let cipher = reference_encrypt(&plain, &key(), &[0u8; 16]);
        let reader = CtrReader::new(key(), [0u8; 16], MemorySource::new(cipher)).unwrap();

        let rt = runtime();
        let first = rt.block_on(reader.read(offset, size)).unwrap();
        let _ = rt.block_on(reader.read(other_offset, 0x10)).unwrap();
        let second = rt.block_on(reader.read(offset, size)).unwrap();

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.len(), size);
    }
}
