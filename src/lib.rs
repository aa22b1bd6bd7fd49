//! Random-access decryption for AES-protected content archives.
//!
//! - [`reader::CtrReader`]: decrypted view over an AES-128-CTR region,
//!   readable at any offset and length.
//! - [`reader::XtsReader`]: the same for AES-128-XTS sectors.
//! - [`crypto`]: one-shot decryptors for the fixed-layout metadata (header,
//!   key area, the gamecard's wrapped header).
//!
//! Ciphertext comes from a [`source::ByteSource`]; both readers are sources
//! themselves, so they stack.

pub mod crypto;
pub mod error;
pub mod reader;
pub mod source;

pub use error::{CryptoError, Expected, Result};
pub use reader::{CtrReader, XtsReader};
pub use source::{ByteSource, FileSource, MemorySource};
