//! # Sealcore AEAD
//!
//! The seal half of an authenticated encryption layer for Sealcore.
//!
//! [`seal`] encrypts one block with ChaCha20-Poly1305 (RFC 8439) and writes
//! `ciphertext || tag` into a caller-owned buffer:
//!
//! ```text
//! out[0 .. n)        ciphertext, same length as the plaintext
//! out[n .. n + 16)   Poly1305 authentication tag
//! ```
//!
//! Key and nonce management belong to the caller. The engine only checks that
//! what it is handed has the right shape and refuses to produce anything short
//! of a complete sealed block.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod context;
pub mod error;
mod seal;

pub use context::{AeadContext, ChaCha20Poly1305Context, Cipher};
pub use error::{ContextError, SealError, SealStep, Violation};
pub use seal::{seal, seal_or_abort, seal_with};

/// Size of a ChaCha20 key in bytes.
pub const KEY_SIZE: usize = 32;

/// Size of an IETF ChaCha20-Poly1305 nonce in bytes.
pub const NONCE_SIZE: usize = 12;

/// Size of a Poly1305 authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Returns the number of bytes [`seal`] writes for a plaintext of
/// `plaintext_len` bytes, or `None` if that overflows `usize`.
#[inline]
pub fn sealed_len(plaintext_len: usize) -> Option<usize> {
    plaintext_len.checked_add(TAG_SIZE)
}
