//! Multi-step AEAD contexts.
//!
//! [`AeadContext`] is the conventional staged AEAD interface: select a cipher,
//! bind key and nonce lengths, bind the key and nonce, absorb associated data,
//! encrypt, finalize, read the tag. The seal engine drives any implementation
//! of it, which keeps the orchestration separate from the primitive.
//!
//! [`ChaCha20Poly1305Context`] implements it on top of the `chacha20poly1305`
//! crate. A context is acquired with `new()` and released when dropped.

use chacha20poly1305::aead::{AeadInPlace, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Nonce};
use zeroize::{Zeroize, Zeroizing};

use crate::error::ContextError;
use crate::{KEY_SIZE, NONCE_SIZE, TAG_SIZE};

/// AEAD constructions a context can be asked to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Cipher {
    /// ChaCha20 stream cipher with a Poly1305 authenticator, IETF variant
    /// (RFC 8439).
    ChaCha20Poly1305,
}

/// Staged AEAD encryption interface.
///
/// Steps must be called in declaration order. Each returns an error instead
/// of silently doing less than asked; byte-count results are reported so the
/// caller can check them against what the cipher guarantees.
pub trait AeadContext {
    /// Selects the AEAD construction.
    fn select(&mut self, cipher: Cipher) -> Result<(), ContextError>;

    /// Binds the key length. Fails if the cipher does not accept it.
    fn set_key_length(&mut self, len: usize) -> Result<(), ContextError>;

    /// Binds the nonce length. Fails if the cipher does not accept it.
    fn set_nonce_length(&mut self, len: usize) -> Result<(), ContextError>;

    /// Binds key and nonce bytes. Both must match the bound lengths.
    fn init(&mut self, key: &[u8], nonce: &[u8]) -> Result<(), ContextError>;

    /// Absorbs associated data and returns the number of bytes consumed.
    fn update_aad(&mut self, aad: &[u8]) -> Result<usize, ContextError>;

    /// Encrypts `input` into `output` and returns the number of bytes written.
    fn update(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, ContextError>;

    /// Finishes encryption and returns the number of extra bytes written to
    /// `output`.
    fn finalize(&mut self, output: &mut [u8]) -> Result<usize, ContextError>;

    /// Writes the authentication tag. `out.len()` is the requested tag length.
    fn tag(&mut self, out: &mut [u8]) -> Result<(), ContextError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Created,
    Selected,
    Keyed,
    Encrypted,
    Finalized,
    Done,
}

/// One-shot ChaCha20-Poly1305 encryption context.
///
/// Associated data may arrive in several `update_aad` calls; plaintext is
/// encrypted in a single `update`. The cipher wipes its key on drop and the
/// pending tag is held in zeroizing storage.
pub struct ChaCha20Poly1305Context {
    stage: Stage,
    key_len: Option<usize>,
    nonce_len: Option<usize>,
    cipher: Option<ChaCha20Poly1305>,
    nonce: Nonce,
    aad: Vec<u8>,
    tag: Zeroizing<[u8; TAG_SIZE]>,
}

impl ChaCha20Poly1305Context {
    /// Acquires a fresh context.
    pub fn new() -> Self {
        Self {
            stage: Stage::Created,
            key_len: None,
            nonce_len: None,
            cipher: None,
            nonce: Nonce::default(),
            aad: Vec::new(),
            tag: Zeroizing::new([0u8; TAG_SIZE]),
        }
    }

    fn expect_stage(&self, stage: Stage, op: &'static str) -> Result<(), ContextError> {
        if self.stage == stage {
            Ok(())
        } else {
            Err(ContextError::OutOfOrder(op))
        }
    }
}

impl Default for ChaCha20Poly1305Context {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ChaCha20Poly1305Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChaCha20Poly1305Context")
            .field("stage", &self.stage)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl Drop for ChaCha20Poly1305Context {
    fn drop(&mut self) {
        self.nonce.as_mut_slice().zeroize();
        self.aad.zeroize();
    }
}

impl AeadContext for ChaCha20Poly1305Context {
    fn select(&mut self, cipher: Cipher) -> Result<(), ContextError> {
        self.expect_stage(Stage::Created, "select")?;
        match cipher {
            Cipher::ChaCha20Poly1305 => {}
        }
        self.stage = Stage::Selected;
        Ok(())
    }

    fn set_key_length(&mut self, len: usize) -> Result<(), ContextError> {
        self.expect_stage(Stage::Selected, "set_key_length")?;
        if len != KEY_SIZE {
            return Err(ContextError::UnsupportedKeyLength(len));
        }
        self.key_len = Some(len);
        Ok(())
    }

    fn set_nonce_length(&mut self, len: usize) -> Result<(), ContextError> {
        self.expect_stage(Stage::Selected, "set_nonce_length")?;
        if len != NONCE_SIZE {
            return Err(ContextError::UnsupportedNonceLength(len));
        }
        self.nonce_len = Some(len);
        Ok(())
    }

    fn init(&mut self, key: &[u8], nonce: &[u8]) -> Result<(), ContextError> {
        self.expect_stage(Stage::Selected, "init")?;
        // No default nonce length: both lengths must have been bound explicitly.
        let (Some(key_len), Some(nonce_len)) = (self.key_len, self.nonce_len) else {
            return Err(ContextError::OutOfOrder("init"));
        };
        if key.len() != key_len {
            return Err(ContextError::BoundLengthMismatch {
                what: "key",
                bound: key_len,
                actual: key.len(),
            });
        }
        if nonce.len() != nonce_len {
            return Err(ContextError::BoundLengthMismatch {
                what: "nonce",
                bound: nonce_len,
                actual: nonce.len(),
            });
        }

        let cipher = ChaCha20Poly1305::new_from_slice(key)
            .map_err(|_| ContextError::UnsupportedKeyLength(key.len()))?;
        self.cipher = Some(cipher);
        self.nonce.copy_from_slice(nonce);
        self.stage = Stage::Keyed;
        Ok(())
    }

    fn update_aad(&mut self, aad: &[u8]) -> Result<usize, ContextError> {
        self.expect_stage(Stage::Keyed, "update_aad")?;
        self.aad.extend_from_slice(aad);
        Ok(aad.len())
    }

    fn update(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, ContextError> {
        self.expect_stage(Stage::Keyed, "update")?;
        let cipher = self.cipher.as_ref().ok_or(ContextError::OutOfOrder("update"))?;
        if output.len() < input.len() {
            return Err(ContextError::BufferTooSmall {
                required: input.len(),
                available: output.len(),
            });
        }

        let body = &mut output[..input.len()];
        body.copy_from_slice(input);
        match cipher.encrypt_in_place_detached(&self.nonce, &self.aad, body) {
            Ok(tag) => {
                self.tag.copy_from_slice(tag.as_slice());
                self.stage = Stage::Encrypted;
                Ok(input.len())
            }
            Err(_) => {
                // Never leave the plaintext copy behind in the caller's buffer.
                body.zeroize();
                Err(ContextError::Primitive)
            }
        }
    }

    fn finalize(&mut self, _output: &mut [u8]) -> Result<usize, ContextError> {
        self.expect_stage(Stage::Encrypted, "finalize")?;
        self.stage = Stage::Finalized;
        Ok(0)
    }

    fn tag(&mut self, out: &mut [u8]) -> Result<(), ContextError> {
        self.expect_stage(Stage::Finalized, "tag")?;
        if out.len() != TAG_SIZE {
            return Err(ContextError::UnsupportedTagLength(out.len()));
        }
        out.copy_from_slice(&self.tag[..]);
        self.stage = Stage::Done;
        Ok(())
    }
}
