//! Seal error types.
//!
//! A [`SealError`] is never expected in correct operation. It means either the
//! caller broke the input contract (wrong key size, undersized buffer) or the
//! cipher library misbehaved. Neither is transient, so there is nothing to
//! retry.

use std::fmt;

use thiserror::Error;

use crate::{KEY_SIZE, NONCE_SIZE, TAG_SIZE};

/// Errors reported by a single step of an [`AeadContext`](crate::AeadContext).
#[derive(Debug, Error)]
pub enum ContextError {
    /// A step was invoked before the steps it depends on.
    #[error("{0} called out of order")]
    OutOfOrder(&'static str),

    /// The cipher does not accept this key length.
    #[error("unsupported key length {0} (expected {})", KEY_SIZE)]
    UnsupportedKeyLength(usize),

    /// The cipher does not accept this nonce length.
    #[error("unsupported nonce length {0} (expected {})", NONCE_SIZE)]
    UnsupportedNonceLength(usize),

    /// The cipher does not produce tags of this length.
    #[error("unsupported tag length {0} (expected {})", TAG_SIZE)]
    UnsupportedTagLength(usize),

    /// Key or nonce bytes disagree with the length bound earlier.
    #[error("{what} is {actual} bytes but {bound} were bound")]
    BoundLengthMismatch {
        /// Which input disagreed.
        what: &'static str,
        /// Length configured into the context.
        bound: usize,
        /// Length actually supplied.
        actual: usize,
    },

    /// Output slice cannot hold the result.
    #[error("buffer too small: need {required} bytes, have {available}")]
    BufferTooSmall {
        /// Bytes needed.
        required: usize,
        /// Bytes available.
        available: usize,
    },

    /// The underlying cipher refused the operation.
    #[error("cipher primitive failed")]
    Primitive,
}

/// The steps of a seal, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SealStep {
    /// Length checks on the caller's inputs.
    Preconditions,
    /// Cipher selection.
    SelectCipher,
    /// Key length binding.
    KeyLength,
    /// Nonce length binding.
    NonceLength,
    /// Key and nonce binding.
    Init,
    /// Associated data absorption.
    AssociatedData,
    /// Plaintext encryption.
    Encrypt,
    /// Encryption finalization.
    Finalize,
    /// Tag extraction into the output buffer.
    AppendTag,
}

impl SealStep {
    /// Every step, in execution order.
    pub const ALL: [SealStep; 9] = [
        SealStep::Preconditions,
        SealStep::SelectCipher,
        SealStep::KeyLength,
        SealStep::NonceLength,
        SealStep::Init,
        SealStep::AssociatedData,
        SealStep::Encrypt,
        SealStep::Finalize,
        SealStep::AppendTag,
    ];

    /// Short label used in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            SealStep::Preconditions => "preconditions",
            SealStep::SelectCipher => "select-cipher",
            SealStep::KeyLength => "key-length",
            SealStep::NonceLength => "nonce-length",
            SealStep::Init => "init",
            SealStep::AssociatedData => "associated-data",
            SealStep::Encrypt => "encrypt",
            SealStep::Finalize => "finalize",
            SealStep::AppendTag => "append-tag",
        }
    }
}

impl fmt::Display for SealStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What went wrong during a seal step.
#[derive(Debug, Error)]
pub enum Violation {
    /// Output buffer cannot hold `ciphertext || tag`.
    #[error("output buffer too small: need {required} bytes, have {available}")]
    OutputTooSmall {
        /// Bytes needed.
        required: usize,
        /// Bytes available.
        available: usize,
    },

    /// Plaintext length plus tag length overflows `usize`.
    #[error("sealed length overflows usize")]
    LengthOverflow,

    /// A step reported a byte count other than the one the cipher guarantees.
    #[error("unexpected length: expected {expected} bytes, got {actual}")]
    UnexpectedLength {
        /// Byte count the step must report.
        expected: usize,
        /// Byte count it reported.
        actual: usize,
    },

    /// The context rejected the step.
    #[error(transparent)]
    Context(#[from] ContextError),
}

/// Unrecoverable seal failure.
///
/// Returned instead of a sealed length; the output buffer holds no usable
/// ciphertext when this is observed.
#[derive(Debug, Error)]
#[error("seal aborted at {step}: {violation}")]
pub struct SealError {
    step: SealStep,
    violation: Violation,
}

impl SealError {
    pub(crate) fn new(step: SealStep, violation: Violation) -> Self {
        Self { step, violation }
    }

    /// The step that failed.
    pub fn step(&self) -> SealStep {
        self.step
    }

    /// What went wrong.
    pub fn violation(&self) -> &Violation {
        &self.violation
    }

    /// Whether the failure traces back to the caller's inputs rather than to
    /// the cipher library.
    pub fn is_caller_contract(&self) -> bool {
        matches!(
            (self.step, &self.violation),
            (SealStep::Preconditions, _)
                | (
                    SealStep::KeyLength,
                    Violation::Context(ContextError::UnsupportedKeyLength(_))
                )
                | (
                    SealStep::NonceLength,
                    Violation::Context(ContextError::UnsupportedNonceLength(_))
                )
        )
    }
}
