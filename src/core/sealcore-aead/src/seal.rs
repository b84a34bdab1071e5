//! The seal operation.

use tracing::error;
use zeroize::Zeroize;

use crate::context::{AeadContext, ChaCha20Poly1305Context, Cipher};
use crate::error::{ContextError, SealError, SealStep, Violation};
use crate::{sealed_len, TAG_SIZE};

/// Seals `plaintext` with ChaCha20-Poly1305.
///
/// Writes `ciphertext || tag` to the front of `out` and returns its length,
/// always `plaintext.len() + TAG_SIZE`. `associated_data` is authenticated but
/// not written. Bytes of `out` past the sealed length are left untouched.
///
/// The caller must never reuse a `(key, nonce)` pair for two different
/// plaintexts; the engine has no way to detect it.
///
/// # Errors
///
/// Returns [`SealError`] if `key` is not 32 bytes, `nonce` is not 12 bytes,
/// `out` is shorter than the sealed length, or the cipher misbehaves. The
/// region of `out` that would have held the sealed block is zeroed first, so a
/// failure can never be mistaken for a short result.
pub fn seal(
    key: &[u8],
    nonce: &[u8],
    plaintext: &[u8],
    associated_data: &[u8],
    out: &mut [u8],
) -> Result<usize, SealError> {
    seal_with(
        ChaCha20Poly1305Context::new(),
        key,
        nonce,
        plaintext,
        associated_data,
        out,
    )
}

/// Like [`seal`], but panics on any failure.
///
/// The panic message names the failing step. Release builds abort on panic,
/// so this halts the process rather than letting a damaged block through.
pub fn seal_or_abort(
    key: &[u8],
    nonce: &[u8],
    plaintext: &[u8],
    associated_data: &[u8],
    out: &mut [u8],
) -> usize {
    match seal(key, nonce, plaintext, associated_data, out) {
        Ok(len) => len,
        Err(err) => panic!("{err}"),
    }
}

/// Runs the seal steps over a caller-supplied context.
///
/// `context` is consumed and dropped before this returns, on every path.
pub fn seal_with<C: AeadContext>(
    mut context: C,
    key: &[u8],
    nonce: &[u8],
    plaintext: &[u8],
    associated_data: &[u8],
    out: &mut [u8],
) -> Result<usize, SealError> {
    let required = sealed_len(plaintext.len())
        .ok_or_else(|| violation(SealStep::Preconditions, Violation::LengthOverflow))?;
    if out.len() < required {
        return Err(violation(
            SealStep::Preconditions,
            Violation::OutputTooSmall {
                required,
                available: out.len(),
            },
        ));
    }

    let region = &mut out[..required];
    run_steps(
        &mut context,
        key,
        nonce,
        plaintext,
        associated_data,
        &mut *region,
    )
    .map_err(|err| {
        region.zeroize();
        err
    })
}

fn run_steps<C: AeadContext>(
    ctx: &mut C,
    key: &[u8],
    nonce: &[u8],
    plaintext: &[u8],
    associated_data: &[u8],
    region: &mut [u8],
) -> Result<usize, SealError> {
    ctx.select(Cipher::ChaCha20Poly1305)
        .map_err(at(SealStep::SelectCipher))?;
    ctx.set_key_length(key.len())
        .map_err(at(SealStep::KeyLength))?;
    ctx.set_nonce_length(nonce.len())
        .map_err(at(SealStep::NonceLength))?;
    ctx.init(key, nonce).map_err(at(SealStep::Init))?;

    let absorbed = ctx
        .update_aad(associated_data)
        .map_err(at(SealStep::AssociatedData))?;
    expect_len(SealStep::AssociatedData, associated_data.len(), absorbed)?;

    let (body, trailer) = region.split_at_mut(plaintext.len());
    let written = ctx.update(plaintext, body).map_err(at(SealStep::Encrypt))?;
    expect_len(SealStep::Encrypt, plaintext.len(), written)?;

    let extra = ctx.finalize(trailer).map_err(at(SealStep::Finalize))?;
    expect_len(SealStep::Finalize, 0, extra)?;

    let end = match written.checked_add(TAG_SIZE) {
        Some(end) if end <= region.len() => end,
        Some(end) => {
            return Err(violation(
                SealStep::AppendTag,
                Violation::OutputTooSmall {
                    required: end,
                    available: region.len(),
                },
            ))
        }
        None => return Err(violation(SealStep::AppendTag, Violation::LengthOverflow)),
    };
    ctx.tag(&mut region[written..end])
        .map_err(at(SealStep::AppendTag))?;

    Ok(end)
}

fn expect_len(step: SealStep, expected: usize, actual: usize) -> Result<(), SealError> {
    if expected == actual {
        Ok(())
    } else {
        Err(violation(
            step,
            Violation::UnexpectedLength { expected, actual },
        ))
    }
}

fn at(step: SealStep) -> impl FnOnce(ContextError) -> SealError {
    move |err| violation(step, Violation::Context(err))
}

fn violation(step: SealStep, kind: Violation) -> SealError {
    error!(step = %step, error = %kind, "seal aborted");
    SealError::new(step, kind)
}
