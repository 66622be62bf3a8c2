//! Entropy acquisition seam for the DRBG engine.
//!
//! The generator never talks to an entropy device directly: it pulls seed
//! material through the pluggable [`EntropySource`] trait and stages it in a
//! [`TrngWorkBuff`]. In KAT mode the staging buffer is filled by the caller
//! instead and the source is bypassed entirely.

use secmod_types::RndError;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Maximum staged entropy-plus-nonce size in words.
pub const ENTROPY_TEMP_BUFFER_MAX_SIZE_WORDS: usize = 126;
/// Maximum staged entropy-plus-nonce size in bytes.
pub const ENTROPY_TEMP_BUFFER_MAX_SIZE_BYTES: usize = ENTROPY_TEMP_BUFFER_MAX_SIZE_WORDS * 4;

/// Pluggable source of raw seed entropy.
///
/// Implementors supply full-entropy bytes; conditioning and health testing
/// happen behind this boundary, not in the DRBG.
pub trait EntropySource: Send {
    /// Human-readable name of the source.
    fn name(&self) -> &str;

    /// Fill `buf` completely with fresh entropy.
    ///
    /// Plain acquisition failures are reported as
    /// [`RndError::EntropySourceFailure`]. A source that runs its own
    /// continuous tests reports an incomplete generation as
    /// [`RndError::TrngGenerationIncomplete`], which the DRBG additionally
    /// forwards to the FIPS status sink.
    fn fill(&mut self, buf: &mut [u8]) -> Result<(), RndError>;
}

/// System entropy source wrapping `getrandom`.
///
/// The OS guarantees full entropy from `/dev/urandom`, `getentropy()`, etc.
pub struct SystemEntropySource;

impl EntropySource for SystemEntropySource {
    fn name(&self) -> &str {
        "system"
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<(), RndError> {
        getrandom::getrandom(buf).map_err(|_| RndError::EntropySourceFailure)
    }
}

/// Staging buffer for seed source material.
///
/// Owns the bytes that flow into the derivation function: either fresh
/// entropy (plus a nonce when instantiating) pulled from an
/// [`EntropySource`], or caller-injected entropy || nonce in KAT mode. The
/// instantiate/reseed path zeroizes it on every exit.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct TrngWorkBuff {
    /// Number of valid source bytes.
    source_len: usize,
    /// Staged entropy (and nonce) bytes.
    source: [u8; ENTROPY_TEMP_BUFFER_MAX_SIZE_BYTES],
}

impl TrngWorkBuff {
    /// Create an empty staging buffer.
    pub fn new() -> Self {
        TrngWorkBuff {
            source_len: 0,
            source: [0u8; ENTROPY_TEMP_BUFFER_MAX_SIZE_BYTES],
        }
    }

    /// Stage caller-supplied `entropy || nonce` (KAT injection).
    pub(crate) fn stage(&mut self, entropy: &[u8], nonce: &[u8]) -> Result<(), RndError> {
        if entropy.len() > ENTROPY_TEMP_BUFFER_MAX_SIZE_BYTES
            || entropy.len() + nonce.len() > ENTROPY_TEMP_BUFFER_MAX_SIZE_BYTES
        {
            return Err(RndError::IllegalDataSize);
        }
        self.zeroize();
        self.source[..entropy.len()].copy_from_slice(entropy);
        self.source[entropy.len()..entropy.len() + nonce.len()].copy_from_slice(nonce);
        self.source_len = entropy.len() + nonce.len();
        Ok(())
    }

    /// Pull `len` fresh bytes from `source` into the buffer.
    pub(crate) fn fill_from(
        &mut self,
        source: &mut dyn EntropySource,
        len: usize,
    ) -> Result<(), RndError> {
        debug_assert!(len <= ENTROPY_TEMP_BUFFER_MAX_SIZE_BYTES);
        self.zeroize();
        source.fill(&mut self.source[..len])?;
        self.source_len = len;
        Ok(())
    }

    /// The staged source bytes.
    pub(crate) fn source(&self) -> &[u8] {
        &self.source[..self.source_len]
    }

    /// Wipe the staged material.
    pub fn clear(&mut self) {
        self.zeroize();
    }
}

impl Default for TrngWorkBuff {
    fn default() -> Self {
        Self::new()
    }
}
