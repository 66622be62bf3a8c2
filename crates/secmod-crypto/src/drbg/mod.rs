//! Deterministic Random Bit Generation (NIST SP 800-90A).
//!
//! Provides the CTR_DRBG construction (Section 10.2) with the block-cipher
//! derivation function, a continuous random number generator test, and a
//! Known-Answer-Test override mode for compliance runs.

mod df;
mod state;

pub mod ctr_drbg;

pub use ctr_drbg::CtrDrbg;
pub use state::SecurityStrength;

use secmod_types::RndError;

/// Capability handed to consumers that draw from an instantiated generator.
///
/// Replaces the function-pointer-plus-context pairs that asymmetric-key code
/// traditionally threads around: consumers hold a `&dyn RandomSource` and
/// never see the generator's state.
pub trait RandomSource: Send + Sync {
    /// Fill `out` with generated random bytes.
    fn random_bytes(&self, out: &mut [u8]) -> Result<(), RndError>;
}
