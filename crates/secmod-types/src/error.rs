/// Cryptographic primitive errors.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    // General errors
    #[error("invalid argument")]
    InvalidArg,
    #[error("invalid key")]
    InvalidKey,

    // Buffer errors
    #[error("buffer length not enough: need {need}, got {got}")]
    BufferTooSmall { need: usize, got: usize },

    // Symmetric cipher errors
    #[error("invalid key length: expected {expected}, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },
    #[error("invalid iv length")]
    InvalidIvLength,
}

/// Random-number generation errors (CTR_DRBG engine).
///
/// Grouped by recovery class: parameter errors leave the state untouched,
/// state-integrity errors require a new Instantiate/Reseed, collaborator
/// errors during (re)seeding zeroize the whole working state, and a
/// continuity failure is surfaced distinctly so the caller can escalate to
/// a module-wide locked condition.
#[derive(Debug, thiserror::Error)]
pub enum RndError {
    // Parameter errors
    #[error("rnd: illegal parameter")]
    IllegalParameter,
    #[error("rnd: illegal aes key size")]
    IllegalAesKeySize,
    #[error("rnd: additional input size invalid")]
    AdditionalInputSize,
    #[error("rnd: illegal data size")]
    IllegalDataSize,
    #[error("rnd: kat entropy parameters invalid")]
    KatDataParams,

    // State-integrity errors
    #[error("rnd: state validation tag mismatch")]
    StateValidationTag,
    #[error("rnd: instantiation was not done")]
    InstantiationNotDone,
    #[error("rnd: reseed counter overflow, reseeding required")]
    ReseedCounterOverflow,

    // Collaborator errors
    #[error("rnd: cipher operation failed: {0}")]
    CipherFailure(#[from] CryptoError),
    #[error("rnd: entropy source failed")]
    EntropySourceFailure,
    #[error("rnd: entropy generation not completed")]
    TrngGenerationIncomplete,

    // Continuity failure
    #[error("rnd: continuous random number generator test failed")]
    CrngtFailure,
}

/// FIPS/CMVP self-test errors.
#[derive(Debug, thiserror::Error)]
pub enum CmvpError {
    #[error("known-answer test failed: {0}")]
    KatFailure(String),
    #[error("module is in the error state")]
    InvalidState,
}
