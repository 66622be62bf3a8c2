//! Persistent CTR_DRBG working state.

use zeroize::Zeroize;

/// AES block size in 32-bit words.
pub(crate) const BLOCK_SIZE_WORDS: usize = 4;
/// AES-128 key size in words (128-bit security strength).
pub(crate) const AES_128_KEY_SIZE_WORDS: usize = 4;
/// AES-256 key size in words (256-bit security strength).
pub(crate) const AES_256_KEY_SIZE_WORDS: usize = 8;
/// Maximum seed (Key || V) size in words.
pub(crate) const SEED_MAX_SIZE_WORDS: usize = AES_256_KEY_SIZE_WORDS + BLOCK_SIZE_WORDS;
/// Maximum seed size in bytes.
pub(crate) const SEED_MAX_SIZE_BYTES: usize = SEED_MAX_SIZE_WORDS * 4;
/// Maximum pending additional-input size in words.
pub(crate) const ADD_INPUT_MAX_SIZE_WORDS: usize = 12;
/// Maximum pending additional-input size in bytes.
pub(crate) const ADD_INPUT_MAX_SIZE_BYTES: usize = ADD_INPUT_MAX_SIZE_WORDS * 4;
/// Largest single Generate request in bytes.
pub(crate) const MAX_GEN_VECTOR_SIZE_BYTES: usize = 0xFFFF;
/// Reseed counter bound; Generate demands reseeding at this value. Stricter
/// than the 2^48 the standard allows, which only raises the margin.
pub(crate) const MAX_RESEED_COUNTER: u32 = u32::MAX - 0xF;
/// Magic written by a successful Instantiate (or the KAT entry path);
/// guards against use of a zero-initialized or corrupted context.
pub(crate) const WORK_STATE_VALID_TAG: u32 = 0x0123_ABCD;

// StateFlag bits.
pub(crate) const STATE_INSTANTIATED: u32 = 1;
pub(crate) const STATE_KAT_MODE: u32 = 1 << 8;
pub(crate) const STATE_PREVIOUS_VALID: u32 = 1 << 16;

/// Security strength of a DRBG instance, fixing the AES key size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityStrength {
    /// 128-bit strength (AES-128, 4-word key).
    Aes128,
    /// 256-bit strength (AES-256, 8-word key).
    Aes256,
}

impl SecurityStrength {
    pub(crate) fn key_size_words(self) -> usize {
        match self {
            SecurityStrength::Aes128 => AES_128_KEY_SIZE_WORDS,
            SecurityStrength::Aes256 => AES_256_KEY_SIZE_WORDS,
        }
    }
}

/// The persistent, security-sensitive DRBG context.
///
/// Exactly one per generator instance; lives behind the instance lock and is
/// zeroized on drop, on teardown, and on any internal failure while mixing
/// seed material.
#[derive(Zeroize)]
pub(crate) struct RndState {
    /// Key || V concatenation; only the leading key+block bytes are live.
    pub seed: [u8; SEED_MAX_SIZE_BYTES],
    /// Last emitted block, kept for the continuous test.
    pub previous_rand_value: [u8; 16],
    /// Pending caller-supplied additional input, zero-padded.
    pub additional_input: [u8; ADD_INPUT_MAX_SIZE_BYTES],
    /// Valid words in `additional_input`; 0 when nothing is pending.
    pub add_input_size_words: usize,
    /// Generate calls since the last (re)seed; starts at 1.
    pub reseed_counter: u32,
    /// AES key size in words: 4 or 8.
    pub key_size_words: usize,
    /// Bit-field: INSTANTIATED | KAT_MODE | PREVIOUS_VALID.
    pub state_flag: u32,
    /// `WORK_STATE_VALID_TAG` while the context is live.
    pub valid_tag: u32,
}

impl RndState {
    pub fn new() -> Self {
        RndState {
            seed: [0u8; SEED_MAX_SIZE_BYTES],
            previous_rand_value: [0u8; 16],
            additional_input: [0u8; ADD_INPUT_MAX_SIZE_BYTES],
            add_input_size_words: 0,
            reseed_counter: 0,
            key_size_words: 0,
            state_flag: 0,
            valid_tag: 0,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid_tag == WORK_STATE_VALID_TAG
    }

    pub fn is_instantiated(&self) -> bool {
        self.state_flag & STATE_INSTANTIATED != 0
    }

    pub fn kat_mode(&self) -> bool {
        self.state_flag & STATE_KAT_MODE != 0
    }

    pub fn previous_valid(&self) -> bool {
        self.state_flag & STATE_PREVIOUS_VALID != 0
    }

    pub fn clear_additional_input(&mut self) {
        self.additional_input.zeroize();
        self.add_input_size_words = 0;
    }
}

impl Drop for RndState {
    fn drop(&mut self) {
        self.zeroize();
    }
}
