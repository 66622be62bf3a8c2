//! CTR_DRBG engine core (NIST SP 800-90A Section 10.2, with derivation
//! function).
//!
//! Holds the Update, Instantiate/Reseed and Generate algorithms together
//! with the continuous random number generator test (CRNGT), additional
//! input intake and the KAT override mode. Every operation runs under the
//! instance lock and fails closed: a cipher or entropy failure while seed
//! material is being mixed zeroizes the whole working state so a half-valid
//! context can never be reused.

use std::sync::{Arc, Mutex, MutexGuard};

use secmod_types::RndError;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, Zeroizing};

use crate::aes::AES_BLOCK_SIZE;
use crate::entropy::{EntropySource, TrngWorkBuff};
use crate::fips::FipsIndicator;
use crate::modes::ctr::{add_to_counter, CtrCipher};

use super::df::block_cipher_df;
use super::state::{
    RndState, SecurityStrength, ADD_INPUT_MAX_SIZE_BYTES, ADD_INPUT_MAX_SIZE_WORDS,
    AES_128_KEY_SIZE_WORDS, AES_256_KEY_SIZE_WORDS, MAX_GEN_VECTOR_SIZE_BYTES, MAX_RESEED_COUNTER,
    SEED_MAX_SIZE_BYTES, STATE_INSTANTIATED, STATE_KAT_MODE, STATE_PREVIOUS_VALID,
    WORK_STATE_VALID_TAG,
};
use super::RandomSource;

/// CTR_DRBG instance: working state behind a per-instance lock.
///
/// The security strength (AES-128 or AES-256) is fixed at construction.
/// Instantiate once, then any number of Generate / AddAdditionalInput /
/// Reseed calls; UnInstantiate (or drop) wipes the state.
pub struct CtrDrbg {
    /// Working state, serialized by the instance lock.
    state: Mutex<RndState>,
    /// Security strength fixed at construction.
    strength: SecurityStrength,
    /// Optional FIPS status sink for continuity failures.
    indicator: Option<Arc<dyn FipsIndicator>>,
}

impl CtrDrbg {
    /// Create an uninstantiated instance at the given security strength.
    pub fn new(strength: SecurityStrength) -> Self {
        CtrDrbg {
            state: Mutex::new(RndState::new()),
            strength,
            indicator: None,
        }
    }

    /// Attach a FIPS status sink that receives continuity-failure reports.
    pub fn with_indicator(mut self, indicator: Arc<dyn FipsIndicator>) -> Self {
        self.indicator = Some(indicator);
        self
    }

    /// Acquire the instance lock. A poisoned lock means another thread
    /// panicked inside the engine; that is a platform fault, not a
    /// recoverable condition.
    fn lock(&self) -> MutexGuard<'_, RndState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(_) => std::process::abort(),
        }
    }

    /// CTR_DRBG_Instantiate (10.2.1.3.2).
    ///
    /// Builds a fresh seed from entropy || nonce || pending additional input
    /// (the personalization string) and marks the state valid. Must succeed
    /// once before any Generate. In KAT mode the staged `work` content is
    /// consumed instead of querying `source`.
    pub fn instantiate(
        &self,
        source: &mut dyn EntropySource,
        work: &mut TrngWorkBuff,
    ) -> Result<(), RndError> {
        let mut state = self.lock();
        self.instantiate_or_reseed(&mut state, source, work, true)
    }

    /// CTR_DRBG_Reseed (10.2.1.4.2).
    ///
    /// Mixes fresh entropy and pending additional input into the working
    /// state and resets the reseed counter. Requires a valid, instantiated
    /// state.
    pub fn reseed(
        &self,
        source: &mut dyn EntropySource,
        work: &mut TrngWorkBuff,
    ) -> Result<(), RndError> {
        let mut state = self.lock();
        self.instantiate_or_reseed(&mut state, source, work, false)
    }

    fn instantiate_or_reseed(
        &self,
        state: &mut RndState,
        source: &mut dyn EntropySource,
        work: &mut TrngWorkBuff,
        is_instantiate: bool,
    ) -> Result<(), RndError> {
        if !is_instantiate {
            if !state.is_valid() {
                return Err(RndError::StateValidationTag);
            }
            if !state.is_instantiated() {
                return Err(RndError::InstantiationNotDone);
            }
        }

        // The key size follows the configured strength; a prior failure may
        // have zeroized it.
        state.key_size_words = self.strength.key_size_words();

        let key_size_words = state.key_size_words;
        if key_size_words != AES_128_KEY_SIZE_WORDS && key_size_words != AES_256_KEY_SIZE_WORDS {
            return Err(RndError::IllegalAesKeySize);
        }
        if state.add_input_size_words > ADD_INPUT_MAX_SIZE_WORDS {
            return Err(RndError::AdditionalInputSize);
        }
        // KAT injection requires a non-empty staged source.
        if state.kat_mode() && work.source().is_empty() {
            return Err(RndError::KatDataParams);
        }

        let res = self.derive_and_update(state, source, work, is_instantiate);

        // The staging buffer holds raw entropy; wipe it on every exit.
        work.clear();

        match res {
            Ok(()) => {
                state.reseed_counter = 1;
                state.state_flag |= STATE_INSTANTIATED;
                if is_instantiate {
                    state.valid_tag = WORK_STATE_VALID_TAG;
                    state.state_flag &= !STATE_PREVIOUS_VALID;
                }
                state.clear_additional_input();
                Ok(())
            }
            Err(err) => {
                // Partially mixed key material must never survive.
                state.zeroize();
                if matches!(err, RndError::TrngGenerationIncomplete) {
                    if let Some(indicator) = &self.indicator {
                        indicator.report_continuity_failure();
                    }
                }
                Err(err)
            }
        }
    }

    /// Obtain seed source material, run it through the derivation function
    /// and fold the result into (Key, V).
    fn derive_and_update(
        &self,
        state: &mut RndState,
        source: &mut dyn EntropySource,
        work: &mut TrngWorkBuff,
        is_instantiate: bool,
    ) -> Result<(), RndError> {
        let key_size_bytes = state.key_size_words * 4;
        let seed_size_bytes = key_size_bytes + AES_BLOCK_SIZE;

        if !state.kat_mode() {
            // Full-strength entropy, plus a half-strength nonce when
            // building a fresh seed.
            let mut request = key_size_bytes;
            if is_instantiate {
                request += key_size_bytes / 2;
            }
            work.fill_from(source, request)?;
        }

        // seed material = entropy || nonce || additional input
        let mut material = Zeroizing::new(Vec::with_capacity(
            work.source().len() + ADD_INPUT_MAX_SIZE_BYTES,
        ));
        material.extend_from_slice(work.source());
        material
            .extend_from_slice(&state.additional_input[..state.add_input_size_words * 4]);

        let mut seed_material = Zeroizing::new([0u8; SEED_MAX_SIZE_BYTES]);
        block_cipher_df(
            state.key_size_words,
            &material,
            &mut seed_material[..seed_size_bytes],
        )?;

        // Instantiate is defined relative to an all-zero previous seed.
        if is_instantiate {
            state.seed.zeroize();
        }
        update(state, &seed_material[..seed_size_bytes], false)
    }

    /// CTR_DRBG_Generate (10.2.1.5.2).
    ///
    /// Fills `out` with generated bytes. On any failure the buffer is
    /// zeroized before returning so partial keystream never leaks; pending
    /// additional input is consumed by exactly one request, successful or
    /// not.
    pub fn generate(&self, out: &mut [u8]) -> Result<(), RndError> {
        // Zero-length requests succeed without touching the state. Kept for
        // callers that probe with empty buffers; not a NIST rule.
        if out.is_empty() {
            return Ok(());
        }
        if out.len() > MAX_GEN_VECTOR_SIZE_BYTES {
            return Err(RndError::IllegalParameter);
        }

        let mut state = self.lock();
        let res = self.generate_locked(&mut state, out);

        if state.add_input_size_words != 0 {
            state.clear_additional_input();
        }
        if let Err(err) = &res {
            out.zeroize();
            if matches!(err, RndError::CipherFailure(_)) {
                state.zeroize();
            }
        }
        res
    }

    fn generate_locked(&self, state: &mut RndState, out: &mut [u8]) -> Result<(), RndError> {
        if !state.is_valid() {
            return Err(RndError::StateValidationTag);
        }
        if !state.is_instantiated() {
            return Err(RndError::InstantiationNotDone);
        }
        if state.reseed_counter >= MAX_RESEED_COUNTER {
            return Err(RndError::ReseedCounterOverflow);
        }

        let key_size_words = state.key_size_words;
        if key_size_words != AES_128_KEY_SIZE_WORDS && key_size_words != AES_256_KEY_SIZE_WORDS {
            return Err(RndError::IllegalAesKeySize);
        }
        if state.add_input_size_words > ADD_INPUT_MAX_SIZE_WORDS {
            return Err(RndError::AdditionalInputSize);
        }

        let key_size_bytes = key_size_words * 4;
        let seed_size_bytes = key_size_bytes + AES_BLOCK_SIZE;

        // Pending additional input is compressed through the derivation
        // function and folded into (Key, V) now; the derived value is
        // reused by the closing Update below.
        let mut provided = Zeroizing::new([0u8; SEED_MAX_SIZE_BYTES]);
        if state.add_input_size_words > 0 {
            let add_len = state.add_input_size_words * 4;
            let mut pending = Zeroizing::new([0u8; ADD_INPUT_MAX_SIZE_BYTES]);
            pending[..add_len].copy_from_slice(&state.additional_input[..add_len]);
            block_cipher_df(
                key_size_words,
                &pending[..add_len],
                &mut provided[..seed_size_bytes],
            )?;
            update(state, &provided[..seed_size_bytes], false)?;
        }

        // V = V + 1
        add_to_counter(&mut state.seed[key_size_bytes..seed_size_bytes], 1);

        let mut ctr = CtrCipher::new(
            &state.seed[..key_size_bytes],
            &state.seed[key_size_bytes..seed_size_bytes],
        )?;

        // First use of a working session: burn one block as the comparison
        // baseline for the continuous test.
        if !state.kat_mode() && !state.previous_valid() {
            state.previous_rand_value = ctr.next_block()?;
            state.state_flag |= STATE_PREVIOUS_VALID;
        }

        let mut remain_bytes = out.len() & (AES_BLOCK_SIZE - 1);
        let mut count_blocks = out.len() >> 4;
        if remain_bytes == 0 {
            remain_bytes = AES_BLOCK_SIZE;
        } else {
            count_blocks += 1;
        }
        let full_bytes = out.len() - remain_bytes;

        if full_bytes > 0 {
            out[..full_bytes].fill(0);
            ctr.apply(&mut out[..full_bytes])?;
        }

        // The final block is always produced whole: its leading bytes close
        // the request and the whole block becomes the next baseline.
        let previous = state.previous_rand_value;
        state.previous_rand_value = ctr.next_block()?;
        out[full_bytes..].copy_from_slice(&state.previous_rand_value[..remain_bytes]);

        if !state.kat_mode() {
            if let Err(err) = continuous_test(
                &previous,
                &out[..full_bytes],
                &state.previous_rand_value,
                count_blocks,
            ) {
                if let Some(indicator) = &self.indicator {
                    indicator.report_continuity_failure();
                }
                return Err(err);
            }
        }

        // V = V + count_blocks, then refresh (Key, V) for the next request.
        add_to_counter(
            &mut state.seed[key_size_bytes..seed_size_bytes],
            count_blocks as u32,
        );
        update(state, &provided[..seed_size_bytes], true)?;

        state.reseed_counter += 1;
        Ok(())
    }

    /// Generate `len` pseudorandom bytes (convenience method).
    pub fn generate_bytes(&self, len: usize) -> Result<Vec<u8>, RndError> {
        let mut out = vec![0u8; len];
        self.generate(&mut out)?;
        Ok(out)
    }

    /// Stage caller-supplied additional input for the next Generate or
    /// Reseed. Length must be a multiple of 4 bytes, at most 48; unused
    /// trailing words are zero. Staged data is consumed exactly once.
    pub fn add_additional_input(&self, data: &[u8]) -> Result<(), RndError> {
        if data.len() > ADD_INPUT_MAX_SIZE_BYTES || data.len() % 4 != 0 {
            return Err(RndError::AdditionalInputSize);
        }

        let mut state = self.lock();
        if !state.is_valid() {
            return Err(RndError::StateValidationTag);
        }
        state.clear_additional_input();
        state.additional_input[..data.len()].copy_from_slice(data);
        state.add_input_size_words = data.len() / 4;
        Ok(())
    }

    /// Switch into Known-Answer-Test mode: the next Instantiate/Reseed
    /// consumes `entropy || nonce` staged in `work` instead of querying the
    /// entropy source, and Generate skips the continuous test so output is
    /// bit-exact against published vectors.
    ///
    /// Empty entropy is a no-op success.
    pub fn enter_kat_mode(
        &self,
        entropy: &[u8],
        nonce: &[u8],
        work: &mut TrngWorkBuff,
    ) -> Result<(), RndError> {
        if entropy.is_empty() {
            return Ok(());
        }

        let mut state = self.lock();
        work.stage(entropy, nonce)?;
        state.state_flag |= STATE_KAT_MODE;
        // The KAT entry path vouches for the context so test scenarios can
        // stage additional input before the first instantiate.
        state.valid_tag = WORK_STATE_VALID_TAG;
        Ok(())
    }

    /// Leave KAT mode. Idempotent; clears only the mode flag.
    pub fn disable_kat_mode(&self) {
        let mut state = self.lock();
        state.state_flag &= !STATE_KAT_MODE;
    }

    /// Tear down the instance: zeroizes the whole working state including
    /// the valid tag, so any further use is rejected until a fresh
    /// Instantiate.
    pub fn uninstantiate(&self) {
        let mut state = self.lock();
        state.zeroize();
    }
}

impl RandomSource for CtrDrbg {
    fn random_bytes(&self, out: &mut [u8]) -> Result<(), RndError> {
        self.generate(out)
    }
}

/// CTR_DRBG Update (10.2.1.2): fold exactly seed-sized `provided_data` into
/// (Key, V) with one CTR pass over it.
///
/// When `skip_setup` is false the first keystream block is discarded, which
/// advances V by one before the pass; the Generate path has already
/// positioned V and sets `skip_setup`.
fn update(state: &mut RndState, provided_data: &[u8], skip_setup: bool) -> Result<(), RndError> {
    let key_size_bytes = state.key_size_words * 4;
    let seed_size_bytes = key_size_bytes + AES_BLOCK_SIZE;
    debug_assert_eq!(provided_data.len(), seed_size_bytes);

    let mut ctr = CtrCipher::new(
        &state.seed[..key_size_bytes],
        &state.seed[key_size_bytes..seed_size_bytes],
    )?;
    if !skip_setup {
        ctr.advance(1);
    }

    let mut temp = Zeroizing::new([0u8; SEED_MAX_SIZE_BYTES]);
    temp[..seed_size_bytes].copy_from_slice(provided_data);
    ctr.apply(&mut temp[..seed_size_bytes])?;
    state.seed[..seed_size_bytes].copy_from_slice(&temp[..seed_size_bytes]);
    Ok(())
}

/// Continuous RNG test: within one request, every adjacent pair of
/// generated blocks must differ, and the first block must differ from the
/// previous request's last block. Comparisons are constant-time.
fn continuous_test(
    previous: &[u8; 16],
    full_blocks: &[u8],
    last: &[u8; 16],
    count_blocks: usize,
) -> Result<(), RndError> {
    if count_blocks == 1 {
        if bool::from(previous[..].ct_eq(&last[..])) {
            return Err(RndError::CrngtFailure);
        }
        return Ok(());
    }

    if bool::from(previous[..].ct_eq(&full_blocks[..AES_BLOCK_SIZE])) {
        return Err(RndError::CrngtFailure);
    }
    let tail = &full_blocks[(count_blocks - 2) * AES_BLOCK_SIZE..(count_blocks - 1) * AES_BLOCK_SIZE];
    if bool::from(tail.ct_eq(&last[..])) {
        return Err(RndError::CrngtFailure);
    }
    for i in 0..count_blocks.saturating_sub(2) {
        let a = &full_blocks[i * AES_BLOCK_SIZE..(i + 1) * AES_BLOCK_SIZE];
        let b = &full_blocks[(i + 1) * AES_BLOCK_SIZE..(i + 2) * AES_BLOCK_SIZE];
        if bool::from(a.ct_eq(b)) {
            return Err(RndError::CrngtFailure);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aes::AesKey;
    use crate::entropy::SystemEntropySource;

    fn hex_to_bytes(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }

    /// Instantiate from fixed KAT entropy at the given strength.
    fn kat_instance(strength: SecurityStrength, entropy: &[u8], nonce: &[u8]) -> CtrDrbg {
        let drbg = CtrDrbg::new(strength);
        let mut work = TrngWorkBuff::new();
        drbg.enter_kat_mode(entropy, nonce, &mut work).unwrap();
        drbg.instantiate(&mut SystemEntropySource, &mut work)
            .unwrap();
        drbg
    }

    // Update from the all-zero state with zero provided data must yield the
    // raw keystream at counters 1..=3.
    #[test]
    fn update_from_zero_state_known_answer() {
        let mut state = RndState::new();
        state.key_size_words = AES_256_KEY_SIZE_WORDS;
        update(&mut state, &[0u8; 48], false).unwrap();

        let cipher = AesKey::new(&[0u8; 32]).unwrap();
        let mut expected = [0u8; 48];
        for i in 0u32..3 {
            let mut block = [0u8; 16];
            block[12..].copy_from_slice(&(i + 1).to_be_bytes());
            cipher.encrypt_block(&mut block).unwrap();
            expected[i as usize * 16..(i as usize + 1) * 16].copy_from_slice(&block);
        }
        assert_eq!(&state.seed[..48], &expected);
    }

    // With skip_setup the keystream starts at the current counter value.
    #[test]
    fn update_skip_setup_starts_at_current_counter() {
        let mut state = RndState::new();
        state.key_size_words = AES_256_KEY_SIZE_WORDS;
        update(&mut state, &[0u8; 48], true).unwrap();

        let cipher = AesKey::new(&[0u8; 32]).unwrap();
        let mut first = [0u8; 16];
        cipher.encrypt_block(&mut first).unwrap();
        assert_eq!(&state.seed[..16], &first);
    }

    #[test]
    fn continuous_test_single_block() {
        let a = [0x11u8; 16];
        let b = [0x22u8; 16];
        assert!(continuous_test(&a, &[], &b, 1).is_ok());
        assert!(matches!(
            continuous_test(&a, &[], &a, 1),
            Err(RndError::CrngtFailure)
        ));
    }

    #[test]
    fn continuous_test_multi_block() {
        let prev = [0xAAu8; 16];
        let last = [0xDDu8; 16];
        let mut blocks = [0u8; 32];
        blocks[..16].copy_from_slice(&[0xBB; 16]);
        blocks[16..].copy_from_slice(&[0xCC; 16]);

        assert!(continuous_test(&prev, &blocks, &last, 3).is_ok());
        // previous request's block repeats first
        assert!(continuous_test(&[0xBB; 16], &blocks, &last, 3).is_err());
        // adjacent repeat inside the request
        blocks[16..].copy_from_slice(&[0xBB; 16]);
        assert!(continuous_test(&prev, &blocks, &last, 3).is_err());
        // last block repeats the preceding one
        blocks[16..].copy_from_slice(&[0xCC; 16]);
        assert!(continuous_test(&prev, &blocks, &[0xCC; 16], 3).is_err());
    }

    #[test]
    fn kat_generate_is_deterministic() {
        let entropy = [0x42u8; 32];
        let nonce = [0x24u8; 16];
        let a = kat_instance(SecurityStrength::Aes256, &entropy, &nonce)
            .generate_bytes(64)
            .unwrap();
        let b = kat_instance(SecurityStrength::Aes256, &entropy, &nonce)
            .generate_bytes(64)
            .unwrap();
        assert_eq!(a, b);
        assert!(a.iter().any(|&x| x != 0));
    }

    #[test]
    fn additional_input_changes_output_deterministically() {
        let entropy = [0x42u8; 32];
        let nonce = [0x24u8; 16];
        let add = hex_to_bytes("00112233445566778899aabbccddeeff");

        let plain = kat_instance(SecurityStrength::Aes256, &entropy, &nonce)
            .generate_bytes(32)
            .unwrap();

        let mixed1 = {
            let drbg = kat_instance(SecurityStrength::Aes256, &entropy, &nonce);
            drbg.add_additional_input(&add).unwrap();
            drbg.generate_bytes(32).unwrap()
        };
        let mixed2 = {
            let drbg = kat_instance(SecurityStrength::Aes256, &entropy, &nonce);
            drbg.add_additional_input(&add).unwrap();
            drbg.generate_bytes(32).unwrap()
        };

        assert_ne!(plain, mixed1);
        assert_eq!(mixed1, mixed2);
    }

    #[test]
    fn additional_input_consumed_once() {
        let drbg = kat_instance(SecurityStrength::Aes256, &[0x42; 32], &[0x24; 16]);
        drbg.add_additional_input(&[0x77; 16]).unwrap();
        let _ = drbg.generate_bytes(16).unwrap();
        assert_eq!(drbg.state.lock().unwrap().add_input_size_words, 0);
    }

    #[test]
    fn zero_length_generate_is_a_noop() {
        let drbg = kat_instance(SecurityStrength::Aes256, &[0x42; 32], &[0x24; 16]);
        let (seed_before, counter_before) = {
            let state = drbg.state.lock().unwrap();
            (state.seed, state.reseed_counter)
        };

        let mut out = [0u8; 0];
        drbg.generate(&mut out).unwrap();

        let state = drbg.state.lock().unwrap();
        assert_eq!(state.seed, seed_before);
        assert_eq!(state.reseed_counter, counter_before);
    }

    #[test]
    fn oversized_generate_rejected_without_state_change() {
        let drbg = kat_instance(SecurityStrength::Aes256, &[0x42; 32], &[0x24; 16]);
        let seed_before = drbg.state.lock().unwrap().seed;

        let mut out = vec![0u8; 0x10000];
        assert!(matches!(
            drbg.generate(&mut out),
            Err(RndError::IllegalParameter)
        ));
        assert_eq!(drbg.state.lock().unwrap().seed, seed_before);

        // One byte less is the largest accepted request.
        let mut out = vec![0u8; 0xFFFF];
        drbg.generate(&mut out).unwrap();
    }

    #[test]
    fn reseed_counter_overflow_is_rejected() {
        let drbg = kat_instance(SecurityStrength::Aes256, &[0x42; 32], &[0x24; 16]);
        drbg.state.lock().unwrap().reseed_counter = MAX_RESEED_COUNTER - 1;

        // The last permitted request takes the counter to the bound.
        drbg.generate_bytes(16).unwrap();
        assert_eq!(
            drbg.state.lock().unwrap().reseed_counter,
            MAX_RESEED_COUNTER
        );

        let seed_before = drbg.state.lock().unwrap().seed;
        assert!(matches!(
            drbg.generate_bytes(16),
            Err(RndError::ReseedCounterOverflow)
        ));
        assert_eq!(drbg.state.lock().unwrap().seed, seed_before);
    }

    #[test]
    fn uninitialized_context_is_rejected() {
        let drbg = CtrDrbg::new(SecurityStrength::Aes256);
        assert!(matches!(
            drbg.generate_bytes(16),
            Err(RndError::StateValidationTag)
        ));
        assert!(matches!(
            drbg.add_additional_input(&[0u8; 8]),
            Err(RndError::StateValidationTag)
        ));
        let mut work = TrngWorkBuff::new();
        assert!(matches!(
            drbg.reseed(&mut SystemEntropySource, &mut work),
            Err(RndError::StateValidationTag)
        ));
    }

    #[test]
    fn additional_input_size_validation() {
        let drbg = kat_instance(SecurityStrength::Aes256, &[0x42; 32], &[0x24; 16]);
        // 13 words
        assert!(matches!(
            drbg.add_additional_input(&[0u8; 52]),
            Err(RndError::AdditionalInputSize)
        ));
        // not word-aligned
        assert!(matches!(
            drbg.add_additional_input(&[0u8; 5]),
            Err(RndError::AdditionalInputSize)
        ));
        // 12 words exactly
        drbg.add_additional_input(&[0u8; 48]).unwrap();
        // empty clears the pending buffer
        drbg.add_additional_input(&[]).unwrap();
        assert_eq!(drbg.state.lock().unwrap().add_input_size_words, 0);
    }

    #[test]
    fn additional_input_cleared_even_when_generate_fails() {
        let drbg = kat_instance(SecurityStrength::Aes256, &[0x42; 32], &[0x24; 16]);
        drbg.state.lock().unwrap().reseed_counter = MAX_RESEED_COUNTER;
        drbg.add_additional_input(&[0x33; 8]).unwrap();

        assert!(drbg.generate_bytes(16).is_err());
        assert_eq!(drbg.state.lock().unwrap().add_input_size_words, 0);
    }

    #[test]
    fn kat_mode_with_empty_staging_is_rejected() {
        let drbg = CtrDrbg::new(SecurityStrength::Aes256);
        let mut work = TrngWorkBuff::new();
        drbg.enter_kat_mode(&[0x42; 32], &[0x24; 16], &mut work)
            .unwrap();
        work.clear();
        assert!(matches!(
            drbg.instantiate(&mut SystemEntropySource, &mut work),
            Err(RndError::KatDataParams)
        ));
    }

    #[test]
    fn enter_kat_mode_with_empty_entropy_is_a_noop() {
        let drbg = CtrDrbg::new(SecurityStrength::Aes256);
        let mut work = TrngWorkBuff::new();
        drbg.enter_kat_mode(&[], &[], &mut work).unwrap();
        assert!(!drbg.state.lock().unwrap().kat_mode());
    }

    #[test]
    fn disable_kat_mode_is_idempotent() {
        let drbg = kat_instance(SecurityStrength::Aes256, &[0x42; 32], &[0x24; 16]);
        assert!(drbg.state.lock().unwrap().kat_mode());
        drbg.disable_kat_mode();
        drbg.disable_kat_mode();
        assert!(!drbg.state.lock().unwrap().kat_mode());

        // Never-entered contexts tolerate it too.
        CtrDrbg::new(SecurityStrength::Aes128).disable_kat_mode();
    }

    #[test]
    fn uninstantiate_wipes_the_state() {
        let drbg = kat_instance(SecurityStrength::Aes256, &[0x42; 32], &[0x24; 16]);
        drbg.generate_bytes(32).unwrap();
        drbg.uninstantiate();

        let state = drbg.state.lock().unwrap();
        assert_eq!(state.seed, [0u8; SEED_MAX_SIZE_BYTES]);
        assert!(!state.is_valid());
        drop(state);

        assert!(matches!(
            drbg.generate_bytes(16),
            Err(RndError::StateValidationTag)
        ));
    }

    #[test]
    fn reseed_counter_resets_on_reseed() {
        let drbg = kat_instance(SecurityStrength::Aes256, &[0x42; 32], &[0x24; 16]);
        drbg.generate_bytes(16).unwrap();
        drbg.generate_bytes(16).unwrap();
        assert_eq!(drbg.state.lock().unwrap().reseed_counter, 3);

        let mut work = TrngWorkBuff::new();
        drbg.enter_kat_mode(&[0x55; 32], &[], &mut work).unwrap();
        drbg.reseed(&mut SystemEntropySource, &mut work).unwrap();
        assert_eq!(drbg.state.lock().unwrap().reseed_counter, 1);
    }

    #[test]
    fn generate_output_lengths() {
        let drbg = kat_instance(SecurityStrength::Aes128, &[0x42; 16], &[0x24; 8]);
        for len in [1usize, 5, 15, 16, 17, 31, 32, 33, 64, 100] {
            let out = drbg.generate_bytes(len).unwrap();
            assert_eq!(out.len(), len);
        }
    }

    #[test]
    fn random_source_trait_draws() {
        let drbg = kat_instance(SecurityStrength::Aes256, &[0x42; 32], &[0x24; 16]);
        let source: &dyn RandomSource = &drbg;
        let mut out = [0u8; 24];
        source.random_bytes(&mut out).unwrap();
        assert!(out.iter().any(|&b| b != 0));
    }
}
