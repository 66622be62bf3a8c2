//! Known Answer Tests (KAT) for FIPS 140-3 self-testing.
//!
//! Each KAT runs a single algorithm computation with a known input and
//! verifies the output against the expected value from FIPS 197, NIST
//! SP 800-38A or the NIST CAVP DRBG vector files.

use secmod_types::CmvpError;

use crate::aes::AesKey;
use crate::drbg::{CtrDrbg, SecurityStrength};
use crate::entropy::{SystemEntropySource, TrngWorkBuff};
use crate::modes::ctr::CtrCipher;

fn hex(s: &str) -> Vec<u8> {
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
        .collect()
}

/// Run all KAT self-tests. Returns on first failure.
pub(crate) fn run_all_kat() -> Result<(), CmvpError> {
    kat_aes256()?;
    kat_aes_ctr()?;
    kat_ctr_drbg_aes128()?;
    kat_ctr_drbg_aes256()?;
    Ok(())
}

/// AES-256 block encryption KAT (FIPS 197 Appendix C.3).
fn kat_aes256() -> Result<(), CmvpError> {
    let key = hex("000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f");
    let mut block: [u8; 16] = hex("00112233445566778899aabbccddeeff").try_into().unwrap();
    let expected = hex("8ea2b7ca516745bfeafc49904b496089");

    let cipher = AesKey::new(&key).map_err(|e| CmvpError::KatFailure(format!("AES-256 key: {e}")))?;
    cipher
        .encrypt_block(&mut block)
        .map_err(|e| CmvpError::KatFailure(format!("AES-256 encrypt: {e}")))?;

    if block[..] != expected[..] {
        return Err(CmvpError::KatFailure("AES-256 ciphertext mismatch".into()));
    }
    Ok(())
}

/// AES-128 CTR mode KAT (NIST SP 800-38A F.5.1, first block).
fn kat_aes_ctr() -> Result<(), CmvpError> {
    let key = hex("2b7e151628aed2a6abf7158809cf4f3c");
    let iv = hex("f0f1f2f3f4f5f6f7f8f9fafbfcfdfeff");
    let mut data = hex("6bc1bee22e409f96e93d7e117393172a");
    let expected = hex("874d6191b620e3261bef6864990db6ce");

    let mut ctr = CtrCipher::new(&key, &iv)
        .map_err(|e| CmvpError::KatFailure(format!("AES-CTR init: {e}")))?;
    ctr.apply(&mut data)
        .map_err(|e| CmvpError::KatFailure(format!("AES-CTR apply: {e}")))?;

    if data != expected {
        return Err(CmvpError::KatFailure("AES-CTR keystream mismatch".into()));
    }
    Ok(())
}

/// Drive the full KAT-mode DRBG flow: instantiate from fixed entropy, two
/// generate calls, compare the second output.
fn ctr_drbg_kat(
    strength: SecurityStrength,
    entropy: &[u8],
    nonce: &[u8],
    expected: &[u8],
    label: &str,
) -> Result<(), CmvpError> {
    let fail = |stage: &str| CmvpError::KatFailure(format!("{label} {stage}"));

    let drbg = CtrDrbg::new(strength);
    let mut work = TrngWorkBuff::new();
    drbg.enter_kat_mode(entropy, nonce, &mut work)
        .map_err(|_| fail("enter kat mode"))?;
    drbg.instantiate(&mut SystemEntropySource, &mut work)
        .map_err(|_| fail("instantiate"))?;

    let mut out = vec![0u8; expected.len()];
    drbg.generate(&mut out).map_err(|_| fail("generate 1"))?;
    drbg.generate(&mut out).map_err(|_| fail("generate 2"))?;

    if out != expected {
        return Err(fail("output mismatch"));
    }
    Ok(())
}

/// CTR_DRBG AES-128 (use df) KAT: NIST CAVP drbgvectors_no_reseed,
/// [AES-128 use df] COUNT 0.
fn kat_ctr_drbg_aes128() -> Result<(), CmvpError> {
    ctr_drbg_kat(
        SecurityStrength::Aes128,
        &hex("890eb067acf7382eff80b0c73bc872c6"),
        &hex("aad471ef3ef1d203"),
        &hex(
            "a5514ed7095f64f3d0d3a5760394ab42062f373a25072a6ea6bcfd8489e94af6cf18659fea22ed1ca0a9e33f718b115ee536b12809c31b72b08ddd8be1910fa3",
        ),
        "CTR_DRBG AES-128",
    )
}

/// CTR_DRBG AES-256 (use df) KAT: NIST CAVP drbgvectors_no_reseed,
/// [AES-256 use df] COUNT 0.
fn kat_ctr_drbg_aes256() -> Result<(), CmvpError> {
    ctr_drbg_kat(
        SecurityStrength::Aes256,
        &hex("36401940fa8b1fba91a1661f211d78a0b9389a74e5bccfece8d766af1a6d3b14"),
        &hex("496f25b0f1301b4f501be30380a137eb"),
        &hex(
            "5862eb38bd558dd978a696e6df164782ddd887e7e9a6c9f3f1fbafb78941b535a64912dfd224c6dc7454e5250b3d97165e16260c2faf1cc7735cb75fb4f07e1d",
        ),
        "CTR_DRBG AES-256",
    )
}
