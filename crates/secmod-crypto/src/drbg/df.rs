//! Block_Cipher_df, the seed derivation function (NIST SP 800-90A 10.3.2).
//!
//! Compresses variable-length seed material (entropy || nonce || additional
//! input) into a (key || block)-sized pseudorandom seed. The BCC compression
//! step is run as a CBC-MAC chained from a precomputed start vector per
//! output block: each vector is the encryption of the block index under the
//! fixed public derivation key, so the per-block counter prefix of the
//! standard never has to be materialized.

use secmod_types::RndError;
use zeroize::Zeroize;

use crate::aes::AES_BLOCK_SIZE;
use crate::cbc_mac::CbcMacAes;
use crate::modes::cbc::cbc_encrypt_in_place;

use super::state::{AES_128_KEY_SIZE_WORDS, AES_256_KEY_SIZE_WORDS};

/// Fixed public derivation key 0x00, 0x01, …, 0x1F, truncated to key size.
const DF_KEY: [u8; 32] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E,
    0x0F, 0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19, 0x1A, 0x1B, 0x1C, 0x1D,
    0x1E, 0x1F,
];

/// AES-128_K(BE32(i) || 0^12) for output block i, 128-bit strength.
const INITIAL_MAC_128: [[u8; 16]; 2] = [
    [
        0xc6, 0xa1, 0x3b, 0x37, 0x87, 0x8f, 0x5b, 0x82, 0x6f, 0x4f, 0x81, 0x62, 0xa1, 0xc8, 0xd8,
        0x79,
    ],
    [
        0x95, 0x03, 0xe3, 0xa2, 0x24, 0x5a, 0x2b, 0xe4, 0x3c, 0x98, 0x74, 0xed, 0xfe, 0x1b, 0xed,
        0x9e,
    ],
];

/// AES-256_K(BE32(i) || 0^12) for output block i, 256-bit strength.
const INITIAL_MAC_256: [[u8; 16]; 3] = [
    [
        0xF2, 0x90, 0x00, 0xB6, 0x2A, 0x49, 0x9F, 0xD0, 0xA9, 0xF3, 0x9A, 0x6A, 0xDD, 0x2E, 0x77,
        0x80,
    ],
    [
        0x9D, 0xBA, 0x41, 0xA7, 0x77, 0xF3, 0xB4, 0x6A, 0x37, 0xB7, 0xAA, 0xAE, 0x49, 0xD6, 0xDF,
        0x8D,
    ],
    [
        0x2F, 0x7A, 0x3C, 0x60, 0x07, 0x08, 0xD1, 0x24, 0xAC, 0xD3, 0xC5, 0xDE, 0x3B, 0x65, 0x84,
        0x47,
    ],
];

/// Derive `out.len()` seed bytes from `seed_material`.
///
/// `out` must be exactly key size + block size for the given strength; the
/// check runs before any cipher call and nothing is written on failure.
pub(crate) fn block_cipher_df(
    key_size_words: usize,
    seed_material: &[u8],
    out: &mut [u8],
) -> Result<(), RndError> {
    let key_size_bytes = key_size_words * 4;
    let init_macs: &[[u8; 16]] = match key_size_words {
        AES_128_KEY_SIZE_WORDS => &INITIAL_MAC_128,
        AES_256_KEY_SIZE_WORDS => &INITIAL_MAC_256,
        _ => return Err(RndError::IllegalAesKeySize),
    };
    if out.len() != key_size_bytes + AES_BLOCK_SIZE {
        return Err(RndError::IllegalDataSize);
    }

    // S = BE32(L) || BE32(N) || seed_material || 0x80 || zero padding
    let mut s = Vec::with_capacity(8 + seed_material.len() + AES_BLOCK_SIZE);
    s.extend_from_slice(&(seed_material.len() as u32).to_be_bytes());
    s.extend_from_slice(&(out.len() as u32).to_be_bytes());
    s.extend_from_slice(seed_material);
    s.push(0x80);
    s.resize(s.len().div_ceil(AES_BLOCK_SIZE) * AES_BLOCK_SIZE, 0);

    // Compression: one CBC-MAC pass per output block.
    let key = &DF_KEY[..key_size_bytes];
    for (i, iv) in init_macs.iter().enumerate() {
        let mut mac = CbcMacAes::new(key, iv)?;
        mac.update(&s)?;
        mac.finish(&mut out[i * AES_BLOCK_SIZE..(i + 1) * AES_BLOCK_SIZE])?;
    }
    s.zeroize();

    // Second stage: the raw compressed value keys one CBC pass over an
    // all-zero buffer of the same length, its own tail block as IV.
    let mut df_cipher_key = [0u8; 32];
    df_cipher_key[..key_size_bytes].copy_from_slice(&out[..key_size_bytes]);
    let mut iv = [0u8; AES_BLOCK_SIZE];
    iv.copy_from_slice(&out[key_size_bytes..key_size_bytes + AES_BLOCK_SIZE]);

    out.fill(0);
    let res = cbc_encrypt_in_place(&df_cipher_key[..key_size_bytes], &iv, out);
    df_cipher_key.zeroize();
    iv.zeroize();
    res?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aes::AesKey;

    // The hard-coded start vectors are the encryptions of the output block
    // index under the fixed derivation key.
    #[test]
    fn initial_mac_constants_match_cipher() {
        for (i, expected) in INITIAL_MAC_128.iter().enumerate() {
            let cipher = AesKey::new(&DF_KEY[..16]).unwrap();
            let mut block = [0u8; 16];
            block[..4].copy_from_slice(&(i as u32).to_be_bytes());
            cipher.encrypt_block(&mut block).unwrap();
            assert_eq!(&block, expected);
        }
        for (i, expected) in INITIAL_MAC_256.iter().enumerate() {
            let cipher = AesKey::new(&DF_KEY).unwrap();
            let mut block = [0u8; 16];
            block[..4].copy_from_slice(&(i as u32).to_be_bytes());
            cipher.encrypt_block(&mut block).unwrap();
            assert_eq!(&block, expected);
        }
    }

    #[test]
    fn df_is_deterministic() {
        let material = b"entropy input material for derivation";
        let mut out1 = [0u8; 48];
        let mut out2 = [0u8; 48];
        block_cipher_df(8, material, &mut out1).unwrap();
        block_cipher_df(8, material, &mut out2).unwrap();
        assert_eq!(out1, out2);
        assert!(out1.iter().any(|&b| b != 0));
    }

    #[test]
    fn df_distinguishes_inputs() {
        let mut out1 = [0u8; 32];
        let mut out2 = [0u8; 32];
        block_cipher_df(4, b"material one", &mut out1).unwrap();
        block_cipher_df(4, b"material two", &mut out2).unwrap();
        assert_ne!(out1, out2);
    }

    // L is part of the MAC'd header, so a zero-padded longer input must not
    // collide with the shorter one.
    #[test]
    fn df_length_is_bound_into_output() {
        let mut out1 = [0u8; 32];
        let mut out2 = [0u8; 32];
        block_cipher_df(4, &[0x55; 16], &mut out1).unwrap();
        block_cipher_df(4, &[0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0, 0, 0, 0], &mut out2).unwrap();
        assert_ne!(out1, out2);
    }

    #[test]
    fn df_rejects_wrong_output_size() {
        let mut out = [0u8; 40];
        assert!(matches!(
            block_cipher_df(8, b"x", &mut out),
            Err(RndError::IllegalDataSize)
        ));
        let mut out = [0u8; 32];
        assert!(matches!(
            block_cipher_df(8, b"x", &mut out),
            Err(RndError::IllegalDataSize)
        ));
    }

    #[test]
    fn df_rejects_bad_key_size() {
        let mut out = [0u8; 40];
        assert!(matches!(
            block_cipher_df(6, b"x", &mut out),
            Err(RndError::IllegalAesKeySize)
        ));
    }

    #[test]
    fn df_strengths_have_expected_output_sizes() {
        let mut out128 = [0u8; 32];
        block_cipher_df(4, b"some material", &mut out128).unwrap();
        let mut out256 = [0u8; 48];
        block_cipher_df(8, b"some material", &mut out256).unwrap();
        assert_ne!(&out128[..], &out256[..32]);
    }
}
