//! CBC (Cipher Block Chaining) mode, raw block encryption.
//!
//! No padding is applied or stripped; callers hand in block-aligned data.
//! The DRBG derivation function pads its own input (0x80 plus zeros) before
//! it ever reaches this layer.

use crate::aes::{AesKey, AES_BLOCK_SIZE};
use secmod_types::CryptoError;

/// Encrypt block-aligned `data` in place with AES-CBC.
pub fn cbc_encrypt_in_place(key: &[u8], iv: &[u8], data: &mut [u8]) -> Result<(), CryptoError> {
    if iv.len() != AES_BLOCK_SIZE {
        return Err(CryptoError::InvalidIvLength);
    }
    if data.is_empty() || data.len() % AES_BLOCK_SIZE != 0 {
        return Err(CryptoError::InvalidArg);
    }
    let cipher = AesKey::new(key)?;

    let mut prev = [0u8; AES_BLOCK_SIZE];
    prev.copy_from_slice(iv);

    for chunk in data.chunks_mut(AES_BLOCK_SIZE) {
        for (c, p) in chunk.iter_mut().zip(prev.iter()) {
            *c ^= p;
        }
        cipher.encrypt_block(chunk)?;
        prev.copy_from_slice(chunk);
    }
    Ok(())
}
