//! CTR (Counter) mode keystream engine.
//!
//! Unlike a one-shot transform, [`CtrCipher`] keeps its counter across
//! calls: the DRBG consumes keystream in several slices per request (a
//! discarded setup block, the bulk output, one final whole block) and all
//! of them must come from one contiguous counter sequence.

use crate::aes::{AesKey, AES_BLOCK_SIZE};
use secmod_types::CryptoError;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Add `val` to a 128-bit big-endian counter with carry propagation.
pub(crate) fn add_to_counter(counter: &mut [u8], val: u32) {
    debug_assert_eq!(counter.len(), AES_BLOCK_SIZE);
    let mut carry = val as u64;
    for limb in (0..4).rev() {
        if carry == 0 {
            break;
        }
        let off = limb * 4;
        let cur = u32::from_be_bytes(counter[off..off + 4].try_into().unwrap()) as u64;
        let sum = cur + carry;
        counter[off..off + 4].copy_from_slice(&(sum as u32).to_be_bytes());
        carry = sum >> 32;
    }
}

/// Stateful AES-CTR keystream engine.
///
/// The full 16-byte block is the counter, treated as a big-endian integer;
/// it advances by one per keystream block.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct CtrCipher {
    cipher: AesKey,
    counter: [u8; AES_BLOCK_SIZE],
}

impl CtrCipher {
    /// Create a CTR engine from a raw AES key and a 16-byte initial counter.
    pub fn new(key: &[u8], iv: &[u8]) -> Result<Self, CryptoError> {
        if iv.len() != AES_BLOCK_SIZE {
            return Err(CryptoError::InvalidIvLength);
        }
        let cipher = AesKey::new(key)?;
        let mut counter = [0u8; AES_BLOCK_SIZE];
        counter.copy_from_slice(iv);
        Ok(Self { cipher, counter })
    }

    /// Discard `blocks` keystream blocks by advancing the counter.
    pub fn advance(&mut self, blocks: u32) {
        add_to_counter(&mut self.counter, blocks);
    }

    /// Produce the next raw keystream block.
    pub fn next_block(&mut self) -> Result<[u8; AES_BLOCK_SIZE], CryptoError> {
        let mut block = self.counter;
        self.cipher.encrypt_block(&mut block)?;
        add_to_counter(&mut self.counter, 1);
        Ok(block)
    }

    /// XOR the keystream into `data` in place.
    ///
    /// A trailing partial block still consumes one full keystream block.
    pub fn apply(&mut self, data: &mut [u8]) -> Result<(), CryptoError> {
        for chunk in data.chunks_mut(AES_BLOCK_SIZE) {
            let ks = self.next_block()?;
            for (d, &k) in chunk.iter_mut().zip(ks.iter()) {
                *d ^= k;
            }
        }
        Ok(())
    }
}
