//! CBC-MAC with the AES block cipher.
//!
//! Implements CBC-MAC with a caller-supplied initialization vector and no
//! implicit padding: input must cover whole 16-byte blocks by the time the
//! MAC is finalized. The DRBG derivation function chains each of its
//! compression passes from a precomputed per-block start vector, which is
//! exactly a CBC-MAC over pre-padded data with that vector as IV.
//! Output is always 16 bytes (one AES block).

use crate::aes::{AesKey, AES_BLOCK_SIZE};
use secmod_types::CryptoError;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// CBC-MAC context using AES as the underlying block cipher.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct CbcMacAes {
    /// AES cipher key.
    cipher: AesKey,
    /// CBC chain state.
    state: [u8; AES_BLOCK_SIZE],
    /// Buffer for incomplete block data.
    buf: [u8; AES_BLOCK_SIZE],
    /// Number of bytes in the buffer.
    buf_len: usize,
    /// Whether the context is ready for use (false after finish).
    active: bool,
}

impl CbcMacAes {
    /// Create a new CBC-MAC context with the given key and 16-byte IV.
    ///
    /// Key must be 16, 24 or 32 bytes.
    pub fn new(key: &[u8], iv: &[u8]) -> Result<Self, CryptoError> {
        if iv.len() != AES_BLOCK_SIZE {
            return Err(CryptoError::InvalidIvLength);
        }
        let cipher = AesKey::new(key)?;
        let mut state = [0u8; AES_BLOCK_SIZE];
        state.copy_from_slice(iv);
        Ok(Self {
            cipher,
            state,
            buf: [0u8; AES_BLOCK_SIZE],
            buf_len: 0,
            active: true,
        })
    }

    /// Feed data into the CBC-MAC computation.
    pub fn update(&mut self, data: &[u8]) -> Result<(), CryptoError> {
        if !self.active {
            return Err(CryptoError::InvalidArg);
        }

        let mut offset = 0;

        // If we have buffered data, try to complete a block
        if self.buf_len > 0 {
            let need = AES_BLOCK_SIZE - self.buf_len;
            if data.len() < need {
                self.buf[self.buf_len..self.buf_len + data.len()].copy_from_slice(data);
                self.buf_len += data.len();
                return Ok(());
            }
            self.buf[self.buf_len..AES_BLOCK_SIZE].copy_from_slice(&data[..need]);
            self.process_block()?;
            self.buf_len = 0;
            offset = need;
        }

        // Process full blocks
        while offset + AES_BLOCK_SIZE <= data.len() {
            self.buf[..AES_BLOCK_SIZE].copy_from_slice(&data[offset..offset + AES_BLOCK_SIZE]);
            self.process_block()?;
            offset += AES_BLOCK_SIZE;
        }

        // Buffer remaining bytes
        let remaining = data.len() - offset;
        if remaining > 0 {
            self.buf[..remaining].copy_from_slice(&data[offset..]);
            self.buf_len = remaining;
        }

        Ok(())
    }

    /// Finalize the CBC-MAC computation and write the MAC to `out`.
    ///
    /// Fails if the fed data did not cover whole blocks (padding is the
    /// caller's responsibility). `out` must be at least 16 bytes.
    pub fn finish(&mut self, out: &mut [u8]) -> Result<(), CryptoError> {
        if !self.active || self.buf_len != 0 {
            return Err(CryptoError::InvalidArg);
        }
        if out.len() < AES_BLOCK_SIZE {
            return Err(CryptoError::BufferTooSmall {
                need: AES_BLOCK_SIZE,
                got: out.len(),
            });
        }

        out[..AES_BLOCK_SIZE].copy_from_slice(&self.state);
        self.active = false;

        Ok(())
    }

    /// Returns the output size (always 16 bytes).
    pub fn output_size(&self) -> usize {
        AES_BLOCK_SIZE
    }

    /// Process one complete block: state = E_K(state XOR block).
    fn process_block(&mut self) -> Result<(), CryptoError> {
        for i in 0..AES_BLOCK_SIZE {
            self.state[i] ^= self.buf[i];
        }
        self.cipher.encrypt_block(&mut self.state)?;
        Ok(())
    }
}
