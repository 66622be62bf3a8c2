#![doc = "Cryptographic core of the SecMod hardware-security-module stack."]
#![forbid(unsafe_code)]

// Block cipher primitive
pub mod aes;

// Modes of operation
pub mod modes;

// MAC used by the DRBG derivation function
pub mod cbc_mac;

// Entropy acquisition seam
pub mod entropy;

// Deterministic random bit generation (NIST SP 800-90A)
pub mod drbg;

// FIPS/CMVP compliance
pub mod fips;
