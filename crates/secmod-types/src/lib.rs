#![forbid(unsafe_code)]
#![doc = "Common types and error codes for the SecMod cryptographic stack."]

pub mod error;

pub use error::*;
