//! Cryptographic hashing utilities
//!
//! SHA-256 based helpers used for wallet address derivation.

pub mod hash;

pub use hash::{double_sha256, sha256};
