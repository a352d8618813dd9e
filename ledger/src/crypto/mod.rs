//! Cryptographic primitives: SHA-256, rendered as lowercase hex.

pub mod hash;

pub use hash::{sha256_hex, sha256_hex_multi};
