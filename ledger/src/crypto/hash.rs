//! # Hashing Utilities
//!
//! Tessera uses exactly one hash function: SHA-256, rendered as 64
//! lowercase hex characters. The proof-of-work difficulty is defined over
//! that hex form (leading `'0'` digits), so the hex rendering is part of
//! the protocol, not a presentation detail.

use sha2::{Digest, Sha256};

/// Compute `hex(SHA-256(data))` as a lowercase 64-character string.
///
/// # Example
///
/// ```
/// use tessera_ledger::crypto::sha256_hex;
///
/// let digest = sha256_hex(b"tessera");
/// assert_eq!(digest.len(), 64);
/// ```
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Hash multiple byte slices together without concatenation overhead.
///
/// Feeding the parts sequentially into one hasher yields the same digest as
/// hashing their concatenation, minus the temporary buffer. The sealer uses
/// this to hash `content || nonce` on every mining attempt without
/// reallocating the content.
pub fn sha256_hex_multi(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hex::encode(hasher.finalize())
}
