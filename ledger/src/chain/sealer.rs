//! # Proof-of-Work Sealer
//!
//! Sealing a block means finding a nonce such that
//! `hex(SHA-256(content || nonce))` starts with `difficulty` zero hex
//! digits. The nonce is appended to the content in decimal — the same
//! layout during mining and during verification, so a sealed block always
//! re-verifies from its stored fields.
//!
//! The search starts at nonce 0 and counts upward with no upper bound. For
//! a difficulty `d` the expected cost is `16^d` hashes; a pathological
//! difficulty makes sealing arbitrarily slow, and that is documented rather
//! than mitigated. Mining is a blocking, CPU-bound loop with no
//! cancellation — callers that need responsiveness run it on a worker and
//! discard the result.

use tracing::debug;

use crate::crypto::sha256_hex_multi;

/// The result of a successful proof-of-work search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Seal {
    /// The first nonce (counting from 0) that satisfied the difficulty.
    pub nonce: u64,
    /// `hex(SHA-256(content || nonce))`, 64 lowercase hex characters.
    pub hash: String,
}

/// Whether the first `difficulty` hex characters of `hash` are all `'0'`.
///
/// A difficulty longer than the digest itself can never be met.
pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
    let difficulty = difficulty as usize;
    difficulty <= hash.len() && hash.as_bytes()[..difficulty].iter().all(|&b| b == b'0')
}

/// Mine a nonce for `content` meeting `difficulty`.
///
/// Exhaustive upward search from nonce 0; always terminates in expectation
/// `16^difficulty` attempts, never early.
pub fn seal(content: &str, difficulty: u32) -> Seal {
    let mut nonce: u64 = 0;
    loop {
        let hash = hash_attempt(content, nonce);
        if meets_difficulty(&hash, difficulty) {
            debug!(nonce, difficulty, "proof-of-work found");
            return Seal { nonce, hash };
        }
        nonce += 1;
    }
}

/// Recompute the hash for a stored `(content, nonce)` pair — one hash, no
/// search. Returns the digest only if it meets the difficulty.
pub fn verify(content: &str, nonce: u64, difficulty: u32) -> Option<String> {
    let hash = hash_attempt(content, nonce);
    meets_difficulty(&hash, difficulty).then_some(hash)
}

fn hash_attempt(content: &str, nonce: u64) -> String {
    // Feed the two parts into one hasher; equivalent to hashing the
    // concatenated string without building it on every attempt.
    let mut buf = [0u8; 20];
    let digits = write_decimal(&mut buf, nonce);
    sha256_hex_multi(&[content.as_bytes(), digits])
}

// Decimal rendering of the nonce without a heap allocation per attempt.
// u64::MAX is 20 digits.
fn write_decimal(buf: &mut [u8; 20], mut value: u64) -> &[u8] {
    let mut pos = buf.len();
    loop {
        pos -= 1;
        buf[pos] = b'0' + (value % 10) as u8;
        value /= 10;
        if value == 0 {
            break;
        }
    }
    &buf[pos..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::sha256_hex;

    #[test]
    fn seal_meets_difficulty() {
        for difficulty in 1..=2 {
            let seal = seal("0addsomething00abc", difficulty);
            assert!(seal.hash.starts_with(&"0".repeat(difficulty as usize)));
            assert_eq!(seal.hash.len(), 64);
        }
    }

    #[test]
    fn seal_finds_the_smallest_nonce() {
        let sealed = seal("content", 1);
        // Every nonce below the found one must fail the difficulty.
        for nonce in 0..sealed.nonce {
            assert!(verify("content", nonce, 1).is_none());
        }
    }

    #[test]
    fn verify_recomputes_an_identical_hash() {
        let sealed = seal("5remove9true000fa3", 2);
        let recomputed = verify("5remove9true000fa3", sealed.nonce, 2);
        assert_eq!(recomputed.as_deref(), Some(sealed.hash.as_str()));
    }

    #[test]
    fn verify_rejects_a_wrong_nonce() {
        let sealed = seal("some block content", 2);
        // The next nonce after a valid one almost certainly fails; if it
        // happened to pass the difficulty its hash would still differ.
        match verify("some block content", sealed.nonce + 1, 2) {
            None => {}
            Some(hash) => assert_ne!(hash, sealed.hash),
        }
    }

    #[test]
    fn verify_rejects_tampered_content() {
        let sealed = seal("original content", 2);
        match verify("tampered content", sealed.nonce, 2) {
            None => {}
            Some(hash) => assert_ne!(hash, sealed.hash),
        }
    }

    #[test]
    fn nonce_is_appended_in_decimal() {
        // The sealed hash must equal a plain hash of content ++ decimal nonce.
        let sealed = seal("layout check", 1);
        let manual = sha256_hex(format!("layout check{}", sealed.nonce).as_bytes());
        assert_eq!(sealed.hash, manual);
    }

    #[test]
    fn meets_difficulty_edge_cases() {
        assert!(meets_difficulty("00ab", 2));
        assert!(!meets_difficulty("0ab0", 2));
        assert!(meets_difficulty("anything", 0));
        // Demanding more zeros than there are characters is unsatisfiable.
        assert!(!meets_difficulty("0000", 5));
    }
}
