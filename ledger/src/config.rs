//! # Protocol Constants
//!
//! Every magic value in Tessera lives here. The genesis sentinels are part
//! of the chain's identity: change them and every previously sealed chain
//! stops validating, so don't.

/// Instruction string carried by the genesis block. The genesis block
/// records no tree operation; this placeholder is hashed like any other
/// instruction.
pub const GENESIS_INSTRUCTION: &str = "No instruction";

/// Previous-hash sentinel for the genesis block. There is no block before
/// the first one, so the chain starts from a fixed dummy value rather than
/// a real digest.
pub const GENESIS_PREV_HASH: &str = "00000000";

/// Lowest difficulty the interactive front end accepts. Below four leading
/// zero digits, sealing is so cheap that tampering is barely inconvenienced.
pub const MIN_DIFFICULTY: u32 = 4;

/// Highest difficulty the interactive front end accepts. At sixteen leading
/// zero hex digits the expected search is 16^16 hashes — astronomically slow
/// on one core, but the sealer will faithfully grind away if asked.
pub const MAX_DIFFICULTY: u32 = 16;

/// Length of a SHA-256 digest rendered as lowercase hex.
pub const HASH_HEX_LENGTH: usize = 64;

/// Returns whether a difficulty falls in the front-end's accepted range.
///
/// The core itself accepts any difficulty — tests run at 1 or 2 to stay
/// fast — so this is a convenience for callers that want the classic
/// `zeros 4..16` bound.
pub fn difficulty_in_range(difficulty: u32) -> bool {
    (MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&difficulty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_range_bounds() {
        assert!(difficulty_in_range(MIN_DIFFICULTY));
        assert!(difficulty_in_range(MAX_DIFFICULTY));
        assert!(difficulty_in_range(8));
        assert!(!difficulty_in_range(MIN_DIFFICULTY - 1));
        assert!(!difficulty_in_range(MAX_DIFFICULTY + 1));
    }

    #[test]
    fn max_difficulty_fits_in_a_digest() {
        // A difficulty demanding more zero digits than the digest has
        // characters could never be satisfied.
        assert!((MAX_DIFFICULTY as usize) < HASH_HEX_LENGTH);
    }

    #[test]
    fn genesis_sentinels_are_stable() {
        // These two strings are consensus-critical: they feed the genesis
        // block's seal preimage.
        assert_eq!(GENESIS_INSTRUCTION, "No instruction");
        assert_eq!(GENESIS_PREV_HASH, "00000000");
    }
}
