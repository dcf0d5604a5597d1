//! Key-to-slot hashing.
//!
//! Every identifier placed on the ring (node names, virtual labels, lookup
//! keys) goes through [`hash_item`], so placement and lookup always agree.

use xxhash_rust::xxh3::xxh3_128;

/// Hash `item` onto a slot in `[0, modulus)`.
///
/// Takes the 128-bit xxh3 digest of the item's bytes, folds the high and low
/// halves together with XOR and reduces the result modulo `modulus`.
///
/// # Panics
///
/// Panics if `modulus` is zero. Ring constructors reject a zero ring size, so
/// this only happens on direct misuse.
///
/// # Example
///
/// ```rust
/// use corelib::hash::hash_item;
///
/// let slot = hash_item("user:42", 1 << 32);
/// assert!(slot < 1 << 32);
/// assert_eq!(slot, hash_item("user:42", 1 << 32));
/// ```
#[inline]
pub fn hash_item(item: &str, modulus: u64) -> u64 {
    assert!(modulus > 0, "hash modulus must be positive");
    let digest = xxh3_128(item.as_bytes());
    let high = (digest >> 64) as u64;
    let low = digest as u64;
    (high ^ low) % modulus
}
