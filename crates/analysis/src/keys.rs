//! Random key samples.

use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Key length used by the demo driver.
pub const DEFAULT_KEY_LENGTH: usize = 32;

/// One alphanumeric key (`[A-Za-z0-9]`) of `len` characters.
pub fn random_key<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// `count` alphanumeric keys of `len` characters each.
pub fn random_keys<R: Rng + ?Sized>(rng: &mut R, count: usize, len: usize) -> Vec<String> {
    (0..count).map(|_| random_key(rng, len)).collect()
}

/// Reproducible sample: the same seed always yields the same keys.
pub fn seeded_keys(seed: u64, count: usize, len: usize) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    random_keys(&mut rng, count, len)
}
