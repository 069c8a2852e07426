//! Deterministic per-item random number generators.
//!
//! Parallel loops derive one generator per work item from the run seed and
//! the item index, so results do not depend on how rayon schedules the work.

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Mix a base seed with a counter (SplitMix64 finalizer).
#[inline]
pub fn counter_rng_seed(seed: u64, counter: u64) -> u64 {
    let mut z = seed ^ counter.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Generator for work item `counter` of a run seeded with `seed`.
#[inline]
pub fn item_rng(seed: u64, counter: u64) -> Xoshiro256PlusPlus {
    Xoshiro256PlusPlus::seed_from_u64(counter_rng_seed(seed, counter))
}
