//! Worker-local RNG seeding.
//!
//! The source program serializes tournament selection under a critical
//! section because it reaches for one shared, mutable RNG. Every GA operator
//! in this crate instead takes an explicit `&mut impl Rng`, and each
//! rayon-parallel task constructs its own generator here, seeded
//! deterministically from the master seed and the task's index. This keeps a
//! genome's evaluation reproducible independent of worker count, at the cost
//! of keying on task index rather than OS thread id (so reproducibility
//! holds regardless of how rayon schedules the work, not only under static
//! scheduling).

use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Large odd constant (Fibonacci hashing / SplitMix64) used to decorrelate
/// adjacent task indices before XORing into the master seed.
const SPLITMIX_GAMMA: u64 = 0x9E3779B97F4A7C15;

/// Build a deterministic, independent generator for task `index` under
/// `master_seed`.
pub fn task_rng(master_seed: u64, index: u64) -> SmallRng {
    SmallRng::seed_from_u64(master_seed ^ index.wrapping_mul(SPLITMIX_GAMMA))
}

/// Derive the master seed from a high-resolution clock XORed with the
/// process id, used when the CLI receives no explicit seed.
pub fn seed_from_environment() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    nanos ^ (std::process::id() as u64)
}
