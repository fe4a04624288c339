//! Deterministic seeding for simulation randomness and identifiers.
//!
//! Every random stream in a run is a [`ChaCha8Rng`] seeded from the run seed
//! and a per-stream domain tag. Keeping arrivals and service draws on separate
//! streams means two runs that differ only in server count see the same
//! arrival instants and the same sequence of service durations.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Deterministically derive a UUID from a seed, domain, and counter.
///
/// This is used to keep component keys reproducible across runs.
pub fn deterministic_uuid(seed: u64, domain: u64, counter: u64) -> Uuid {
    let x0 = seed ^ domain ^ counter;
    let lo = splitmix64(x0);
    let hi = splitmix64(x0.wrapping_add(0xD1B5_4A32_D192_ED03));
    Uuid::from_u128(((hi as u128) << 64) | (lo as u128))
}

/// Derive the seed of an independent random stream.
pub fn stream_seed(seed: u64, domain: u64) -> u64 {
    splitmix64(seed ^ splitmix64(domain))
}

/// Build the RNG for one random stream of a run.
pub fn stream_rng(seed: u64, domain: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(stream_seed(seed, domain))
}

pub const UUID_DOMAIN_COMPONENT: u64 = 0x434F_4D50_4F4E_454E; // "COMPONEN" (tag)

pub const STREAM_ARRIVALS: u64 = 0x4152_5249_5641_4C53; // "ARRIVALS" (tag)
pub const STREAM_SERVICE: u64 = 0x5345_5256_4943_455F; // "SERVICE_" (tag)
