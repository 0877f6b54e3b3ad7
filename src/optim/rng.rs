//! Deterministic random streams.
//!
//! Every particle owns its own [`StdRng`], seeded from the swarm's master seed and
//! the particle index. Draws made for one particle never shift the sequence seen
//! by another, so a run is reproducible for a fixed master seed regardless of the
//! order (or thread) in which particles are updated.

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Random stream owned by a single particle.
pub type ParticleRng = StdRng;

/// SplitMix64 finalizer. Spreads nearby inputs over the whole `u64` range.
fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Creates the random stream of the particle at `index`.
pub fn particle_stream(master_seed: u64, index: usize) -> ParticleRng {
    let stream_seed = splitmix64(master_seed ^ splitmix64(index as u64));
    StdRng::seed_from_u64(stream_seed)
}

/// Returns the configured seed, or draws a fresh one from the thread RNG.
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| rand::thread_rng().gen())
}

/// Uniform draw in `[lower, upper)`. Returns `lower` for an empty interval.
#[inline]
pub fn uniform(rng: &mut impl Rng, lower: f64, upper: f64) -> f64 {
    lower + rng.gen::<f64>() * (upper - lower)
}
