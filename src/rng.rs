use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::coord::IntCoord;

/// The fixed process-wide seed constant the spec requires for
/// reproducibility within a back end (§4.5, §5).
pub const DEFAULT_SEED: u64 = 42;

/// Derives a worker-local seed for the per-pixel random stream at
/// `coord` within an image of the given `width`, from the process-wide
/// `base_seed`. Using a SplitMix64-style mix of `(base_seed, flat index)`
/// guarantees each target pixel gets an independent, deterministic
/// stream with no contention between workers, per the shared-resource
/// policy in §5.
#[inline]
pub fn pixel_seed(base_seed: u64, coord: IntCoord, width: i32) -> u64 {
    let index = coord.flat_index(width) as u64;
    splitmix64(base_seed ^ index.wrapping_mul(0x9E3779B97F4A7C15))
}

/// A single SplitMix64 round, used only to scatter `(seed, index)` pairs
/// into well-distributed 64-bit seeds for `StdRng`; not a general-purpose
/// PRNG in its own right.
#[inline]
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Builds the deterministic per-pixel RNG used by the search primitive.
#[inline]
pub fn rng_for_pixel(base_seed: u64, coord: IntCoord, width: i32) -> StdRng {
    StdRng::seed_from_u64(pixel_seed(base_seed, coord, width))
}
