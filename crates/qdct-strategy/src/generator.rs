//! Deterministic strategy generation from a device identifier

use qdct_core::consts::BLOCK_AREA;
use std::fmt;

/// Linear congruential generator with the Numerical Recipes constants
///
/// `state = state * 1664525 + 1013904223 (mod 2^32)`. The constants are fixed
/// so that independent implementations produce identical permutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lcg {
    state: u32,
}

impl Lcg {
    pub const MULTIPLIER: u32 = 1_664_525;
    pub const INCREMENT: u32 = 1_013_904_223;

    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
        self.state
    }

    /// Uniform value in `0..bound`: `floor(state / 2^32 * bound)`
    pub fn next_below(&mut self, bound: usize) -> usize {
        ((self.next_u32() as u64 * bound as u64) >> 32) as usize
    }
}

/// The coefficient visit order assigned to one device
#[derive(Clone, PartialEq, Eq)]
pub struct DeviceStrategy {
    pub device_id: String,
    /// Permutation of the row-major coefficient slots `0..64`
    pub quantization_order: [u8; BLOCK_AREA],
}

impl DeviceStrategy {
    /// Slot visited at step `step` of a round
    pub fn slot(&self, step: usize) -> usize {
        self.quantization_order[step] as usize
    }
}

impl fmt::Debug for DeviceStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceStrategy")
            .field("device_id", &self.device_id)
            .field("quantization_order", &&self.quantization_order[..])
            .finish()
    }
}

/// Fold the leading digest bytes into a big-endian 32-bit seed
fn seed_from_digest(digest: &[u8; 32]) -> u32 {
    let seed = digest[..4]
        .iter()
        .fold(0u32, |acc, &byte| (acc << 8) | byte as u32);
    if seed == 0 {
        1
    } else {
        seed
    }
}

/// Derive the strategy for `device_id`
///
/// Pure and total: the same identifier (including the empty string) always
/// yields the same permutation.
pub fn generate_strategy(device_id: &str) -> DeviceStrategy {
    let digest = blake3::hash(device_id.as_bytes());
    let mut rng = Lcg::new(seed_from_digest(digest.as_bytes()));

    let mut order: [u8; BLOCK_AREA] = core::array::from_fn(|i| i as u8);
    for i in (1..BLOCK_AREA).rev() {
        let j = rng.next_below(i + 1);
        order.swap(i, j);
    }

    DeviceStrategy {
        device_id: device_id.to_string(),
        quantization_order: order,
    }
}
