use crate::RandSource;
use rand::{Rng, rng};

/// A `RandSource` that uses the thread-local RNG (`rand::rng()`).
///
/// This RNG is fast, cryptographically secure (ChaCha-based), and automatically
/// reseeded periodically.
///
/// The underlying `ThreadRng` is not `Send`, but this type is a zero-sized
/// wrapper that looks the generator up on every call, so it can be moved into
/// a producer task freely.
#[derive(Default, Clone, Copy, Debug)]
pub struct ThreadRandom;

impl RandSource for ThreadRandom {
    fn index_below(&mut self, bound: usize) -> usize {
        rng().random_range(0..bound)
    }
}
