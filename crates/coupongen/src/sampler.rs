use crate::{Coupon, ExclusionSet, Number, RandSource, SampleStatus, ThreadRandom};
use std::collections::BTreeSet;

/// Draws single coupons from per-position inclusion pools.
///
/// Excluded numbers are removed from every pool once, at construction. Each
/// call to [`Self::sample`] then walks the positions in order, drawing one
/// number uniformly from that position's pool and re-drawing whenever the
/// number was already picked for the current coupon. The finished selection
/// is sorted ascending.
///
/// Pools are read-only for the sampler's lifetime; the random source is the
/// only mutable state.
#[derive(Clone, Debug)]
pub struct CandidateSampler<R = ThreadRandom>
where
    R: RandSource,
{
    pools: Vec<Vec<Number>>,
    valid_numbers_count: usize,
    rng: R,
}

impl<R> CandidateSampler<R>
where
    R: RandSource,
{
    /// Creates a sampler over `pools` with every number in `exclusion`
    /// removed.
    ///
    /// Positions beyond the end of `pools` are treated as empty.
    pub fn new(
        pools: &[BTreeSet<Number>],
        exclusion: &ExclusionSet,
        valid_numbers_count: usize,
        rng: R,
    ) -> Self {
        let pools = pools
            .iter()
            .map(|pool| pool.difference(exclusion).copied().collect())
            .collect();

        Self {
            pools,
            valid_numbers_count,
            rng,
        }
    }

    /// Number of values each sampled coupon holds.
    pub const fn valid_numbers_count(&self) -> usize {
        self.valid_numbers_count
    }

    /// Post-exclusion pool for `position`, if that position has one.
    pub fn pool(&self, position: usize) -> Option<&[Number]> {
        self.pools.get(position).map(Vec::as_slice)
    }

    /// Attempts to draw one coupon.
    ///
    /// Returns [`SampleStatus::PoolExhausted`] for the first position whose
    /// pool is empty, or whose every value is already on the coupon. A
    /// sampler for zero-number coupons is always exhausted at position 0.
    pub fn sample(&mut self) -> SampleStatus {
        if self.valid_numbers_count == 0 {
            return SampleStatus::PoolExhausted { position: 0 };
        }
        let mut chosen: Vec<Number> = Vec::with_capacity(self.valid_numbers_count);

        for position in 0..self.valid_numbers_count {
            let pool = match self.pools.get(position) {
                Some(pool) if !pool.is_empty() => pool,
                _ => return SampleStatus::PoolExhausted { position },
            };

            // Only a pool no larger than the selection so far can be fully
            // covered by it.
            if pool.len() <= chosen.len() && pool.iter().all(|value| chosen.contains(value)) {
                return SampleStatus::PoolExhausted { position };
            }

            let value = loop {
                let candidate = pool[self.rng.index_below(pool.len())];
                if !chosen.contains(&candidate) {
                    break candidate;
                }
            };
            chosen.push(value);
        }

        SampleStatus::Ready {
            coupon: Coupon::from_distinct(chosen),
        }
    }
}
