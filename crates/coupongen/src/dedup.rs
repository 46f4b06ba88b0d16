use crate::{Coupon, Number};
use std::collections::{BTreeSet, HashSet};

/// Drops coupons that are too close to one already accepted in the same run.
///
/// The distance from a candidate to an accepted coupon is the number of
/// values on the candidate that the accepted coupon does not have. With a
/// threshold of `0` only an identical value set is rejected; with a
/// threshold `k > 0` a candidate is rejected if it is within `k` of *any*
/// accepted coupon.
///
/// The deduplicator is single-owner state: checking a candidate and recording
/// it happen in one `&mut self` call, so it must not be shared between
/// concurrent evaluations.
#[derive(Clone, Debug, Default)]
pub struct DistanceDeduplicator {
    threshold: usize,
    seen: HashSet<BTreeSet<Number>>,
}

impl DistanceDeduplicator {
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold,
            seen: HashSet::new(),
        }
    }

    pub const fn threshold(&self) -> usize {
        self.threshold
    }

    /// Number of coupons accepted so far.
    pub fn accepted(&self) -> usize {
        self.seen.len()
    }

    /// Number of values in `candidate` that `accepted` does not contain.
    pub fn distance(candidate: &BTreeSet<Number>, accepted: &BTreeSet<Number>) -> usize {
        candidate.difference(accepted).count()
    }

    /// Returns `true` if `coupon` would be rejected, without recording it.
    pub fn is_duplicate(&self, coupon: &Coupon) -> bool {
        self.is_duplicate_set(&coupon.to_set())
    }

    /// Records `coupon` and returns `true` if it is far enough from every
    /// accepted coupon; returns `false` and leaves the state untouched
    /// otherwise.
    pub fn accept(&mut self, coupon: &Coupon) -> bool {
        let candidate = coupon.to_set();
        if self.is_duplicate_set(&candidate) {
            return false;
        }
        self.seen.insert(candidate);
        true
    }

    /// Forgets every accepted coupon.
    pub fn clear(&mut self) {
        self.seen.clear();
    }

    fn is_duplicate_set(&self, candidate: &BTreeSet<Number>) -> bool {
        if self.threshold == 0 {
            return self.seen.contains(candidate);
        }
        self.seen
            .iter()
            .any(|accepted| Self::distance(candidate, accepted) <= self.threshold)
    }
}
