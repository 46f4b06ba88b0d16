use crate::Coupon;

/// Represents the result of a single attempt to sample a coupon.
///
/// This type models the outcome of [`CandidateSampler::sample`]:
///
/// - [`SampleStatus::Ready`] indicates a valid coupon was drawn.
/// - [`SampleStatus::PoolExhausted`] means some position had nothing left to
///   draw from, so no coupon could be produced by this attempt.
///
/// Exhaustion is not an error. Pools are fixed for the lifetime of a sampler,
/// so a sampler that keeps reporting exhaustion will never produce anything;
/// the owner of the sampler decides when to stop asking.
///
/// # Example
///
/// ```
/// use std::collections::BTreeSet;
/// use coupongen::{CandidateSampler, SampleStatus, SeededRandom};
///
/// let pools = vec![BTreeSet::from([1, 2]), BTreeSet::new()];
/// let mut sampler = CandidateSampler::new(&pools, &BTreeSet::new(), 2, SeededRandom::new(7));
/// match sampler.sample() {
///     SampleStatus::Ready { coupon } => println!("coupon: {coupon}"),
///     SampleStatus::PoolExhausted { position } => println!("empty pool at {position}"),
/// }
/// ```
///
/// [`CandidateSampler::sample`]: crate::CandidateSampler::sample
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleStatus {
    /// A coupon was generated and is ready to use.
    Ready {
        /// The generated coupon.
        coupon: Coupon,
    },
    /// No coupon could be generated because the pool for `position` had no
    /// value left to draw.
    PoolExhausted {
        /// Zero-based coupon position whose pool was exhausted.
        position: usize,
    },
}

impl SampleStatus {
    /// Returns the coupon if the attempt succeeded.
    pub fn ready(self) -> Option<Coupon> {
        match self {
            Self::Ready { coupon } => Some(coupon),
            Self::PoolExhausted { .. } => None,
        }
    }
}
