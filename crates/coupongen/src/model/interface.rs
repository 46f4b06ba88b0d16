use crate::{ExclusionSet, InclusionPools, Number};
use futures::future::BoxFuture;
use tokio::sync::watch;

/// The statistical model a generation run draws its inputs from.
///
/// Both data sources are single-value futures that may resolve at different
/// times. A source that never resolves models data that never arrives; the
/// run's timeout covers that case.
pub trait CouponModel: Send + Sync + 'static {
    /// Receiver that tracks whether the model has finished loading.
    fn data_ready(&self) -> watch::Receiver<bool>;

    /// Returns `true` if the model is ready right now.
    fn is_data_ready(&self) -> bool {
        *self.data_ready().borrow()
    }

    /// Per-position inclusion pools for the given model parameters.
    fn inclusion_pools(
        &self,
        history_depth: usize,
        std_dev_factor: f64,
    ) -> BoxFuture<'static, InclusionPools>;

    /// Numbers that may not appear on any coupon.
    fn exclusion_set(&self) -> BoxFuture<'static, ExclusionSet>;

    /// Validity predicate applied to every sampled coupon before
    /// deduplication.
    fn is_in_scope(&self, values: &[Number]) -> bool;
}
