use super::CouponModel;
use crate::{DrawType, ExclusionSet, InclusionPools, Number};
use core::{fmt, time::Duration};
use futures::{
    FutureExt,
    future::{self, BoxFuture},
};
use std::{collections::BTreeSet, sync::Arc};
use tokio::sync::watch;

type ScopeFn = dyn Fn(&[Number]) -> bool + Send + Sync;

/// An in-memory [`CouponModel`] holding fixed inputs.
///
/// Both inputs are delivered after an optional delay. Either may be left
/// unset, in which case the matching future never resolves. The model starts
/// out ready; hosts can flip readiness with [`Self::set_ready`].
pub struct StaticModel {
    ready: watch::Sender<bool>,
    inclusion: Option<InclusionPools>,
    exclusion: Option<ExclusionSet>,
    delay: Duration,
    scope: Option<Arc<ScopeFn>>,
}

impl StaticModel {
    pub fn new(inclusion: InclusionPools, exclusion: ExclusionSet) -> Self {
        let (ready, _) = watch::channel(true);
        Self {
            ready,
            inclusion: Some(inclusion),
            exclusion: Some(exclusion),
            delay: Duration::ZERO,
            scope: None,
        }
    }

    /// A model whose every position may hold any number of the game.
    pub fn full_range(draw_type: DrawType) -> Self {
        let pool: BTreeSet<Number> = (1..=draw_type.max_number()).collect();
        Self::new(
            vec![pool; draw_type.valid_numbers_count()],
            ExclusionSet::new(),
        )
    }

    /// A ready model whose inputs never arrive.
    pub fn unresolved() -> Self {
        let (ready, _) = watch::channel(true);
        Self {
            ready,
            inclusion: None,
            exclusion: None,
            delay: Duration::ZERO,
            scope: None,
        }
    }

    /// Delays both inputs by `delay`.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub fn with_exclusion(mut self, exclusion: ExclusionSet) -> Self {
        self.exclusion = Some(exclusion);
        self
    }

    /// Drops the exclusion set so it never arrives.
    #[must_use]
    pub fn without_exclusion(mut self) -> Self {
        self.exclusion = None;
        self
    }

    /// Restricts which sampled coupons count as in scope.
    #[must_use]
    pub fn with_scope<F>(mut self, scope: F) -> Self
    where
        F: Fn(&[Number]) -> bool + Send + Sync + 'static,
    {
        self.scope = Some(Arc::new(scope));
        self
    }

    #[must_use]
    pub fn with_ready(self, ready: bool) -> Self {
        self.set_ready(ready);
        self
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.send_replace(ready);
    }

    fn deliver<T>(&self, value: Option<T>) -> BoxFuture<'static, T>
    where
        T: Send + 'static,
    {
        let delay = self.delay;
        match value {
            Some(value) => async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                value
            }
            .boxed(),
            None => future::pending().boxed(),
        }
    }
}

impl CouponModel for StaticModel {
    fn data_ready(&self) -> watch::Receiver<bool> {
        self.ready.subscribe()
    }

    fn inclusion_pools(
        &self,
        _history_depth: usize,
        _std_dev_factor: f64,
    ) -> BoxFuture<'static, InclusionPools> {
        self.deliver(self.inclusion.clone())
    }

    fn exclusion_set(&self) -> BoxFuture<'static, ExclusionSet> {
        self.deliver(self.exclusion.clone())
    }

    fn is_in_scope(&self, values: &[Number]) -> bool {
        self.scope.as_ref().is_none_or(|scope| scope(values))
    }
}

impl fmt::Debug for StaticModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticModel")
            .field("ready", &*self.ready.borrow())
            .field("inclusion", &self.inclusion)
            .field("exclusion", &self.exclusion)
            .field("delay", &self.delay)
            .field("scoped", &self.scope.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn full_range_covers_game() {
        let model = StaticModel::full_range(DrawType::MiniLotto);
        let pools = model.inclusion_pools(0, 0.0).await;
        assert_eq!(pools.len(), 5);
        assert!(pools.iter().all(|pool| pool.len() == 42));
        assert!(model.exclusion_set().await.is_empty());
        assert!(model.is_data_ready());
        assert!(model.is_in_scope(&[1, 2, 3, 4, 5]));
    }

    #[tokio::test]
    async fn readiness_is_observable() {
        let model = StaticModel::full_range(DrawType::Lotto).with_ready(false);
        let mut ready = model.data_ready();
        assert!(!*ready.borrow());
        model.set_ready(true);
        ready.changed().await.unwrap();
        assert!(*ready.borrow());
    }

    #[tokio::test(start_paused = true)]
    async fn missing_input_never_resolves() {
        let model = StaticModel::full_range(DrawType::Lotto).without_exclusion();
        let waited =
            tokio::time::timeout(Duration::from_secs(60), model.exclusion_set()).await;
        assert!(waited.is_err());
    }

    #[test]
    fn scope_predicate_is_applied() {
        let model = StaticModel::full_range(DrawType::Lotto)
            .with_scope(|values| values.iter().sum::<Number>() > 100);
        assert!(!model.is_in_scope(&[1, 2, 3, 4, 5, 6]));
        assert!(model.is_in_scope(&[40, 41, 42, 43, 44, 45]));
    }
}
