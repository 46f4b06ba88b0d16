use crate::{
    CouponController, CouponModel, DrawType, GenerationRequest, GeneratorConfig, Result,
    RunHandle,
};
use core::fmt;
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};

type ModelFactory<M> = dyn Fn(DrawType) -> Arc<M> + Send + Sync;

/// One [`CouponController`] per [`DrawType`], created on first use.
///
/// Because every controller allows a single active run, the registry
/// guarantees at most one active run per game.
pub struct ControllerRegistry<M>
where
    M: CouponModel,
{
    factory: Box<ModelFactory<M>>,
    config: GeneratorConfig,
    controllers: Mutex<HashMap<DrawType, Arc<CouponController<M>>>>,
}

impl<M> ControllerRegistry<M>
where
    M: CouponModel,
{
    /// Creates a registry that builds each game's model with `factory`.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(DrawType) -> Arc<M> + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            config: GeneratorConfig::default(),
            controllers: Mutex::new(HashMap::new()),
        }
    }

    /// Producer configuration for controllers created from now on.
    #[must_use]
    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the controller for `draw_type`, creating it if needed.
    pub fn controller(&self, draw_type: DrawType) -> Arc<CouponController<M>> {
        let mut controllers = self.controllers.lock();
        let controller = controllers.entry(draw_type).or_insert_with(|| {
            #[cfg(feature = "tracing")]
            tracing::debug!("Creating controller for {draw_type}");
            let model = (self.factory)(draw_type);
            Arc::new(CouponController::for_draw_type(model, draw_type).with_config(self.config))
        });
        Arc::clone(controller)
    }

    /// Returns the controller for `draw_type` if one was created.
    pub fn get(&self, draw_type: DrawType) -> Option<Arc<CouponController<M>>> {
        self.controllers.lock().get(&draw_type).cloned()
    }

    /// Starts a run for `draw_type`, replacing any run still active for it.
    ///
    /// # Errors
    ///
    /// See [`CouponController::start`].
    pub fn start(&self, draw_type: DrawType, request: GenerationRequest) -> Result<Option<RunHandle>> {
        self.controller(draw_type).start(request)
    }

    /// Cancels the active run for `draw_type`, if any.
    pub fn cancel(&self, draw_type: DrawType) {
        if let Some(controller) = self.get(draw_type) {
            controller.cancel();
        }
    }

    /// Cancels the active run of every game.
    pub fn cancel_all(&self) {
        let controllers: Vec<_> = self.controllers.lock().values().cloned().collect();
        for controller in controllers {
            controller.cancel();
        }
    }

    /// Cancels and forgets the controller for `draw_type`. The next call to
    /// [`Self::controller`] builds a fresh one with a fresh model.
    pub fn reset(&self, draw_type: DrawType) {
        let removed = self.controllers.lock().remove(&draw_type);
        if let Some(controller) = removed {
            controller.cancel();
        }
    }
}

impl<M> fmt::Debug for ControllerRegistry<M>
where
    M: CouponModel,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let games: Vec<DrawType> = self.controllers.lock().keys().copied().collect();
        f.debug_struct("ControllerRegistry")
            .field("games", &games)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RunState, StaticModel};
    use core::time::Duration;

    fn registry() -> ControllerRegistry<StaticModel> {
        ControllerRegistry::new(|draw_type| Arc::new(StaticModel::full_range(draw_type)))
    }

    #[test]
    fn controllers_are_created_once_per_game() {
        let registry = registry();
        assert!(registry.get(DrawType::Lotto).is_none());

        let lotto = registry.controller(DrawType::Lotto);
        assert!(Arc::ptr_eq(&lotto, &registry.controller(DrawType::Lotto)));
        assert_eq!(lotto.valid_numbers_count(), 6);
        assert_eq!(registry.controller(DrawType::MiniLotto).valid_numbers_count(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn runs_for_different_games_are_independent() {
        let registry = registry();
        let request = GenerationRequest::default().with_target_count(1_000);

        let mut lotto = registry.start(DrawType::Lotto, request).unwrap().unwrap();
        let mut mini = registry.start(DrawType::MiniLotto, request).unwrap().unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        registry.cancel(DrawType::Lotto);
        assert_eq!(lotto.finished().await, RunState::Cancelled);
        assert_eq!(mini.state(), RunState::Sampling);
        assert!(!registry.controller(DrawType::MiniLotto).coupons().is_empty());

        registry.cancel_all();
        assert_eq!(mini.finished().await, RunState::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_drops_controller() {
        let registry = registry();
        let before = registry.controller(DrawType::EuroJackpot);
        let mut handle = before
            .start(GenerationRequest::default().with_target_count(1_000))
            .unwrap()
            .unwrap();

        registry.reset(DrawType::EuroJackpot);
        assert_eq!(handle.finished().await, RunState::Cancelled);
        assert!(registry.get(DrawType::EuroJackpot).is_none());
        assert!(!Arc::ptr_eq(&before, &registry.controller(DrawType::EuroJackpot)));
    }
}
