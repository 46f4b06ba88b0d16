//! Entry point for coupon generation runs.
//!
//! [`CouponController`] exposes the three observables a host binds to
//! (progress, results, data readiness) plus `start`/`cancel`. All mutation of
//! those observables for a run goes through `Shared`, under one lock that
//! also records which run is active, so a run that has been cancelled or
//! replaced can never write again.

use super::{
    progress::{Progress, RunState},
    request::GenerationRequest,
    run::{RunContext, run_generation},
};
use crate::{Coupon, CouponModel, DrawType, Error, GeneratorConfig, Result};
use core::sync::atomic::{AtomicU64, Ordering};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::{sync::watch, task::JoinHandle};
use tokio_util::sync::CancellationToken;

/// Drives coupon generation for one game against one model.
///
/// At most one run is active at a time. Starting a new run cancels the
/// previous one first; results and progress are reset at the start of every
/// run.
pub struct CouponController<M>
where
    M: CouponModel,
{
    model: Arc<M>,
    valid_numbers_count: usize,
    config: GeneratorConfig,
    shared: Arc<Shared>,
}

impl<M> CouponController<M>
where
    M: CouponModel,
{
    pub fn new(model: Arc<M>, valid_numbers_count: usize) -> Self {
        Self {
            model,
            valid_numbers_count,
            config: GeneratorConfig::default(),
            shared: Arc::new(Shared::new()),
        }
    }

    /// A controller sized for `draw_type`'s coupons.
    pub fn for_draw_type(model: Arc<M>, draw_type: DrawType) -> Self {
        Self::new(model, draw_type.valid_numbers_count())
    }

    #[must_use]
    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    pub const fn valid_numbers_count(&self) -> usize {
        self.valid_numbers_count
    }

    pub fn model(&self) -> &Arc<M> {
        &self.model
    }

    /// Starts a generation run.
    ///
    /// Returns `Ok(None)` without doing anything when the model is not ready
    /// yet. Otherwise any active run is cancelled, results and progress are
    /// reset, and a new run task is spawned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`](crate::Error::InvalidRequest) if the
    /// request fails validation or the controller was built for coupons of
    /// zero numbers.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(target = request.target_count, distance = request.distance)))]
    pub fn start(&self, request: GenerationRequest) -> Result<Option<RunHandle>> {
        request.validate()?;
        if self.valid_numbers_count == 0 {
            return Err(Error::InvalidRequest {
                reason: "Coupons must hold at least one number".to_string(),
            });
        }

        if !self.model.is_data_ready() {
            #[cfg(feature = "tracing")]
            tracing::debug!("Model data not ready, ignoring start");
            return Ok(None);
        }

        let mut active = self.shared.active.lock();
        self.shared.cancel_locked(&mut active);

        self.shared.results.send_replace(Vec::new());
        self.shared.progress.send_replace(0.0);

        let id = self.shared.next_run_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        let (run_state, run_state_rx) = watch::channel(RunState::AwaitingModelData);
        self.shared.state.send_replace(RunState::AwaitingModelData);

        let fut = run_generation(RunContext {
            id,
            model: Arc::clone(&self.model),
            request,
            valid_numbers_count: self.valid_numbers_count,
            config: self.config,
            token: token.clone(),
            shared: Arc::clone(&self.shared),
        });
        #[cfg(feature = "tracing")]
        let fut = {
            use tracing::Instrument;
            let span = tracing::info_span!("generation", run_id = id);
            fut.instrument(span)
        };

        // The task cannot observe itself as active until this lock is
        // released, by which point `active` holds its entry.
        let handle = tokio::spawn(fut);
        *active = Some(ActiveRun {
            id,
            token: token.clone(),
            handle,
            state: run_state,
        });

        #[cfg(feature = "tracing")]
        tracing::info!("Started generation run {id}");

        Ok(Some(RunHandle {
            id,
            state: run_state_rx,
            token,
            shared: Arc::clone(&self.shared),
        }))
    }

    /// Cancels the active run, if any, and resets progress and results.
    ///
    /// Once this returns, nothing from the cancelled run is appended. Calling
    /// it again has no further effect.
    pub fn cancel(&self) {
        let mut active = self.shared.active.lock();
        self.shared.cancel_locked(&mut active);
        self.shared.progress.send_replace(0.0);
        self.shared.results.send_replace(Vec::new());
    }

    /// Empties the result list without touching progress or the active run.
    pub fn clear_coupons(&self) {
        self.shared.results.send_modify(Vec::clear);
    }

    /// Returns `true` while a run is awaiting data or sampling.
    pub fn is_generating(&self) -> bool {
        self.shared.active.lock().is_some()
    }

    /// Progress in `[0, 1]`; `1.0` means the last run ended.
    pub fn progress(&self) -> watch::Receiver<f64> {
        self.shared.progress.subscribe()
    }

    /// Coupons accepted by the current (or last) run, in acceptance order.
    pub fn results(&self) -> watch::Receiver<Vec<Coupon>> {
        self.shared.results.subscribe()
    }

    /// State of the current (or last) run.
    pub fn state(&self) -> watch::Receiver<RunState> {
        self.shared.state.subscribe()
    }

    /// Whether the model is ready to serve a run.
    pub fn data_ready(&self) -> watch::Receiver<bool> {
        self.model.data_ready()
    }

    /// Snapshot of the accepted coupons.
    pub fn coupons(&self) -> Vec<Coupon> {
        self.shared.results.borrow().clone()
    }

    /// Snapshot of progress, interpreted through the state of the current
    /// (or last) run.
    ///
    /// Both are read under the controller lock, so they come from the same
    /// update.
    pub fn progress_status(&self) -> Progress {
        let _active = self.shared.active.lock();
        let progress = *self.shared.progress.borrow();
        let state = *self.shared.state.borrow();
        Progress::from_state(state, progress)
    }
}

impl<M> Drop for CouponController<M>
where
    M: CouponModel,
{
    fn drop(&mut self) {
        let mut active = self.shared.active.lock();
        self.shared.cancel_locked(&mut active);
    }
}

/// Handle to one run started by [`CouponController::start`].
///
/// Dropping the handle does not stop the run.
#[derive(Debug)]
pub struct RunHandle {
    id: u64,
    state: watch::Receiver<RunState>,
    token: CancellationToken,
    shared: Arc<Shared>,
}

impl RunHandle {
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Current state of this run.
    pub fn state(&self) -> RunState {
        *self.state.borrow()
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Waits until this run reaches a terminal state and returns it.
    pub async fn finished(&mut self) -> RunState {
        let finished = self
            .state
            .wait_for(|state| state.is_terminal())
            .await
            .map(|state| *state);
        // Sender gone: the run task and its controller entry are both
        // dropped, so the last published state is final.
        finished.unwrap_or_else(|_| *self.state.borrow())
    }

    /// Cancels this run if it is still the controller's active run, resetting
    /// progress and results. Does nothing otherwise.
    pub fn cancel(&self) {
        let mut active = self.shared.active.lock();
        if active.as_ref().is_some_and(|run| run.id == self.id) {
            self.shared.cancel_locked(&mut active);
            self.shared.progress.send_replace(0.0);
            self.shared.results.send_replace(Vec::new());
        }
    }
}

struct ActiveRun {
    id: u64,
    token: CancellationToken,
    handle: JoinHandle<()>,
    state: watch::Sender<RunState>,
}

/// Outcome of appending an accepted coupon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Appended {
    /// Stored; the target is not reached yet.
    More,
    /// Stored, and it was the last one: the run is complete.
    Done,
    /// The run is no longer active; nothing was stored.
    Inactive,
}

/// Observable state shared between a controller and its run tasks.
pub(crate) struct Shared {
    progress: watch::Sender<f64>,
    results: watch::Sender<Vec<Coupon>>,
    state: watch::Sender<RunState>,
    active: Mutex<Option<ActiveRun>>,
    next_run_id: AtomicU64,
}

impl Shared {
    fn new() -> Self {
        Self {
            progress: watch::channel(0.0).0,
            results: watch::channel(Vec::new()).0,
            state: watch::channel(RunState::Idle).0,
            active: Mutex::new(None),
            next_run_id: AtomicU64::new(1),
        }
    }

    fn cancel_locked(&self, active: &mut Option<ActiveRun>) {
        if let Some(run) = active.take() {
            run.token.cancel();
            run.handle.abort();
            run.state.send_replace(RunState::Cancelled);
            self.state.send_replace(RunState::Cancelled);

            #[cfg(feature = "tracing")]
            tracing::info!("Cancelled generation run {}", run.id);
        }
    }

    /// Moves run `id` to a non-terminal `state`. Returns `false` if the run
    /// is no longer active.
    pub(crate) fn transition(&self, id: u64, state: RunState) -> bool {
        let active = self.active.lock();
        match active.as_ref() {
            Some(run) if run.id == id && !run.token.is_cancelled() => {
                run.state.send_replace(state);
                self.state.send_replace(state);
                true
            }
            _ => false,
        }
    }

    /// Appends `coupon` to run `id`'s results and updates progress.
    pub(crate) fn append(&self, id: u64, coupon: Coupon, target: usize) -> Appended {
        let mut active = self.active.lock();
        let Some(run) = active.as_ref() else {
            return Appended::Inactive;
        };
        if run.id != id || run.token.is_cancelled() {
            return Appended::Inactive;
        }

        let mut accepted = 0;
        self.results.send_modify(|results| {
            results.push(coupon);
            accepted = results.len();
        });

        if accepted >= target {
            self.progress.send_replace(1.0);
            run.state.send_replace(RunState::Completed);
            self.state.send_replace(RunState::Completed);
            *active = None;
            Appended::Done
        } else {
            #[allow(clippy::cast_precision_loss)]
            self.progress
                .send_replace(accepted as f64 / target as f64);
            Appended::More
        }
    }

    /// Ends run `id` without reaching its target: progress is forced to
    /// `1.0`.
    pub(crate) fn fail(&self, id: u64, state: RunState) {
        let mut active = self.active.lock();
        if let Some(run) = active.as_ref().filter(|run| run.id == id) {
            if run.token.is_cancelled() {
                return;
            }
            self.progress.send_replace(1.0);
            run.state.send_replace(state);
            self.state.send_replace(state);
            *active = None;
        }
    }
}

impl core::fmt::Debug for Shared {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Shared")
            .field("progress", &*self.progress.borrow())
            .field("results", &self.results.borrow().len())
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}
