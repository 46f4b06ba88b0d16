use super::{GeneratorConfig, SleepProvider, TokioSleep};
use crate::{CandidateSampler, Coupon, RandSource, SampleStatus};
use core::{
    pin::Pin,
    task::{Context, Poll},
    time::Duration,
};
use futures::Stream;
use tokio::{
    sync::mpsc::{self, error::TrySendError},
    task::JoinHandle,
};
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

/// An unbounded, cancellable stream of sampled coupons.
///
/// Created by [`CouponStream::spawn`], which moves a [`CandidateSampler`] onto
/// a dedicated Tokio task. That task sleeps for the configured cadence,
/// samples once, and forwards the coupon over a bounded channel. Attempts that
/// hit an exhausted pool are skipped silently.
///
/// The stream holds the producer task for its whole lifetime: cancelling it
/// (explicitly, through the parent token, or by dropping it) stops the task
/// and ends the stream. Coupons still buffered in the channel are discarded.
pub struct CouponStream {
    inner: ReceiverStream<Coupon>,
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl CouponStream {
    /// Spawns a producer that ticks on [`TokioSleep`].
    ///
    /// The producer is cancelled together with `parent`.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn spawn<R>(
        sampler: CandidateSampler<R>,
        config: &GeneratorConfig,
        parent: &CancellationToken,
    ) -> Self
    where
        R: RandSource + Send + 'static,
    {
        Self::spawn_with::<R, TokioSleep>(sampler, config, parent)
    }

    /// Spawns a producer that waits between ticks with the given
    /// [`SleepProvider`].
    pub fn spawn_with<R, S>(
        sampler: CandidateSampler<R>,
        config: &GeneratorConfig,
        parent: &CancellationToken,
    ) -> Self
    where
        R: RandSource + Send + 'static,
        S: SleepProvider + 'static,
    {
        let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
        let token = parent.child_token();
        let handle = tokio::spawn(produce::<R, S>(
            sampler,
            tx,
            config.cadence,
            token.clone(),
        ));

        Self {
            inner: ReceiverStream::new(rx),
            token,
            handle: Some(handle),
        }
    }

    /// Stops the producer. No coupon is yielded after this returns.
    ///
    /// Calling this more than once has no further effect.
    pub fn cancel(&mut self) {
        self.token.cancel();
        self.inner.close();
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Returns `true` once the stream has been cancelled, directly or through
    /// its parent token.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancels the producer and waits until its task has finished.
    pub async fn shutdown(mut self) {
        self.token.cancel();
        self.inner.close();
        if let Some(handle) = self.handle.take() {
            // The task only ends by cancellation or abort; neither is an
            // error worth reporting here.
            let _ = handle.await;
        }
    }
}

impl Stream for CouponStream {
    type Item = Coupon;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.token.is_cancelled() {
            return Poll::Ready(None);
        }
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

impl Drop for CouponStream {
    fn drop(&mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Producer loop: one sampling attempt per tick until cancelled.
///
/// The loop has no exit of its own other than cancellation or the consumer
/// dropping its receiver.
async fn produce<R, S>(
    mut sampler: CandidateSampler<R>,
    tx: mpsc::Sender<Coupon>,
    cadence: Duration,
    token: CancellationToken,
) where
    R: RandSource,
    S: SleepProvider,
{
    #[cfg(feature = "tracing")]
    tracing::trace!("Coupon producer started");

    let mut exhausted_ticks: u64 = 0;

    loop {
        tokio::select! {
            biased;
            () = token.cancelled() => break,
            () = S::sleep_for(cadence) => {}
        }

        match sampler.sample() {
            SampleStatus::Ready { coupon } => {
                if token.is_cancelled() {
                    break;
                }
                match tx.try_send(coupon) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_coupon)) => {
                        #[cfg(feature = "tracing")]
                        tracing::trace!("Consumer behind, dropping {}", _coupon);
                    }
                    Err(TrySendError::Closed(_)) => {
                        #[cfg(feature = "tracing")]
                        tracing::debug!("Coupon receiver closed, stopping producer");
                        break;
                    }
                }
            }
            SampleStatus::PoolExhausted { position: _position } => {
                exhausted_ticks += 1;
                if exhausted_ticks == 1 {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("Pool for position {_position} exhausted, skipping tick");
                }
            }
        }
    }

    #[cfg(feature = "tracing")]
    tracing::trace!("Coupon producer stopped after {exhausted_ticks} exhausted ticks");
}
