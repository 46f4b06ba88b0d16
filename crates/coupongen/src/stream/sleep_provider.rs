use core::{future::Future, time::Duration};

/// A trait that abstracts over how to sleep for a given [`Duration`] in async
/// contexts.
///
/// The producer loop is generic over this so tests can swap in a provider
/// that does not touch the timer.
pub trait SleepProvider {
    /// We require `Send` so that the producer future can be spawned.
    fn sleep_for(dur: Duration) -> impl Future<Output = ()> + Send;
}

/// An implementation of [`SleepProvider`] using Tokio's timer.
///
/// This is the default provider used by [`CouponStream::spawn`].
///
/// [`CouponStream::spawn`]: crate::CouponStream::spawn
pub struct TokioSleep;

impl SleepProvider for TokioSleep {
    fn sleep_for(dur: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(dur)
    }
}

/// An implementation of [`SleepProvider`] using Tokio's yield.
///
/// Yields to the scheduler instead of sleeping, so the producer samples as
/// fast as the runtime lets it. Useful for benchmarks; in production the
/// timer-based [`TokioSleep`] keeps CPU usage down.
pub struct TokioYield;

impl SleepProvider for TokioYield {
    fn sleep_for(_dur: Duration) -> impl Future<Output = ()> + Send {
        tokio::task::yield_now()
    }
}
