use super::{
    controller::{Appended, Shared},
    progress::RunState,
    request::GenerationRequest,
};
use crate::{
    CandidateSampler, CouponModel, CouponStream, DistanceDeduplicator, Error, GeneratorConfig,
    Result, ThreadRandom,
};
use futures::StreamExt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Everything a run task owns.
pub(crate) struct RunContext<M> {
    pub(crate) id: u64,
    pub(crate) model: Arc<M>,
    pub(crate) request: GenerationRequest,
    pub(crate) valid_numbers_count: usize,
    pub(crate) config: GeneratorConfig,
    pub(crate) token: CancellationToken,
    pub(crate) shared: Arc<Shared>,
}

/// Runs one generation to a terminal state.
///
/// Completion is published by the final append itself; this function only
/// has to publish the non-completing outcomes.
pub(crate) async fn run_generation<M>(ctx: RunContext<M>)
where
    M: CouponModel,
{
    #[cfg(feature = "tracing")]
    let start = tokio::time::Instant::now();

    match drive(&ctx).await {
        Ok(()) => {
            #[cfg(feature = "tracing")]
            tracing::info!(
                "Run completed with {} coupons in {:?}",
                ctx.request.target_count,
                start.elapsed()
            );
        }
        Err(Error::Cancelled) => {
            #[cfg(feature = "tracing")]
            tracing::debug!("Run cancelled after {:?}", start.elapsed());
        }
        Err(Error::Timeout { after: _after }) => {
            #[cfg(feature = "tracing")]
            tracing::warn!("Model data not available after {:?}", _after);
            ctx.shared.fail(ctx.id, RunState::TimedOut);
        }
        Err(_e) => {
            #[cfg(feature = "tracing")]
            tracing::error!("Run failed: {}", _e);
            ctx.shared.fail(ctx.id, RunState::TimedOut);
        }
    }
}

async fn drive<M>(ctx: &RunContext<M>) -> Result<()>
where
    M: CouponModel,
{
    let request = &ctx.request;

    // Both inputs are polled together; the run waits for whichever is last.
    let inputs = futures::future::join(
        ctx.model
            .inclusion_pools(request.history_depth, request.std_dev_factor),
        ctx.model.exclusion_set(),
    );

    let (pools, exclusion) = tokio::select! {
        biased;
        () = ctx.token.cancelled() => return Err(Error::Cancelled),
        inputs = tokio::time::timeout(request.timeout, inputs) => {
            inputs.map_err(|_| Error::Timeout { after: request.timeout })?
        }
    };

    #[cfg(feature = "tracing")]
    tracing::debug!(
        "Model data ready: {} pools, {} excluded",
        pools.len(),
        exclusion.len()
    );

    if !ctx.shared.transition(ctx.id, RunState::Sampling) {
        return Err(Error::Cancelled);
    }

    let sampler = CandidateSampler::new(
        &pools,
        &exclusion,
        ctx.valid_numbers_count,
        ThreadRandom,
    );
    // Dropping the stream on any return below stops the producer.
    let mut stream = CouponStream::spawn(sampler, &ctx.config, &ctx.token);
    let mut dedup = DistanceDeduplicator::new(request.distance);

    loop {
        let next = tokio::select! {
            biased;
            () = ctx.token.cancelled() => return Err(Error::Cancelled),
            next = stream.next() => next,
        };

        let Some(coupon) = next else {
            return Err(Error::ChannelError {
                context: "Coupon producer stopped unexpectedly".to_string(),
            });
        };

        if !ctx.model.is_in_scope(coupon.values()) {
            #[cfg(feature = "tracing")]
            tracing::trace!("Out of scope: {}", coupon);
            continue;
        }

        if !dedup.accept(&coupon) {
            #[cfg(feature = "tracing")]
            tracing::trace!("Too close to an accepted coupon: {}", coupon);
            continue;
        }

        match ctx.shared.append(ctx.id, coupon, request.target_count) {
            Appended::More => {}
            Appended::Done => {
                stream.shutdown().await;
                return Ok(());
            }
            Appended::Inactive => return Err(Error::Cancelled),
        }
    }
}
