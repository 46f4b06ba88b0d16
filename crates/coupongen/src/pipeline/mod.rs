//! Generation runs: orchestration, progress and cancellation.
//!
//! A [`CouponController`] owns the observable progress/result state for one
//! game and at most one active run. Each run is a single Tokio task that
//! waits for the model inputs (bounded by the request timeout), then consumes
//! a [`CouponStream`](crate::CouponStream), filters candidates through the
//! model's scope predicate and a [`DistanceDeduplicator`](crate::DistanceDeduplicator),
//! and appends survivors until the target count is reached.
//!
//! ## Structure
//!
//! - [`controller`] - public entry point (`CouponController`, `RunHandle`).
//! - [`request`] - `GenerationRequest` parameters and validation.
//! - [`progress`] - `RunState` and the derived `Progress` view.
//! - `run` - the per-run task.

pub mod controller;
pub mod progress;
pub mod request;
mod run;
#[cfg(test)]
mod tests;

pub use controller::*;
pub use progress::*;
pub use request::*;
