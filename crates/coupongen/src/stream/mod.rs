//! Continuous coupon production on a background task.
//!
//! [`CouponStream`] owns a producer task that samples one candidate per tick
//! and a channel the consumer reads from. The stream never ends by itself:
//! it stops when it is cancelled, dropped, or its parent token is cancelled.

mod config;
mod coupon_stream;
mod sleep_provider;

pub use config::*;
pub use coupon_stream::*;
pub use sleep_provider::*;
