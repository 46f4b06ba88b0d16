#![doc = include_str!("../README.md")]

mod coupon;
mod dedup;
mod draw;
mod error;
mod model;
mod pipeline;
mod random;
mod registry;
mod sampler;
mod status;
mod stream;

pub use crate::coupon::*;
pub use crate::dedup::*;
pub use crate::draw::*;
pub use crate::error::*;
pub use crate::model::*;
pub use crate::pipeline::*;
pub use crate::random::*;
pub use crate::registry::*;
pub use crate::sampler::*;
pub use crate::status::*;
pub use crate::stream::*;
