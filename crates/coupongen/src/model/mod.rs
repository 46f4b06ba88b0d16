//! The statistical model seam.
//!
//! Inclusion pools, the exclusion set and the scope predicate come from a
//! model of historical draws that lives outside this crate. [`CouponModel`]
//! is the boundary; [`StaticModel`] is an in-memory implementation for hosts
//! that already hold the data, and for tests.

mod fixed;
mod interface;

pub use fixed::*;
pub use interface::*;
