use crate::{Error, Result};
use core::fmt;
use std::collections::BTreeSet;

/// The primitive integer used for lottery numbers.
pub type Number = u32;

/// Per-position sets of numbers eligible for sampling, ordered by coupon
/// position.
pub type InclusionPools = Vec<BTreeSet<Number>>;

/// Numbers that may not appear at any position.
pub type ExclusionSet = BTreeSet<Number>;

/// A playable selection: distinct numbers in ascending order.
///
/// A `Coupon` is immutable once constructed. Coupons produced by
/// [`CandidateSampler`] are always sorted and free of repeats; the public
/// [`Coupon::new`] constructor normalizes arbitrary input to the same shape.
///
/// [`CandidateSampler`]: crate::CandidateSampler
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<Number>", into = "Vec<Number>"))]
pub struct Coupon {
    values: Vec<Number>,
}

impl Coupon {
    /// Builds a coupon from arbitrary numbers, sorting them ascending.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if `values` is empty or contains a
    /// repeated number.
    pub fn new(mut values: Vec<Number>) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::InvalidRequest {
                reason: "Coupon must contain at least one number".to_string(),
            });
        }
        values.sort_unstable();
        if let Some(pair) = values.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(Error::InvalidRequest {
                reason: format!("Coupon repeats number {}", pair[0]),
            });
        }
        Ok(Self { values })
    }

    /// Wraps numbers that the caller guarantees are distinct, sorting them.
    pub(crate) fn from_distinct(mut values: Vec<Number>) -> Self {
        debug_assert!({
            let set: BTreeSet<_> = values.iter().collect();
            set.len() == values.len()
        });
        values.sort_unstable();
        Self { values }
    }

    /// Numbers in ascending order.
    pub fn values(&self) -> &[Number] {
        &self.values
    }

    /// Number of values on the coupon.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false` for a constructed coupon; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The coupon's numbers as a set.
    pub fn to_set(&self) -> BTreeSet<Number> {
        self.values.iter().copied().collect()
    }

    /// Returns `true` if the coupon contains `number`.
    pub fn contains(&self, number: Number) -> bool {
        self.values.binary_search(&number).is_ok()
    }
}

impl TryFrom<Vec<Number>> for Coupon {
    type Error = Error;

    fn try_from(values: Vec<Number>) -> Result<Self> {
        Self::new(values)
    }
}

impl From<Coupon> for Vec<Number> {
    fn from(coupon: Coupon) -> Self {
        coupon.values
    }
}

impl fmt::Display for Coupon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{value:>2}")?;
        }
        Ok(())
    }
}
