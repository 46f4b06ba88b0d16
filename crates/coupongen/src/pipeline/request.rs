use crate::{Error, Result};
use core::time::Duration;

/// Parameters of a single generation run.
///
/// Defaults mirror what the host application starts with: a 30 second
/// input timeout, distance 3 and a batch of 10 coupons.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenerationRequest {
    /// How long to wait for the model's inclusion pools and exclusion set.
    /// Sampling itself is not bounded by this.
    pub timeout: Duration,
    /// Similarity threshold handed to the deduplicator.
    pub distance: usize,
    /// Number of coupons after which the run completes.
    pub target_count: usize,
    /// Number of past draws the model looks at.
    pub history_depth: usize,
    /// Standard-deviation factor the model widens its pools by.
    pub std_dev_factor: f64,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            distance: 3,
            target_count: 10,
            history_depth: 0,
            std_dev_factor: 0.0,
        }
    }
}

impl GenerationRequest {
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_distance(mut self, distance: usize) -> Self {
        self.distance = distance;
        self
    }

    #[must_use]
    pub const fn with_target_count(mut self, target_count: usize) -> Self {
        self.target_count = target_count;
        self
    }

    #[must_use]
    pub const fn with_history_depth(mut self, history_depth: usize) -> Self {
        self.history_depth = history_depth;
        self
    }

    #[must_use]
    pub const fn with_std_dev_factor(mut self, std_dev_factor: f64) -> Self {
        self.std_dev_factor = std_dev_factor;
        self
    }

    /// Checks the request can start a run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if the target count is zero or the
    /// standard-deviation factor is not a finite number.
    pub fn validate(&self) -> Result<()> {
        if self.target_count == 0 {
            return Err(Error::InvalidRequest {
                reason: "Target count must be greater than 0".to_string(),
            });
        }
        if !self.std_dev_factor.is_finite() {
            return Err(Error::InvalidRequest {
                reason: format!(
                    "Standard deviation factor must be finite, got {}",
                    self.std_dev_factor
                ),
            });
        }
        Ok(())
    }
}
