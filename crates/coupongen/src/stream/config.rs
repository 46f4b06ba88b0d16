use core::time::Duration;

/// Interval between two sampling attempts of a producer.
///
/// The cadence only keeps the producer from spinning a core; it has no
/// bearing on correctness.
pub const DEFAULT_CADENCE: Duration = Duration::from_millis(50);

/// Default number of sampled coupons buffered between producer and consumer.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// Tuning knobs for the coupon producer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Sleep between two sampling attempts.
    pub cadence: Duration,
    /// Capacity of the producer-to-consumer channel. When the consumer falls
    /// behind and the channel is full, freshly sampled coupons are dropped
    /// rather than slowing the producer down.
    pub channel_capacity: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            cadence: DEFAULT_CADENCE,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl GeneratorConfig {
    #[must_use]
    pub const fn with_cadence(mut self, cadence: Duration) -> Self {
        self.cadence = cadence;
        self
    }

    #[must_use]
    pub const fn with_channel_capacity(mut self, channel_capacity: usize) -> Self {
        self.channel_capacity = channel_capacity;
        self
    }
}
