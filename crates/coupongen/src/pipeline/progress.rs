use core::fmt;

/// Lifecycle of a generation run.
///
/// `Idle -> AwaitingModelData -> Sampling -> {Completed | TimedOut | Cancelled}`.
/// `Cancelled` is reachable from every non-terminal state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RunState {
    /// No run has been started.
    #[default]
    Idle,
    /// Waiting for inclusion pools and exclusion set.
    AwaitingModelData,
    /// Producer running, coupons being filtered and collected.
    Sampling,
    /// Target count reached.
    Completed,
    /// Model data did not arrive in time.
    TimedOut,
    /// Cancelled by the caller.
    Cancelled,
}

impl RunState {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::TimedOut | Self::Cancelled)
    }

    pub const fn is_active(self) -> bool {
        matches!(self, Self::AwaitingModelData | Self::Sampling)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::AwaitingModelData => "awaiting model data",
            Self::Sampling => "sampling",
            Self::Completed => "completed",
            Self::TimedOut => "timed out",
            Self::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// What a caller can tell from the observable progress and result count.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Progress {
    /// Fraction of the target collected so far, in `[0, 1]`.
    Fraction(f64),
    /// Progress reached its terminal value without the target being met.
    TimedOut,
}

impl Progress {
    /// Derives the caller's view from raw observables.
    ///
    /// A progress of `1.0` always means the run has ended; whether it
    /// completed or timed out is only visible by comparing `accepted` to
    /// `target`.
    pub fn from_observed(progress: f64, accepted: usize, target: usize) -> Self {
        if progress >= 1.0 && accepted < target {
            Self::TimedOut
        } else {
            Self::Fraction(progress.clamp(0.0, 1.0))
        }
    }

    /// Derives the caller's view from the run state and the raw progress.
    ///
    /// Terminal states decide the outcome, so emptying the result list after
    /// a completed run does not turn it into a timeout.
    pub fn from_state(state: RunState, progress: f64) -> Self {
        match state {
            RunState::Completed => Self::Fraction(1.0),
            RunState::TimedOut => Self::TimedOut,
            _ => Self::Fraction(progress.clamp(0.0, 1.0)),
        }
    }

    /// The fraction, or `None` for a timeout.
    pub const fn value(self) -> Option<f64> {
        match self {
            Self::Fraction(value) => Some(value),
            Self::TimedOut => None,
        }
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fraction(value) => write!(f, "{:.0}%", value * 100.0),
            Self::TimedOut => f.write_str("timeout"),
        }
    }
}
