//! Shared time budget for one session.

use std::time::Duration;

use tokio::time::Instant;

/// Longest budget or cap honored, about 30 years. Larger values are clamped
/// so the deadline stays representable as an [`Instant`].
pub const MAX_BUDGET: Duration = Duration::from_secs(86_400 * 365 * 30);

/// A deadline fixed when the session starts.
///
/// Every blocking operation in the session draws from the same budget, so
/// a slow connect leaves less time for reads.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutBudget {
    start: Instant,
    limit: Duration,
}

impl TimeoutBudget {
    /// Start a budget of `limit` from now, clamped to [`MAX_BUDGET`].
    pub fn new(limit: Duration) -> Self {
        Self {
            start: Instant::now(),
            limit: limit.min(MAX_BUDGET),
        }
    }

    /// Start a budget of `secs` seconds from now.
    pub fn from_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    /// Total budget.
    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Time spent since the budget started.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Time left, zero once exhausted.
    pub fn remaining(&self) -> Duration {
        self.limit.saturating_sub(self.elapsed())
    }

    /// Whether the budget is used up.
    pub fn is_exhausted(&self) -> bool {
        self.elapsed() >= self.limit
    }

    /// Absolute instant at which the budget runs out.
    pub fn deadline(&self) -> Instant {
        self.start + self.limit
    }

    /// The earlier of the budget deadline and `cap` from now.
    pub fn deadline_capped(&self, cap: Duration) -> Instant {
        self.deadline().min(Instant::now() + cap.min(MAX_BUDGET))
    }
}
