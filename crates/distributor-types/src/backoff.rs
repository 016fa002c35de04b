//! Bounded exponential backoff for reconnecting collaborators

use std::time::Duration;

/// Reconnect policy: delays start at `min_interval` and double (by
/// `multiplier`) on every failed attempt, never exceeding `max_interval`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconnectPolicy {
	pub min_interval: Duration,
	pub max_interval: Duration,
	pub multiplier: u32,
}

impl ReconnectPolicy {
	pub fn new(min_interval: Duration, max_interval: Duration) -> Self {
		// A misconfigured window collapses to a fixed interval
		let max_interval = max_interval.max(min_interval);
		Self { min_interval, max_interval, multiplier: 2 }
	}

	/// Delay before reconnect attempt `attempt` (1-based).
	pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
		if attempt <= 1 {
			return self.min_interval;
		}

		self.multiplier
			.checked_pow(attempt - 1)
			.and_then(|factor| self.min_interval.checked_mul(factor))
			.map_or(self.max_interval, |delay| delay.min(self.max_interval))
	}

	/// Iterator over successive delays, handy for retry loops
	pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
		(1..).map(|attempt| self.delay_for_attempt(attempt))
	}
}

impl Default for ReconnectPolicy {
	fn default() -> Self {
		Self::new(Duration::from_secs(10), Duration::from_secs(60))
	}
}


// vim: ts=4
