// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::obs;

/// Thread-safe counters for renewal cycles.
#[derive(Debug, Default)]
pub struct RenewalMetrics {
	attempts: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
	invalidation_failure: AtomicU64,
}
impl RenewalMetrics {
	/// Returns the total number of renewal cycles started.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of cycles that stored a fresh token.
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Returns the number of cycles whose acquisition failed.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	/// Returns how often the best-effort revocation of the previous token failed.
	pub fn invalidation_failures(&self) -> u64 {
		self.invalidation_failure.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);

		obs::record_renewal_outcome("attempt");
	}

	pub(crate) fn record_success(&self) {
		self.success.fetch_add(1, Ordering::Relaxed);

		obs::record_renewal_outcome("success");
	}

	pub(crate) fn record_failure(&self) {
		self.failure.fetch_add(1, Ordering::Relaxed);

		obs::record_renewal_outcome("failure");
	}

	pub(crate) fn record_invalidation_failure(&self) {
		self.invalidation_failure.fetch_add(1, Ordering::Relaxed);

		obs::record_renewal_outcome("invalidation_failure");
	}
}
