//! Session configuration and its builder.

// std
use std::time::Duration as StdDuration;
// self
use crate::{_prelude::*, error::ConfigError};

/// Base URL of the public push REST API.
pub const DEFAULT_BASE_URL: &str = "https://restapi.getui.com/v1";
/// Renewal interval applied when none (or a non-positive one) is configured.
pub const DEFAULT_RENEWAL_INTERVAL: Duration = Duration::hours(20);

/// What the session does with its token when a background renewal fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaleTokenPolicy {
	/// Keep serving the last token until a later tick succeeds.
	#[default]
	KeepStale,
	/// Drop the token so calls fail fast until a later tick succeeds.
	FailClosed,
}

/// Validated session configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
	/// Base URL every endpoint path is appended to.
	pub base_url: Url,
	/// Interval between background renewals.
	pub renewal_interval: Duration,
	/// Behaviour after a failed background renewal.
	pub stale_token_policy: StaleTokenPolicy,
	/// Per-request deadline passed to the transport.
	pub request_timeout: Option<StdDuration>,
	/// Start the renewal task as soon as the session becomes active.
	pub auto_renew: bool,
}
impl SessionConfig {
	/// Returns a builder seeded with defaults (public service, 20 hour renewal, keep stale).
	pub fn builder() -> SessionConfigBuilder {
		SessionConfigBuilder::default()
	}

	/// Renewal interval as a std duration for the timer.
	pub(crate) fn renewal_period(&self) -> StdDuration {
		StdDuration::try_from(self.renewal_interval)
			.ok()
			.filter(|period| !period.is_zero())
			.unwrap_or(StdDuration::from_secs(DEFAULT_RENEWAL_INTERVAL.whole_seconds() as u64))
	}
}

/// Builder for [`SessionConfig`] values.
#[derive(Debug, Default)]
pub struct SessionConfigBuilder {
	/// Raw base URL override.
	pub base_url: Option<String>,
	/// Renewal interval override.
	pub renewal_interval: Option<Duration>,
	/// Stale token policy override.
	pub stale_token_policy: Option<StaleTokenPolicy>,
	/// Per-request deadline.
	pub request_timeout: Option<StdDuration>,
	/// Disables the automatic renewal task when `Some(false)`.
	pub auto_renew: Option<bool>,
}
impl SessionConfigBuilder {
	/// Overrides the base URL.
	pub fn base_url(mut self, url: impl Into<String>) -> Self {
		self.base_url = Some(url.into());

		self
	}

	/// Overrides the renewal interval; zero or negative values fall back to 20 hours.
	pub fn renewal_interval(mut self, interval: Duration) -> Self {
		self.renewal_interval = Some(interval);

		self
	}

	/// Overrides the stale token policy.
	pub fn stale_token_policy(mut self, policy: StaleTokenPolicy) -> Self {
		self.stale_token_policy = Some(policy);

		self
	}

	/// Sets the per-request deadline.
	pub fn request_timeout(mut self, timeout: StdDuration) -> Self {
		self.request_timeout = Some(timeout);

		self
	}

	/// Enables or disables the automatic renewal task.
	pub fn auto_renew(mut self, enabled: bool) -> Self {
		self.auto_renew = Some(enabled);

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<SessionConfig, ConfigError> {
		let base_url = parse_base_url(self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))?;
		let renewal_interval = self
			.renewal_interval
			.filter(|interval| interval.is_positive())
			.unwrap_or(DEFAULT_RENEWAL_INTERVAL);

		Ok(SessionConfig {
			base_url,
			renewal_interval,
			stale_token_policy: self.stale_token_policy.unwrap_or_default(),
			request_timeout: self.request_timeout,
			auto_renew: self.auto_renew.unwrap_or(true),
		})
	}
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
	let url = Url::parse(raw).map_err(|_| ConfigError::InvalidBaseUrl { url: raw.to_owned() })?;

	if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
		return Err(ConfigError::InvalidBaseUrl { url: raw.to_owned() });
	}

	Ok(url)
}
