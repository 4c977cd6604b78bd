//! Background renewal: the periodic invalidate-then-reacquire cycle and its lifecycle.

// std
use std::{sync::Weak, time::Duration as StdDuration};
// crates.io
use tokio::{
	task::JoinHandle,
	time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
// self
use crate::{
	_prelude::*,
	config::StaleTokenPolicy,
	error::AuthError,
	http::PushHttpClient,
	obs::{self, OpKind},
	session::{Session, SessionState},
};

const STOP_TIMEOUT: StdDuration = StdDuration::from_secs(5);

/// Outcome of one renewal cycle, delivered to a [`RenewalObserver`].
#[derive(Debug)]
pub enum RenewalEvent<'a> {
	/// A fresh token replaced the previous one.
	Renewed {
		/// Issue instant of the new token.
		renewed_at: OffsetDateTime,
	},
	/// Revoking the previous token failed; the cycle continued with acquisition.
	InvalidationFailed {
		/// Revocation failure.
		error: &'a Error,
	},
	/// Acquiring the replacement failed and `policy` was applied.
	AcquisitionFailed {
		/// Acquisition failure.
		error: &'a Error,
		/// Policy that decided whether the previous token stays in service.
		policy: StaleTokenPolicy,
	},
}

/// Receives renewal outcomes that have no caller to return to.
pub trait RenewalObserver
where
	Self: Send + Sync,
{
	/// Called once per event, from the task running the cycle.
	fn on_renewal(&self, event: &RenewalEvent<'_>);
}
impl<F> RenewalObserver for F
where
	F: Send + Sync + Fn(&RenewalEvent<'_>),
{
	fn on_renewal(&self, event: &RenewalEvent<'_>) {
		self(event)
	}
}

pub(super) struct RenewalTask {
	pub(super) cancel: CancellationToken,
	handle: JoinHandle<()>,
}

impl<C> Session<C>
where
	C: ?Sized + PushHttpClient,
{
	/// Runs one renewal cycle immediately, outside the timer.
	///
	/// The cycle is serialized with the background task, so calling this while a tick is in
	/// flight waits for that tick and then renews again.
	pub async fn renew_now(&self) -> Result<()> {
		let _writer = self.writer.lock().await;

		self.renew_locked().await
	}

	/// Spawns the periodic renewal task. Returns `false` when one is already running or the
	/// session is closed.
	///
	/// The task holds only a weak reference, so dropping the last [`Arc`] to the session ends it.
	pub fn start_renewal(self: &Arc<Self>) -> bool {
		let mut renewal = self.renewal.lock();

		// `close` marks the state before taking this lock, so a spawn here is always seen by it.
		if self.state() == SessionState::Closed
			|| renewal.as_ref().is_some_and(|task| !task.handle.is_finished())
		{
			return false;
		}

		let cancel = CancellationToken::new();
		let handle = tokio::spawn(run_renewal_loop(
			Arc::downgrade(self),
			self.config.renewal_period(),
			cancel.clone(),
		));

		*renewal = Some(RenewalTask { cancel, handle });

		#[cfg(feature = "tracing")]
		tracing::debug!(
			app_id = %self.credentials.app_id,
			interval = %self.config.renewal_interval,
			"Push session renewal started."
		);

		true
	}

	/// Cancels the renewal task and waits for it to finish. Returns `false` when none was running.
	///
	/// A cycle already in flight is allowed to complete; if it overruns five seconds the task is
	/// aborted and a half-finished `Renewing` state is settled from the token still held.
	pub async fn stop_renewal(&self) -> bool {
		let Some(RenewalTask { cancel, mut handle }) = self.renewal.lock().take() else {
			return false;
		};

		cancel.cancel();

		if time::timeout(STOP_TIMEOUT, &mut handle).await.is_err() {
			#[cfg(feature = "tracing")]
			tracing::warn!(
				app_id = %self.credentials.app_id,
				"Push session renewal did not stop in time; aborting."
			);

			handle.abort();

			let mut slot = self.slot.write();

			if slot.state == SessionState::Renewing {
				slot.state =
					if slot.active.is_some() { SessionState::Active } else { SessionState::Failed };
			}
		}

		true
	}

	/// Returns `true` while the background task is alive.
	pub fn renewal_task_running(&self) -> bool {
		self.renewal.lock().as_ref().is_some_and(|task| !task.handle.is_finished())
	}

	/// One renewal cycle. Callers must hold the writer guard.
	async fn renew_locked(&self) -> Result<()> {
		let previous = {
			let mut slot = self.slot.write();

			if slot.state == SessionState::Closed {
				return Err(AuthError::Closed.into());
			}

			slot.state = SessionState::Renewing;

			slot.active.clone()
		};

		self.metrics.record_attempt();

		obs::observe(OpKind::Renew, "renew", async {
			// The service allows one live token per application, so the old one goes first.
			if let Some(previous) = &previous {
				if let Err(err) = self.invalidate(&previous.token).await {
					self.metrics.record_invalidation_failure();

					#[cfg(feature = "tracing")]
					tracing::warn!(
						app_id = %self.credentials.app_id,
						error = %err,
						"Failed to revoke the previous push token; continuing with renewal."
					);

					self.notify(&RenewalEvent::InvalidationFailed { error: &err });
				}
			}

			match self.acquire().await {
				Ok(active) => {
					let renewed_at = active.renewed_at;

					self.store_active(active);
					self.metrics.record_success();

					#[cfg(feature = "tracing")]
					tracing::info!(app_id = %self.credentials.app_id, "Push token renewed.");

					self.notify(&RenewalEvent::Renewed { renewed_at });

					Ok(())
				},
				Err(err) => {
					let policy = self.config.stale_token_policy;

					self.metrics.record_failure();
					self.settle_failed_renewal(policy);

					#[cfg(feature = "tracing")]
					tracing::warn!(
						app_id = %self.credentials.app_id,
						error = %err,
						?policy,
						"Push token renewal failed."
					);

					self.notify(&RenewalEvent::AcquisitionFailed { error: &err, policy });

					Err(err)
				},
			}
		})
		.await
	}

	fn settle_failed_renewal(&self, policy: StaleTokenPolicy) {
		let mut slot = self.slot.write();

		match policy {
			StaleTokenPolicy::KeepStale if slot.active.is_some() => {
				slot.state = SessionState::Active;
			},
			StaleTokenPolicy::KeepStale => slot.state = SessionState::Failed,
			StaleTokenPolicy::FailClosed => {
				slot.active = None;
				slot.state = SessionState::Failed;
			},
		}
	}

	fn notify(&self, event: &RenewalEvent<'_>) {
		if let Some(observer) = &self.observer {
			observer.on_renewal(event);
		}
	}
}

async fn run_renewal_loop<C>(
	session: Weak<Session<C>>,
	period: StdDuration,
	cancel: CancellationToken,
) where
	C: ?Sized + PushHttpClient,
{
	let mut ticker = time::interval_at(Instant::now() + period, period);

	ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

	loop {
		tokio::select! {
			biased;
			_ = cancel.cancelled() => break,
			_ = ticker.tick() => {},
		}

		let Some(session) = session.upgrade() else {
			break;
		};
		let _writer = session.writer.lock().await;

		// Other outcomes reach callers through metrics, logs, and the observer.
		if let Err(Error::Auth(AuthError::Closed)) = session.renew_locked().await {
			break;
		}
	}
}
