//! Credential lifecycle: initial acquisition, lock-protected reads, renewal, and close.
//!
//! A [`Session`] owns the one token the push service currently honours for an application. The
//! token lives behind a single `RwLock` so readers observe either the previous or the next value
//! and never a partially written one. Every writer (initial acquisition, renewal ticks,
//! [`Session::renew_now`], [`Session::close`]) first takes an async writer guard, so exactly one
//! write sequence runs at a time while reads stay non-blocking.
//!
//! Sessions are plain values. Embedding applications that talk to several applications construct
//! one session per credential set and hand each to its own
//! [`Dispatcher`](crate::dispatch::Dispatcher).

mod metrics;
mod renewal;

pub use metrics::RenewalMetrics;
pub use renewal::*;

// self
use crate::{
	_prelude::*,
	auth::{ApplicationCredentials, AuthToken, signer},
	config::SessionConfig,
	endpoint::Endpoint,
	envelope::{self, Envelope, ServiceEnvelope},
	error::AuthError,
	http::{self, PushHttpClient, RequestSpec},
	obs::{self, OpKind},
};

/// Lifecycle states of a [`Session`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionState {
	/// Constructed, no acquisition attempted yet.
	Uninitialized,
	/// Initial acquisition in flight.
	Acquiring,
	/// A token is held and served to callers.
	Active,
	/// Invalidate-then-reacquire cycle in flight; the previous token is still served.
	Renewing,
	/// No usable token: initial acquisition failed, or a renewal failed under
	/// [`StaleTokenPolicy::FailClosed`](crate::config::StaleTokenPolicy::FailClosed).
	Failed,
	/// Explicitly closed; the session will not acquire again.
	Closed,
}
impl SessionState {
	/// Returns a stable label suitable for logs.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Uninitialized => "uninitialized",
			Self::Acquiring => "acquiring",
			Self::Active => "active",
			Self::Renewing => "renewing",
			Self::Failed => "failed",
			Self::Closed => "closed",
		}
	}
}
impl Display for SessionState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Token currently served by a session.
#[derive(Clone, Debug)]
pub struct ActiveToken {
	/// Credential sent in the `authtoken` header.
	pub token: AuthToken,
	/// Instant the token was issued to this session.
	pub renewed_at: OffsetDateTime,
}

#[derive(Debug)]
struct SessionSlot {
	state: SessionState,
	active: Option<ActiveToken>,
}

#[derive(Serialize)]
struct AuthSignRequest<'a> {
	#[serde(rename = "appkey")]
	app_key: &'a str,
	timestamp: String,
	sign: &'a str,
}

#[derive(Deserialize)]
struct AuthSignResponse {
	result: String,
	#[serde(default)]
	auth_token: Option<String>,
	#[serde(default)]
	desc: Option<String>,
}
impl ServiceEnvelope for AuthSignResponse {
	fn result_code(&self) -> &str {
		&self.result
	}

	fn description(&self) -> Option<&str> {
		self.desc.as_deref()
	}
}

/// Authenticated session shared by every operation of one application.
pub struct Session<C>
where
	C: ?Sized + PushHttpClient,
{
	credentials: ApplicationCredentials,
	config: SessionConfig,
	http_client: Arc<C>,
	slot: RwLock<SessionSlot>,
	writer: AsyncMutex<()>,
	renewal: Mutex<Option<renewal::RenewalTask>>,
	observer: Option<Arc<dyn RenewalObserver>>,
	metrics: Arc<RenewalMetrics>,
}
impl<C> Session<C>
where
	C: ?Sized + PushHttpClient,
{
	/// Creates an uninitialized session; call [`Session::activate`] to acquire the first token.
	pub fn new(
		credentials: ApplicationCredentials,
		config: SessionConfig,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self {
			credentials,
			config,
			http_client: http_client.into(),
			slot: RwLock::new(SessionSlot { state: SessionState::Uninitialized, active: None }),
			writer: AsyncMutex::new(()),
			renewal: Mutex::new(None),
			observer: None,
			metrics: Default::default(),
		}
	}

	/// Registers a callback that receives every renewal outcome.
	pub fn with_observer(mut self, observer: impl 'static + RenewalObserver) -> Self {
		self.observer = Some(Arc::new(observer));

		self
	}

	/// Builds a session, acquires the first token, and starts renewal per the config.
	///
	/// Acquisition failure is fatal here: the error is returned and no session is produced.
	pub async fn initialize(
		credentials: ApplicationCredentials,
		config: SessionConfig,
		http_client: impl Into<Arc<C>>,
	) -> Result<Arc<Self>> {
		let session = Arc::new(Self::new(credentials, config, http_client));

		session.activate().await?;

		Ok(session)
	}

	/// Performs the initial acquisition: `Uninitialized | Failed → Acquiring → Active | Failed`.
	///
	/// Activating an already active session is a no-op. The renewal task starts on success when
	/// [`SessionConfig::auto_renew`] is set.
	pub async fn activate(self: &Arc<Self>) -> Result<()> {
		{
			let _writer = self.writer.lock().await;

			match self.state() {
				SessionState::Active | SessionState::Renewing => return Ok(()),
				SessionState::Closed => return Err(AuthError::Closed.into()),
				_ => self.set_state(SessionState::Acquiring),
			}

			match self.acquire().await {
				Ok(active) => {
					#[cfg(feature = "tracing")]
					tracing::info!(app_id = %self.credentials.app_id, "Push session activated.");

					self.store_active(active);
				},
				Err(err) => {
					#[cfg(feature = "tracing")]
					tracing::warn!(
						app_id = %self.credentials.app_id,
						error = %err,
						"Push session failed to acquire its first token."
					);

					self.set_state(SessionState::Failed);

					return Err(err);
				},
			}
		}

		if self.config.auto_renew {
			self.start_renewal();
		}

		Ok(())
	}

	/// Returns the token last known active without waiting for an in-flight renewal.
	pub fn current_token(&self) -> Result<AuthToken> {
		let slot = self.slot.read();

		match (&slot.active, slot.state) {
			(_, SessionState::Closed) => Err(AuthError::Closed.into()),
			(Some(active), _) => Ok(active.token.clone()),
			(None, _) => Err(AuthError::NoActiveToken.into()),
		}
	}

	/// Current lifecycle state.
	pub fn state(&self) -> SessionState {
		self.slot.read().state
	}

	/// Instant the current token was issued, if one is held.
	pub fn renewed_at(&self) -> Option<OffsetDateTime> {
		self.slot.read().active.as_ref().map(|active| active.renewed_at)
	}

	/// Interval between background renewals.
	pub fn renewal_interval(&self) -> Duration {
		self.config.renewal_interval
	}

	/// Static credentials this session signs with.
	pub fn credentials(&self) -> &ApplicationCredentials {
		&self.credentials
	}

	/// Configuration the session was built with.
	pub fn config(&self) -> &SessionConfig {
		&self.config
	}

	/// Transport shared with dispatchers.
	pub fn http_client(&self) -> &Arc<C> {
		&self.http_client
	}

	/// Renewal counters.
	pub fn metrics(&self) -> &Arc<RenewalMetrics> {
		&self.metrics
	}

	/// Stops renewal, revokes the current token remotely, and clears it.
	///
	/// When revocation fails the token is kept (and the error returned) so the caller can retry;
	/// the renewal task stays stopped either way.
	pub async fn close(&self) -> Result<()> {
		self.stop_renewal().await;

		let _writer = self.writer.lock().await;
		let held = self.slot.read().active.clone();

		if let Some(active) = held {
			self.invalidate(&active.token).await?;
		}

		{
			let mut slot = self.slot.write();

			slot.active = None;
			slot.state = SessionState::Closed;
		}

		// A concurrent `activate` may have started renewal after the stop above.
		if let Some(task) = self.renewal.lock().take() {
			task.cancel.cancel();
		}

		#[cfg(feature = "tracing")]
		tracing::info!(app_id = %self.credentials.app_id, "Push session closed.");

		Ok(())
	}

	/// Signs and sends a token-issuance request.
	async fn acquire(&self) -> Result<ActiveToken> {
		obs::observe(OpKind::Acquire, "acquire", async {
			let timestamp = signer::now_millis();
			let sign = signer::sign(
				&self.credentials.app_key,
				&self.credentials.master_secret,
				timestamp,
			);
			let body = AuthSignRequest {
				app_key: self.credentials.app_key.as_ref(),
				timestamp: timestamp.to_string(),
				sign: sign.as_str(),
			};
			let url =
				Endpoint::AuthSign.url(&self.config.base_url, &self.credentials.app_id, None)?;
			let request = RequestSpec::new(Endpoint::AuthSign, url)
				.with_json(&body)?
				.with_timeout(self.config.request_timeout);
			let response =
				http::send(self.http_client.as_ref(), request).await.map_err(acquisition_failure)?;
			let envelope: AuthSignResponse =
				envelope::decode(&response).map_err(acquisition_failure)?;

			if !envelope.is_ok() {
				let description =
					envelope.desc.filter(|desc| !desc.is_empty()).unwrap_or(envelope.result);

				return Err(AuthError::Rejected { description }.into());
			}

			let token = envelope.auth_token.filter(|token| !token.is_empty()).ok_or_else(|| {
				AuthError::Rejected { description: "response carried no auth_token".into() }
			})?;

			Ok(ActiveToken { token: AuthToken::new(token), renewed_at: OffsetDateTime::now_utc() })
		})
		.await
	}

	/// Revokes `token` remotely. Local state is left to the caller.
	async fn invalidate(&self, token: &AuthToken) -> Result<()> {
		obs::observe(OpKind::Invalidate, "invalidate", async {
			let url =
				Endpoint::AuthClose.url(&self.config.base_url, &self.credentials.app_id, None)?;
			let request = RequestSpec::new(Endpoint::AuthClose, url)
				.with_token(token)
				.with_timeout(self.config.request_timeout);
			let response = http::send(self.http_client.as_ref(), request).await?;

			envelope::decode::<Envelope>(&response)?.into_checked()?;

			Ok(())
		})
		.await
	}

	fn set_state(&self, state: SessionState) {
		self.slot.write().state = state;
	}

	fn store_active(&self, active: ActiveToken) {
		let mut slot = self.slot.write();

		slot.active = Some(active);
		slot.state = SessionState::Active;
	}
}
impl<C> Debug for Session<C>
where
	C: ?Sized + PushHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let slot = self.slot.read();

		f.debug_struct("Session")
			.field("app_id", &self.credentials.app_id)
			.field("state", &slot.state)
			.field("token_held", &slot.active.is_some())
			.field("renewal_interval", &self.config.renewal_interval)
			.finish()
	}
}
impl<C> Drop for Session<C>
where
	C: ?Sized + PushHttpClient,
{
	fn drop(&mut self) {
		if let Some(task) = self.renewal.get_mut().take() {
			task.cancel.cancel();
		}
	}
}

fn acquisition_failure(err: Error) -> Error {
	AuthError::Acquisition { source: Box::new(err) }.into()
}
