//! Typed push operations executed against an authenticated [`Session`].
//!
//! Every call follows one pipeline: validate the body, stamp the application key and a request id,
//! resolve the endpoint URL, attach the session token, send once, decode the envelope, and map a
//! non-`ok` result into [`Error::Remote`]. Calls are never retried; the caller decides.

mod request_id;

pub use request_id::next_request_id;

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::AuthToken,
	endpoint::Endpoint,
	envelope::{self, Envelope, PushReceipt, RESULT_NO_USER, ServiceEnvelope, UserStatus},
	error::{DecodeError, ValidationError},
	http::{self, PushHttpClient, RequestSpec},
	message::{AppPush, ListPush, SaveListBody, SinglePush},
	obs::{self, OpKind},
	session::Session,
};

/// Issues push-service calls on behalf of one session.
///
/// Dispatchers are cheap to clone and safe to share across tasks; every call reads the token
/// once at request-build time and never waits for an in-flight renewal.
pub struct Dispatcher<C>
where
	C: ?Sized + PushHttpClient,
{
	session: Arc<Session<C>>,
}
impl<C> Dispatcher<C>
where
	C: ?Sized + PushHttpClient,
{
	/// Creates a dispatcher bound to `session`.
	pub fn new(session: Arc<Session<C>>) -> Self {
		Self { session }
	}

	/// Session backing this dispatcher.
	pub fn session(&self) -> &Arc<Session<C>> {
		&self.session
	}

	/// Sends a notification to one client id or alias.
	pub async fn push_to_single(&self, mut body: SinglePush) -> Result<PushReceipt> {
		obs::observe(OpKind::PushSingle, "push_to_single", async move {
			if body.cid.is_empty() && body.alias.is_empty() {
				return Err(ValidationError::MissingTarget { operation: "push_single" }.into());
			}

			body.message.app_key = self.app_key().to_owned();

			let request_id = request_id::stamp(&mut body.request_id);
			let envelope: Envelope =
				self.execute(Endpoint::PushSingle, None, Some(&body)).await?;

			Ok(PushReceipt::from_envelope(envelope.into_checked()?, Some(request_id)))
		})
		.await
	}

	/// Saves the shared body, then pushes it to the listed client ids or alias.
	///
	/// A failed save returns immediately; the push endpoint is only called with a saved task id.
	pub async fn push_to_list(&self, mut body: ListPush) -> Result<PushReceipt> {
		obs::observe(OpKind::PushList, "push_to_list", async move {
			if body.cid.is_empty() && body.alias.is_empty() {
				return Err(ValidationError::MissingTarget { operation: "push_list" }.into());
			}

			let app_key = self.app_key().to_owned();
			let saved: Envelope = self
				.execute(
					Endpoint::SaveListBody,
					None,
					Some(&SaveListBody::from_list(&body, &app_key)),
				)
				.await?;
			let task_id = saved
				.into_checked()?
				.task_id
				.filter(|task_id| !task_id.is_empty())
				.ok_or_else(|| DecodeError::Field {
					field: "taskid",
					reason: "save_list_body returned no task id".into(),
				})?;

			body.message.app_key = app_key;
			body.task_id = task_id.clone();
			body.need_detail = true;

			let pushed: Envelope = self.execute(Endpoint::PushList, None, Some(&body)).await?;
			let mut receipt = PushReceipt::from_envelope(pushed.into_checked()?, None);

			receipt.task_id =
				receipt.task_id.filter(|task_id| !task_id.is_empty()).or(Some(task_id));

			Ok(receipt)
		})
		.await
	}

	/// Sends a notification to every client matching the body's conditions.
	pub async fn push_to_app(&self, mut body: AppPush) -> Result<PushReceipt> {
		obs::observe(OpKind::PushApp, "push_to_app", async move {
			body.message.app_key = self.app_key().to_owned();

			let request_id = request_id::stamp(&mut body.request_id);
			let envelope: Envelope = self.execute(Endpoint::PushApp, None, Some(&body)).await?;

			Ok(PushReceipt::from_envelope(envelope.into_checked()?, Some(request_id)))
		})
		.await
	}

	/// Cancels a scheduled or running push task.
	pub async fn stop_task(&self, task_id: &str) -> Result<PushReceipt> {
		obs::observe(OpKind::StopTask, "stop_task", async move {
			if task_id.is_empty() {
				return Err(
					ValidationError::EmptyField { operation: "stop_task", field: "task_id" }.into()
				);
			}

			let envelope: Envelope =
				self.execute(Endpoint::StopTask, Some(task_id), None::<&()>).await?;
			let mut receipt = PushReceipt::from_envelope(envelope.into_checked()?, None);

			receipt.task_id.get_or_insert_with(|| task_id.to_owned());

			Ok(receipt)
		})
		.await
	}

	/// Looks up the presence of one client id.
	pub async fn user_status(&self, cid: &str) -> Result<UserStatus> {
		obs::observe(OpKind::UserStatus, "user_status", async move {
			let mut status = self.fetch_user_status(cid).await?.into_checked()?;

			status.resolve_last_login()?;

			Ok(status)
		})
		.await
	}

	/// Returns whether the service knows `cid`; `no_user` maps to `false`.
	pub async fn user_existed(&self, cid: &str) -> Result<bool> {
		obs::observe(OpKind::UserStatus, "user_existed", async move {
			let status = self.fetch_user_status(cid).await?;

			if status.result_code() == RESULT_NO_USER {
				return Ok(false);
			}

			status.into_checked().map(|_| true)
		})
		.await
	}

	/// Closes the underlying session, revoking its token.
	pub async fn close_auth(&self) -> Result<()> {
		self.session.close().await
	}

	/// Token currently attached to outgoing calls.
	pub fn auth_token(&self) -> Result<AuthToken> {
		self.session.current_token()
	}

	fn app_key(&self) -> &str {
		self.session.credentials().app_key.as_ref()
	}

	async fn fetch_user_status(&self, cid: &str) -> Result<UserStatus> {
		if cid.is_empty() {
			return Err(ValidationError::EmptyField { operation: "user_status", field: "cid" }.into());
		}

		self.execute(Endpoint::UserStatus, Some(cid), None::<&()>).await
	}

	async fn execute<T, B>(
		&self,
		endpoint: Endpoint,
		param: Option<&str>,
		body: Option<&B>,
	) -> Result<T>
	where
		T: DeserializeOwned,
		B: ?Sized + Serialize,
	{
		let config = self.session.config();
		let url = endpoint.url(&config.base_url, &self.session.credentials().app_id, param)?;
		let token = self.session.current_token()?;
		let mut request =
			RequestSpec::new(endpoint, url).with_token(&token).with_timeout(config.request_timeout);

		if let Some(body) = body.filter(|_| !endpoint.method().is_bodiless()) {
			request = request.with_json(body)?;
		}

		let response = http::send(self.session.http_client().as_ref(), request).await?;

		envelope::decode(&response)
	}
}
impl<C> Clone for Dispatcher<C>
where
	C: ?Sized + PushHttpClient,
{
	fn clone(&self) -> Self {
		Self { session: self.session.clone() }
	}
}
impl<C> Debug for Dispatcher<C>
where
	C: ?Sized + PushHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Dispatcher").field("session", &self.session).finish()
	}
}
