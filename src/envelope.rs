//! Uniform response envelopes and their classification into results or errors.
//!
//! Every push-service response is a JSON object carrying at least a `result` code. The success
//! sentinel is `"ok"`; anything else is an authoritative failure even when the HTTP layer
//! reported `200`. [`decode`] turns raw bytes into a typed envelope (or a [`DecodeError`] with the
//! HTTP status and a bounded body preview), and [`ServiceEnvelope::into_checked`] maps non-success
//! codes into [`Error::Remote`].

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{_prelude::*, error::DecodeError, http::RawResponse};

/// Result code signalling success.
pub const RESULT_OK: &str = "ok";
/// Result code returned by user-status lookups for unknown client ids.
pub const RESULT_NO_USER: &str = "no_user";

const BODY_PREVIEW_LIMIT: usize = 512;

/// Shared accessors for every envelope shape returned by the service.
pub trait ServiceEnvelope
where
	Self: Sized,
{
	/// Raw result code.
	fn result_code(&self) -> &str;

	/// Service-provided description, if any.
	fn description(&self) -> Option<&str>;

	/// Returns `true` when the result code is the success sentinel.
	fn is_ok(&self) -> bool {
		self.result_code() == RESULT_OK
	}

	/// Passes successful envelopes through and maps failures into [`Error::Remote`].
	fn into_checked(self) -> Result<Self> {
		if self.is_ok() {
			Ok(self)
		} else {
			Err(Error::Remote {
				code: self.result_code().to_owned(),
				description: self.description().unwrap_or_default().to_owned(),
			})
		}
	}
}

/// Generic response wrapper returned by push, save and stop operations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
	/// Result code (`"ok"` on success).
	pub result: String,
	/// Human-readable description.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub desc: Option<String>,
	/// Task identifier assigned by the service.
	#[serde(default, rename = "taskid", skip_serializing_if = "Option::is_none")]
	pub task_id: Option<String>,
	/// Delivery status, e.g. `successed_online`, `successed_offline`, `successed_ignore`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub status: Option<String>,
	/// Request identifier echoed by the service.
	#[serde(
		default,
		rename = "requestID",
		alias = "requestid",
		skip_serializing_if = "Option::is_none"
	)]
	pub request_id: Option<String>,
}
impl ServiceEnvelope for Envelope {
	fn result_code(&self) -> &str {
		&self.result
	}

	fn description(&self) -> Option<&str> {
		self.desc.as_deref()
	}
}

/// Successful outcome of a push, save or stop call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushReceipt {
	/// Task identifier assigned by the service.
	pub task_id: Option<String>,
	/// Delivery status reported by the service.
	pub status: Option<String>,
	/// Description reported by the service.
	pub description: Option<String>,
	/// Request identifier used for the call, for correlating delivery reports.
	pub request_id: Option<String>,
}
impl PushReceipt {
	/// Builds a receipt from a checked envelope, preferring the client-stamped request id.
	pub fn from_envelope(envelope: Envelope, request_id: Option<String>) -> Self {
		Self {
			task_id: envelope.task_id,
			status: envelope.status,
			description: envelope.desc,
			request_id: request_id.or(envelope.request_id),
		}
	}
}

/// Online/offline classification returned by user-status lookups.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Presence {
	/// Client currently holds a connection.
	Online,
	/// Client is disconnected; `last_login` is populated.
	Offline,
	/// Any status string the broker does not recognise.
	Other(String),
}

/// User-status envelope: the generic wrapper plus presence details.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStatus {
	/// Result code (`"ok"` on success, `"no_user"` for unknown clients).
	pub result: String,
	/// Human-readable description.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub desc: Option<String>,
	/// Client identifier that was looked up.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub cid: Option<String>,
	/// Raw presence string (`online`/`offline`).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub status: Option<String>,
	/// Last-seen epoch milliseconds as sent by the service; only present when offline.
	#[serde(default, rename = "lastlogin", skip_serializing_if = "Option::is_none")]
	pub last_login_millis: Option<String>,
	/// Calendar form of `last_login_millis`, filled by [`UserStatus::resolve_last_login`].
	#[serde(skip)]
	pub last_login: Option<OffsetDateTime>,
}
impl UserStatus {
	/// Classifies the raw status string.
	pub fn presence(&self) -> Option<Presence> {
		self.status.as_deref().map(|status| match status {
			"online" => Presence::Online,
			"offline" => Presence::Offline,
			other => Presence::Other(other.to_owned()),
		})
	}

	/// Converts the millisecond `lastlogin` field into a calendar timestamp.
	pub fn resolve_last_login(&mut self) -> Result<()> {
		let Some(raw) = self.last_login_millis.as_deref().filter(|raw| !raw.is_empty()) else {
			return Ok(());
		};
		let millis = raw.trim().parse::<i64>().map_err(|err| DecodeError::Field {
			field: "lastlogin",
			reason: err.to_string(),
		})?;
		let instant = OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
			.map_err(|err| DecodeError::Field { field: "lastlogin", reason: err.to_string() })?;

		self.last_login = Some(instant);

		Ok(())
	}
}
impl ServiceEnvelope for UserStatus {
	fn result_code(&self) -> &str {
		&self.result
	}

	fn description(&self) -> Option<&str> {
		self.desc.as_deref()
	}
}

/// Decodes a raw response body into `T`, recording the failing JSON path on error.
pub fn decode<T>(response: &RawResponse) -> Result<T>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(&response.body);

	serde_path_to_error::deserialize(&mut deserializer).map_err(|source| {
		DecodeError::Json { source, status: Some(response.status), body: body_preview(&response.body) }
			.into()
	})
}

fn body_preview(body: &[u8]) -> String {
	let text = String::from_utf8_lossy(body);

	if text.len() <= BODY_PREVIEW_LIMIT {
		return text.into_owned();
	}

	let mut end = BODY_PREVIEW_LIMIT;

	while !text.is_char_boundary(end) {
		end -= 1;
	}

	format!("{}...", &text[..end])
}
