//! Static catalog mapping logical operations to HTTP method + path template.

// self
use crate::{
	_prelude::*,
	auth::AppId,
	error::{ConfigError, ValidationError},
};

/// HTTP verbs used by the push service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
	/// `GET`
	Get,
	/// `POST`
	Post,
	/// `DELETE`
	Delete,
}
impl HttpMethod {
	/// Returns the canonical verb string.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Get => "GET",
			Self::Post => "POST",
			Self::Delete => "DELETE",
		}
	}

	/// Methods whose requests never carry a JSON body.
	pub const fn is_bodiless(self) -> bool {
		matches!(self, Self::Get | Self::Delete)
	}
}
impl Display for HttpMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Every endpoint the broker talks to, relative to `{base}/{app_id}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
	/// Token issuance.
	AuthSign,
	/// Token revocation.
	AuthClose,
	/// Push to one client id or alias.
	PushSingle,
	/// First phase of a list push: store the shared message body.
	SaveListBody,
	/// Second phase of a list push: deliver a saved body to targets.
	PushList,
	/// Push to every client of the application matching optional conditions.
	PushApp,
	/// Stop a running task, `stop_task/{taskid}`.
	StopTask,
	/// Look up a client's online status, `user_status/{cid}`.
	UserStatus,
}
impl Endpoint {
	/// Returns the HTTP method for the endpoint.
	pub const fn method(self) -> HttpMethod {
		match self {
			Self::StopTask => HttpMethod::Delete,
			Self::UserStatus => HttpMethod::Get,
			_ => HttpMethod::Post,
		}
	}

	/// Returns the path segment below `{base}/{app_id}`.
	pub const fn path(self) -> &'static str {
		match self {
			Self::AuthSign => "auth_sign",
			Self::AuthClose => "auth_close",
			Self::PushSingle => "push_single",
			Self::SaveListBody => "save_list_body",
			Self::PushList => "push_list",
			Self::PushApp => "push_app",
			Self::StopTask => "stop_task",
			Self::UserStatus => "user_status",
		}
	}

	/// Whether the path template ends with a caller-supplied segment.
	pub const fn takes_param(self) -> bool {
		matches!(self, Self::StopTask | Self::UserStatus)
	}

	/// Builds the absolute URL, percent-encoding the app id and parameter.
	pub fn url(self, base: &Url, app_id: &AppId, param: Option<&str>) -> Result<Url> {
		let param = match (self.takes_param(), param) {
			(true, Some(value)) if !value.is_empty() => Some(value),
			(true, _) =>
				return Err(ValidationError::MissingPathParam { endpoint: self.path() }.into()),
			(false, Some(_)) =>
				return Err(ValidationError::UnexpectedPathParam { endpoint: self.path() }.into()),
			(false, None) => None,
		};
		let mut url = base.clone();

		{
			let mut segments = url
				.path_segments_mut()
				.map_err(|_| ConfigError::InvalidBaseUrl { url: base.to_string() })?;

			segments.pop_if_empty().push(app_id).push(self.path());

			if let Some(value) = param {
				segments.push(value);
			}
		}

		Ok(url)
	}
}
impl Display for Endpoint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.path())
	}
}
