//! Transport primitives for push-service calls.
//!
//! The module exposes [`PushHttpClient`] alongside [`RequestSpec`] and [`RawResponse`] so
//! downstream crates can integrate custom HTTP clients (or recording fakes in tests) without
//! touching the session or dispatch layers. Implementations only move bytes: envelope decoding and
//! error classification stay in the broker so every transport reports failures the same way.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
use std::time::Duration as StdDuration;
// self
use crate::{
	_prelude::*,
	auth::AuthToken,
	endpoint::{Endpoint, HttpMethod},
	error::{DecodeError, TransportError},
};

/// Header carrying the session credential.
pub const AUTH_TOKEN_HEADER: &str = "authtoken";
/// Content type attached to every request.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Boxed future returned by [`PushHttpClient::execute`].
pub type HttpFuture<'a, E> = Pin<Box<dyn Future<Output = Result<RawResponse, E>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing push-service calls.
///
/// The trait is the broker's only dependency on an HTTP stack. Implementations must be
/// `Send + Sync + 'static` so the session's background renewal task and concurrent dispatcher
/// callers can share one instance behind an `Arc`. A transport must resolve with a
/// [`RawResponse`] for every HTTP response it receives, whatever the status code; only failures
/// to obtain a response (DNS, TCP, TLS, deadline) are errors.
pub trait PushHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Sends the request and collects the full response body.
	fn execute(&self, request: RequestSpec) -> HttpFuture<'_, Self::TransportError>;
}

/// One outbound call: constructed, sent, discarded.
///
/// The credential is copied into [`RequestSpec::headers`] when the request is built, so a
/// renewal that lands while the call is in flight never alters it.
#[derive(Clone)]
pub struct RequestSpec {
	/// Logical endpoint the request targets.
	pub endpoint: Endpoint,
	/// HTTP method from the endpoint catalog.
	pub method: HttpMethod,
	/// Absolute request URL.
	pub url: Url,
	/// Header name/value pairs.
	pub headers: Vec<(&'static str, String)>,
	/// Serialized JSON body, absent for bodiless methods.
	pub body: Option<Vec<u8>>,
	/// Optional per-request deadline passed through to the transport.
	pub timeout: Option<StdDuration>,
}
impl RequestSpec {
	/// Creates a request for `endpoint` with the JSON content type preset.
	pub fn new(endpoint: Endpoint, url: Url) -> Self {
		Self {
			endpoint,
			method: endpoint.method(),
			url,
			headers: vec![("Content-Type", JSON_CONTENT_TYPE.into())],
			body: None,
			timeout: None,
		}
	}

	/// Serializes `body` as the JSON payload.
	pub fn with_json<T>(mut self, body: &T) -> Result<Self>
	where
		T: ?Sized + Serialize,
	{
		self.body = Some(serde_json::to_vec(body).map_err(DecodeError::Encode)?);

		Ok(self)
	}

	/// Attaches the session credential header.
	pub fn with_token(mut self, token: &AuthToken) -> Self {
		self.headers.push((AUTH_TOKEN_HEADER, token.expose().to_owned()));

		self
	}

	/// Overrides the per-request deadline.
	pub fn with_timeout(mut self, timeout: Option<StdDuration>) -> Self {
		self.timeout = timeout;

		self
	}

	/// Returns the value of the first header named `name` (case-insensitive).
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}
}
impl Debug for RequestSpec {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let headers = self
			.headers
			.iter()
			.map(|(key, value)| {
				if key.eq_ignore_ascii_case(AUTH_TOKEN_HEADER) {
					(*key, "<redacted>")
				} else {
					(*key, value.as_str())
				}
			})
			.collect::<Vec<_>>();

		f.debug_struct("RequestSpec")
			.field("endpoint", &self.endpoint)
			.field("method", &self.method)
			.field("url", &self.url.as_str())
			.field("headers", &headers)
			.field("body_len", &self.body.as_ref().map(Vec::len))
			.field("timeout", &self.timeout)
			.finish()
	}
}

/// Status and body of a completed HTTP exchange.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawResponse {
	/// HTTP status code.
	pub status: u16,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl RawResponse {
	/// Convenience constructor used by transports and test doubles.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, body: body.into() }
	}
}

/// Executes `request`, classifying transport failures as [`Error::Transport`].
pub(crate) async fn send<C>(client: &C, request: RequestSpec) -> Result<RawResponse>
where
	C: ?Sized + PushHttpClient,
{
	client.execute(request).await.map_err(|err| TransportError::network(err).into())
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// The push service answers every call directly, so custom clients should keep redirect
/// following disabled or limited.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl PushHttpClient for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn execute(&self, request: RequestSpec) -> HttpFuture<'_, Self::TransportError> {
		let client = self.0.clone();

		Box::pin(async move {
			let method = match request.method {
				HttpMethod::Get => reqwest::Method::GET,
				HttpMethod::Post => reqwest::Method::POST,
				HttpMethod::Delete => reqwest::Method::DELETE,
			};
			let mut builder = client.request(method, request.url);

			for (name, value) in request.headers {
				builder = builder.header(name, value);
			}
			if let Some(body) = request.body {
				builder = builder.body(body);
			}
			if let Some(timeout) = request.timeout {
				builder = builder.timeout(timeout);
			}

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let body = response.bytes().await?.to_vec();

			Ok(RawResponse { status, body })
		})
	}
}
