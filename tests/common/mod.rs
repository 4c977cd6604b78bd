//! Fixtures shared by the integration suites: credentials, configs, and a scripted transport.

#![allow(dead_code)]

// std
use std::{
	collections::{HashMap, VecDeque},
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	time::Duration as StdDuration,
};
// crates.io
use parking_lot::Mutex;
use serde_json::Value;
// self
use push_broker::{
	auth::ApplicationCredentials,
	config::{SessionConfig, SessionConfigBuilder},
	endpoint::{Endpoint, HttpMethod},
	http::{AUTH_TOKEN_HEADER, HttpFuture, PushHttpClient, RawResponse, RequestSpec, ReqwestHttpClient},
	reqwest::Client,
};

pub const APP_ID: &str = "app-1";
pub const APP_KEY: &str = "key-1";
pub const MASTER_SECRET: &str = "master-1";

pub fn credentials() -> ApplicationCredentials {
	ApplicationCredentials::parse(APP_ID, APP_KEY, MASTER_SECRET)
		.expect("Fixture credentials should be valid.")
}

/// Config pointed at a host the scripted transport pretends to be, with renewal disabled.
pub fn fake_config() -> SessionConfigBuilder {
	SessionConfig::builder().base_url("https://push.test/v1").auto_renew(false)
}

/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
/// `httpmock` during tests.
pub fn test_reqwest_http_client() -> ReqwestHttpClient {
	let client = Client::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()
		.expect("Failed to build insecure Reqwest client for tests.");

	ReqwestHttpClient::with_client(client)
}

#[derive(Debug)]
pub struct FakeTransportError;
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Connection refused by fake transport.")
	}
}
impl StdError for FakeTransportError {}

#[derive(Clone, Debug)]
enum Reply {
	Respond(RawResponse),
	Fail,
}

/// Request as observed by [`ScriptedHttpClient`].
#[derive(Clone, Debug)]
pub struct RecordedCall {
	pub endpoint: Endpoint,
	pub method: HttpMethod,
	pub url: String,
	pub token: Option<String>,
	pub body: Option<Value>,
}

/// In-memory transport replaying per-endpoint replies and recording every request.
///
/// Replies queue per endpoint and the last one repeats. Unscripted `auth_sign` calls issue
/// `token-1`, `token-2`, ... in order; other unscripted endpoints answer `{"result":"ok"}`.
#[derive(Default)]
pub struct ScriptedHttpClient {
	replies: Mutex<HashMap<Endpoint, VecDeque<Reply>>>,
	delays: Mutex<HashMap<Endpoint, StdDuration>>,
	calls: Mutex<Vec<RecordedCall>>,
}
impl ScriptedHttpClient {
	pub fn respond(self, endpoint: Endpoint, status: u16, body: &str) -> Self {
		self.replies
			.lock()
			.entry(endpoint)
			.or_default()
			.push_back(Reply::Respond(RawResponse::new(status, body)));

		self
	}

	pub fn ok(self, endpoint: Endpoint, body: &str) -> Self {
		self.respond(endpoint, 200, body)
	}

	pub fn fail(self, endpoint: Endpoint) -> Self {
		self.replies.lock().entry(endpoint).or_default().push_back(Reply::Fail);

		self
	}

	pub fn delay(self, endpoint: Endpoint, delay: StdDuration) -> Self {
		self.delays.lock().insert(endpoint, delay);

		self
	}

	pub fn calls(&self) -> Vec<RecordedCall> {
		self.calls.lock().clone()
	}

	pub fn endpoints(&self) -> Vec<Endpoint> {
		self.calls.lock().iter().map(|call| call.endpoint).collect()
	}

	pub fn count(&self, endpoint: Endpoint) -> usize {
		self.calls.lock().iter().filter(|call| call.endpoint == endpoint).count()
	}

	pub fn last_call(&self, endpoint: Endpoint) -> RecordedCall {
		self.calls
			.lock()
			.iter()
			.rev()
			.find(|call| call.endpoint == endpoint)
			.cloned()
			.expect("Endpoint should have been called.")
	}

	fn next_reply(&self, endpoint: Endpoint, ordinal: usize) -> Reply {
		let mut replies = self.replies.lock();

		match replies.get_mut(&endpoint) {
			Some(queue) if queue.len() > 1 => queue.pop_front().expect("Queue is non-empty."),
			Some(queue) if !queue.is_empty() => queue[0].clone(),
			_ if endpoint == Endpoint::AuthSign => Reply::Respond(RawResponse::new(
				200,
				format!(r#"{{"result":"ok","auth_token":"token-{ordinal}"}}"#),
			)),
			_ => Reply::Respond(RawResponse::new(200, r#"{"result":"ok"}"#)),
		}
	}
}
impl PushHttpClient for ScriptedHttpClient {
	type TransportError = FakeTransportError;

	fn execute(&self, request: RequestSpec) -> HttpFuture<'_, Self::TransportError> {
		let ordinal = {
			let mut calls = self.calls.lock();

			calls.push(RecordedCall {
				endpoint: request.endpoint,
				method: request.method,
				url: request.url.to_string(),
				token: request.header(AUTH_TOKEN_HEADER).map(ToOwned::to_owned),
				body: request
					.body
					.as_deref()
					.map(|body| serde_json::from_slice(body).expect("Request body should be JSON.")),
			});

			calls.iter().filter(|call| call.endpoint == request.endpoint).count()
		};
		let reply = self.next_reply(request.endpoint, ordinal);
		let delay = self.delays.lock().get(&request.endpoint).copied();

		Box::pin(async move {
			if let Some(delay) = delay {
				tokio::time::sleep(delay).await;
			}

			match reply {
				Reply::Respond(response) => Ok(response),
				Reply::Fail => Err(FakeTransportError),
			}
		})
	}
}

/// Polls `condition` every few milliseconds until it holds or `deadline` passes.
pub async fn wait_until(deadline: StdDuration, mut condition: impl FnMut() -> bool) -> bool {
	let started = tokio::time::Instant::now();

	while started.elapsed() < deadline {
		if condition() {
			return true;
		}

		tokio::time::sleep(StdDuration::from_millis(5)).await;
	}

	condition()
}
