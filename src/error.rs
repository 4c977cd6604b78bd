//! Broker-level error types shared by the session manager and the request dispatcher.

// self
use crate::_prelude::*;

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical broker error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Caller input was rejected before any network activity.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Response body could not be decoded into the expected envelope.
	#[error(transparent)]
	Decode(#[from] DecodeError),
	/// Credential acquisition or invalidation failed.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// The service decoded fine but reported a non-success result code.
	#[error("Push service rejected the request with `{code}`: {description}.")]
	Remote {
		/// Result code returned by the service.
		code: String,
		/// Service-provided description (empty when omitted).
		description: String,
	},
}
impl Error {
	/// Returns the remote result code when the error came from the service envelope.
	pub fn remote_code(&self) -> Option<&str> {
		match self {
			Self::Remote { code, .. } => Some(code),
			_ => None,
		}
	}
}

/// Client-side validation failures raised before a request is sent.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ValidationError {
	/// Push target names neither a client id nor an alias.
	#[error("The {operation} target must specify a client id or an alias.")]
	MissingTarget {
		/// Operation label.
		operation: &'static str,
	},
	/// A required identifier was empty.
	#[error("The {operation} request requires a non-empty {field}.")]
	EmptyField {
		/// Operation label.
		operation: &'static str,
		/// Offending field name.
		field: &'static str,
	},
	/// Endpoint path template needs a parameter that was not supplied.
	#[error("Endpoint `{endpoint}` requires a path parameter.")]
	MissingPathParam {
		/// Endpoint path label.
		endpoint: &'static str,
	},
	/// Endpoint path template does not take a parameter but one was supplied.
	#[error("Endpoint `{endpoint}` does not accept a path parameter.")]
	UnexpectedPathParam {
		/// Endpoint path label.
		endpoint: &'static str,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the push service.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Envelope decoding failures.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// Response body is not valid JSON for the expected envelope.
	#[error("Push service returned malformed JSON (status {status:?}, body `{body}`).")]
	Json {
		/// Structured parsing failure, including the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Bounded preview of the raw body.
		body: String,
	},
	/// A decoded field carried a value that could not be interpreted.
	#[error("Push service returned an invalid `{field}` value: {reason}.")]
	Field {
		/// Field name as it appears on the wire.
		field: &'static str,
		/// Why the value was rejected.
		reason: String,
	},
	/// Outgoing request body could not be serialized.
	#[error("Request body could not be serialized.")]
	Encode(#[source] serde_json::Error),
}

/// Credential acquisition and invalidation failures.
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// Token issuance endpoint answered with a non-success result.
	#[error("Push service refused to issue a token: {description}.")]
	Rejected {
		/// Service-provided description, or the result code when none was sent.
		description: String,
	},
	/// Token issuance could not complete (transport or decode failure).
	#[error("Token acquisition failed.")]
	Acquisition {
		/// Underlying failure.
		#[source]
		source: Box<Error>,
	},
	/// No token is currently held by the session.
	#[error("Session holds no active token.")]
	NoActiveToken,
	/// The session was closed and will not acquire again.
	#[error("Session has been closed.")]
	Closed,
}

/// Configuration failures raised while building sessions.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Base URL cannot be parsed or cannot carry path segments.
	#[error("Base URL `{url}` is invalid.")]
	InvalidBaseUrl {
		/// Offending URL string.
		url: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
