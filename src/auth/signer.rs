//! Token-issuance signatures.

// crates.io
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	auth::{AppKey, MasterSecret},
};

/// Lowercase hex SHA-256 signature attached to token-issuance requests.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Signature(String);
impl Signature {
	/// Returns the hex-encoded digest.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Debug for Signature {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Signature({})", self.0)
	}
}
impl Display for Signature {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Computes `sha256(app_key || timestamp_millis || master_secret)` as lowercase hex.
pub fn sign(app_key: &AppKey, master_secret: &MasterSecret, timestamp_millis: i64) -> Signature {
	let mut hasher = Sha256::new();

	hasher.update(app_key.as_bytes());
	hasher.update(timestamp_millis.to_string().as_bytes());
	hasher.update(master_secret.expose().as_bytes());

	Signature(format!("{:x}", hasher.finalize()))
}

/// Returns the current Unix epoch in milliseconds.
pub fn now_millis() -> i64 {
	(OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}
