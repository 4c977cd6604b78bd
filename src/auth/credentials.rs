//! Static application credentials supplied once at startup.

// self
use crate::{
	_prelude::*,
	auth::{AppId, AppKey, IdentifierError, MasterSecret},
};

/// Immutable application credentials shared by every call a session makes.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationCredentials {
	/// Application identifier used as the first path segment of every endpoint.
	pub app_id: AppId,
	/// Application key stamped into signatures and message bodies.
	pub app_key: AppKey,
	/// Master secret used only while signing token requests.
	pub master_secret: MasterSecret,
}
impl ApplicationCredentials {
	/// Creates a credential set from validated parts.
	pub fn new(app_id: AppId, app_key: AppKey, master_secret: MasterSecret) -> Self {
		Self { app_id, app_key, master_secret }
	}

	/// Validates raw strings and assembles a credential set.
	pub fn parse(
		app_id: impl Into<String>,
		app_key: impl Into<String>,
		master_secret: impl Into<String>,
	) -> Result<Self, IdentifierError> {
		Ok(Self::new(
			AppId::new(app_id)?,
			AppKey::new(app_key)?,
			MasterSecret::new(master_secret),
		))
	}
}
impl Debug for ApplicationCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApplicationCredentials")
			.field("app_id", &self.app_id)
			.field("app_key", &self.app_key)
			.field("master_secret", &self.master_secret)
			.finish()
	}
}
