//! Strongly typed application identifiers validated at construction.

// std
use std::ops::Deref;
// self
use crate::_prelude::*;

const IDENTIFIER_MAX_LEN: usize = 128;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} cannot be empty.")]
	Empty {
		/// Which identifier failed (`AppId`, `AppKey`).
		kind: &'static str,
	},
	/// The identifier contains whitespace, which the service never issues.
	#[error("{kind} contains whitespace.")]
	ContainsWhitespace {
		/// Which identifier failed (`AppId`, `AppKey`).
		kind: &'static str,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} exceeds {max} characters.")]
	TooLong {
		/// Which identifier failed (`AppId`, `AppKey`).
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
}

macro_rules! def_id {
	($(#[$meta:meta])* $name:ident) => {
		$(#[$meta])*
		#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Validates `value` and wraps it.
			pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
				let value = value.into();

				check(stringify!($name), &value)?;

				Ok(Self(value))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &str {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				Self::new(value)
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, "{}({})", stringify!($name), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
	};
}

def_id! {
	/// Application identifier that scopes every endpoint path.
	AppId
}
def_id! {
	/// Application key stamped into signatures and push bodies.
	AppKey
}

fn check(kind: &'static str, value: &str) -> Result<(), IdentifierError> {
	match value {
		"" => Err(IdentifierError::Empty { kind }),
		v if v.chars().any(char::is_whitespace) =>
			Err(IdentifierError::ContainsWhitespace { kind }),
		v if v.len() > IDENTIFIER_MAX_LEN =>
			Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN }),
		_ => Ok(()),
	}
}
