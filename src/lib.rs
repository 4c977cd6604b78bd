//! Session and request-dispatch layer for signed, token-based push-notification REST APIs:
//! self-renewing credentials, typed push envelopes, and transport-aware observability in one crate.
//!
//! A [`session::Session`] signs in with the application's key and master secret, keeps the issued
//! token fresh on a background timer, and hands it out without blocking. A
//! [`dispatch::Dispatcher`] turns typed [`message`] bodies into authenticated calls and classifies
//! every response through the [`envelope`] rules.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod dispatch;
pub mod endpoint;
pub mod envelope;
pub mod error;
pub mod http;
pub mod message;
pub mod obs;
pub mod session;

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
