//! Application identity, redacted secrets, and request signing.

pub mod credentials;
pub mod id;
pub mod secret;
pub mod signer;

pub use credentials::*;
pub use id::*;
pub use secret::*;
pub use signer::*;
