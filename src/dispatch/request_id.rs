//! Client correlation ids for push requests.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::_prelude::*;

static LAST_STAMP: AtomicU64 = AtomicU64::new(0);

/// Generates a process-unique request id.
///
/// The id is the current epoch in nanoseconds, bumped past the previously issued stamp so ids stay
/// strictly increasing even when the clock stalls or steps back, followed by a random 16-bit
/// suffix. Both parts are lowercase hex.
pub fn next_request_id() -> String {
	let now = u64::try_from(OffsetDateTime::now_utc().unix_timestamp_nanos()).unwrap_or_default();
	let previous = LAST_STAMP
		.fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| Some(now.max(last + 1)))
		.unwrap_or_else(|last| last);
	let stamp = now.max(previous + 1);

	format!("{stamp:x}{:04x}", rand::random::<u16>())
}

/// Fills `slot` with a fresh id when it is empty and returns the id the request will carry.
pub(crate) fn stamp(slot: &mut String) -> String {
	if slot.is_empty() {
		*slot = next_request_id();
	}

	slot.clone()
}
