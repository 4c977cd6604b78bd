//! Optional observability helpers for session and dispatch operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `push_broker.op` with the `op` and `stage`
//!   fields, plus renewal-loop events.
//! - Enable `metrics` to increment the `push_broker_op_total` counter for every
//!   attempt/success/failure, labeled by `op` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the broker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
	/// Token issuance.
	Acquire,
	/// Token revocation.
	Invalidate,
	/// Invalidate-then-reacquire cycle.
	Renew,
	/// Single-target push.
	PushSingle,
	/// Two-phase list push.
	PushList,
	/// App-wide push.
	PushApp,
	/// Task cancellation.
	StopTask,
	/// User-status lookup.
	UserStatus,
}
impl OpKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpKind::Acquire => "acquire",
			OpKind::Invalidate => "invalidate",
			OpKind::Renew => "renew",
			OpKind::PushSingle => "push_single",
			OpKind::PushList => "push_list",
			OpKind::PushApp => "push_app",
			OpKind::StopTask => "stop_task",
			OpKind::UserStatus => "user_status",
		}
	}
}
impl Display for OpKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to a broker operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller (or the renewal observer).
	Failure,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Success => "success",
			OpOutcome::Failure => "failure",
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside an operation span, recording attempt and outcome counters.
pub(crate) async fn observe<T, Fut>(kind: OpKind, stage: &'static str, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = OpSpan::new(kind, stage);

	record_op_outcome(kind, OpOutcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => record_op_outcome(kind, OpOutcome::Success),
		Err(_) => record_op_outcome(kind, OpOutcome::Failure),
	}

	result
}
