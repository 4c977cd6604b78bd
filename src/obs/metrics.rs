// self
use crate::obs::{OpKind, OpOutcome};

/// Records an operation outcome via the global metrics recorder (when enabled).
pub fn record_op_outcome(kind: OpKind, outcome: OpOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"push_broker_op_total",
			"op" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records a renewal-cycle outcome (`attempt`, `success`, `failure`, `invalidation_failure`).
pub fn record_renewal_outcome(outcome: &'static str) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("push_broker_renewal_total", "outcome" => outcome).increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = outcome;
	}
}
