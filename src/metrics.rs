use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing prediction traffic.
#[derive(Debug, Default)]
pub struct PredictionMetrics {
    predictions_served: AtomicU64,
    prediction_failures: AtomicU64,
    rejected_requests: AtomicU64,
}

impl PredictionMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a prediction that produced a response.
    pub fn record_success(&self) {
        self.predictions_served.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a prediction that failed inside the inference engine.
    pub fn record_failure(&self) {
        self.prediction_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a request rejected because of its parameters.
    pub fn record_rejection(&self) {
        self.rejected_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            predictions_served: self.predictions_served.load(Ordering::Relaxed),
            prediction_failures: self.prediction_failures.load(Ordering::Relaxed),
            rejected_requests: self.rejected_requests.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of prediction counters used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Predictions answered with a 200 since startup.
    pub predictions_served: u64,
    /// Predictions that failed during computation.
    pub prediction_failures: u64,
    /// Prediction requests rejected for invalid parameters.
    pub rejected_requests: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_each_outcome() {
        let metrics = PredictionMetrics::new();
        metrics.record_success();
        metrics.record_success();
        metrics.record_failure();
        metrics.record_rejection();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.predictions_served, 2);
        assert_eq!(snapshot.prediction_failures, 1);
        assert_eq!(snapshot.rejected_requests, 1);
    }

    #[test]
    fn snapshot_starts_empty() {
        let metrics = PredictionMetrics::new();
        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                predictions_served: 0,
                prediction_failures: 0,
                rejected_requests: 0,
            }
        );
    }
}
