use std::sync::Mutex;

/// Request/failure counters shared by the REST client operations.
pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

struct Metrics {
    requests: usize,
    failures: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics {
                requests: 0,
                failures: 0,
            }),
        }
    }

    pub fn record_request(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.requests += 1;
        }
    }

    pub fn record_failure(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.failures += 1;
        }
    }

    /// Snapshot of (requests issued, failures observed).
    pub fn snapshot(&self) -> (usize, usize) {
        if let Ok(metrics) = self.inner.lock() {
            (metrics.requests, metrics.failures)
        } else {
            (0, 0)
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder_counts_requests_and_failures() {
        let recorder = MetricsRecorder::new();
        recorder.record_request();
        recorder.record_request();
        recorder.record_failure();
        assert_eq!(recorder.snapshot(), (2, 1));
    }
}
