use std::time::Instant;
use tracing::debug;

/// Logs how long a scope took when dropped.
///
/// ```
/// use search_core::LogDuration;
/// {
///     let _timer = LogDuration::new("rebuild");
///     // ...
/// }
/// ```
pub struct LogDuration {
    label: &'static str,
    start: Instant,
}

impl LogDuration {
    pub fn new(label: &'static str) -> Self {
        Self { label, start: Instant::now() }
    }
}

impl Drop for LogDuration {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        debug!(label = self.label, elapsed_ms = elapsed.as_secs_f64() * 1000.0, "operation time");
    }
}
