use dashmap::DashMap;
use tracing::warn;
use trackerblocker_application::ports::ErrorTracker;

/// Reports recovered failures to the log and keeps per-category counts.
#[derive(Default)]
pub struct TracingErrorTracker {
    counts: DashMap<String, u64>,
}

impl TracingErrorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, category: &str) -> u64 {
        self.counts.get(category).map(|c| *c).unwrap_or(0)
    }

    /// Counts sorted by category.
    pub fn snapshot(&self) -> Vec<(String, u64)> {
        let mut counts: Vec<(String, u64)> = self
            .counts
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();
        counts.sort();
        counts
    }
}

impl ErrorTracker for TracingErrorTracker {
    fn report(&self, category: &str, detail: &str) {
        warn!(category, detail, "Tracked error");
        *self.counts.entry(category.to_string()).or_insert(0) += 1;
    }
}
