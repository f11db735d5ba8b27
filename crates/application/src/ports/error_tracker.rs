/// Fire-and-forget side channel for recovered failures.
pub trait ErrorTracker: Send + Sync {
    fn report(&self, category: &str, detail: &str);
}
