use trackerblocker_domain::{ContentBlockerRule, TrackerData};

/// Turns tracker data into content blocker rules.
///
/// Implementations must be pure: the same input always yields the same rules
/// in the same order.
pub trait RuleBuilder: Send + Sync {
    fn build_rules(
        &self,
        tracker_data: &TrackerData,
        unprotected_domains: &[String],
    ) -> Vec<ContentBlockerRule>;
}
